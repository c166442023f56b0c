//! Slot search: scans a window of weeks across a list of districts and keeps
//! the sessions that match the age and dose filters.

use chrono::{Days, Local, NaiveDate};
use vaxslot_core::SearchConfig;

use crate::client::SessionClient;
use crate::endpoints::{Endpoint, SESSIONS_BY_DISTRICT, SESSIONS_BY_DISTRICT_PUBLIC};
use crate::error::ClientError;
use crate::locations::LocationResolver;
use crate::otp::OtpProvider;
use crate::types::{CalendarResponse, CalendarSession, SlotMatch};

/// Date format the calendar endpoints expect in the `date` query parameter.
const CALENDAR_DATE_FORMAT: &str = "%d-%m-%Y";

/// Runs one search pass starting today (local time).
///
/// # Errors
///
/// See [`search_slots_from`].
pub async fn search_slots<P: OtpProvider>(
    client: &mut SessionClient<'_, P>,
    filters: &SearchConfig,
) -> Result<Vec<SlotMatch>, ClientError> {
    search_slots_from(client, filters, Local::now().date_naive()).await
}

/// Runs one search pass whose first week starts at `start`.
///
/// Issues one calendar request per (week, district) pair, weeks outermost.
/// Matches are returned in visiting order and are not deduplicated. When
/// `filters.weeks` is zero or no districts are listed, returns an empty list
/// without touching the network.
///
/// # Errors
///
/// - [`ClientError::NotFound`] if the state or any district name is unknown.
/// - Any [`SessionClient::execute`] error from the location or calendar calls.
pub async fn search_slots_from<P: OtpProvider>(
    client: &mut SessionClient<'_, P>,
    filters: &SearchConfig,
    start: NaiveDate,
) -> Result<Vec<SlotMatch>, ClientError> {
    if filters.weeks == 0 || filters.districts.is_empty() {
        return Ok(Vec::new());
    }

    let mut resolver = LocationResolver::new();
    let state_id = resolver.resolve_state(client, &filters.state).await?;
    let mut district_ids = Vec::with_capacity(filters.districts.len());
    for name in &filters.districts {
        district_ids.push(resolver.resolve_district(client, state_id, name).await?);
    }

    let endpoint: &Endpoint = if client.config().use_public_api {
        &SESSIONS_BY_DISTRICT_PUBLIC
    } else {
        &SESSIONS_BY_DISTRICT
    };

    let mut matches = Vec::new();
    for week in 0..filters.weeks {
        let week_start = start
            .checked_add_days(Days::new(u64::from(week) * 7))
            .unwrap_or(NaiveDate::MAX);
        let date = week_start.format(CALENDAR_DATE_FORMAT).to_string();

        for &district_id in &district_ids {
            let query = [
                ("district_id", district_id.to_string()),
                ("date", date.clone()),
            ];
            let calendar: CalendarResponse = client.execute_as(endpoint, &[], &query).await?;
            let district = resolver.district_name(district_id).unwrap_or_default();

            let before = matches.len();
            collect_matches(&calendar, district, filters.min_age, filters.dose, &mut matches);
            tracing::debug!(
                district_id,
                date = %date,
                centers = calendar.centers.len(),
                matched = matches.len() - before,
                "calendar scanned"
            );
        }
    }

    tracing::info!(matches = matches.len(), "search pass complete");
    Ok(matches)
}

/// Whether `session` admits someone of `min_age` for `dose`.
#[must_use]
pub fn session_matches(session: &CalendarSession, min_age: u32, dose: u8) -> bool {
    session.min_age_limit <= min_age && session.capacity_for_dose(dose) > 0
}

fn collect_matches(
    calendar: &CalendarResponse,
    district: &str,
    min_age: u32,
    dose: u8,
    out: &mut Vec<SlotMatch>,
) {
    for center in &calendar.centers {
        for session in &center.sessions {
            if !session_matches(session, min_age, dose) {
                continue;
            }
            out.push(SlotMatch {
                session_id: session.session_id.clone(),
                center_id: center.center_id,
                center_name: center.name.clone(),
                district: district.to_owned(),
                date: session.date.clone(),
                vaccine: session.vaccine.clone(),
                available_capacity: session.capacity_for_dose(dose),
                time_slots: session.slots.clone(),
            });
        }
    }
}
