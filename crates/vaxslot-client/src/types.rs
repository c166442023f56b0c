//! Booking-API request and response types, plus the [`SlotMatch`] produced
//! by a search pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateOtpRequest<'a> {
    pub mobile: &'a str,
    pub secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateOtpResponse {
    #[serde(rename = "txnId")]
    pub txn_id: String,
}

/// `otp` is the hex SHA-256 digest of the code, never the code itself.
#[derive(Debug, Serialize)]
pub struct ValidateOtpRequest<'a> {
    #[serde(rename = "txnId")]
    pub txn_id: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ValidateOtpResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StatesResponse {
    pub states: Vec<State>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct State {
    pub state_id: i64,
    pub state_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DistrictsResponse {
    pub districts: Vec<District>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct District {
    pub district_id: i64,
    pub district_name: String,
}

// ---------------------------------------------------------------------------
// Beneficiaries
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BeneficiariesResponse {
    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Beneficiary {
    pub beneficiary_reference_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CalendarResponse {
    #[serde(default)]
    pub centers: Vec<Center>,
}

#[derive(Debug, Deserialize)]
pub struct Center {
    pub center_id: i64,
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<CalendarSession>,
}

/// One dated session at a center. Capacity is reported per dose as
/// `available_capacity_dose{N}`; doses beyond 2 land in `extra`.
#[derive(Debug, Deserialize)]
pub struct CalendarSession {
    pub session_id: String,
    pub date: String,
    pub min_age_limit: u32,
    #[serde(default)]
    pub vaccine: String,
    #[serde(default)]
    pub available_capacity_dose1: u32,
    #[serde(default)]
    pub available_capacity_dose2: u32,
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl CalendarSession {
    /// Available capacity for the given dose number; 0 when the API omits it.
    #[must_use]
    pub fn capacity_for_dose(&self, dose: u8) -> u32 {
        match dose {
            1 => self.available_capacity_dose1,
            2 => self.available_capacity_dose2,
            n => self
                .extra
                .get(&format!("available_capacity_dose{n}"))
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// One center session that satisfied the caller's filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotMatch {
    pub session_id: String,
    pub center_id: i64,
    pub center_name: String,
    pub district: String,
    pub date: String,
    pub vaccine: String,
    /// Capacity for the dose that was searched for.
    pub available_capacity: u32,
    pub time_slots: Vec<String>,
}

impl std::fmt::Display for SlotMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, slots available({}), {} on {}",
            self.center_name, self.district, self.available_capacity, self.vaccine, self.date
        )
    }
}

/// Body of the schedule endpoint. Built locally; this crate never sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub center_id: i64,
    pub session_id: String,
    pub beneficiaries: Vec<String>,
    pub slot: String,
    pub dose: u8,
}

impl SlotMatch {
    /// Builds the schedule-endpoint payload for this match.
    #[must_use]
    pub fn booking_request(&self, beneficiaries: &[String], slot: &str, dose: u8) -> BookingRequest {
        BookingRequest {
            center_id: self.center_id,
            session_id: self.session_id.clone(),
            beneficiaries: beneficiaries.to_vec(),
            slot: slot.to_owned(),
            dose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_json(extra: serde_json::Value) -> CalendarSession {
        let mut base = serde_json::json!({
            "session_id": "s-1",
            "date": "01-06-2021",
            "min_age_limit": 18,
            "vaccine": "COVISHIELD",
            "available_capacity_dose1": 4,
            "available_capacity_dose2": 0,
            "slots": ["09:00AM-11:00AM"]
        });
        if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in more {
                obj.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn capacity_for_first_and_second_dose() {
        let s = session_json(serde_json::json!({}));
        assert_eq!(s.capacity_for_dose(1), 4);
        assert_eq!(s.capacity_for_dose(2), 0);
    }

    #[test]
    fn capacity_for_later_dose_reads_flattened_field() {
        let s = session_json(serde_json::json!({ "available_capacity_dose3": 7 }));
        assert_eq!(s.capacity_for_dose(3), 7);
        assert_eq!(s.capacity_for_dose(4), 0);
    }

    #[test]
    fn missing_capacity_fields_default_to_zero() {
        let s: CalendarSession = serde_json::from_value(serde_json::json!({
            "session_id": "s-2",
            "date": "02-06-2021",
            "min_age_limit": 45
        }))
        .unwrap();
        assert_eq!(s.capacity_for_dose(1), 0);
        assert_eq!(s.capacity_for_dose(2), 0);
        assert!(s.slots.is_empty());
    }

    #[test]
    fn validate_request_uses_wire_field_names() {
        let body = serde_json::to_value(ValidateOtpRequest {
            txn_id: "t-1",
            otp: "abc",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "txnId": "t-1", "otp": "abc" }));
    }

    #[test]
    fn slot_match_display_and_booking_request() {
        let m = SlotMatch {
            session_id: "s-9".to_owned(),
            center_id: 77,
            center_name: "PHC Indiranagar".to_owned(),
            district: "BBMP".to_owned(),
            date: "03-06-2021".to_owned(),
            vaccine: "COVAXIN".to_owned(),
            available_capacity: 12,
            time_slots: vec!["10:00AM-12:00PM".to_owned()],
        };
        assert_eq!(
            m.to_string(),
            "PHC Indiranagar, BBMP, slots available(12), COVAXIN on 03-06-2021"
        );

        let req = m.booking_request(&["ref-1".to_owned()], "10:00AM-12:00PM", 2);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "center_id": 77,
                "session_id": "s-9",
                "beneficiaries": ["ref-1"],
                "slot": "10:00AM-12:00PM",
                "dose": 2
            })
        );
    }
}
