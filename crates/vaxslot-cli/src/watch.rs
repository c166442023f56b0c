//! Periodic search loop: search, notify, open the dashboard, sleep, repeat.
//!
//! Transport failures are logged and retried on the next pass. Exhausted
//! re-authentication and unknown location names stop the loop, as does
//! Ctrl-C or SIGTERM.

use std::future::Future;
use std::time::Duration;

use vaxslot_client::{
    search_slots, BookingRequest, ClientError, OtpProvider, SessionClient, SlotMatch,
};
use vaxslot_core::SearchConfig;

use crate::browser;
use crate::notifier::Notifier;

pub(crate) async fn run_watch<P: OtpProvider>(
    client: &mut SessionClient<'_, P>,
    filters: &SearchConfig,
    interval: Duration,
) -> anyhow::Result<()> {
    run_watch_until(client, filters, interval, shutdown_signal()).await
}

/// Runs passes every `interval` until `shutdown` completes or a pass hits an
/// error that no later pass can recover from.
pub(crate) async fn run_watch_until<P: OtpProvider>(
    client: &mut SessionClient<'_, P>,
    filters: &SearchConfig,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let config = client.config();
    let mut notifier = Notifier::from_config(config)?;
    let mut beneficiaries: Option<Vec<String>> = None;
    tokio::pin!(shutdown);

    let mut run_count: u64 = 1;
    loop {
        tracing::info!(run_count, "starting search pass");
        if beneficiaries.is_none() {
            beneficiaries = fetch_beneficiaries(client).await?;
        }

        match search_slots(client, filters).await {
            Ok(matches) if matches.is_empty() => tracing::info!("no matching sessions"),
            Ok(matches) => {
                for m in &matches {
                    tracing::info!(session_id = %m.session_id, "available slot: {m}");
                }
                if let Err(e) = notifier.notify(&matches).await {
                    tracing::warn!(error = %e, "notification failed");
                }
                let ids = beneficiaries.as_deref().unwrap_or_default();
                if let Some(request) =
                    preferred_booking(&matches, &filters.districts, ids, filters.dose)
                {
                    tracing::info!(
                        request = %serde_json::to_string(&request).unwrap_or_default(),
                        "booking is manual; preferred slot"
                    );
                }
                if let Err(e) = browser::open_tab(config.browser.as_deref(), &config.dashboard_url)
                {
                    tracing::warn!(error = %e, "failed to open browser");
                }
            }
            Err(e) if e.is_fatal_for_run() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "search pass failed, will retry next interval");
            }
        }

        run_count += 1;
        tokio::select! {
            () = tokio::time::sleep(interval) => {},
            () = &mut shutdown => {
                tracing::info!("received shutdown signal, exiting");
                return Ok(());
            }
        }
    }
}

/// `Ok(None)` when the fetch failed transiently and should be retried on the
/// next pass.
async fn fetch_beneficiaries<P: OtpProvider>(
    client: &mut SessionClient<'_, P>,
) -> Result<Option<Vec<String>>, ClientError> {
    match client.fetch_beneficiaries().await {
        Ok(ids) => Ok(Some(ids)),
        Err(e) if e.is_fatal_for_run() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch beneficiaries, will retry next pass");
            Ok(None)
        }
    }
}

/// Picks the first bookable slot, visiting districts in preference order.
/// `None` without beneficiaries or when no match offers a time slot.
pub(crate) fn preferred_booking(
    matches: &[SlotMatch],
    districts: &[String],
    beneficiaries: &[String],
    dose: u8,
) -> Option<BookingRequest> {
    if beneficiaries.is_empty() {
        return None;
    }
    districts.iter().find_map(|district| {
        matches
            .iter()
            .filter(|m| &m.district == district)
            .find_map(|m| {
                m.time_slots
                    .first()
                    .map(|slot| m.booking_request(beneficiaries, slot, dose))
            })
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use vaxslot_core::AppConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct NoOtp;

    impl OtpProvider for NoOtp {
        async fn obtain_otp(&self, _timeout: Duration) -> Option<String> {
            panic!("watch tests must not trigger authentication");
        }
    }

    fn config(api_base_url: String) -> AppConfig {
        AppConfig {
            mobile_number: "9876543210".to_string(),
            otp_secret: "secret".to_string(),
            log_level: "info".to_string(),
            api_base_url,
            request_timeout_secs: 5,
            user_agent: "test".to_string(),
            origin: "http://localhost".to_string(),
            referer: "http://localhost/".to_string(),
            max_auth_retries: 1,
            otp_timeout_secs: 1,
            use_public_api: false,
            poll_interval_mins: 1,
            notify_min_interval_secs: 30,
            notify_webhook_url: None,
            browser: None,
            dashboard_url: "http://localhost/dashboard".to_string(),
            search_config_path: PathBuf::from("search.yaml"),
        }
    }

    fn filters(district: &str) -> SearchConfig {
        SearchConfig {
            state: "Maharashtra".to_string(),
            districts: vec![district.to_string()],
            min_age: 45,
            dose: 1,
            weeks: 1,
        }
    }

    async fn mount_locations(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v2/admin/location/states"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "states": [{ "state_id": 21, "state_name": "Maharashtra" }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/admin/location/districts/21"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "districts": [{ "district_id": 363, "district_name": "Pune" }]
            })))
            .mount(server)
            .await;
    }

    async fn mount_beneficiaries(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/v2/appointment/beneficiaries"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn beneficiaries_outage_does_not_stop_the_search_pass() {
        let server = MockServer::start().await;
        mount_locations(&server).await;
        mount_beneficiaries(&server, ResponseTemplate::new(503).set_body_string("busy")).await;
        Mock::given(method("GET"))
            .and(path("/v2/appointment/sessions/calendarByDistrict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "centers": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(server.uri());
        let mut client = SessionClient::new(&config, NoOtp).unwrap();

        run_watch_until(
            &mut client,
            &filters("Pune"),
            Duration::from_secs(60),
            std::future::ready(()),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_district_stops_the_loop() {
        let server = MockServer::start().await;
        mount_locations(&server).await;
        mount_beneficiaries(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "beneficiaries": [] })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v2/appointment/sessions/calendarByDistrict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "centers": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let config = config(server.uri());
        let mut client = SessionClient::new(&config, NoOtp).unwrap();

        let err = run_watch_until(
            &mut client,
            &filters("Atlantis"),
            Duration::from_secs(60),
            std::future::pending(),
        )
        .await
        .unwrap_err();

        assert!(
            matches!(
                err.downcast_ref::<ClientError>(),
                Some(ClientError::NotFound { kind: "district", .. })
            ),
            "expected NotFound(district), got: {err:?}"
        );
    }

    #[tokio::test]
    async fn transient_beneficiary_failure_is_retried_later() {
        let server = MockServer::start().await;
        mount_beneficiaries(&server, ResponseTemplate::new(502)).await;

        let config = config(server.uri());
        let mut client = SessionClient::new(&config, NoOtp).unwrap();

        assert_eq!(fetch_beneficiaries(&mut client).await.unwrap(), None);
    }
}
