//! Resolves human-readable state and district names to the numeric ids the
//! booking API expects.

use std::collections::HashMap;

use crate::client::SessionClient;
use crate::endpoints::{LIST_DISTRICTS, LIST_STATES};
use crate::error::ClientError;
use crate::otp::OtpProvider;
use crate::types::{DistrictsResponse, StatesResponse};

/// Name lookups backed by the location catalog. Resolved district ids are
/// remembered with their display names for the lifetime of one search run.
#[derive(Debug, Default)]
pub struct LocationResolver {
    district_names: HashMap<i64, String>,
}

impl LocationResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the state list and returns the id of the first exact name match.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if no state has that exact name.
    /// - Any [`SessionClient::execute`] error.
    pub async fn resolve_state<P: OtpProvider>(
        &self,
        client: &mut SessionClient<'_, P>,
        state_name: &str,
    ) -> Result<i64, ClientError> {
        let response: StatesResponse = client.execute_as(&LIST_STATES, &[], &[]).await?;
        response
            .states
            .into_iter()
            .find(|s| s.state_name == state_name)
            .map(|s| s.state_id)
            .ok_or_else(|| ClientError::NotFound {
                kind: "state",
                name: state_name.to_owned(),
            })
    }

    /// Fetches the district list for `state_id` and returns the id of the
    /// first exact name match, recording the id-to-name mapping.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if no district has that exact name.
    /// - Any [`SessionClient::execute`] error.
    pub async fn resolve_district<P: OtpProvider>(
        &mut self,
        client: &mut SessionClient<'_, P>,
        state_id: i64,
        district_name: &str,
    ) -> Result<i64, ClientError> {
        let state_id = state_id.to_string();
        let response: DistrictsResponse = client
            .execute_as(&LIST_DISTRICTS, &[("state_id", state_id.as_str())], &[])
            .await?;
        let district = response
            .districts
            .into_iter()
            .find(|d| d.district_name == district_name)
            .ok_or_else(|| ClientError::NotFound {
                kind: "district",
                name: district_name.to_owned(),
            })?;

        self.district_names
            .insert(district.district_id, district_name.to_owned());
        Ok(district.district_id)
    }

    /// Display name for a district id resolved earlier in this run.
    #[must_use]
    pub fn district_name(&self, district_id: i64) -> Option<&str> {
        self.district_names.get(&district_id).map(String::as_str)
    }
}
