//! Beneficiary listing for the session client.

use crate::client::SessionClient;
use crate::endpoints::LIST_BENEFICIARIES;
use crate::error::ClientError;
use crate::otp::OtpProvider;
use crate::types::BeneficiariesResponse;

impl<P: OtpProvider> SessionClient<'_, P> {
    /// Lists the reference ids of beneficiaries registered to the account.
    ///
    /// The endpoint always needs a bearer token, so in public-API mode this
    /// returns an empty list instead of triggering authentication.
    ///
    /// # Errors
    ///
    /// Any [`SessionClient::execute`] error, or [`ClientError::Deserialize`]
    /// if the response shape is unexpected.
    pub async fn fetch_beneficiaries(&mut self) -> Result<Vec<String>, ClientError> {
        if self.config().use_public_api {
            tracing::warn!("beneficiaries cannot be fetched without authentication in public-API mode");
            return Ok(Vec::new());
        }

        let response: BeneficiariesResponse =
            self.execute_as(&LIST_BENEFICIARIES, &[], &[]).await?;
        let ids: Vec<String> = response
            .beneficiaries
            .into_iter()
            .map(|b| b.beneficiary_reference_id)
            .collect();
        tracing::info!(count = ids.len(), "fetched beneficiaries");
        Ok(ids)
    }
}
