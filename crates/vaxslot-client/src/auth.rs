//! OTP authentication state machine.
//!
//! ```text
//! RequestingOtp -> AwaitingOtp -> ValidatingOtp -> Authenticated
//!       ^               |               |
//!       +---------------+---------------+   (attempt + 1, until the bound)
//!                                           -> Failed
//! ```
//!
//! A missing OTP or a rejected validation restarts the cycle with a fresh
//! transaction id. A failed OTP-generation call is fatal and propagates.

use std::time::Duration;

use reqwest::Url;
use vaxslot_core::AppConfig;

use crate::endpoints::{Endpoint, GENERATE_OTP, VALIDATE_OTP};
use crate::error::ClientError;
use crate::otp::{hash_otp, obtain_with_timeout, OtpProvider};
use crate::session::{expect_ok_json, Session};
use crate::types::{GenerateOtpRequest, GenerateOtpResponse, ValidateOtpRequest, ValidateOtpResponse};

/// Terminal result of one `authenticate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { token: String, attempts: u32 },
    Failed { attempts: u32 },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthOutcome::Authenticated { token, .. } => Some(token.as_str()),
            AuthOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug)]
enum AuthState {
    RequestingOtp { attempt: u32 },
    AwaitingOtp { attempt: u32, txn_id: String },
    ValidatingOtp { attempt: u32, txn_id: String, otp: String },
    Authenticated { token: String, attempts: u32 },
    Failed { attempts: u32 },
}

/// Result of submitting an OTP. Rejection is an expected outcome, not an error.
enum Validation {
    Accepted(String),
    Rejected(String),
}

pub(crate) struct Authenticator<'a, P> {
    session: &'a Session,
    base_url: &'a Url,
    config: &'a AppConfig,
    otp: &'a P,
}

impl<'a, P: OtpProvider> Authenticator<'a, P> {
    pub fn new(session: &'a Session, base_url: &'a Url, config: &'a AppConfig, otp: &'a P) -> Self {
        Self {
            session,
            base_url,
            config,
            otp,
        }
    }

    /// Drives the machine to a terminal state.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the OTP-generation request. Validation
    /// failures and missing codes are retried up to `max_auth_retries` cycles
    /// and then reported as [`AuthOutcome::Failed`].
    pub async fn run(&self) -> Result<AuthOutcome, ClientError> {
        let mut state = AuthState::RequestingOtp { attempt: 1 };
        loop {
            state = match state {
                AuthState::Authenticated { token, attempts } => {
                    tracing::info!(attempts, "authenticated");
                    return Ok(AuthOutcome::Authenticated { token, attempts });
                }
                AuthState::Failed { attempts } => {
                    tracing::error!(attempts, "re-authentication retry limit reached");
                    return Ok(AuthOutcome::Failed { attempts });
                }
                other => self.step(other).await?,
            };
        }
    }

    async fn step(&self, state: AuthState) -> Result<AuthState, ClientError> {
        let max_retries = self.config.max_auth_retries;
        let next = match state {
            AuthState::RequestingOtp { attempt } if attempt > max_retries => AuthState::Failed {
                attempts: max_retries,
            },
            AuthState::RequestingOtp { attempt } => {
                let txn_id = self.request_otp().await?;
                tracing::info!(attempt, max_retries, "OTP sent to registered mobile number");
                AuthState::AwaitingOtp { attempt, txn_id }
            }
            AuthState::AwaitingOtp { attempt, txn_id } => {
                let timeout = Duration::from_secs(self.config.otp_timeout_secs);
                match obtain_with_timeout(self.otp, timeout).await {
                    Some(otp) => AuthState::ValidatingOtp {
                        attempt,
                        txn_id,
                        otp,
                    },
                    None => {
                        tracing::warn!(attempt, max_retries, "no OTP obtained, requesting a new one");
                        AuthState::RequestingOtp {
                            attempt: attempt + 1,
                        }
                    }
                }
            }
            AuthState::ValidatingOtp {
                attempt,
                txn_id,
                otp,
            } => match self.validate_otp(&txn_id, &otp).await {
                Validation::Accepted(token) => AuthState::Authenticated {
                    token,
                    attempts: attempt,
                },
                Validation::Rejected(reason) => {
                    tracing::warn!(attempt, max_retries, %reason, "OTP rejected, requesting a new one");
                    AuthState::RequestingOtp {
                        attempt: attempt + 1,
                    }
                }
            },
            terminal @ (AuthState::Authenticated { .. } | AuthState::Failed { .. }) => terminal,
        };
        Ok(next)
    }

    async fn request_otp(&self) -> Result<String, ClientError> {
        let payload = serde_json::to_value(GenerateOtpRequest {
            mobile: &self.config.mobile_number,
            secret: &self.config.otp_secret,
        })
        .map_err(|e| ClientError::Deserialize {
            context: GENERATE_OTP.name.to_owned(),
            source: e,
        })?;
        let body = self.post(&GENERATE_OTP, &payload).await?;
        let response: GenerateOtpResponse =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: GENERATE_OTP.name.to_owned(),
                source: e,
            })?;
        Ok(response.txn_id)
    }

    async fn validate_otp(&self, txn_id: &str, otp: &str) -> Validation {
        let otp_hash = hash_otp(otp);
        let payload = match serde_json::to_value(ValidateOtpRequest {
            txn_id,
            otp: &otp_hash,
        }) {
            Ok(payload) => payload,
            Err(e) => return Validation::Rejected(e.to_string()),
        };

        match self.post(&VALIDATE_OTP, &payload).await {
            Ok(body) => match serde_json::from_value::<ValidateOtpResponse>(body) {
                Ok(response) => Validation::Accepted(response.token),
                Err(e) => Validation::Rejected(format!("validation response without token: {e}")),
            },
            Err(e) => Validation::Rejected(e.to_string()),
        }
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let url = endpoint.url(self.base_url, &[])?;
        let reply = self.session.send(endpoint, url, Some(payload), &[]).await?;
        expect_ok_json(endpoint, reply)
    }
}
