//! Authenticated session client for the vaccination-booking API.
//!
//! Wraps a single [`Session`] and re-authenticates transparently: a 401 drops
//! the session, runs the OTP state machine, installs a fresh session carrying
//! the new bearer token and re-issues the original request once. A second 401
//! for the same call is surfaced as [`ClientError::Request`].

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use vaxslot_core::AppConfig;

use crate::auth::{AuthOutcome, Authenticator};
use crate::endpoints::{normalise_base_url, Endpoint};
use crate::error::ClientError;
use crate::otp::OtpProvider;
use crate::session::{expect_ok_json, Session};

/// Client owning exactly one live [`Session`] and the OTP capability used to
/// renew it.
///
/// Not meant to be shared between concurrent callers: every call takes
/// `&mut self` and at most one request is in flight.
pub struct SessionClient<'c, P> {
    config: &'c AppConfig,
    base_url: Url,
    session: Option<Session>,
    otp: P,
}

impl<'c, P: OtpProvider> SessionClient<'c, P> {
    /// Creates a client against `config.api_base_url`. The HTTP session is
    /// built lazily on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the configured base URL does
    /// not parse.
    pub fn new(config: &'c AppConfig, otp: P) -> Result<Self, ClientError> {
        Self::with_base_url(config, &config.api_base_url, otp)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(config: &'c AppConfig, base_url: &str, otp: P) -> Result<Self, ClientError> {
        Ok(Self {
            config,
            base_url: normalise_base_url(base_url)?,
            session: None,
            otp,
        })
    }

    #[must_use]
    pub fn config(&self) -> &'c AppConfig {
        self.config
    }

    /// Whether the live session carries a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_authenticated)
    }

    /// Executes `endpoint` and returns the decoded JSON body of a 200 reply.
    ///
    /// On a 401 the client re-authenticates and retries the identical request
    /// exactly once.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthExhausted`] if re-authentication ran out of attempts.
    /// - [`ClientError::Request`] for any other non-200 status, including a
    ///   401 that persists after re-authenticating.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if a 200 body is not JSON.
    pub async fn execute(
        &mut self,
        endpoint: &Endpoint,
        path_params: &[(&str, &str)],
        payload: Option<&serde_json::Value>,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ClientError> {
        let url = endpoint.url(&self.base_url, path_params)?;
        let mut reauthenticated = false;

        loop {
            let session = self.live_session()?;
            let reply = session.send(endpoint, url.clone(), payload, query).await?;

            if reply.status == StatusCode::UNAUTHORIZED && !reauthenticated {
                tracing::info!(endpoint = endpoint.name, "authentication required");
                self.session = None;
                match self.authenticate().await? {
                    AuthOutcome::Authenticated { .. } => {
                        reauthenticated = true;
                        continue;
                    }
                    AuthOutcome::Failed { attempts } => {
                        return Err(ClientError::AuthExhausted { attempts });
                    }
                }
            }

            if reply.status != StatusCode::OK {
                tracing::warn!(
                    endpoint = endpoint.name,
                    status = reply.status.as_u16(),
                    "request failed"
                );
            }
            return expect_ok_json(endpoint, reply);
        }
    }

    /// Like [`execute`](Self::execute), deserializing the body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`execute`](Self::execute) returns, plus
    /// [`ClientError::Deserialize`] if the body does not match `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &mut self,
        endpoint: &Endpoint,
        path_params: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let body = self.execute(endpoint, path_params, None, query).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
            context: endpoint.name.to_owned(),
            source: e,
        })
    }

    /// Runs the OTP state machine on a fresh unauthenticated session. On
    /// success the live session is replaced by one carrying the new token.
    ///
    /// # Errors
    ///
    /// Propagates a failed OTP-generation request. Exhausted retries are
    /// reported as [`AuthOutcome::Failed`], not as an error.
    pub async fn authenticate(&mut self) -> Result<AuthOutcome, ClientError> {
        self.session = None;
        let anonymous = Session::new(self.config, None)?;
        let outcome = Authenticator::new(&anonymous, &self.base_url, self.config, &self.otp)
            .run()
            .await?;

        if let AuthOutcome::Authenticated { token, .. } = &outcome {
            self.session = Some(Session::new(self.config, Some(token.as_str()))?);
        }
        Ok(outcome)
    }

    fn live_session(&mut self) -> Result<&Session, ClientError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => Session::new(self.config, None)?,
        };
        Ok(self.session.insert(session))
    }
}
