//! One HTTP session: a `reqwest::Client` carrying the API's fixed headers and
//! at most one bearer token.
//!
//! A [`Session`] is never mutated after construction. Re-authentication
//! builds a replacement and drops the old one.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::{Client, StatusCode, Url};
use vaxslot_core::AppConfig;

use crate::endpoints::Endpoint;
use crate::error::ClientError;

/// Raw outcome of one HTTP exchange, before status interpretation.
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

pub(crate) struct Session {
    client: Client,
    authenticated: bool,
}

impl Session {
    /// Builds a session with the fixed header set and, when `token` is given,
    /// an `Authorization: Bearer` header.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidHeader`] if a configured header value or the
    ///   token contains characters not allowed in HTTP headers.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: &AppConfig, token: Option<&str>) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, header_value("origin", &config.origin)?);
        headers.insert(REFERER, header_value("referer", &config.referer)?);
        if let Some(token) = token {
            let mut value = header_value("authorization", &format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            authenticated: token.is_some(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Sends one request and returns status plus raw body text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] on network failure or an unreadable body.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        url: Url,
        payload: Option<&serde_json::Value>,
        query: &[(&str, String)],
    ) -> Result<Reply, ClientError> {
        let mut request = self.client.request(endpoint.method.as_method(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(Reply { status, body })
    }
}

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader { header })
}

/// Interprets a 200 reply body as JSON; any other status becomes
/// [`ClientError::Request`].
pub(crate) fn expect_ok_json(
    endpoint: &Endpoint,
    reply: Reply,
) -> Result<serde_json::Value, ClientError> {
    if reply.status != StatusCode::OK {
        return Err(ClientError::Request {
            endpoint: endpoint.name.to_owned(),
            status: reply.status.as_u16(),
            body: reply.body,
        });
    }
    serde_json::from_str(&reply.body).map_err(|e| ClientError::Deserialize {
        context: endpoint.name.to_owned(),
        source: e,
    })
}
