use thiserror::Error;

/// Errors returned by the booking-API session client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than 200. A 401 only surfaces
    /// here when it persists after a successful re-authentication, or when
    /// it comes from one of the OTP endpoints themselves.
    #[error("request to {endpoint} failed with status {status}: {body}")]
    Request {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The OTP cycle failed on every allowed attempt.
    #[error("re-authentication limit reached: no valid OTP after {attempts} attempt(s)")]
    AuthExhausted { attempts: u32 },

    /// A state or district name is absent from the location catalog.
    #[error("{kind} '{name}' not found in location catalog")]
    NotFound { kind: &'static str, name: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("endpoint {endpoint} requires path parameter '{param}'")]
    MissingPathParam {
        endpoint: &'static str,
        param: String,
    },

    #[error("invalid value for header {header}")]
    InvalidHeader { header: &'static str },
}

impl ClientError {
    /// Returns `true` for errors that no later pass can recover from without
    /// operator action: exhausted re-authentication or a location name the
    /// catalog does not contain.
    #[must_use]
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            ClientError::AuthExhausted { .. }
                | ClientError::NotFound { .. }
                | ClientError::InvalidBaseUrl { .. }
                | ClientError::MissingPathParam { .. }
                | ClientError::InvalidHeader { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_exhausted_is_fatal() {
        assert!(ClientError::AuthExhausted { attempts: 5 }.is_fatal_for_run());
    }

    #[test]
    fn not_found_is_fatal() {
        let err = ClientError::NotFound {
            kind: "district",
            name: "Atlantis".to_owned(),
        };
        assert!(err.is_fatal_for_run());
        assert_eq!(
            err.to_string(),
            "district 'Atlantis' not found in location catalog"
        );
    }

    #[test]
    fn request_error_is_not_fatal() {
        let err = ClientError::Request {
            endpoint: "LIST_STATES".to_owned(),
            status: 503,
            body: "busy".to_owned(),
        };
        assert!(!err.is_fatal_for_run());
        assert!(err.to_string().contains("503"));
    }
}
