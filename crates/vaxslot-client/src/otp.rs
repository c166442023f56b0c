//! The "obtain an OTP" capability the auth state machine depends on.

use std::future::Future;
use std::time::Duration;

use sha2::{Digest, Sha256};

/// Source of one-time passcodes: an operator prompt, an inbox reader, or a
/// scripted sequence in tests.
///
/// Returning `None` (or an empty string) means no code arrived; the auth
/// state machine counts that as one failed attempt.
pub trait OtpProvider {
    fn obtain_otp(&self, timeout: Duration) -> impl Future<Output = Option<String>> + Send;
}

/// Asks `provider` for a code, enforcing `timeout` even if the provider
/// ignores it. Whitespace is trimmed and blank codes become `None`.
pub(crate) async fn obtain_with_timeout<P: OtpProvider>(
    provider: &P,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, provider.obtain_otp(timeout)).await {
        Ok(code) => code
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty()),
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "timed out waiting for OTP");
            None
        }
    }
}

/// Hex-encoded SHA-256 digest of the plaintext code, as the validate endpoint
/// expects.
#[must_use]
pub fn hash_otp(otp: &str) -> String {
    format!("{:x}", Sha256::digest(otp.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl OtpProvider for Fixed {
        async fn obtain_otp(&self, _timeout: Duration) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    struct Never;

    impl OtpProvider for Never {
        async fn obtain_otp(&self, _timeout: Duration) -> Option<String> {
            std::future::pending::<()>().await;
            None
        }
    }

    #[test]
    fn hash_otp_is_hex_sha256() {
        assert_eq!(
            hash_otp("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[tokio::test]
    async fn trims_returned_code() {
        let code = obtain_with_timeout(&Fixed(Some(" 123456\n")), Duration::from_secs(1)).await;
        assert_eq!(code.as_deref(), Some("123456"));
    }

    #[tokio::test]
    async fn blank_code_is_none() {
        let code = obtain_with_timeout(&Fixed(Some("   ")), Duration::from_secs(1)).await;
        assert!(code.is_none());
    }

    #[tokio::test]
    async fn provider_that_never_answers_times_out() {
        let code = obtain_with_timeout(&Never, Duration::from_millis(20)).await;
        assert!(code.is_none());
    }
}
