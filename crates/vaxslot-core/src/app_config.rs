use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://cdn-api.co-vin.in/api";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

pub const DEFAULT_ORIGIN: &str = "https://selfregistration.cowin.gov.in";

pub const DEFAULT_REFERER: &str = "https://selfregistration.cowin.gov.in/";

pub const DEFAULT_DASHBOARD_URL: &str = "https://selfregistration.cowin.gov.in/dashboard";

/// Process-wide settings, built once at startup and passed by reference to
/// the session client, the search and the CLI loop.
#[derive(Clone)]
pub struct AppConfig {
    pub mobile_number: String,
    pub otp_secret: String,
    pub log_level: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub origin: String,
    pub referer: String,
    /// Maximum number of full OTP cycles per authentication.
    pub max_auth_retries: u32,
    pub otp_timeout_secs: u64,
    /// Query the unauthenticated calendar endpoint instead of the
    /// authenticated one.
    pub use_public_api: bool,
    pub poll_interval_mins: u64,
    pub notify_min_interval_secs: u64,
    pub notify_webhook_url: Option<String>,
    pub browser: Option<String>,
    pub dashboard_url: String,
    pub search_config_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("mobile_number", &self.mobile_number)
            .field("otp_secret", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("origin", &self.origin)
            .field("referer", &self.referer)
            .field("max_auth_retries", &self.max_auth_retries)
            .field("otp_timeout_secs", &self.otp_timeout_secs)
            .field("use_public_api", &self.use_public_api)
            .field("poll_interval_mins", &self.poll_interval_mins)
            .field("notify_min_interval_secs", &self.notify_min_interval_secs)
            .field(
                "notify_webhook_url",
                &self.notify_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field("browser", &self.browser)
            .field("dashboard_url", &self.dashboard_url)
            .field("search_config_path", &self.search_config_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = AppConfig {
            mobile_number: "9999999999".to_string(),
            otp_secret: "super-secret".to_string(),
            log_level: "info".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            max_auth_retries: 5,
            otp_timeout_secs: 180,
            use_public_api: false,
            poll_interval_mins: 1,
            notify_min_interval_secs: 30,
            notify_webhook_url: Some("https://hooks.example.com/abc".to_string()),
            browser: None,
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            search_config_path: PathBuf::from("./config/search.yaml"),
        };

        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"), "secret leaked: {rendered}");
        assert!(!rendered.contains("hooks.example.com"), "webhook leaked: {rendered}");
        assert!(rendered.contains("9999999999"));
    }
}
