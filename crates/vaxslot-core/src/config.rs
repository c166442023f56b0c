use crate::app_config::{
    AppConfig, DEFAULT_API_BASE_URL, DEFAULT_DASHBOARD_URL, DEFAULT_ORIGIN, DEFAULT_REFERER,
    DEFAULT_USER_AGENT,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let mobile_number = require("VAXSLOT_MOBILE_NUMBER")?;
    if !mobile_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "VAXSLOT_MOBILE_NUMBER".to_string(),
            reason: "must contain digits only".to_string(),
        });
    }
    let otp_secret = require("VAXSLOT_OTP_SECRET")?;

    let log_level = or_default("VAXSLOT_LOG_LEVEL", "info");
    let api_base_url = or_default("VAXSLOT_API_BASE_URL", DEFAULT_API_BASE_URL);
    let request_timeout_secs = parse_u64("VAXSLOT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VAXSLOT_USER_AGENT", DEFAULT_USER_AGENT);
    let origin = or_default("VAXSLOT_ORIGIN", DEFAULT_ORIGIN);
    let referer = or_default("VAXSLOT_REFERER", DEFAULT_REFERER);

    let max_auth_retries = parse_u32("VAXSLOT_MAX_AUTH_RETRIES", "5")?;
    let otp_timeout_secs = parse_u64("VAXSLOT_OTP_TIMEOUT_SECS", "180")?;
    let use_public_api = parse_bool(
        "VAXSLOT_USE_PUBLIC_API",
        &or_default("VAXSLOT_USE_PUBLIC_API", "false"),
    )?;

    let poll_interval_mins = parse_u64("VAXSLOT_POLL_INTERVAL_MINS", "1")?;
    let notify_min_interval_secs = parse_u64("VAXSLOT_NOTIFY_MIN_INTERVAL_SECS", "30")?;
    let notify_webhook_url = lookup("VAXSLOT_NOTIFY_WEBHOOK_URL").ok();
    let browser = lookup("VAXSLOT_BROWSER").ok();
    let dashboard_url = or_default("VAXSLOT_DASHBOARD_URL", DEFAULT_DASHBOARD_URL);
    let search_config_path = PathBuf::from(or_default(
        "VAXSLOT_SEARCH_CONFIG_PATH",
        "./config/search.yaml",
    ));

    Ok(AppConfig {
        mobile_number,
        otp_secret,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        origin,
        referer,
        max_auth_retries,
        otp_timeout_secs,
        use_public_api,
        poll_interval_mins,
        notify_min_interval_secs,
        notify_webhook_url,
        browser,
        dashboard_url,
        search_config_path,
    })
}

/// Parse a boolean flag. Accepts `true`/`false`, `1`/`0`, `yes`/`no`.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
