use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_dose() -> u8 {
    1
}

fn default_weeks() -> u32 {
    4
}

/// Slot-search filters read from the search YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// State name exactly as the location catalog spells it.
    pub state: String,
    /// District names in order of preference.
    pub districts: Vec<String>,
    /// Sessions whose `min_age_limit` exceeds this are skipped.
    pub min_age: u32,
    #[serde(default = "default_dose")]
    pub dose: u8,
    /// Number of 7-day windows to scan, starting today.
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

/// Load and validate the search filters from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_search_config(path: &Path) -> Result<SearchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SearchFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_search_config(&content)
}

/// Parse and validate search filters from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text does not parse or fails validation.
pub fn parse_search_config(content: &str) -> Result<SearchConfig, ConfigError> {
    let config: SearchConfig = serde_yaml::from_str(content)?;
    validate_search_config(&config)?;
    Ok(config)
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.state.trim().is_empty() {
        return Err(ConfigError::Validation(
            "state name must be non-empty".to_string(),
        ));
    }

    if config.dose == 0 {
        return Err(ConfigError::Validation(
            "dose must be 1 or greater".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for district in &config.districts {
        if district.trim().is_empty() {
            return Err(ConfigError::Validation(
                "district name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(district.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate district name: '{district}'"
            )));
        }
    }

    Ok(())
}
