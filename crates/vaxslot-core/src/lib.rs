pub mod app_config;
pub mod config;
pub mod search_config;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use search_config::{load_search_config, parse_search_config, SearchConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read search config at {path}: {source}")]
    SearchFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse search config: {0}")]
    SearchFileParse(#[from] serde_yaml::Error),

    #[error("search config validation failed: {0}")]
    Validation(String),
}
