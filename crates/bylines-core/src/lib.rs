pub mod app_config;
pub mod config;
pub mod date_range;
pub mod journalists;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use date_range::DateRange;
pub use journalists::{ArticleRecord, FaceHeuristics, JournalistRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
