pub mod app_config;
pub mod config;
pub mod products;
pub mod search;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{FetchMethod, ProductRecord, StockSignal};
pub use search::{PageQuery, SearchRequest, SortOrder};

/// Every variable has a default, so only a set-but-unusable value fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
