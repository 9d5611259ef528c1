//! Configuration file loading, validation and persistence.

mod manager;
mod resolve;

pub use manager::{ConfigFile, ConfigManager, ProviderConfig, default_api_key_env};
pub use resolve::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_CONCURRENCY, DEFAULT_DETECTION_THRESHOLD,
    DEFAULT_HISTORY_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_TARGET, MAX_CONCURRENCY,
    ResolvedConfig, ResolvedProvider, resolve_config, resolve_config_with_env,
};
