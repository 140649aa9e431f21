//! Subcommand implementations.

use manavault_storefront::{ApiClient, ApiError, CardCache, ConfigError, StorefrontConfig};
use thiserror::Error;

pub mod card;
pub mod import;
pub mod inventory;
pub mod orders;
pub mod search;

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The import could not be parsed or submitted.
    #[error(transparent)]
    Import(#[from] manavault_core::import::ImportError),

    /// Reading the input or writing the failed-rows file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A command-line value could not be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Load configuration from the environment and build a client with a fresh
/// card cache.
pub fn connect() -> Result<(StorefrontConfig, ApiClient), CommandError> {
    let config = StorefrontConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let cache = CardCache::new(config.card_cache);
    let client = ApiClient::new(&config, cache)?;
    Ok((config, client))
}
