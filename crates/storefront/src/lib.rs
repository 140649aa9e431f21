//! ManaVault storefront client library.
//!
//! Talks to the REST function in front of the card database and carries the
//! client-side behavior that needs I/O:
//!
//! - [`api`] - Typed client for catalog, collection, watchlist, stats, and admin calls
//! - [`cache`] - Injected card detail cache with a stated eviction policy
//! - [`import`] - Sequential, paced bulk import with resume
//! - [`detail`] - Card detail navigation on top of the core selection state
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod detail;
pub mod error;
pub mod import;

pub use api::ApiClient;
pub use cache::{CachePolicy, CardCache};
pub use config::{ConfigError, StorefrontConfig};
pub use detail::CardDetailController;
pub use error::ApiError;
pub use import::{BulkImporter, ChunkPacer, ChunkSubmitter, ImportSettings};
