//! ManaVault Core - Shared types and logic library.
//!
//! This crate provides the types and pure logic used across all ManaVault components:
//! - `storefront` - API client, card cache, and bulk import runner
//! - `cli` - Command-line tools for imports, card lookups, and order management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, finishes, conditions, and statuses
//! - [`printing`] - Printing and card detail records, resolved at the wire boundary
//! - [`versions`] - Grouping printings by set and collector number
//! - [`detail`] - Card detail selection state
//! - [`import`] - Bulk import parsing, chunking, and failed-row export
//! - [`cart`] - Client-side cart arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod detail;
pub mod import;
pub mod printing;
pub mod types;
pub mod versions;

pub use printing::{CardDetail, Printing, RawCardDetail, RawPrinting};
pub use types::*;
pub use versions::{ActiveSelection, VersionGroup};
