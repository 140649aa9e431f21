//! Core types for ManaVault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod finish;
pub mod id;
pub mod price;
pub mod status;

pub use finish::Finish;
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
