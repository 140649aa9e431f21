//! Card finish (foil treatment).
//!
//! Upstream catalog sources disagree on how a finish is expressed: some rows
//! carry an `is_foil` flag, some a `finish` string, some both, some neither.
//! [`Finish::resolve`] collapses those signals once at the ingestion boundary
//! so nothing downstream re-checks them.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// The physical finish of a printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    #[default]
    Nonfoil,
    Foil,
    Etched,
}

impl Finish {
    /// All finishes in display order.
    pub const ALL: [Self; 3] = [Self::Nonfoil, Self::Foil, Self::Etched];

    /// Resolve a finish from the loosely-typed fields of a wire record.
    ///
    /// An `etched` finish string wins over everything. Otherwise either a
    /// `foil` string or `is_foil == true` means foil.
    #[must_use]
    pub fn resolve(is_foil: Option<bool>, finish: Option<&str>) -> Self {
        let finish = finish.map(|f| f.trim().to_ascii_lowercase());
        match finish.as_deref() {
            Some("etched") => Self::Etched,
            Some("foil") => Self::Foil,
            _ if is_foil == Some(true) => Self::Foil,
            _ => Self::Nonfoil,
        }
    }

    /// Whether the finish counts as foil for pricing and marketplace links.
    #[must_use]
    pub const fn is_foil(self) -> bool {
        matches!(self, Self::Foil | Self::Etched)
    }

    /// Wire name (`nonfoil`, `foil`, `etched`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nonfoil => "nonfoil",
            Self::Foil => "foil",
            Self::Etched => "etched",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nonfoil => "Nonfoil",
            Self::Foil => "Foil",
            Self::Etched => "Etched",
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Finish {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonfoil" | "non-foil" | "normal" => Ok(Self::Nonfoil),
            "foil" => Ok(Self::Foil),
            "etched" => Ok(Self::Etched),
            _ => Err(ParseEnumError::new("finish", s)),
        }
    }
}
