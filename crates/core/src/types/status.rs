//! Status and classification enums for various entities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Order lifecycle status.
///
/// Maps to the values accepted by the `update_order_status` RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(ParseEnumError::new("order status", s)),
        }
    }
}

/// Card condition grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    /// Near Mint.
    #[default]
    NM,
    /// Lightly Played.
    LP,
    /// Moderately Played.
    MP,
    /// Heavily Played.
    HP,
    /// Damaged.
    DMG,
}

impl Condition {
    /// Short code (e.g., "NM").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NM => "NM",
            Self::LP => "LP",
            Self::MP => "MP",
            Self::HP => "HP",
            Self::DMG => "DMG",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Condition {
    type Err = ParseEnumError;

    /// Accepts short codes and the long names used by most collection exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect();
        match normalized.as_str() {
            "nm" | "nearmint" | "mint" => Ok(Self::NM),
            "lp" | "lightlyplayed" | "excellent" => Ok(Self::LP),
            "mp" | "moderatelyplayed" | "played" => Ok(Self::MP),
            "hp" | "heavilyplayed" => Ok(Self::HP),
            "dmg" | "damaged" | "poor" => Ok(Self::DMG),
            _ => Err(ParseEnumError::new("condition", s)),
        }
    }
}

/// Target of a bulk import, sent as the `import_type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    /// Add rows to the signed-in user's collection.
    #[default]
    Collection,
    /// Update market prices.
    Prices,
    /// Update store inventory (admin only).
    Inventory,
}

impl ImportType {
    /// Wire name of the import type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Prices => "prices",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collection" => Ok(Self::Collection),
            "prices" => Ok(Self::Prices),
            "inventory" => Ok(Self::Inventory),
            _ => Err(ParseEnumError::new("import type", s)),
        }
    }
}
