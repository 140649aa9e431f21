//! Logical import fields and their mapping to source columns.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ParseEnumError;

/// A logical field the import endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    Name,
    Tcg,
    Set,
    CollectorNumber,
    Quantity,
    Price,
    Condition,
}

impl ImportField {
    /// All fields in selector order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Tcg,
        Self::Set,
        Self::CollectorNumber,
        Self::Quantity,
        Self::Price,
        Self::Condition,
    ];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Tcg => "tcg",
            Self::Set => "set",
            Self::CollectorNumber => "collector_number",
            Self::Quantity => "quantity",
            Self::Price => "price",
            Self::Condition => "condition",
        }
    }

    /// Lowercased header spellings recognized by [`ColumnMapping::auto_detect`].
    const fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name", "card name", "card", "card_name", "title"],
            Self::Tcg => &["tcg", "game", "game name", "tcg name"],
            Self::Set => &["set", "set code", "set_code", "edition", "expansion"],
            Self::CollectorNumber => &[
                "collector_number",
                "collector number",
                "number",
                "card number",
                "no",
                "#",
            ],
            Self::Quantity => &["quantity", "qty", "count", "amount"],
            Self::Price => &["price", "market price", "market_price", "price usd", "usd"],
            Self::Condition => &["condition", "cond", "grade"],
        }
    }
}

impl fmt::Display for ImportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("import field", s))
    }
}

/// Which source column feeds each logical field.
///
/// An empty string means "not provided". Serializes with every field
/// present, which is the shape the import endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: String,
    pub tcg: String,
    pub set: String,
    pub collector_number: String,
    pub quantity: String,
    pub price: String,
    pub condition: String,
}

impl ColumnMapping {
    /// Mapping for the positional decklist format.
    #[must_use]
    pub fn decklist() -> Self {
        Self {
            name: "name".to_string(),
            set: "set".to_string(),
            collector_number: "collector_number".to_string(),
            quantity: "quantity".to_string(),
            ..Self::default()
        }
    }

    /// Guess a mapping from header names. Unrecognized fields stay unmapped.
    #[must_use]
    pub fn auto_detect(headers: &[String]) -> Self {
        let mut mapping = Self::default();
        for field in ImportField::ALL {
            let found = headers.iter().find(|h| {
                let lowered = h.trim().to_ascii_lowercase();
                field.synonyms().contains(&lowered.as_str())
            });
            if let Some(header) = found {
                mapping.set(field, header.clone());
            }
        }
        mapping
    }

    fn slot(&self, field: ImportField) -> &String {
        match field {
            ImportField::Name => &self.name,
            ImportField::Tcg => &self.tcg,
            ImportField::Set => &self.set,
            ImportField::CollectorNumber => &self.collector_number,
            ImportField::Quantity => &self.quantity,
            ImportField::Price => &self.price,
            ImportField::Condition => &self.condition,
        }
    }

    fn slot_mut(&mut self, field: ImportField) -> &mut String {
        match field {
            ImportField::Name => &mut self.name,
            ImportField::Tcg => &mut self.tcg,
            ImportField::Set => &mut self.set,
            ImportField::CollectorNumber => &mut self.collector_number,
            ImportField::Quantity => &mut self.quantity,
            ImportField::Price => &mut self.price,
            ImportField::Condition => &mut self.condition,
        }
    }

    /// Source header for a field, if mapped.
    #[must_use]
    pub fn get(&self, field: ImportField) -> Option<&str> {
        let header = self.slot(field);
        (!header.is_empty()).then_some(header.as_str())
    }

    /// Map a field to a source header. An empty header unmaps it.
    pub fn set(&mut self, field: ImportField, header: impl Into<String>) {
        *self.slot_mut(field) = header.into();
    }

    /// Fields that have a source column.
    #[must_use]
    pub fn mapped_fields(&self) -> Vec<ImportField> {
        ImportField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }

    /// Mapped headers that do not exist in `headers`.
    #[must_use]
    pub fn unknown_headers(&self, headers: &[String]) -> Vec<(ImportField, String)> {
        ImportField::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|h| (f, h.to_string())))
            .filter(|(_, h)| !headers.iter().any(|known| known == h))
            .collect()
    }
}
