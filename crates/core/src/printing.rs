//! Printing and card detail records.
//!
//! The REST function returns loosely-typed rows (`Raw*` types). They are
//! converted into [`Printing`] and [`CardDetail`] immediately after
//! deserialization; only the converted types travel further.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Finish, OracleId, Price, PrintingId};

// =============================================================================
// Wire Types
// =============================================================================

/// A printing row as returned by the REST function or the search RPC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrinting {
    #[serde(alias = "id")]
    pub printing_id: String,
    #[serde(default, alias = "card_id")]
    pub oracle_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_foil: Option<bool>,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default, alias = "price_usd", alias = "market_price")]
    pub price: Option<Decimal>,
    #[serde(default, alias = "stock_quantity")]
    pub stock: Option<i64>,
}

/// A card detail payload: one printing plus its siblings and rules data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCardDetail {
    #[serde(flatten)]
    pub printing: RawPrinting,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub legalities: BTreeMap<String, String>,
    #[serde(default)]
    pub all_versions: Vec<RawPrinting>,
}

// =============================================================================
// Domain Types
// =============================================================================

/// One physical card version, identified by set, collector number, and finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printing {
    pub id: PrintingId,
    /// Identity shared by every printing of the same card.
    pub oracle_id: Option<OracleId>,
    pub name: String,
    pub set_code: String,
    pub set_name: Option<String>,
    pub collector_number: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub finish: Finish,
    /// Market price in USD, if known.
    pub price: Option<Decimal>,
    /// Units in stock.
    pub stock: u32,
}

impl Printing {
    /// Key shared by all finishes of the same physical printing.
    #[must_use]
    pub fn group_key(&self) -> String {
        format!("{}-{}", self.set_code, self.collector_number)
    }

    /// Market price as a [`Price`].
    #[must_use]
    pub fn market_price(&self) -> Option<Price> {
        self.price.map(Price::usd)
    }

    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl From<RawPrinting> for Printing {
    fn from(raw: RawPrinting) -> Self {
        let finish = Finish::resolve(raw.is_foil, raw.finish.as_deref());
        let stock = raw
            .stock
            .map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX));

        Self {
            id: PrintingId::new(raw.printing_id),
            oracle_id: raw.oracle_id.filter(|o| !o.is_empty()).map(OracleId::new),
            name: raw.name,
            set_code: raw.set_code,
            set_name: raw.set_name,
            collector_number: raw.collector_number,
            rarity: raw.rarity,
            image_url: raw.image_url,
            finish,
            price: raw.price,
            stock,
        }
    }
}

/// A printing with everything the detail views display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetail {
    pub printing: Printing,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    /// Format name to legality (e.g., "modern" -> "legal").
    pub legalities: BTreeMap<String, String>,
    /// Every known printing of the same card, across sets and finishes.
    pub all_versions: Vec<Printing>,
}

impl CardDetail {
    /// Printing ID of this detail.
    #[must_use]
    pub const fn id(&self) -> &PrintingId {
        &self.printing.id
    }

    /// Oracle identity of this card.
    #[must_use]
    pub const fn oracle_id(&self) -> Option<&OracleId> {
        self.printing.oracle_id.as_ref()
    }

    /// Formats in which the card is legal.
    pub fn legal_formats(&self) -> impl Iterator<Item = &str> {
        self.legalities
            .iter()
            .filter(|(_, status)| status.as_str() == "legal")
            .map(|(format, _)| format.as_str())
    }
}

impl From<RawCardDetail> for CardDetail {
    fn from(raw: RawCardDetail) -> Self {
        Self {
            printing: raw.printing.into(),
            type_line: raw.type_line,
            oracle_text: raw.oracle_text,
            legalities: raw.legalities,
            all_versions: raw.all_versions.into_iter().map(Printing::from).collect(),
        }
    }
}
