//! Request and response bodies of the REST function and the admin RPCs.
//!
//! Shapes are per endpoint; there is no shared envelope. Card rows stay as
//! [`RawPrinting`] here and are converted to [`Printing`] by the client
//! before they leave this crate.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use manavault_core::import::{ColumnMapping, ImportRecord};
use manavault_core::{Condition, Finish, OrderId, OrderStatus, Printing, PrintingId, RawPrinting};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A trading card game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// A card set (expansion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub card_count: Option<u32>,
}

/// Search filters for `POST /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardSearch {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish: Option<Finish>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl CardSearch {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// The search endpoint answers either with a bare array or wrapped with a
/// total count.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchResponse {
    Bare(Vec<RawPrinting>),
    Wrapped {
        #[serde(alias = "results", alias = "data")]
        cards: Vec<RawPrinting>,
    },
}

impl SearchResponse {
    pub(crate) fn into_printings(self) -> Vec<Printing> {
        let rows = match self {
            Self::Bare(cards) | Self::Wrapped { cards } => cards,
        };
        rows.into_iter().map(Printing::from).collect()
    }
}

/// Parameters of the `search_cards_with_prices` RPC, used when the REST
/// function is unavailable.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct SearchRpcParams {
    pub search_query: Option<String>,
    pub game_filter: Option<String>,
    pub set_filter: Option<String>,
    pub printing_filter: Option<String>,
    pub result_limit: Option<u32>,
    pub result_offset: Option<u32>,
}

impl From<&CardSearch> for SearchRpcParams {
    fn from(search: &CardSearch) -> Self {
        Self {
            search_query: Some(search.query.clone()),
            game_filter: search.game.clone(),
            set_filter: search.set.clone(),
            printing_filter: None,
            result_limit: search.limit,
            result_offset: search.offset,
        }
    }
}

/// One point of a printing's price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(alias = "recorded_at")]
    pub date: DateTime<Utc>,
    #[serde(alias = "market_price")]
    pub price: Decimal,
    #[serde(default)]
    pub finish: Finish,
}

// =============================================================================
// Collections
// =============================================================================

/// A row of the signed-in user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub printing_id: PrintingId,
    pub quantity: u32,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub finish: Finish,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// Card data joined in by the function.
    #[serde(default)]
    pub card: Option<RawPrinting>,
}

/// Body of `POST /api/collections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCollectionItem {
    pub printing_id: PrintingId,
    pub quantity: u32,
    pub condition: Condition,
    pub finish: Finish,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
}

/// Body of `PUT /api/collections`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
}

/// Body of `POST /api/collections/import`.
#[derive(Debug, Serialize)]
pub(crate) struct ImportChunkRequest<'a> {
    pub data: &'a [ImportRecord],
    pub mapping: &'a ColumnMapping,
}

// =============================================================================
// Watchlists
// =============================================================================

/// A watched printing with an optional alert price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: String,
    pub printing_id: PrintingId,
    #[serde(default)]
    pub target_price: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub card: Option<RawPrinting>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WatchRequest<'a> {
    pub printing_id: &'a PrintingId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Decimal>,
}

// =============================================================================
// Stats
// =============================================================================

/// Totals of the signed-in user's collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionStats {
    pub total_cards: u64,
    pub unique_cards: u64,
    pub total_value: Decimal,
    /// Card count per game name.
    pub by_game: BTreeMap<String, u64>,
}

/// Price movement of one printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMover {
    pub printing_id: PrintingId,
    pub name: String,
    #[serde(default)]
    pub set_code: String,
    pub current_price: Decimal,
    pub previous_price: Decimal,
    pub change_percent: Decimal,
}

/// Market-wide price summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceStats {
    pub tracked_printings: u64,
    pub average_price: Decimal,
    pub gainers: Vec<PriceMover>,
    pub losers: Vec<PriceMover>,
}

// =============================================================================
// Admin
// =============================================================================

/// A stocked printing as seen by the admin inventory view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub printing_id: PrintingId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub finish: Finish,
    #[serde(default)]
    pub condition: Condition,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters of the `get_inventory_list` RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryFilter {
    #[serde(rename = "search_query", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(rename = "set_filter", skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    /// Only rows with stock at or below this quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,
}

/// Body of the `upsert_product_inventory` RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryUpsert {
    pub printing_id: PrintingId,
    pub condition: Condition,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

/// Order row returned by the order RPCs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderStatusParams<'a> {
    pub order_id: &'a OrderId,
    pub new_status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderIdParams<'a> {
    pub order_id: &'a OrderId,
}

#[derive(Debug, Serialize)]
pub(crate) struct PriceTrendParams {
    pub days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_limit: Option<u32>,
}

/// Price change of one printing over a window.
pub type PriceTrend = PriceMover;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_shapes() {
        let bare: SearchResponse =
            serde_json::from_str(r#"[{"id":"p1","name":"Bolt","is_foil":true}]"#).unwrap();
        let printings = bare.into_printings();
        assert_eq!(printings[0].finish, Finish::Foil);

        let wrapped: SearchResponse =
            serde_json::from_str(r#"{"cards":[{"id":"p1"},{"id":"p2"}],"total":2}"#).unwrap();
        assert_eq!(wrapped.into_printings().len(), 2);
    }

    #[test]
    fn test_card_search_omits_unset_filters() {
        let mut search = CardSearch::new("bolt");
        search.limit = Some(20);
        let json = serde_json::to_value(&search).unwrap();
        assert_eq!(json, serde_json::json!({"query": "bolt", "limit": 20}));
    }

    #[test]
    fn test_import_request_shape() {
        let mut record = ImportRecord::new();
        record.insert("Name".to_string(), "Bolt".to_string());
        let mapping = ColumnMapping::decklist();
        let body = serde_json::to_value(ImportChunkRequest {
            data: &[record],
            mapping: &mapping,
        })
        .unwrap();
        assert_eq!(body["data"][0]["Name"], "Bolt");
        assert_eq!(body["mapping"]["quantity"], "quantity");
    }

    #[test]
    fn test_collection_stats_tolerates_missing_fields() {
        let stats: CollectionStats = serde_json::from_str(r#"{"total_cards": 12}"#).unwrap();
        assert_eq!(stats.total_cards, 12);
        assert_eq!(stats.total_value, Decimal::ZERO);
    }
}
