//! Games, sets, card search, card detail, and price history.

use std::collections::BTreeMap;

use manavault_core::{CardDetail, Printing, PrintingId, RawCardDetail};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::ApiClient;
use super::types::{CardSearch, CardSet, Game, PricePoint, SearchResponse, SearchRpcParams};
use crate::error::{ApiError, Result};

/// Database function used when the REST function cannot answer.
const SEARCH_FALLBACK_RPC: &str = "search_cards_with_prices";

impl ApiClient {
    /// List games.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn games(&self) -> Result<Vec<Game>> {
        self.get("/api/games", &[]).await
    }

    /// List sets, optionally for one game.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn sets(&self, game: Option<&str>) -> Result<Vec<CardSet>> {
        match game {
            Some(game) => self.get("/api/sets", &[("game", game)]).await,
            None => self.get("/api/sets", &[]).await,
        }
    }

    /// Search printings.
    ///
    /// Falls back once to the `search_cards_with_prices` database function
    /// when the REST function fails with a transport error or a 5xx.
    ///
    /// # Errors
    ///
    /// Returns the REST error if it is not fallback-eligible, otherwise the
    /// fallback's error.
    #[instrument(skip(self, search), fields(query = %search.query))]
    pub async fn search_cards(&self, search: &CardSearch) -> Result<Vec<Printing>> {
        let primary: Result<SearchResponse> = self
            .send_json(Method::POST, "/api/search", &[], search)
            .await;

        match primary {
            Ok(response) => Ok(response.into_printings()),
            Err(e) if e.is_fallback_eligible() => {
                warn!(error = %e, "Search failed, querying database directly");
                let rows: SearchResponse = self
                    .rpc(SEARCH_FALLBACK_RPC, &SearchRpcParams::from(search))
                    .await?;
                Ok(rows.into_printings())
            }
            Err(e) => Err(e),
        }
    }

    /// Get a card's detail, from the cache when present.
    ///
    /// Falls back once to the search database function on a transport error
    /// or a 5xx. The fallback row has no sibling versions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if neither path knows the printing.
    #[instrument(skip(self, id), fields(printing_id = %id))]
    pub async fn card(&self, id: &PrintingId) -> Result<CardDetail> {
        if let Some(card) = self.cache().get(id).await {
            return Ok(card);
        }

        let primary: Result<RawCardDetail> = self.get("/api/cards", &[("id", id.as_str())]).await;

        let card = match primary {
            Ok(raw) => CardDetail::from(raw),
            Err(e) if e.is_fallback_eligible() => {
                warn!(error = %e, "Card fetch failed, querying database directly");
                self.card_from_database(id).await?
            }
            Err(e) => return Err(e),
        };

        debug!(versions = card.all_versions.len(), "Fetched card");
        self.cache().insert(card.clone()).await;
        Ok(card)
    }

    async fn card_from_database(&self, id: &PrintingId) -> Result<CardDetail> {
        let params = SearchRpcParams {
            printing_filter: Some(id.as_str().to_string()),
            result_limit: Some(1),
            ..SearchRpcParams::default()
        };
        let rows: SearchResponse = self.rpc(SEARCH_FALLBACK_RPC, &params).await?;
        let printing = rows
            .into_printings()
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Printing not found: {id}")))?;

        Ok(CardDetail {
            printing,
            type_line: None,
            oracle_text: None,
            legalities: BTreeMap::new(),
            all_versions: Vec::new(),
        })
    }

    /// Price history of a printing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, id), fields(printing_id = %id))]
    pub async fn prices(&self, id: &PrintingId) -> Result<Vec<PricePoint>> {
        self.get("/api/prices", &[("id", id.as_str())]).await
    }
}
