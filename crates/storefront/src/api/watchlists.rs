//! Watched printings and price alerts.

use manavault_core::PrintingId;
use reqwest::Method;
use rust_decimal::Decimal;
use tracing::instrument;

use super::ApiClient;
use super::types::{WatchRequest, WatchlistEntry};
use crate::error::Result;

impl ApiClient {
    /// List watched printings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        self.get("/api/watchlists", &[]).await
    }

    /// Watch a printing, optionally alerting below `target_price`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, id), fields(printing_id = %id))]
    pub async fn watch(&self, id: &PrintingId, target_price: Option<Decimal>) -> Result<WatchlistEntry> {
        let body = WatchRequest {
            printing_id: id,
            target_price,
        };
        self.send_json(Method::POST, "/api/watchlists", &[], &body)
            .await
    }

    /// Stop watching a printing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, id), fields(printing_id = %id))]
    pub async fn unwatch(&self, id: &PrintingId) -> Result<()> {
        let _: serde_json::Value = self
            .delete("/api/watchlists", &[("printing_id", id.as_str())])
            .await?;
        Ok(())
    }
}
