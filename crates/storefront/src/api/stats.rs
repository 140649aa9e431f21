//! Collection and market statistics.

use tracing::instrument;

use super::ApiClient;
use super::types::{CollectionStats, PriceStats};
use crate::error::Result;

impl ApiClient {
    /// Totals of the signed-in user's collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn collection_stats(&self) -> Result<CollectionStats> {
        self.get("/api/stats/collection", &[]).await
    }

    /// Market price summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn price_stats(&self) -> Result<PriceStats> {
        self.get("/api/stats/prices", &[]).await
    }
}
