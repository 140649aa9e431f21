//! The signed-in user's collection and bulk import.

use manavault_core::ImportType;
use manavault_core::import::{ColumnMapping, ImportChunkResponse, ImportRecord};
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{CollectionItem, CollectionItemUpdate, ImportChunkRequest, NewCollectionItem};
use crate::error::Result;

impl ApiClient {
    /// List the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`](crate::error::ApiError::Unauthorized)
    /// without a user token, or any request error.
    #[instrument(skip(self))]
    pub async fn collection(&self) -> Result<Vec<CollectionItem>> {
        self.get("/api/collections", &[]).await
    }

    /// Add a printing to the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item), fields(printing_id = %item.printing_id))]
    pub async fn add_to_collection(&self, item: &NewCollectionItem) -> Result<CollectionItem> {
        self.send_json(Method::POST, "/api/collections", &[], item)
            .await
    }

    /// Change quantity, condition, or purchase price of a collection row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_collection_item(
        &self,
        item_id: &str,
        update: &CollectionItemUpdate,
    ) -> Result<CollectionItem> {
        self.send_json(Method::PUT, "/api/collections", &[("id", item_id)], update)
            .await
    }

    /// Remove a collection row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_from_collection(&self, item_id: &str) -> Result<()> {
        let _: serde_json::Value = self.delete("/api/collections", &[("id", item_id)]).await?;
        Ok(())
    }

    /// Send one chunk of a bulk import.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the function rejects the
    /// chunk as a whole.
    #[instrument(skip(self, records, mapping), fields(rows = records.len()))]
    pub async fn import_chunk(
        &self,
        import_type: ImportType,
        records: &[ImportRecord],
        mapping: &ColumnMapping,
    ) -> Result<ImportChunkResponse> {
        let body = ImportChunkRequest {
            data: records,
            mapping,
        };
        self.send_json(
            Method::POST,
            "/api/collections/import",
            &[("import_type", import_type.as_str())],
            &body,
        )
        .await
    }
}
