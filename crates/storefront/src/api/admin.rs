//! Admin operations, called as database functions.
//!
//! These bypass the REST function. Authorization is enforced by the
//! database from the bearer token.

use manavault_core::{OrderId, OrderStatus};
use tracing::{info, instrument};

use super::ApiClient;
use super::types::{
    InventoryFilter, InventoryItem, InventoryUpsert, OrderIdParams, OrderStatusParams,
    OrderSummary, PriceTrend, PriceTrendParams,
};
use crate::error::Result;

impl ApiClient {
    /// List stocked printings.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self))]
    pub async fn inventory_list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>> {
        self.rpc("get_inventory_list", filter).await
    }

    /// Create or replace the stock row of a printing and condition.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, item), fields(printing_id = %item.printing_id, quantity = item.quantity))]
    pub async fn upsert_inventory(&self, item: &InventoryUpsert) -> Result<InventoryItem> {
        self.rpc("upsert_product_inventory", item).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, order_id, status), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<OrderSummary> {
        let params = OrderStatusParams {
            order_id,
            new_status: status,
        };
        let order: OrderSummary = self.rpc("update_order_status", &params).await?;
        info!("Order status updated");
        Ok(order)
    }

    /// Hide an order from listings without deleting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, order_id), fields(order_id = %order_id))]
    pub async fn soft_delete_order(&self, order_id: &OrderId) -> Result<()> {
        let _: serde_json::Value = self
            .rpc("soft_delete_order", &OrderIdParams { order_id })
            .await?;
        info!("Order soft-deleted");
        Ok(())
    }

    /// Biggest price changes over the last `days`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self))]
    pub async fn price_trends(&self, days: u32, limit: Option<u32>) -> Result<Vec<PriceTrend>> {
        let params = PriceTrendParams {
            days,
            result_limit: limit,
        };
        self.rpc("calculate_price_trends", &params).await
    }
}
