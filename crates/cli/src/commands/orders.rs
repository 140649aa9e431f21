//! Order management commands.
//!
//! # Usage
//!
//! ```bash
//! mv-cli orders status 1042 shipped
//! mv-cli orders delete 1042
//! ```
//!
//! Both call database functions directly and need `MANAVAULT_ACCESS_TOKEN`
//! to belong to an admin.

use manavault_core::{OrderId, OrderStatus};

use super::{CommandError, connect};

/// Move an order to a new status.
pub async fn update_status(order_id: &OrderId, status: OrderStatus) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let order = client.update_order_status(order_id, status).await?;
    tracing::info!(
        order_id = %order.id,
        status = %order.status,
        "Order updated"
    );
    Ok(())
}

/// Hide an order from listings.
pub async fn soft_delete(order_id: &OrderId) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    client.soft_delete_order(order_id).await?;
    tracing::info!(order_id = %order_id, "Order deleted");
    Ok(())
}
