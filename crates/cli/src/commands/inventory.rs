//! Store inventory commands.

use std::fmt::Write as _;

use manavault_core::{Condition, PrintingId};
use manavault_storefront::api::{InventoryFilter, InventoryItem, InventoryUpsert};
use rust_decimal::Decimal;

use super::{CommandError, connect};

/// List stocked printings.
pub async fn list(
    query: Option<String>,
    set_code: Option<String>,
    max_quantity: Option<u32>,
) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let filter = InventoryFilter {
        query,
        set_code,
        max_quantity,
    };

    let items = client.inventory_list(&filter).await?;
    tracing::info!(rows = items.len(), "Inventory loaded");

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&items));
    }
    Ok(())
}

/// Create or replace the stock row of a printing and condition.
pub async fn set(
    printing_id: PrintingId,
    condition: Condition,
    quantity: u32,
    price: Option<Decimal>,
) -> Result<(), CommandError> {
    if price.is_some_and(|p| p.is_sign_negative()) {
        return Err(CommandError::InvalidArgument(
            "price cannot be negative".to_owned(),
        ));
    }

    let (_, client) = connect()?;
    let item = client
        .upsert_inventory(&InventoryUpsert {
            printing_id,
            condition,
            quantity,
            price,
        })
        .await?;
    tracing::info!(
        printing_id = %item.printing_id,
        condition = %item.condition,
        quantity = item.quantity,
        "Inventory updated"
    );
    Ok(())
}

fn render(items: &[InventoryItem]) -> String {
    let mut out = String::new();
    for item in items {
        let price = item
            .price
            .map_or_else(|| "n/a".to_owned(), |p| format!("${p:.2}"));
        let _ = writeln!(
            out,
            "{:>4}x  {} ({}) #{} {} {}  {}  [{}]",
            item.quantity,
            item.name,
            item.set_code.to_uppercase(),
            item.collector_number,
            item.finish.label(),
            item.condition,
            price,
            item.printing_id
        );
    }
    out
}
