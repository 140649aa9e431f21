//! Card search command.

use std::fmt::Write as _;

use manavault_core::Printing;
use manavault_storefront::api::CardSearch;

use super::{CommandError, connect};

/// Search printings and print one line per result.
pub async fn run(
    query: String,
    game: Option<String>,
    set: Option<String>,
    limit: u32,
) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let search = CardSearch {
        game,
        set,
        limit: Some(limit),
        ..CardSearch::new(query)
    };

    let printings = client.search_cards(&search).await?;
    tracing::info!(results = printings.len(), "Search complete");

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&printings));
    }
    Ok(())
}

fn render(printings: &[Printing]) -> String {
    let mut out = String::new();
    for p in printings {
        let price = p
            .market_price()
            .map_or_else(|| "n/a".to_owned(), |price| price.display());
        let _ = writeln!(
            out,
            "{}  {} ({}) #{} {}  {}  stock {}",
            p.id,
            p.name,
            p.set_code.to_uppercase(),
            p.collector_number,
            p.finish.label(),
            price,
            p.stock
        );
    }
    out
}
