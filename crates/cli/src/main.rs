//! ManaVault CLI - Bulk imports, card lookups, and store management.
//!
//! # Usage
//!
//! ```bash
//! # Import a collection export, mapping a non-standard header
//! mv-cli import cards.csv --type collection --map quantity=Count
//!
//! # Preview how a decklist would be chunked without sending it
//! mv-cli import deck.txt --dry-run
//!
//! # Continue an import that stopped at chunk 3
//! mv-cli import cards.csv --resume-from 3
//!
//! # Show a card with the foil finish selected
//! mv-cli card 6f1c2a3e --finish foil
//!
//! # Search printings
//! mv-cli search "lightning bolt" --set 2xm --limit 10
//!
//! # Order and inventory administration
//! mv-cli orders status 1042 shipped
//! mv-cli inventory list --low-stock 2
//! ```
//!
//! # Commands
//!
//! - `import` - Parse a CSV or decklist and import it in paced chunks
//! - `card` - Show a card's versions, price, and marketplace link
//! - `search` - Search printings
//! - `orders` - Update or soft-delete orders
//! - `inventory` - List or update store stock
//!
//! Connection settings come from the `MANAVAULT_*` environment variables
//! (see `manavault_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use manavault_core::{Condition, Finish, ImportType, OrderId, OrderStatus, PrintingId};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "manavault_cli=info,manavault_storefront=info";

#[derive(Parser)]
#[command(name = "mv-cli")]
#[command(author, version, about = "ManaVault CLI tools")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV or decklist file
    Import {
        /// File to import (`.csv`, or `.txt` decklist)
        file: PathBuf,

        /// What the rows update
        #[arg(short = 't', long = "type", default_value = "collection")]
        import_type: ImportType,

        /// Override a column mapping, e.g. `--map quantity=Count`
        #[arg(short, long = "map", value_name = "FIELD=HEADER")]
        mappings: Vec<String>,

        /// Parse and plan the import without sending anything
        #[arg(long)]
        dry_run: bool,

        /// Where to write rows that failed (defaults to `failed_<file>` next to the input)
        #[arg(long, value_name = "PATH")]
        failed_out: Option<PathBuf>,

        /// 1-based chunk to start from, skipping chunks already imported
        #[arg(long, value_name = "CHUNK")]
        resume_from: Option<usize>,
    },
    /// Show a card's versions and price
    Card {
        /// Printing ID
        id: String,

        /// Finish to select, as if its button had been clicked
        #[arg(short, long)]
        finish: Option<Finish>,
    },
    /// Search printings
    Search {
        /// Search text
        query: String,

        /// Restrict to a game
        #[arg(short, long)]
        game: Option<String>,

        /// Restrict to a set code
        #[arg(short, long)]
        set: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Manage store inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Move an order to a new status
    Status {
        /// Order ID
        order_id: String,

        /// New status (`pending`, `processing`, `shipped`, `delivered`, `cancelled`, `refunded`)
        status: OrderStatus,
    },
    /// Hide an order from listings
    Delete {
        /// Order ID
        order_id: String,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// List stocked printings
    List {
        /// Filter by name
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by set code
        #[arg(short, long)]
        set: Option<String>,

        /// Only rows at or below this quantity
        #[arg(long, value_name = "QUANTITY")]
        low_stock: Option<u32>,
    },
    /// Create or replace a stock row
    Set {
        /// Printing ID
        printing_id: String,

        /// Units in stock
        #[arg(short, long)]
        quantity: u32,

        /// Card condition (`NM`, `LP`, `MP`, `HP`, `DMG`)
        #[arg(short, long, default_value = "NM")]
        condition: Condition,

        /// Sale price in USD
        #[arg(short, long)]
        price: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so load it before building the filter
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(cli.verbose).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn default_filter(verbose: u8) -> String {
    match verbose {
        0 => DEFAULT_LOG_FILTER.to_owned(),
        1 => DEFAULT_LOG_FILTER.replace("=info", "=debug"),
        _ => DEFAULT_LOG_FILTER.replace("=info", "=trace"),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Import {
            file,
            import_type,
            mappings,
            dry_run,
            failed_out,
            resume_from,
        } => {
            let options = commands::import::ImportOptions {
                import_type,
                mappings,
                dry_run,
                failed_out,
                resume_from,
            };
            commands::import::run(&file, options).await?;
        }
        Commands::Card { id, finish } => {
            commands::card::show(&PrintingId::new(id), finish).await?;
        }
        Commands::Search {
            query,
            game,
            set,
            limit,
        } => {
            commands::search::run(query, game, set, limit).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::Status { order_id, status } => {
                commands::orders::update_status(&OrderId::new(order_id), status).await?;
            }
            OrdersAction::Delete { order_id } => {
                commands::orders::soft_delete(&OrderId::new(order_id)).await?;
            }
        },
        Commands::Inventory { action } => match action {
            InventoryAction::List {
                query,
                set,
                low_stock,
            } => {
                commands::inventory::list(query, set, low_stock).await?;
            }
            InventoryAction::Set {
                printing_id,
                quantity,
                condition,
                price,
            } => {
                commands::inventory::set(PrintingId::new(printing_id), condition, quantity, price)
                    .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_filter_raises_with_verbosity() {
        assert_eq!(default_filter(0), DEFAULT_LOG_FILTER);
        assert_eq!(
            default_filter(1),
            "manavault_cli=debug,manavault_storefront=debug"
        );
        assert_eq!(
            default_filter(3),
            "manavault_cli=trace,manavault_storefront=trace"
        );
    }

    #[test]
    fn test_import_args_parse() {
        let cli = Cli::try_parse_from([
            "mv-cli",
            "import",
            "cards.csv",
            "--type",
            "prices",
            "--map",
            "quantity=Count",
            "--map",
            "name=Card",
            "--resume-from",
            "2",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Import {
            import_type,
            mappings,
            resume_from,
            dry_run,
            ..
        } = cli.command
        else {
            panic!("expected import command");
        };
        assert_eq!(import_type, ImportType::Prices);
        assert_eq!(mappings, vec!["quantity=Count", "name=Card"]);
        assert_eq!(resume_from, Some(2));
        assert!(!dry_run);
    }

    #[test]
    fn test_card_finish_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["mv-cli", "card", "abc", "--finish", "shiny"]).is_err());
        assert!(Cli::try_parse_from(["mv-cli", "card", "abc", "--finish", "foil"]).is_ok());
    }
}
