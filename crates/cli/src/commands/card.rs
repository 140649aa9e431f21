//! Card detail command.

use std::fmt::Write as _;

use manavault_core::detail::{ApplyOutcome, CardDetailState};
use manavault_core::{Finish, PrintingId};
use manavault_storefront::CardDetailController;

use super::{CommandError, connect};

/// Fetch a card and print its versions.
///
/// With `finish`, the card is opened as if that finish's button had been
/// clicked, so the selection survives the fetch.
pub async fn show(id: &PrintingId, finish: Option<Finish>) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let mut controller = CardDetailController::new(client);

    let outcome = match finish {
        Some(finish) => controller.open_with_finish(id, finish).await?,
        None => controller.open(id).await?,
    };
    if let ApplyOutcome::Applied {
        preserved_versions: true,
    } = outcome
    {
        tracing::debug!("Kept the previously loaded version list");
    }

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(controller.state()));
    }
    Ok(())
}

/// Text view of the loaded card: header, legal formats, price, and one line
/// per physical printing with the active one marked.
fn render(state: &CardDetailState) -> String {
    let mut out = String::new();
    let Some(card) = state.card() else {
        return out;
    };

    let _ = writeln!(out, "{}", card.printing.name);
    if let Some(type_line) = &card.type_line {
        let _ = writeln!(out, "{type_line}");
    }
    if let Some(text) = &card.oracle_text {
        let _ = writeln!(out, "\n{text}");
    }
    let formats: Vec<&str> = card.legal_formats().collect();
    if !formats.is_empty() {
        let _ = writeln!(out, "\nLegal in: {}", formats.join(", "));
    }

    let _ = writeln!(out, "\nSelected finish: {}", state.selected_finish().label());
    match state.market_price() {
        Some(price) => {
            let _ = writeln!(out, "Market price: {}", price.display());
        }
        None => {
            let _ = writeln!(out, "Market price: n/a");
        }
    }
    if let Some(url) = state.marketplace_url() {
        let _ = writeln!(out, "Buy: {url}");
    }

    let _ = writeln!(out, "\nVersions:");
    for group in state.groups() {
        let marker = if state.is_active_group(group) { '>' } else { ' ' };
        let finishes: Vec<&str> = group.finishes().into_iter().map(Finish::label).collect();
        let base = group.base();
        let _ = writeln!(
            out,
            "{marker} {} #{} {} [{}]",
            group.set_code().to_uppercase(),
            group.collector_number(),
            base.set_name.as_deref().unwrap_or_default(),
            finishes.join("/")
        );
    }
    out
}
