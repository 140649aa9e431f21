//! Card detail selection state.
//!
//! [`CardDetailState`] is what the quick-view modal, the detail page, and the
//! inventory modal share: the loaded card, its version groups, and the finish
//! the user is looking at. Fetching is someone else's job; this type only
//! decides what a freshly fetched card does to the current selection.

use crate::printing::{CardDetail, Printing};
use crate::types::{Finish, Price, PrintingId};
use crate::versions::{ActiveSelection, VersionGroup, group_versions, resolve_active};

const MARKETPLACE_SEARCH_URL: &str = "https://www.tcgplayer.com/search/all/product";

/// A navigation that has been requested but not yet fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingNavigation {
    id: PrintingId,
    explicit_finish: Option<Finish>,
}

/// Result of applying a fetched card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The card was installed.
    Applied {
        /// The previous, richer version list was kept.
        preserved_versions: bool,
    },
    /// The response was for a printing other than the one last requested.
    Stale,
}

/// Selection state of a card detail view.
#[derive(Debug, Clone, Default)]
pub struct CardDetailState {
    card: Option<CardDetail>,
    groups: Vec<VersionGroup>,
    selected_finish: Finish,
    pending: Option<PendingNavigation>,
}

impl CardDetailState {
    /// An empty view with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a navigation to `id`.
    ///
    /// `explicit_finish` is set when the user clicked a specific finish
    /// button; it is selected right away and survives the re-fetch.
    pub fn request(&mut self, id: PrintingId, explicit_finish: Option<Finish>) {
        if let Some(finish) = explicit_finish {
            self.selected_finish = finish;
        }
        self.pending = Some(PendingNavigation {
            id,
            explicit_finish,
        });
    }

    /// Install a freshly fetched card.
    ///
    /// Responses for anything but the most recent request are dropped. A
    /// response with no pending request (e.g. a background refresh) is
    /// applied as a fresh load.
    pub fn apply(&mut self, mut fetched: CardDetail) -> ApplyOutcome {
        let explicit_finish = match self.pending.take() {
            Some(pending) if &pending.id != fetched.id() => {
                self.pending = Some(pending);
                return ApplyOutcome::Stale;
            }
            Some(pending) => pending.explicit_finish,
            None => None,
        };

        let preserved_versions = self.should_preserve_versions(&fetched);
        if preserved_versions {
            if let Some(previous) = self.card.take() {
                fetched.all_versions = previous.all_versions;
            }
        }

        self.selected_finish = explicit_finish.unwrap_or(fetched.printing.finish);
        self.groups = build_groups(&fetched);
        self.card = Some(fetched);

        ApplyOutcome::Applied { preserved_versions }
    }

    /// Keep the old version list when the new payload did not embed its
    /// siblings but the previous card is the same card with more versions.
    fn should_preserve_versions(&self, fetched: &CardDetail) -> bool {
        let Some(previous) = &self.card else {
            return false;
        };
        let same_card = match (previous.oracle_id(), fetched.oracle_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        same_card
            && fetched.all_versions.len() <= 1
            && previous.all_versions.len() > fetched.all_versions.len()
    }

    /// User toggled a finish tab.
    pub fn select_finish(&mut self, finish: Finish) {
        self.selected_finish = finish;
    }

    /// Currently selected finish.
    #[must_use]
    pub const fn selected_finish(&self) -> Finish {
        self.selected_finish
    }

    /// Loaded card, if any.
    #[must_use]
    pub const fn card(&self) -> Option<&CardDetail> {
        self.card.as_ref()
    }

    /// Printing ID of the outstanding request, if any.
    #[must_use]
    pub fn pending_id(&self) -> Option<&PrintingId> {
        self.pending.as_ref().map(|p| &p.id)
    }

    /// Version rows for the version list.
    #[must_use]
    pub fn groups(&self) -> &[VersionGroup] {
        &self.groups
    }

    /// The printing on screen and the finish it was chosen for.
    #[must_use]
    pub fn active(&self) -> Option<ActiveSelection<'_>> {
        let card = self.card.as_ref()?;
        resolve_active(&self.groups, card.id(), self.selected_finish)
    }

    /// Printing on screen.
    #[must_use]
    pub fn active_printing(&self) -> Option<&Printing> {
        self.active().map(|a| a.printing)
    }

    /// Whether `group` is the row currently on screen, regardless of finish.
    #[must_use]
    pub fn is_active_group(&self, group: &VersionGroup) -> bool {
        self.active()
            .is_some_and(|a| a.group.base().id == group.base().id)
    }

    /// Market price of the active printing (foil price when a foil is shown).
    #[must_use]
    pub fn market_price(&self) -> Option<Price> {
        self.active_printing().and_then(Printing::market_price)
    }

    /// Marketplace search link for the active printing.
    #[must_use]
    pub fn marketplace_url(&self) -> Option<String> {
        let active = self.active()?;
        Some(marketplace_url(&active.printing.name, active.finish))
    }
}

/// Group a card's versions, making sure the card itself is in a group.
fn build_groups(card: &CardDetail) -> Vec<VersionGroup> {
    if card.all_versions.iter().any(|v| &v.id == card.id()) {
        return group_versions(&card.all_versions);
    }
    let mut versions = card.all_versions.clone();
    versions.push(card.printing.clone());
    group_versions(&versions)
}

/// Build a marketplace search URL for a card name and finish.
#[must_use]
pub fn marketplace_url(name: &str, finish: Finish) -> String {
    let mut url = format!(
        "{MARKETPLACE_SEARCH_URL}?q={}&view=grid",
        urlencoding::encode(name)
    );
    if finish.is_foil() {
        url.push_str("&Printing=Foil");
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::OracleId;

    fn printing(id: &str, number: &str, finish: Finish, price: i64) -> Printing {
        Printing {
            id: PrintingId::new(id),
            oracle_id: Some(OracleId::new("bolt")),
            name: "Lightning Bolt".to_string(),
            set_code: "2xm".to_string(),
            set_name: None,
            collector_number: number.to_string(),
            rarity: None,
            image_url: None,
            finish,
            price: Some(Decimal::new(price, 2)),
            stock: 2,
        }
    }

    fn detail(main: Printing, versions: Vec<Printing>) -> CardDetail {
        CardDetail {
            printing: main,
            type_line: None,
            oracle_text: None,
            legalities: std::collections::BTreeMap::new(),
            all_versions: versions,
        }
    }

    fn all_versions() -> Vec<Printing> {
        vec![
            printing("A", "117", Finish::Nonfoil, 150),
            printing("B", "117", Finish::Foil, 900),
            printing("C", "400", Finish::Etched, 1200),
        ]
    }

    #[test]
    fn test_fresh_load_selects_printing_finish() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("B"), None);
        state.apply(detail(printing("B", "117", Finish::Foil, 900), all_versions()));

        assert_eq!(state.selected_finish(), Finish::Foil);
        assert_eq!(state.active_printing().unwrap().id.as_str(), "B");
    }

    #[test]
    fn test_fresh_load_of_etched_selects_etched() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("C"), None);
        state.apply(detail(printing("C", "400", Finish::Etched, 1200), all_versions()));
        assert_eq!(state.selected_finish(), Finish::Etched);
    }

    #[test]
    fn test_explicit_finish_survives_refetch() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));
        assert_eq!(state.selected_finish(), Finish::Nonfoil);

        // Click the foil button on the version row
        state.request(PrintingId::new("B"), Some(Finish::Foil));
        assert_eq!(state.selected_finish(), Finish::Foil);

        // The re-fetch of B must not reset the finish
        state.apply(detail(printing("B", "117", Finish::Foil, 900), all_versions()));
        assert_eq!(state.selected_finish(), Finish::Foil);
        assert_eq!(state.active_printing().unwrap().id.as_str(), "B");
    }

    #[test]
    fn test_explicit_nonfoil_on_foil_printing_is_honored() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("B"), Some(Finish::Nonfoil));
        state.apply(detail(printing("B", "117", Finish::Foil, 900), all_versions()));
        assert_eq!(state.selected_finish(), Finish::Nonfoil);
        // Same group, so the nonfoil sibling is shown
        assert_eq!(state.active_printing().unwrap().id.as_str(), "A");
    }

    #[test]
    fn test_preserves_richer_version_list_for_same_card() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));

        state.request(PrintingId::new("C"), None);
        let outcome = state.apply(detail(printing("C", "400", Finish::Etched, 1200), vec![]));

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                preserved_versions: true
            }
        );
        assert_eq!(state.card().unwrap().all_versions.len(), 3);
        assert_eq!(state.groups().len(), 2);
    }

    #[test]
    fn test_does_not_preserve_across_different_cards() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));

        let mut other = printing("Z", "9", Finish::Nonfoil, 50);
        other.oracle_id = Some(OracleId::new("shock"));
        state.request(PrintingId::new("Z"), None);
        let outcome = state.apply(detail(other, vec![]));

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                preserved_versions: false
            }
        );
        // The card itself still forms a group
        assert_eq!(state.groups().len(), 1);
        assert_eq!(state.active_printing().unwrap().id.as_str(), "Z");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.request(PrintingId::new("B"), None);

        let outcome = state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(state.card().is_none());
        assert_eq!(state.pending_id().map(PrintingId::as_str), Some("B"));
    }

    #[test]
    fn test_market_price_follows_active_finish() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));
        assert_eq!(state.market_price().unwrap().display(), "$1.50");

        state.select_finish(Finish::Foil);
        assert_eq!(state.market_price().unwrap().display(), "$9.00");
    }

    #[test]
    fn test_marketplace_url_marks_foil() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));
        let url = state.marketplace_url().unwrap();
        assert!(url.contains("q=Lightning%20Bolt"));
        assert!(!url.contains("Printing=Foil"));

        state.select_finish(Finish::Foil);
        assert!(state.marketplace_url().unwrap().ends_with("&Printing=Foil"));
    }

    #[test]
    fn test_is_active_group_is_finish_independent() {
        let mut state = CardDetailState::new();
        state.request(PrintingId::new("A"), None);
        state.apply(detail(printing("A", "117", Finish::Nonfoil, 150), all_versions()));
        state.select_finish(Finish::Foil);

        let groups = state.groups().to_vec();
        assert!(state.is_active_group(&groups[0]));
        assert!(!state.is_active_group(&groups[1]));
    }
}
