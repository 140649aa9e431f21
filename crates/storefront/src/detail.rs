//! Card detail navigation backed by the API client.

use manavault_core::detail::{ApplyOutcome, CardDetailState};
use manavault_core::{Finish, PrintingId};
use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::error::Result;

/// Loads cards into a [`CardDetailState`].
#[derive(Debug, Clone)]
pub struct CardDetailController {
    client: ApiClient,
    state: CardDetailState,
}

impl CardDetailController {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: CardDetailState::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CardDetailState {
        &self.state
    }

    /// Open a printing with its own finish selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be fetched. The previous card
    /// stays on screen.
    pub async fn open(&mut self, id: &PrintingId) -> Result<ApplyOutcome> {
        self.navigate(id, None).await
    }

    /// Open a printing because the user clicked a specific finish. That
    /// finish stays selected after the fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be fetched.
    pub async fn open_with_finish(&mut self, id: &PrintingId, finish: Finish) -> Result<ApplyOutcome> {
        self.navigate(id, Some(finish)).await
    }

    /// Switch finish tabs.
    ///
    /// When the active group has a separate printing for `finish`, that
    /// printing is opened; otherwise only the selection changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the sibling printing cannot be fetched.
    pub async fn select_finish(&mut self, finish: Finish) -> Result<ApplyOutcome> {
        let target = self.state.active().and_then(|active| {
            active
                .group
                .get(finish)
                .filter(|p| p.id != active.printing.id)
                .map(|p| p.id.clone())
        });

        match target {
            Some(id) => self.open_with_finish(&id, finish).await,
            None => {
                self.state.select_finish(finish);
                Ok(ApplyOutcome::Applied {
                    preserved_versions: false,
                })
            }
        }
    }

    #[instrument(skip(self, id), fields(printing_id = %id, finish = ?explicit_finish))]
    async fn navigate(&mut self, id: &PrintingId, explicit_finish: Option<Finish>) -> Result<ApplyOutcome> {
        self.state.request(id.clone(), explicit_finish);
        let card = self.client.card(id).await?;
        let outcome = self.state.apply(card);
        debug!(?outcome, selected = %self.state.selected_finish(), "Applied card");
        Ok(outcome)
    }
}
