//! Version grouping for card detail views.
//!
//! A card's `all_versions` list is flat: one row per printing *and* finish.
//! The detail views present it as one row per physical printing (set +
//! collector number) with finish toggles. [`group_versions`] builds those
//! rows; [`resolve_active`] picks what is on screen.

use std::collections::HashMap;

use serde::Serialize;

use crate::printing::Printing;
use crate::types::{Finish, PrintingId};

/// All finishes of one physical printing, keyed by `"{set_code}-{collector_number}"`.
///
/// Built from a first printing, so a base always exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionGroup {
    key: String,
    /// Normal if present, else foil, else etched.
    base: Printing,
    normal: Option<Printing>,
    foil: Option<Printing>,
    etched: Option<Printing>,
}

impl VersionGroup {
    fn new(printing: Printing) -> Self {
        let mut group = Self {
            key: printing.group_key(),
            base: printing.clone(),
            normal: None,
            foil: None,
            etched: None,
        };
        group.insert(printing);
        group
    }

    /// Place a printing in its finish slot. The first printing seen for a
    /// finish keeps the slot.
    fn insert(&mut self, printing: Printing) {
        if printing.finish < self.base.finish {
            self.base = printing.clone();
        }
        let slot = match printing.finish {
            Finish::Nonfoil => &mut self.normal,
            Finish::Foil => &mut self.foil,
            Finish::Etched => &mut self.etched,
        };
        if slot.is_none() {
            *slot = Some(printing);
        }
    }

    /// Group key (`set_code-collector_number`).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stable representative of the group: normal, else foil, else etched.
    ///
    /// Identity comparisons go through `base` so they do not depend on which
    /// finish is currently displayed.
    #[must_use]
    pub const fn base(&self) -> &Printing {
        &self.base
    }

    /// Printing for a specific finish, if the group has one.
    #[must_use]
    pub const fn get(&self, finish: Finish) -> Option<&Printing> {
        match finish {
            Finish::Nonfoil => self.normal.as_ref(),
            Finish::Foil => self.foil.as_ref(),
            Finish::Etched => self.etched.as_ref(),
        }
    }

    /// Finishes available in this group, in display order.
    #[must_use]
    pub fn finishes(&self) -> Vec<Finish> {
        Finish::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }

    /// Whether any printing in the group has this ID.
    #[must_use]
    pub fn contains(&self, id: &PrintingId) -> bool {
        self.printings().any(|p| &p.id == id)
    }

    /// Iterate over the printings present, in finish order.
    pub fn printings(&self) -> impl Iterator<Item = &Printing> {
        [&self.normal, &self.foil, &self.etched]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    /// Set code of the group.
    #[must_use]
    pub fn set_code(&self) -> &str {
        &self.base().set_code
    }

    /// Collector number of the group.
    #[must_use]
    pub fn collector_number(&self) -> &str {
        &self.base().collector_number
    }
}

/// What the detail view shows: a printing and the finish it was chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSelection<'a> {
    pub group: &'a VersionGroup,
    pub printing: &'a Printing,
    pub finish: Finish,
}

/// Group a flat version list by set + collector number, in first-appearance order.
#[must_use]
pub fn group_versions(versions: &[Printing]) -> Vec<VersionGroup> {
    let mut groups: Vec<VersionGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for printing in versions {
        let key = printing.group_key();
        match index.get(&key).and_then(|&i| groups.get_mut(i)) {
            Some(group) => group.insert(printing.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push(VersionGroup::new(printing.clone()));
            }
        }
    }

    groups
}

/// Find the group containing a printing ID (any finish).
#[must_use]
pub fn find_group<'a>(groups: &'a [VersionGroup], id: &PrintingId) -> Option<&'a VersionGroup> {
    groups.iter().find(|g| g.contains(id))
}

/// Resolve the displayed version for a printing ID and a selected finish.
///
/// Shows the selected finish when the group has it, else the normal
/// printing, else the group's base. Returns `None` only when no group
/// contains `id`.
#[must_use]
pub fn resolve_active<'a>(
    groups: &'a [VersionGroup],
    id: &PrintingId,
    selected: Finish,
) -> Option<ActiveSelection<'a>> {
    let group = find_group(groups, id)?;
    let printing = group
        .get(selected)
        .or_else(|| group.get(Finish::Nonfoil))
        .unwrap_or_else(|| group.base());

    Some(ActiveSelection {
        group,
        printing,
        finish: printing.finish,
    })
}
