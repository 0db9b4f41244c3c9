use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::classifier::BusinessApplication;
use super::domain::{EntityId, EntityKind, EntityRef};

/// Anything rendered as a selectable row.
pub trait Selectable {
    fn entity_ref(&self) -> EntityRef;
}

impl Selectable for EntityRef {
    fn entity_ref(&self) -> EntityRef {
        self.clone()
    }
}

impl Selectable for BusinessApplication {
    fn entity_ref(&self) -> EntityRef {
        BusinessApplication::entity_ref(self)
    }
}

/// Header checkbox state for the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Checked,
    Indeterminate,
    Unchecked,
}

/// Rows picked for the next bulk action.
///
/// One instance per queue. The set knows nothing about paging; callers clear it when
/// filters or pages change and after a bulk dispatch completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    members: BTreeSet<EntityRef>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the pair if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, kind: EntityKind, id: impl Into<EntityId>) -> bool {
        let entry = EntityRef::new(kind, id);
        if self.members.remove(&entry) {
            false
        } else {
            self.members.insert(entry);
            true
        }
    }

    /// Replace the selection with exactly the given visible rows.
    pub fn select_all<T: Selectable>(&mut self, items: &[T]) {
        self.members = items.iter().map(Selectable::entity_ref).collect();
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn contains(&self, entry: &EntityRef) -> bool {
        self.members.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.members.iter()
    }

    pub fn count_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.members {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_all_selected<T: Selectable>(&self, items: &[T]) -> bool {
        !items.is_empty() && items.iter().all(|item| self.contains(&item.entity_ref()))
    }

    pub fn is_partially_selected<T: Selectable>(&self, items: &[T]) -> bool {
        let selected = items
            .iter()
            .filter(|item| self.contains(&item.entity_ref()))
            .count();
        selected > 0 && selected < items.len()
    }

    pub fn checkbox_state<T: Selectable>(&self, items: &[T]) -> SelectionState {
        if self.is_all_selected(items) {
            SelectionState::Checked
        } else if self.is_partially_selected(items) {
            SelectionState::Indeterminate
        } else {
            SelectionState::Unchecked
        }
    }

    /// Bulk target list, optionally narrowed to one kind. Ordered by kind then id, not by
    /// the order rows appear in the queue.
    pub fn targets(&self, filter: Option<EntityKind>) -> Vec<EntityRef> {
        self.members
            .iter()
            .filter(|entry| filter.map_or(true, |kind| entry.kind == kind))
            .cloned()
            .collect()
    }
}
