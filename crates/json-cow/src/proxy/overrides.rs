//! Per-node attribute override tracking.
//!
//! An override map exists only while its owning node is still uncopied. A
//! full copy drains it during the fold; afterwards the copied flag
//! short-circuits every access straight to the duplicate and the map is
//! never consulted again.

use indexmap::IndexMap;
use serde_json::Value;

use crate::proxy::CowProxy;
use crate::step::Step;

#[derive(Debug, Clone)]
pub(crate) enum OverrideEntry {
    /// Nested proxy, lazily created on first aggregate read.
    Node(CowProxy),
    /// Raw value written directly in partial mode.
    Value(Value),
    /// Partial-mode deletion marker.
    Tombstone,
}

#[derive(Debug, Default)]
pub(crate) struct OverrideMap {
    entries: IndexMap<Step, OverrideEntry>,
}

impl OverrideMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, step: &Step) -> Option<&OverrideEntry> {
        self.entries.get(step)
    }

    pub(crate) fn insert(&mut self, step: Step, entry: OverrideEntry) {
        self.entries.insert(step, entry);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Step, &OverrideEntry)> {
        self.entries.iter()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the map in insertion order for the fold.
    pub(crate) fn drain(&mut self) -> Vec<(Step, OverrideEntry)> {
        self.entries.drain(..).collect()
    }
}
