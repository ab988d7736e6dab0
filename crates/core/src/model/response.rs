use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::ids::ItemId;

/// Captured user input for a single item.
///
/// The variant must match the item kind: `Choice` for single-choice,
/// `Selection` for multi-select, `Flag` for boolean. Exercises capture
/// no response at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    Choice(usize),
    Selection(BTreeSet<usize>),
    Flag(bool),
}

impl Response {
    /// Returns the selected set for a `Selection` response.
    #[must_use]
    pub fn as_selection(&self) -> Option<&BTreeSet<usize>> {
        match self {
            Response::Selection(set) => Some(set),
            _ => None,
        }
    }
}

/// Responses captured so far, keyed by item id.
///
/// Only items that have already been presented may have an entry;
/// the session controller enforces that by accepting submissions for
/// the current item alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseState {
    entries: BTreeMap<ItemId, Response>,
}

impl ResponseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response, overwriting any prior one (last write wins).
    pub fn record(&mut self, item_id: ItemId, response: Response) {
        self.entries.insert(item_id, response);
    }

    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&Response> {
        self.entries.get(&item_id)
    }

    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.entries.contains_key(&item_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all captured responses.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Response)> {
        self.entries.iter().map(|(id, r)| (*id, r))
    }
}
