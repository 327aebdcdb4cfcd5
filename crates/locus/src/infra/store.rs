//! The most-recent-wins slot holding the last accepted selection.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::domain::model::{Classification, NormalizedFrame};

/// A selection that passed validation and classification in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSelection {
    pub dom_label: Option<String>,
    pub frames: Vec<NormalizedFrame>,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Process-wide "last selection" state, owned explicitly and injected into
/// the bridge rather than living in a module-level global, so concurrent
/// tests never leak state into each other.
///
/// Only fully constructed selections are ever published, so readers observe
/// either nothing or the most recently completed write.
#[derive(Debug, Default)]
pub struct SelectionStore {
    slot: Mutex<Option<StoredSelection>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a newly accepted selection.
    pub fn publish(&self, selection: StoredSelection) {
        *self.slot.lock() = Some(selection);
    }

    /// Clone of the most recently published selection, if any.
    pub fn latest(&self) -> Option<StoredSelection> {
        self.slot.lock().clone()
    }

    /// Drop the held selection, returning the store to its startup state.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Classification;

    fn selection(label: &str) -> StoredSelection {
        StoredSelection {
            dom_label: Some(label.to_owned()),
            frames: Vec::new(),
            classification: Classification::empty(),
        }
    }

    #[test]
    fn starts_empty_and_keeps_most_recent_write() {
        let store = SelectionStore::new();
        assert!(store.latest().is_none());

        store.publish(selection("first"));
        store.publish(selection("second"));
        assert_eq!(store.latest().unwrap().dom_label.as_deref(), Some("second"));
    }

    #[test]
    fn clear_returns_to_startup_state() {
        let store = SelectionStore::new();
        store.publish(selection("only"));
        store.clear();
        assert!(store.latest().is_none());
    }
}
