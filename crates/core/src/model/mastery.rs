use std::collections::BTreeSet;

use crate::model::ids::{ItemId, RECORD_DELIMITER};

/// Identifiers of items the user has durably learned.
///
/// Grows during play; only a reset empties it. Kept ordered so the
/// persisted record is stable across saves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterySet {
    ids: BTreeSet<ItemId>,
}

impl MasterySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted record.
    ///
    /// The empty record is the empty set. Empty tokens are skipped, so
    /// `"a||b"` and `"a|b"` decode the same.
    #[must_use]
    pub fn decode(record: &str) -> Self {
        if record.is_empty() {
            return Self::new();
        }
        record
            .split(RECORD_DELIMITER)
            .filter_map(|token| ItemId::new(token).ok())
            .collect()
    }

    /// Serializes into the `|`-joined record.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                out.push(RECORD_DELIMITER);
            }
            out.push_str(id.as_str());
        }
        out
    }

    /// Adds an identifier. Returns true if it was not mastered before.
    pub fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }
}

impl FromIterator<ItemId> for MasterySet {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
