//! Bounded in-memory conversation history.

use crate::entry::Entry;
use std::collections::VecDeque;

/// Insertion-ordered log of entries holding at most `capacity` items.
///
/// Appending past the bound evicts from the front, so the store always holds
/// the most recent `capacity` entries, oldest first. The store never talks to
/// persistence or presentation; the controller does that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStore {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl MessageStore {
    /// Creates an empty store. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a store from existing entries, keeping only the newest `capacity`.
    #[must_use]
    pub fn from_entries(capacity: usize, entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut store = Self::new(capacity);
        for entry in entries {
            store.append(entry);
        }
        store
    }

    /// Appends an entry, evicting the oldest entries while over capacity.
    pub fn append(&mut self, entry: Entry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Snapshot of every entry, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<Entry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use chrono::Utc;
    use proptest::prelude::*;

    fn numbered(n: usize) -> Entry {
        let kind = if n % 2 == 0 {
            EntryKind::User
        } else {
            EntryKind::Bot
        };
        Entry::new(kind, format!("m{n}"), Utc::now())
    }

    #[test]
    fn append_under_capacity_keeps_everything() {
        let mut store = MessageStore::new(3);
        store.append(numbered(0));
        store.append(numbered(1));

        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].text, "m0");
    }

    #[test]
    fn append_over_capacity_evicts_oldest() {
        let mut store = MessageStore::new(2);
        for n in 0..5 {
            store.append(numbered(n));
        }

        let texts: Vec<_> = store.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["m3", "m4"]);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut store = MessageStore::new(0);
        store.append(numbered(0));
        store.append(numbered(1));

        assert_eq!(store.capacity(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].text, "m1");
    }

    #[test]
    fn from_entries_truncates_to_newest() {
        let store = MessageStore::from_entries(2, (0..4).map(numbered));
        let texts: Vec<_> = store.iter().map(|e| e.text.clone()).collect();
        assert_eq!(texts, ["m2", "m3"]);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = MessageStore::from_entries(4, (0..3).map(numbered));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 4);
    }

    proptest! {
        #[test]
        fn retains_exactly_the_most_recent(cap in 1usize..20, total in 0usize..60) {
            let mut store = MessageStore::new(cap);
            for n in 0..total {
                store.append(numbered(n));
            }

            prop_assert_eq!(store.len(), cap.min(total));
            let expected: Vec<String> = (total.saturating_sub(cap)..total)
                .map(|n| format!("m{n}"))
                .collect();
            let actual: Vec<String> = store.iter().map(|e| e.text.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
