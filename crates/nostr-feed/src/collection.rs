use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::events::{FeedEvent, Profile};

/// Profiles keyed by author pubkey. A later event for the same pubkey
/// replaces the earlier profile.
pub type ProfileMap = BTreeMap<String, Profile>;

/// Arrival-ordered event set, deduplicated by event id.
///
/// The first copy of an event is kept; events are immutable so later
/// duplicates carry nothing new.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: IndexMap<String, FeedEvent>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent. Returns `true` when the event was new.
    pub fn insert(&mut self, event: FeedEvent) -> bool {
        if self.events.contains_key(&event.id) {
            return false;
        }
        self.events.insert(event.id.clone(), event);
        true
    }

    /// Insert every event, returning how many were new.
    pub fn extend<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = FeedEvent>,
    {
        let mut added = 0;
        for event in events {
            if self.insert(event) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<FeedEvent> {
        self.events.into_values().collect()
    }
}

impl FromIterator<FeedEvent> for EventCollection {
    fn from_iter<I: IntoIterator<Item = FeedEvent>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}
