// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `events` module defines the trivial annotation records consumed by timeline front-ends.
//! They carry no invariants for the compute core.

/// A single annotated instant or span on a timeline.
#[derive(Clone, Debug)]
pub struct TimelineEvent {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// A growable collection of [`TimelineEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct TimelineDb {
    events: Vec<TimelineEvent>,
}

impl TimelineDb {
    /// Instantiate an empty event collection.
    pub fn new() -> Self {
        Default::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// The number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&TimelineEvent> {
        self.events.get(index)
    }

    /// Iterate over the recorded events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{TimelineDb, TimelineEvent};

    #[test]
    fn verify_event_collection() {
        let mut db = TimelineDb::new();
        assert!(db.is_empty());

        db.push(TimelineEvent {
            id: 1,
            name: "trigger".to_string(),
            description: "capture trigger armed".to_string(),
        });
        db.push(TimelineEvent {
            id: 2,
            name: "overflow".to_string(),
            description: "channel 3 clipped".to_string(),
        });

        assert_eq!(db.len(), 2);
        assert_eq!(db.get(0).unwrap().name, "trigger");
        assert!(db.get(2).is_none());
        assert_eq!(db.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
