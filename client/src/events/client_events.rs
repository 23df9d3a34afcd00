use std::vec::IntoIter;

use crate::TierSortClientError;

pub struct ClientEvents {
    synced: Vec<usize>,
    resets: usize,
    errors: Vec<TierSortClientError>,

    empty: bool,
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            synced: Vec::new(),
            resets: 0,
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_synced(&mut self, tier_count: usize) {
        self.synced.push(tier_count);
        self.empty = false;
    }

    pub(crate) fn push_reset(&mut self) {
        self.resets += 1;
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: TierSortClientError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

// SyncedEvent: the host's order was installed and acknowledged, yields the
// number of tiers in it
pub struct SyncedEvent;
impl ClientEvent for SyncedEvent {
    type Iter = IntoIter<usize>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.synced);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.synced.is_empty()
    }
}

// ResetEvent: the local order was recomputed after leaving the host
pub struct ResetEvent;
impl ClientEvent for ResetEvent {
    type Iter = IntoIter<()>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let count = std::mem::take(&mut events.resets);
        IntoIterator::into_iter(vec![(); count])
    }

    fn has(events: &ClientEvents) -> bool {
        events.resets > 0
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ClientEvent for ErrorEvent {
    type Iter = IntoIter<TierSortClientError>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.errors.is_empty()
    }
}
