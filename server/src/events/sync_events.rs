use std::vec::IntoIter;

use tiersort_shared::DisconnectReason;

use crate::{PeerKey, TierSortServerError};

pub struct SyncEvents {
    completions: Vec<PeerKey>,
    disconnections: Vec<(PeerKey, DisconnectReason)>,
    errors: Vec<TierSortServerError>,

    empty: bool,
}

impl SyncEvents {
    pub(crate) fn new() -> Self {
        Self {
            completions: Vec::new(),
            disconnections: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: SyncEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: SyncEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_completion(&mut self, peer_key: &PeerKey) {
        self.completions.push(*peer_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, peer_key: &PeerKey, reason: DisconnectReason) {
        self.disconnections.push((*peer_key, reason));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: TierSortServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait SyncEvent {
    type Iter;

    fn iter(events: &mut SyncEvents) -> Self::Iter;

    fn has(events: &SyncEvents) -> bool;
}

// CompleteEvent: the handshake step finished, gameplay may proceed
pub struct CompleteEvent;
impl SyncEvent for CompleteEvent {
    type Iter = IntoIter<PeerKey>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.completions);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.completions.is_empty()
    }
}

// DisconnectEvent: the connection must be closed with the given reason
pub struct DisconnectEvent;
impl SyncEvent for DisconnectEvent {
    type Iter = IntoIter<(PeerKey, DisconnectReason)>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl SyncEvent for ErrorEvent {
    type Iter = IntoIter<TierSortServerError>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.errors.is_empty()
    }
}
