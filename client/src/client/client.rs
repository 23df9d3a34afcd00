use std::{
    collections::VecDeque,
    mem,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use log::{info, warn};

use tiersort_shared::{PacketSender, SyncMessage, Tier, TierOrdering, TransportError};

use crate::{events::ClientEvents, TierSortClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSyncState {
    /// Using the locally computed order
    Idle,
    /// Host's order is queued on the main context, not yet acknowledged
    Installing,
    /// Using the host's order for this connection, host has been acknowledged
    Synchronized,
    /// Host's order is installed but the acknowledgement could not be sent
    Unacknowledged,
    /// Host's order could not be installed
    Rejected,
}

/// Result of one install task, reported back from the main context
struct InstallOutcome {
    tier_count: usize,
    ack: Result<(), TransportError>,
}

type Outcomes = Arc<Mutex<VecDeque<InstallOutcome>>>;

/// Peer side of the tier sync handshake. Installs the host's order into the
/// local ordering service and acknowledges it once installed.
///
/// The acknowledgement is sent from the install task itself, so with a queued
/// main context the host completes only after the peer switched orders.
/// Progress is picked up on the next `receive_payload` or `receive` call.
pub struct TierSyncClient<T: Tier> {
    ordering: TierOrdering<T>,
    sender: Arc<dyn PacketSender>,
    state: ClientSyncState,
    outcomes: Outcomes,
    // bumped on disconnect, install tasks from an older connection stay silent
    connection: Arc<AtomicU64>,
    incoming_events: ClientEvents,
}

impl<T: Tier> TierSyncClient<T> {
    pub fn new(ordering: TierOrdering<T>, sender: Box<dyn PacketSender>) -> Self {
        Self {
            ordering,
            sender: Arc::from(sender),
            state: ClientSyncState::Idle,
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            connection: Arc::new(AtomicU64::new(0)),
            incoming_events: ClientEvents::new(),
        }
    }

    pub fn ordering(&self) -> &TierOrdering<T> {
        &self.ordering
    }

    pub fn state(&self) -> ClientSyncState {
        self.state
    }

    /// Handles a payload received from the host on the sync channel
    pub fn receive_payload(&mut self, payload: &[u8]) {
        if let Err(error) = self.process_payload(payload) {
            warn!("Client Error: {}", error);
            self.incoming_events.push_error(error);
        }
        self.collect_outcomes();
    }

    /// Leaves the host's order behind and recomputes the local one
    pub fn disconnect(&mut self) {
        self.connection.fetch_add(1, Ordering::AcqRel);
        lock(&self.outcomes).clear();
        self.state = ClientSyncState::Idle;
        self.ordering.request_recompute();
        self.incoming_events.push_reset();
    }

    /// Returns all events since the last call and resets the buffer
    pub fn receive(&mut self) -> ClientEvents {
        self.collect_outcomes();
        mem::replace(&mut self.incoming_events, ClientEvents::new())
    }

    fn process_payload(&mut self, payload: &[u8]) -> Result<(), TierSortClientError> {
        let names = match SyncMessage::from_payload(payload)? {
            SyncMessage::Order(names) => names,
            SyncMessage::Ack => return Err(TierSortClientError::UnexpectedAck),
        };

        let sorted = match self.ordering.resolve_remote(&names) {
            Ok(sorted) => sorted,
            Err(error) => {
                self.state = ClientSyncState::Rejected;
                return Err(error.into());
            }
        };

        let tier_count = sorted.len();
        let sender = self.sender.clone();
        let outcomes = self.outcomes.clone();
        let connection = self.connection.clone();
        let expected = connection.load(Ordering::Acquire);

        self.state = ClientSyncState::Installing;
        self.ordering.request_install_then(sorted, move || {
            if connection.load(Ordering::Acquire) != expected {
                return;
            }
            let ack = sender.send(&SyncMessage::Ack.to_payload());
            lock(&outcomes).push_back(InstallOutcome { tier_count, ack });
        });
        Ok(())
    }

    fn collect_outcomes(&mut self) {
        let outcomes: Vec<InstallOutcome> = lock(&self.outcomes).drain(..).collect();
        for outcome in outcomes {
            match outcome.ack {
                Ok(()) => {
                    self.state = ClientSyncState::Synchronized;
                    info!("installed tier order of {} tiers from host", outcome.tier_count);
                    self.incoming_events.push_synced(outcome.tier_count);
                }
                Err(error) => {
                    self.state = ClientSyncState::Unacknowledged;
                    warn!(
                        "Client Error: installed tier order of {} tiers but cannot acknowledge it",
                        outcome.tier_count
                    );
                    self.incoming_events.push_error(error.into());
                }
            }
        }
    }
}

fn lock(outcomes: &Outcomes) -> MutexGuard<'_, VecDeque<InstallOutcome>> {
    outcomes.lock().unwrap_or_else(PoisonError::into_inner)
}
