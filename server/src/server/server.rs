use std::{collections::HashMap, mem, time::Instant};

use log::{info, warn};

use tiersort_shared::{PeerCapability, SyncMessage, SyncState, Tier, TierOrdering};

use crate::{
    events::SyncEvents,
    handshake::{HandshakeAction, SyncHandshake},
    PeerKey, ServerConfig, TierSortServerError,
};

/// Runs the tier sync handshake for every incoming connection. The embedding
/// server feeds it connections, payloads and time, then reads events to learn
/// which connections may proceed and which must be closed.
pub struct TierSyncServer<T: Tier> {
    config: ServerConfig,
    ordering: TierOrdering<T>,
    handshakes: HashMap<PeerKey, SyncHandshake>,
    next_key: u64,
    incoming_events: SyncEvents,
}

impl<T: Tier> TierSyncServer<T> {
    pub fn new(config: ServerConfig, ordering: TierOrdering<T>) -> Self {
        Self {
            config,
            ordering,
            handshakes: HashMap::new(),
            next_key: 0,
            incoming_events: SyncEvents::new(),
        }
    }

    pub fn ordering(&self) -> &TierOrdering<T> {
        &self.ordering
    }

    // Connections

    /// Starts the handshake for a newly opened connection
    pub fn connect(&mut self, capability: PeerCapability, now: Instant) -> PeerKey {
        let peer_key = PeerKey::from_u64(self.next_key);
        self.next_key += 1;

        let mut handshake = SyncHandshake::new(capability);
        match handshake.begin(&self.ordering, now, self.config.handshake_timeout) {
            Ok(action) => self.apply_action(&peer_key, action),
            Err(source) => {
                warn!("Server Error: Cannot send tier order to {:?}", peer_key);
                self.incoming_events
                    .push_error(TierSortServerError::Transport {
                        peer: peer_key,
                        source,
                    });
                if let SyncState::Disconnected(reason) = handshake.state() {
                    self.incoming_events
                        .push_disconnection(&peer_key, reason.clone());
                }
            }
        }
        self.handshakes.insert(peer_key, handshake);

        peer_key
    }

    /// Handles a payload received from `peer_key` on the sync channel
    pub fn receive_payload(&mut self, peer_key: &PeerKey, payload: &[u8]) {
        let Some(handshake) = self.handshakes.get_mut(peer_key) else {
            warn!("Server Error: tier sync payload from unknown peer {:?}", peer_key);
            self.incoming_events
                .push_error(TierSortServerError::UnknownPeer(*peer_key));
            return;
        };

        let action = match SyncMessage::from_payload(payload) {
            Ok(message) => handshake.receive(message),
            Err(source) => {
                let action = handshake.receive_malformed(source.to_string());
                self.incoming_events.push_error(TierSortServerError::Wire {
                    peer: *peer_key,
                    source,
                });
                action
            }
        };
        self.apply_action(peer_key, action);
    }

    /// Must be called regularly, disconnects peers that never acknowledged
    pub fn update(&mut self, now: Instant) {
        let mut actions = Vec::new();
        for (peer_key, handshake) in self.handshakes.iter_mut() {
            actions.push((*peer_key, handshake.check_timeout(now)));
        }
        actions.sort_by_key(|(peer_key, _)| *peer_key);
        for (peer_key, action) in actions {
            self.apply_action(&peer_key, action);
        }
    }

    /// Forgets the connection. Any in-progress handshake is discarded.
    pub fn disconnect(&mut self, peer_key: &PeerKey) -> Option<SyncState> {
        self.handshakes
            .remove(peer_key)
            .map(|handshake| handshake.state().clone())
    }

    pub fn state(&self, peer_key: &PeerKey) -> Option<&SyncState> {
        self.handshakes.get(peer_key).map(SyncHandshake::state)
    }

    pub fn peer_keys(&self) -> Vec<PeerKey> {
        let mut output: Vec<PeerKey> = self.handshakes.keys().copied().collect();
        output.sort();
        output
    }

    /// Returns all events since the last call and resets the buffer
    pub fn receive(&mut self) -> SyncEvents {
        mem::replace(&mut self.incoming_events, SyncEvents::new())
    }

    // Private methods

    fn apply_action(&mut self, peer_key: &PeerKey, action: HandshakeAction) {
        match action {
            HandshakeAction::None => {}
            HandshakeAction::Complete => {
                info!("tier sync complete for {:?}", peer_key);
                self.incoming_events.push_completion(peer_key);
            }
            HandshakeAction::Disconnect(reason) => {
                info!("disconnecting {:?}: {}", peer_key, reason);
                self.incoming_events.push_disconnection(peer_key, reason);
            }
        }
    }
}
