use std::time::{Duration, Instant};

use log::warn;

use tiersort_shared::{
    DisconnectReason, PeerCapability, SyncMessage, SyncState, Tier, TierOrdering, TransportError,
};

pub(crate) enum HandshakeAction {
    None,
    Complete,
    Disconnect(DisconnectReason),
}

/// One connection's tier sync handshake, host side
pub(crate) struct SyncHandshake {
    capability: PeerCapability,
    state: SyncState,
}

impl SyncHandshake {
    pub fn new(capability: PeerCapability) -> Self {
        Self {
            capability,
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Runs the capability check against the current order. A capable peer is
    /// sent the full order and has until `now + timeout` to acknowledge it.
    pub fn begin<T: Tier>(
        &mut self,
        ordering: &TierOrdering<T>,
        now: Instant,
        timeout: Duration,
    ) -> Result<HandshakeAction, TransportError> {
        self.state = SyncState::AwaitingCapabilityCheck;

        if self.capability.is_vanilla() {
            if ordering.is_seed_order() {
                self.state = SyncState::CompatibleNoSync;
                return Ok(HandshakeAction::Complete);
            }
            return Ok(self.disconnect(DisconnectReason::IncompatiblePeer));
        }

        if let PeerCapability::Supports(sender) = &self.capability {
            let sorted = ordering.sorted_tiers();
            let payload = SyncMessage::Order(sorted.names().to_vec()).to_payload();
            if let Err(err) = sender.send(&payload) {
                self.state = SyncState::Disconnected(DisconnectReason::SendFailed);
                return Err(err);
            }
        }
        self.state = SyncState::Synchronizing {
            deadline: now + timeout,
        };
        Ok(HandshakeAction::None)
    }

    pub fn receive(&mut self, message: SyncMessage) -> HandshakeAction {
        if !matches!(self.state, SyncState::Synchronizing { .. }) {
            warn!("ignoring tier sync message {:?} in state {:?}", message, self.state);
            return HandshakeAction::None;
        }
        match message {
            SyncMessage::Ack => {
                self.state = SyncState::Synchronized;
                HandshakeAction::Complete
            }
            SyncMessage::Order(_) => self.disconnect(DisconnectReason::ProtocolViolation(
                "peer sent a tier order to the host".to_string(),
            )),
        }
    }

    /// A payload that could not be decoded
    pub fn receive_malformed(&mut self, detail: String) -> HandshakeAction {
        if self.state.is_terminal() {
            warn!("ignoring malformed tier sync payload after handshake ended");
            return HandshakeAction::None;
        }
        self.disconnect(DisconnectReason::ProtocolViolation(detail))
    }

    pub fn check_timeout(&mut self, now: Instant) -> HandshakeAction {
        let SyncState::Synchronizing { deadline } = self.state else {
            return HandshakeAction::None;
        };
        if now < deadline {
            return HandshakeAction::None;
        }
        self.disconnect(DisconnectReason::Timeout)
    }

    fn disconnect(&mut self, reason: DisconnectReason) -> HandshakeAction {
        self.state = SyncState::Disconnected(reason.clone());
        HandshakeAction::Disconnect(reason)
    }
}
