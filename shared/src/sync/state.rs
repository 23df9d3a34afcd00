use std::{fmt, time::Instant};

use crate::PacketSender;

/// What the connecting peer can do, decided once when the connection opens
pub enum PeerCapability {
    /// Peer has no tier sorting support and cannot receive an order
    Vanilla,
    /// Peer speaks the sync protocol; the handle reaches it
    Supports(Box<dyn PacketSender>),
}

impl PeerCapability {
    pub fn is_vanilla(&self) -> bool {
        matches!(self, PeerCapability::Vanilla)
    }
}

impl fmt::Debug for PeerCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerCapability::Vanilla => write!(f, "Vanilla"),
            PeerCapability::Supports(_) => write!(f, "Supports"),
        }
    }
}

/// Why a handshake ended the connection. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Vanilla peer while custom tiers exist
    IncompatiblePeer,
    /// Capable peer never acknowledged the order in time
    Timeout,
    /// Peer sent something the protocol does not allow
    ProtocolViolation(String),
    /// Order could not be delivered to the peer
    SendFailed,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::IncompatiblePeer => write!(
                f,
                "Server has custom tool tier ordering (tier sorting) which your client does not support"
            ),
            DisconnectReason::Timeout => write!(f, "Timed out while synchronizing tier sorting"),
            DisconnectReason::ProtocolViolation(detail) => {
                write!(f, "Tier sorting protocol violation: {}", detail)
            }
            DisconnectReason::SendFailed => write!(f, "Failed to send tier sorting to client"),
        }
    }
}

/// Host-side state of one connection's tier sync handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    AwaitingCapabilityCheck,
    /// Terminal: vanilla peer and seed order, nothing to send
    CompatibleNoSync,
    /// Order sent, waiting for the acknowledgement
    Synchronizing { deadline: Instant },
    /// Terminal: peer acknowledged the order
    Synchronized,
    /// Terminal failure
    Disconnected(DisconnectReason),
}

impl SyncState {
    pub fn is_complete(&self) -> bool {
        matches!(self, SyncState::CompatibleNoSync | SyncState::Synchronized)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_complete() || matches!(self, SyncState::Disconnected(_))
    }
}
