use thiserror::Error;

use tiersort_shared::{TransportError, WireError};

use crate::PeerKey;

/// Errors surfaced by the tier sync server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierSortServerError {
    /// Payload arrived for a connection the server does not know
    #[error("No tier sync handshake exists for peer {0:?}")]
    UnknownPeer(PeerKey),

    /// Peer sent a payload that is not a valid sync message
    #[error("Peer {peer:?} sent an invalid tier sync message: {source}")]
    Wire {
        peer: PeerKey,
        #[source]
        source: WireError,
    },

    /// The order could not be sent to the peer
    #[error("Cannot send tier order to peer {peer:?}: {source}")]
    Transport {
        peer: PeerKey,
        #[source]
        source: TransportError,
    },
}
