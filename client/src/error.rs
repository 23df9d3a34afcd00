use thiserror::Error;

use tiersort_shared::{OverrideError, TransportError, WireError};

/// Errors surfaced by the tier sync client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierSortClientError {
    /// Payload from the host is not a valid sync message
    #[error("Invalid tier sync message from host: {0}")]
    Wire(#[from] WireError),

    /// Host order names a tier this client does not know, or repeats one
    #[error("Cannot install tier order from host: {0}")]
    Order(#[from] OverrideError),

    /// Acknowledgement could not be sent
    #[error("Cannot acknowledge tier order: {0}")]
    Transport(#[from] TransportError),

    /// Host sent an acknowledgement, which only peers may send
    #[error("Host sent a tier sync acknowledgement")]
    UnexpectedAck,
}
