use thiserror::Error;

/// Errors that can occur while moving sync payloads over a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Payload could not be handed to the connection
    #[error("Failed to send tier sync payload of {payload_size} bytes")]
    SendFailed { payload_size: usize },

    /// Connection is closed
    #[error("Tier sync connection is closed")]
    Closed,
}

/// Outgoing half of a connection
pub trait PacketSender: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Incoming half of a connection
pub trait PacketReceiver: Send + Sync {
    fn receive(&mut self) -> Result<Option<Box<[u8]>>, TransportError>;
}
