//! # Tiersort Client
//! Peer side of the tier sync handshake: receives the host's sorted tier
//! order, installs it for the lifetime of the connection and acknowledges it.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tiersort_shared::{PacketSender, SyncMessage, TierOrdering};
}

mod client;
mod error;
mod events;

pub use client::{ClientSyncState, TierSyncClient};
pub use error::TierSortClientError;
pub use events::{ClientEvent, ClientEvents, ErrorEvent, ResetEvent, SyncedEvent};
