//! # Tiersort Server
//! Host side of the tier sync handshake: checks each connecting peer's
//! capability against the current tier order, pushes the order to capable
//! peers and refuses peers that cannot honor it.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tiersort_shared::{
        DisconnectReason, PacketSender, PeerCapability, SyncMessage, SyncState, TierOrdering,
    };
}

mod error;
mod events;
mod handshake;
mod peer;
mod server;

pub use error::TierSortServerError;
pub use events::{CompleteEvent, DisconnectEvent, ErrorEvent, SyncEvent, SyncEvents};
pub use peer::PeerKey;
pub use server::{ServerConfig, TierSyncServer};
