//! # Tiersort Shared
//! Common functionality shared between tiersort-server & tiersort-client
//! crates: the tier registry, the sorted order and its queries, and the
//! messages of the sync handshake.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod main_context;
mod name;
mod order_store;
mod ordering;
mod override_loader;
mod registry;
mod sorter;
mod sync;
mod tier;
mod transport;

pub use main_context::{InlineContext, MainContext, Task, TaskQueue};
pub use name::{TierName, TierNameError, DEFAULT_NAMESPACE};
pub use order_store::{OrderStore, SortedTiers};
pub use ordering::TierOrdering;
pub use override_loader::{OrderOverride, OverrideError, OverrideSource};
pub use registry::{error::TierError, TierEdge, TierRef, TierRegistry};
pub use sorter::{sort_tiers, SortError};
pub use sync::{
    message::{SyncMessage, WireError, MAX_NAME_BYTES, MAX_TIER_COUNT, PROTOCOL_VERSION},
    payload_writer::PayloadWriter,
    state::{DisconnectReason, PeerCapability, SyncState},
};
pub use tier::{tags, Tier, TierTag, TierTarget, VanillaTier};
pub use transport::{PacketReceiver, PacketSender, TransportError};
