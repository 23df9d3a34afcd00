mod client;
pub use client::{ClientSyncState, TierSyncClient};
