use thiserror::Error;

use crate::{SortError, TierName};

/// Errors that can occur while registering tiers or building the ordering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// Registry has been handed to the ordering service and is frozen
    #[error("Tier registry is already locked and cannot be modified. Register all tiers before constructing the ordering")]
    RegistryLocked,

    /// A tier is already registered under this name
    #[error("Duplicate tier name {name}")]
    DuplicateName { name: TierName },

    /// The tier object is already registered under another name
    #[error("Tier is already registered as {existing}, cannot register it again as {name}")]
    DuplicateTier { existing: TierName, name: TierName },

    /// An ordering constraint refers to a tier object that has no name yet
    #[error("Tier {name} references an unregistered tier object in its ordering constraints ({tier}). Register it first or refer to it by name")]
    UnregisteredTier { name: TierName, tier: String },

    /// The registry already holds as many tiers as a sync message can carry
    #[error("Cannot register tier {name}, the registry is limited to {max} tiers")]
    TooManyTiers { name: TierName, max: usize },

    /// The registered constraints cannot be sorted
    #[error("Tier sorting failed: {0}")]
    Sort(#[from] SortError),
}
