use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::{name::join_names, SortedTiers, Tier, TierName, TierNameError, TierRegistry};

/// Errors that can occur while loading an explicit tier order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// Document is not valid JSON of the expected shape
    #[error("Failed to parse tier order document: {message}")]
    Parse { message: String },

    /// An entry is not a valid qualified name
    #[error("Tier order document contains an invalid name: {0}")]
    InvalidName(#[from] TierNameError),

    /// An entry names a tier that was never registered
    #[error("Tier not found with name {name}")]
    UnknownTier { name: TierName },

    /// An entry appears more than once
    #[error("Tier {name} is listed more than once in the tier order document")]
    DuplicateTier { name: TierName },

    /// Registered tiers are absent from the document
    #[error("Tiers missing from the ordered list: {}", join_names(.tiers))]
    MissingTiers { tiers: Vec<TierName> },
}

/// An explicit total order, e.g. `{"order": ["minecraft:wood", ...]}`.
/// An empty order means "no override".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderOverride {
    #[serde(default)]
    pub order: Vec<String>,
}

impl OrderOverride {
    pub fn from_json(document: &str) -> Result<Self, OverrideError> {
        serde_json::from_str(document).map_err(|err| OverrideError::Parse {
            message: err.to_string(),
        })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            order: names.into_iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves every entry against `registry`. Only a permutation of exactly
    /// the registered names is accepted.
    pub fn resolve<T: Tier>(
        &self,
        registry: &TierRegistry<T>,
    ) -> Result<SortedTiers<T>, OverrideError> {
        let mut seen = HashSet::with_capacity(self.order.len());
        let mut entries = Vec::with_capacity(self.order.len());

        for entry in &self.order {
            let name = TierName::parse(entry)?;
            let Some(tier) = registry.by_name(&name) else {
                return Err(OverrideError::UnknownTier { name });
            };
            if !seen.insert(name.clone()) {
                return Err(OverrideError::DuplicateTier { name });
            }
            entries.push((tier.clone(), name));
        }

        let missing: Vec<TierName> = registry
            .names()
            .iter()
            .filter(|name| !seen.contains(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(OverrideError::MissingTiers { tiers: missing });
        }

        Ok(SortedTiers::new(entries))
    }
}

/// Hands out the latest override document on each data reload
pub trait OverrideSource {
    /// Raw document text, or None when no document exists
    fn latest(&self) -> Option<String>;
}
