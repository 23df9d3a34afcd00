use std::collections::HashMap;

use log::debug;

use crate::{Tier, TierName, VanillaTier, MAX_TIER_COUNT};

pub mod error;
pub use error::TierError;

/// An ordering constraint: `lesser` must be sorted before `greater`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TierEdge {
    pub lesser: TierName,
    pub greater: TierName,
}

/// One side of an ordering constraint, given either by name or by an
/// already-registered tier
#[derive(Debug, Clone)]
pub enum TierRef<T> {
    Name(TierName),
    Tier(T),
}

impl<T> From<TierName> for TierRef<T> {
    fn from(name: TierName) -> Self {
        TierRef::Name(name)
    }
}

/// Bidirectional name <-> tier mapping plus the edges contributed at
/// registration time. Append-only until locked.
pub struct TierRegistry<T: Tier> {
    names: Vec<TierName>,
    tiers: HashMap<TierName, T>,
    tier_names: HashMap<T, TierName>,
    edges: Vec<TierEdge>,
    locked: bool,
}

impl<T: Tier> Default for TierRegistry<T> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            tiers: HashMap::new(),
            tier_names: HashMap::new(),
            edges: Vec::new(),
            locked: false,
        }
    }
}

impl<T: Tier> TierRegistry<T> {
    /// An empty registry, without the base progression levels
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the base progression chain
    pub fn vanilla() -> Result<Self, TierError>
    where
        T: From<VanillaTier>,
    {
        let mut registry = Self::new();
        for vanilla in VanillaTier::ALL {
            let afters = vanilla
                .afters()
                .iter()
                .map(|other| TierRef::Tier(T::from(*other)))
                .collect();
            let befores = vanilla
                .befores()
                .iter()
                .map(|other| TierRef::Name(other.name()))
                .collect();
            registry.register(T::from(vanilla), vanilla.name(), afters, befores)?;
        }
        Ok(registry)
    }

    /// Registers `tier` under `name`. Each entry of `afters` is ordered before
    /// the new tier, each entry of `befores` after it. Names that are not
    /// registered yet are accepted and dropped at sort time if they never
    /// resolve.
    pub fn register(
        &mut self,
        tier: T,
        name: TierName,
        afters: Vec<TierRef<T>>,
        befores: Vec<TierRef<T>>,
    ) -> Result<T, TierError> {
        self.try_check_lock()?;
        if self.names.len() >= MAX_TIER_COUNT {
            return Err(TierError::TooManyTiers {
                name,
                max: MAX_TIER_COUNT,
            });
        }
        if self.tiers.contains_key(&name) {
            return Err(TierError::DuplicateName { name });
        }
        if let Some(existing) = self.tier_names.get(&tier) {
            return Err(TierError::DuplicateTier {
                existing: existing.clone(),
                name,
            });
        }

        let afters = self.resolve_refs(&name, afters)?;
        let befores = self.resolve_refs(&name, befores)?;

        for other in afters {
            self.edges.push(TierEdge {
                lesser: other,
                greater: name.clone(),
            });
        }
        for other in befores {
            self.edges.push(TierEdge {
                lesser: name.clone(),
                greater: other,
            });
        }

        debug!("registered tier {}", name);
        self.names.push(name.clone());
        self.tiers.insert(name.clone(), tier.clone());
        self.tier_names.insert(tier.clone(), name);
        Ok(tier)
    }

    fn resolve_refs(
        &self,
        name: &TierName,
        refs: Vec<TierRef<T>>,
    ) -> Result<Vec<TierName>, TierError> {
        refs.into_iter()
            .map(|tier_ref| match tier_ref {
                TierRef::Name(other) => Ok(other),
                TierRef::Tier(other) => {
                    self.tier_names
                        .get(&other)
                        .cloned()
                        .ok_or_else(|| TierError::UnregisteredTier {
                            name: name.clone(),
                            tier: format!("{:?}", other),
                        })
                }
            })
            .collect()
    }

    pub fn by_name(&self, name: &TierName) -> Option<&T> {
        self.tiers.get(name)
    }

    pub fn name_of(&self, tier: &T) -> Option<&TierName> {
        self.tier_names.get(tier)
    }

    pub fn is_registered(&self, tier: &T) -> bool {
        self.tier_names.contains_key(tier)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> &[TierName] {
        &self.names
    }

    pub fn edges(&self) -> &[TierEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Returns Err if the registry is locked
    pub fn try_check_lock(&self) -> Result<(), TierError> {
        if self.locked {
            Err(TierError::RegistryLocked)
        } else {
            Ok(())
        }
    }
}
