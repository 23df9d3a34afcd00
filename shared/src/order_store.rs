use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use arc_swap::ArcSwap;

use crate::{Tier, TierName};

/// An immutable snapshot of the sorted order, lesser tiers first
#[derive(Debug, Clone)]
pub struct SortedTiers<T: Tier> {
    tiers: Vec<T>,
    names: Vec<TierName>,
    positions: HashMap<T, usize>,
}

impl<T: Tier> SortedTiers<T> {
    /// Builds a snapshot from `(tier, name)` pairs already in sorted order
    pub fn new(entries: Vec<(T, TierName)>) -> Self {
        let mut tiers = Vec::with_capacity(entries.len());
        let mut names = Vec::with_capacity(entries.len());
        let mut positions = HashMap::with_capacity(entries.len());
        for (index, (tier, name)) in entries.into_iter().enumerate() {
            positions.insert(tier.clone(), index);
            tiers.push(tier);
            names.push(name);
        }
        Self {
            tiers,
            names,
            positions,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn tiers(&self) -> &[T] {
        &self.tiers
    }

    pub fn names(&self) -> &[TierName] {
        &self.names
    }

    pub fn position(&self, tier: &T) -> Option<usize> {
        self.positions.get(tier).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Holds the current sorted order. Each install swaps in a whole new
/// snapshot; readers keep whichever snapshot they loaded.
pub struct OrderStore<T: Tier> {
    current: ArcSwap<SortedTiers<T>>,
    revision: AtomicU64,
}

impl<T: Tier> OrderStore<T> {
    pub fn new(initial: SortedTiers<T>) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            revision: AtomicU64::new(0),
        }
    }

    pub fn load(&self) -> Arc<SortedTiers<T>> {
        self.current.load_full()
    }

    pub fn install(&self, sorted: SortedTiers<T>) {
        self.current.store(Arc::new(sorted));
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of installs since construction
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
}
