use std::{collections::HashSet, sync::Arc};

use log::{error, info, warn};

use crate::{
    sort_tiers, MainContext, OrderOverride, OrderStore, OverrideError, OverrideSource,
    SortError, SortedTiers, Tier, TierError, TierName, TierRegistry, TierTarget, VanillaTier,
};

struct OrderingInner<T: Tier> {
    registry: TierRegistry<T>,
    store: OrderStore<T>,
}

/// The tier ordering service. Owns the locked registry and the current
/// sorted order; clones are handles to the same service.
///
/// Writes to the order go through the injected [`MainContext`], reads may
/// happen from anywhere and see a whole snapshot.
pub struct TierOrdering<T: Tier> {
    inner: Arc<OrderingInner<T>>,
    context: Arc<dyn MainContext>,
}

impl<T: Tier> Clone for TierOrdering<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            context: self.context.clone(),
        }
    }
}

impl<T: Tier> TierOrdering<T> {
    /// Locks `registry` and computes the initial order. A cyclic constraint
    /// set is fatal here; once locked, later recomputations cannot meet one.
    pub fn new(
        mut registry: TierRegistry<T>,
        context: Arc<dyn MainContext>,
    ) -> Result<Self, TierError> {
        registry.lock();
        let sorted = compute_sorted(&registry)?;
        info!("sorted {} tiers", sorted.len());
        Ok(Self {
            inner: Arc::new(OrderingInner {
                store: OrderStore::new(sorted),
                registry,
            }),
            context,
        })
    }

    pub fn registry(&self) -> &TierRegistry<T> {
        &self.inner.registry
    }

    // Registry lookups

    pub fn by_name(&self, name: &TierName) -> Option<&T> {
        self.inner.registry.by_name(name)
    }

    pub fn name_of(&self, tier: &T) -> Option<&TierName> {
        self.inner.registry.name_of(tier)
    }

    // Queries

    /// Whether the tier takes part in sorting at all
    pub fn is_tier_sorted(&self, tier: &T) -> bool {
        self.inner.registry.is_registered(tier)
    }

    pub fn sorted_tiers(&self) -> Arc<SortedTiers<T>> {
        self.inner.store.load()
    }

    /// Whether `tier` is high enough for `target`. Fails if any tier sorted
    /// strictly above `tier` carries a tag the target has. Tiers outside the
    /// order fall back to the target's numeric level policy.
    ///
    /// The scan is linear; tier counts are in the tens.
    pub fn is_correct_tier_for_drops<G>(&self, tier: &T, target: &G) -> bool
    where
        G: TierTarget + ?Sized,
    {
        let sorted = self.sorted_tiers();
        // only registered tiers are ever placed in the order
        let Some(position) = sorted.position(tier) else {
            return target.is_correct_level(tier.level());
        };
        !sorted.tiers()[position + 1..]
            .iter()
            .filter_map(Tier::tag)
            .any(|tag| target.has_tag(tag))
    }

    /// Every tier sorted strictly below `tier`, lowest first
    pub fn tiers_lower_than(&self, tier: &T) -> Vec<T> {
        if !self.is_tier_sorted(tier) {
            return Vec::new();
        }
        let sorted = self.sorted_tiers();
        match sorted.position(tier) {
            Some(position) => sorted.tiers()[..position].to_vec(),
            None => Vec::new(),
        }
    }

    /// Whether the current order is exactly the base progression chain, i.e.
    /// nothing beyond the seed tiers has been registered or reordered
    pub fn is_seed_order(&self) -> bool {
        let sorted = self.sorted_tiers();
        sorted.len() == VanillaTier::SORTED.len()
            && sorted
                .names()
                .iter()
                .zip(VanillaTier::SORTED.iter())
                .all(|(name, vanilla)| *name == vanilla.name())
    }

    /// Number of orders installed since construction
    pub fn revision(&self) -> u64 {
        self.inner.store.revision()
    }

    // Writes

    /// Recomputes the order from the registered edges on the main context
    pub fn request_recompute(&self) {
        let inner = self.inner.clone();
        self.context.run(Box::new(move || {
            recompute(&inner);
        }));
    }

    /// Applies a reloaded override document on the main context. An empty or
    /// absent document, or one that fails validation, recomputes from edges.
    pub fn request_reload(&self, document: Option<OrderOverride>) {
        let inner = self.inner.clone();
        self.context.run(Box::new(move || {
            let Some(document) = document.filter(|document| !document.is_empty()) else {
                recompute(&inner);
                return;
            };
            match document.resolve(&inner.registry) {
                Ok(sorted) => {
                    info!("applying explicit tier order of {} tiers", sorted.len());
                    inner.store.install(sorted);
                }
                Err(err) => {
                    error!("Error applying tier order, falling back to computed order: {}", err);
                    recompute(&inner);
                }
            }
        }));
    }

    /// Pulls the latest document from `source` and applies it
    pub fn request_reload_from(&self, source: &dyn OverrideSource) {
        let document = match source.latest().map(|text| OrderOverride::from_json(&text)) {
            None => None,
            Some(Ok(document)) => Some(document),
            Some(Err(err)) => {
                error!("Error parsing tier order, falling back to computed order: {}", err);
                None
            }
        };
        self.request_reload(document);
    }

    /// Resolves an order received from a remote host. Every name must be
    /// registered locally; local tiers the host does not know stay unsorted.
    pub fn resolve_remote(&self, names: &[TierName]) -> Result<SortedTiers<T>, OverrideError> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let Some(tier) = self.by_name(name) else {
                return Err(OverrideError::UnknownTier { name: name.clone() });
            };
            if !seen.insert(name) {
                return Err(OverrideError::DuplicateTier { name: name.clone() });
            }
            entries.push((tier.clone(), name.clone()));
        }
        let unsorted = self.inner.registry.len() - entries.len();
        if unsorted > 0 {
            warn!("{} local tiers are absent from the remote tier order", unsorted);
        }
        Ok(SortedTiers::new(entries))
    }

    /// Installs an already resolved order on the main context
    pub fn request_install(&self, sorted: SortedTiers<T>) {
        self.request_install_then(sorted, || {});
    }

    /// Installs an already resolved order on the main context, then runs
    /// `installed` there once the new snapshot is visible to readers
    pub fn request_install_then<F>(&self, sorted: SortedTiers<T>, installed: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let inner = self.inner.clone();
        self.context.run(Box::new(move || {
            inner.store.install(sorted);
            installed();
        }));
    }
}

fn compute_sorted<T: Tier>(registry: &TierRegistry<T>) -> Result<SortedTiers<T>, SortError> {
    let order = sort_tiers(registry.names(), registry.edges())?;
    let entries = order
        .into_iter()
        .filter_map(|index| {
            let name = &registry.names()[index];
            registry.by_name(name).map(|tier| (tier.clone(), name.clone()))
        })
        .collect();
    Ok(SortedTiers::new(entries))
}

fn recompute<T: Tier>(inner: &OrderingInner<T>) {
    match compute_sorted(&inner.registry) {
        Ok(sorted) => inner.store.install(sorted),
        Err(err) => error!("Keeping previous tier order: {}", err),
    }
}
