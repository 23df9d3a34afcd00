use std::collections::{BTreeSet, HashMap};

use log::debug;
use thiserror::Error;

use crate::{name::join_names, TierEdge, TierName};

/// Errors that can occur while sorting tiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// The constraints contain a cycle; `tiers` lists every tier that could
    /// not be placed, in registration order
    #[error("Tier ordering constraints form a cycle. Unable to place: {}", join_names(.tiers))]
    Cycle { tiers: Vec<TierName> },
}

/// Topologically sorts `names` under `edges` and returns indices into
/// `names`, lesser tiers first.
///
/// Ties between unconstrained tiers are broken by position in `names`, so the
/// result depends only on registration order and never on hashing. Edges with
/// an endpoint missing from `names` are ignored.
pub fn sort_tiers(names: &[TierName], edges: &[TierEdge]) -> Result<Vec<usize>, SortError> {
    let index_of: HashMap<&TierName, usize> = names
        .iter()
        .enumerate()
        .map(|(index, name)| (name, index))
        .collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    let mut in_degree: Vec<usize> = vec![0; names.len()];

    for edge in edges {
        let (Some(&lesser), Some(&greater)) =
            (index_of.get(&edge.lesser), index_of.get(&edge.greater))
        else {
            debug!(
                "dropping tier edge {} -> {}, endpoint never registered",
                edge.lesser, edge.greater
            );
            continue;
        };
        successors[lesser].push(greater);
        in_degree[greater] += 1;
    }

    let mut ready: BTreeSet<usize> = (0..names.len())
        .filter(|index| in_degree[*index] == 0)
        .collect();
    let mut order = Vec::with_capacity(names.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &successor in &successors[next] {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.insert(successor);
            }
        }
    }

    if order.len() < names.len() {
        let tiers = (0..names.len())
            .filter(|index| in_degree[*index] > 0)
            .map(|index| names[index].clone())
            .collect();
        return Err(SortError::Cycle { tiers });
    }

    Ok(order)
}
