//! Connected components of the "touches" relation.
//!
//! Pave blocks produced independently per curve/surface pair may represent
//! one physical edge. The touch relation between them is symmetric but not
//! transitive; chaining makes it transitive by grouping every mutually
//! reachable set of blocks into one chain.

use tracing::{debug, instrument};

use crate::error::ContractViolation;

/// One connected component of the touch relation.
///
/// Members appear in discovery order: the first member is the earliest
/// unvisited record in the input order, so chain numbering is reproducible
/// across runs for identical input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub members: Vec<usize>,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Build chains from an explicit adjacency mapping; `adjacency[i]` lists the
/// records touching record `i`.
///
/// The mapping must be symmetric; an asymmetric relation is a bug in the
/// caller's touch computation and is rejected up front. Every record ends up
/// in exactly one chain; records with no neighbors form singleton chains.
/// Runs in O(V + E): the seen-guard visits each record and edge once.
#[instrument(skip(adjacency), fields(records = adjacency.len()))]
pub fn build_chains(adjacency: &[Vec<usize>]) -> Result<Vec<Chain>, ContractViolation> {
    let n = adjacency.len();
    for (from, neighbors) in adjacency.iter().enumerate() {
        for &to in neighbors {
            if to >= n {
                return Err(ContractViolation::UnknownRecord { index: to, len: n });
            }
            if !adjacency[to].contains(&from) {
                return Err(ContractViolation::AsymmetricTouch { from, to });
            }
        }
    }

    let mut seen = vec![false; n];
    let mut chains = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut members = vec![start];
        // Explicit cursor into the growing member list; the chain is complete
        // when the cursor catches up with the tail (fixed point).
        let mut cursor = 0;
        while cursor < members.len() {
            let current = members[cursor];
            for &neighbor in &adjacency[current] {
                if !seen[neighbor] {
                    seen[neighbor] = true;
                    members.push(neighbor);
                }
            }
            cursor += 1;
        }
        chains.push(Chain { members });
    }

    debug!(chains = chains.len(), "touch relation chained");
    Ok(chains)
}

/// Build chains from a touch predicate over the items themselves.
///
/// The adjacency is materialized from unordered pairs, so the relation is
/// symmetric by construction and the predicate is consulted once per pair.
pub fn build_chains_by<T>(items: &[T], touches: impl Fn(&T, &T) -> bool) -> Vec<Chain> {
    let mut adjacency = vec![Vec::new(); items.len()];
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if touches(&items[i], &items[j]) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }
    build_chains(&adjacency).expect("pairwise-built adjacency is symmetric")
}
