use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RiskfrontError;
use crate::RiskfrontResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Child reference inside a merge event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ClusterNode {
    /// An original asset, by column index.
    Leaf(usize),
    /// The cluster created by merge event `id`.
    Cluster(usize),
}

impl ClusterNode {
    /// Conventional numeric label: leaves keep their index, clusters are
    /// numbered after the leaves (`n_leaves + id`).
    pub fn label(&self, n_leaves: usize) -> usize {
        match self {
            ClusterNode::Leaf(i) => *i,
            ClusterNode::Cluster(id) => n_leaves + id,
        }
    }
}

/// One agglomeration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeEvent {
    /// Child with the lower conventional label.
    pub left: ClusterNode,
    pub right: ClusterNode,
    /// Single-linkage distance between the two children.
    pub distance: f64,
    /// Number of leaves under the merged cluster.
    pub size: usize,
}

/// Binary merge tree over `n_leaves` assets, `n_leaves - 1` events long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTree {
    n_leaves: usize,
    merges: Vec<MergeEvent>,
}

impl ClusterTree {
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[MergeEvent] {
        &self.merges
    }

    pub fn merge(&self, id: usize) -> Option<&MergeEvent> {
        self.merges.get(id)
    }

    /// The final merge, covering every leaf.
    pub fn root(&self) -> Option<&MergeEvent> {
        self.merges.last()
    }
}

struct ActiveCluster {
    node: ClusterNode,
    size: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Single-linkage agglomerative clustering over a square distance matrix.
///
/// Each step merges the two current clusters whose closest members are
/// nearest. Equal distances are resolved by the smallest pair of
/// conventional labels, which makes the tree deterministic.
pub fn single_linkage(distance: &[Vec<f64>]) -> RiskfrontResult<ClusterTree> {
    let n = distance.len();
    if n < 2 {
        return Err(RiskfrontError::ClusteringError(format!(
            "At least 2 assets required for clustering, got {n}"
        )));
    }
    for (i, row) in distance.iter().enumerate() {
        if row.len() != n {
            return Err(RiskfrontError::ClusteringError(format!(
                "Distance row {} has {} columns, expected {}",
                i,
                row.len(),
                n
            )));
        }
        if let Some(d) = row.iter().find(|d| !d.is_finite()) {
            return Err(RiskfrontError::ClusteringError(format!(
                "Distance row {i} contains non-finite value {d}"
            )));
        }
    }

    let mut active: Vec<ActiveCluster> = (0..n)
        .map(|i| ActiveCluster {
            node: ClusterNode::Leaf(i),
            size: 1,
        })
        .collect();
    // Pairwise single-linkage distances between the active clusters.
    let mut dist: Vec<Vec<f64>> = distance.to_vec();
    let mut merges = Vec::with_capacity(n - 1);

    while active.len() > 1 {
        let mut best: Option<(usize, usize, f64, (usize, usize))> = None;
        for a in 0..active.len() {
            for b in (a + 1)..active.len() {
                let d = dist[a][b];
                let la = active[a].node.label(n);
                let lb = active[b].node.label(n);
                let labels = (la.min(lb), la.max(lb));
                let better = match best {
                    None => true,
                    Some((_, _, best_d, best_labels)) => {
                        d < best_d || (d == best_d && labels < best_labels)
                    }
                };
                if better {
                    best = Some((a, b, d, labels));
                }
            }
        }

        let Some((a, b, d, _)) = best else {
            break;
        };

        let (left, right) = if active[a].node.label(n) < active[b].node.label(n) {
            (active[a].node, active[b].node)
        } else {
            (active[b].node, active[a].node)
        };
        let size = active[a].size + active[b].size;
        merges.push(MergeEvent {
            left,
            right,
            distance: d,
            size,
        });

        // Lance-Williams update for single linkage: min of the two rows.
        let merged_row: Vec<f64> = (0..active.len())
            .filter(|&k| k != a && k != b)
            .map(|k| dist[a][k].min(dist[b][k]))
            .collect();

        // b > a, so removing b first keeps index a valid.
        active.remove(b);
        active.remove(a);
        dist.remove(b);
        dist.remove(a);
        for row in dist.iter_mut() {
            row.remove(b);
            row.remove(a);
        }

        for (row, &v) in dist.iter_mut().zip(merged_row.iter()) {
            row.push(v);
        }
        let mut new_row = merged_row;
        new_row.push(0.0);
        dist.push(new_row);
        active.push(ActiveCluster {
            node: ClusterNode::Cluster(merges.len() - 1),
            size,
        });
    }

    if let Some(root) = merges.last() {
        debug!(
            leaves = n,
            merges = merges.len(),
            root_distance = root.distance,
            "single-linkage clustering complete"
        );
    }

    Ok(ClusterTree {
        n_leaves: n,
        merges,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
