use crate::error::RiskfrontError;
use crate::hrp::linkage::{ClusterNode, ClusterTree};
use crate::RiskfrontResult;

/// Leaf order that places assets merged early next to each other.
///
/// Starts from the root merge and repeatedly replaces every cluster
/// reference with its first child followed by its second child, until only
/// leaves remain.
pub fn quasi_diagonal_order(tree: &ClusterTree) -> RiskfrontResult<Vec<usize>> {
    let root = tree.root().ok_or_else(|| {
        RiskfrontError::ClusteringError("Cluster tree has no merge events".into())
    })?;

    let mut order: Vec<ClusterNode> = vec![root.left, root.right];
    while order.iter().any(|node| matches!(node, ClusterNode::Cluster(_))) {
        let mut expanded = Vec::with_capacity(order.len() * 2);
        for node in order {
            match node {
                ClusterNode::Leaf(_) => expanded.push(node),
                ClusterNode::Cluster(id) => {
                    let merge = tree.merge(id).ok_or_else(|| {
                        RiskfrontError::ClusteringError(format!(
                            "Cluster {id} referenced but tree has {} merges",
                            tree.merges().len()
                        ))
                    })?;
                    expanded.push(merge.left);
                    expanded.push(merge.right);
                }
            }
        }
        if expanded.len() > tree.n_leaves() {
            return Err(RiskfrontError::ClusteringError(
                "Cluster tree expands to more leaves than assets".into(),
            ));
        }
        order = expanded;
    }

    let leaves: Vec<usize> = order
        .into_iter()
        .filter_map(|node| match node {
            ClusterNode::Leaf(i) => Some(i),
            ClusterNode::Cluster(_) => None,
        })
        .collect();

    let mut seen = vec![false; tree.n_leaves()];
    for &i in &leaves {
        if i >= seen.len() || seen[i] {
            return Err(RiskfrontError::ClusteringError(format!(
                "Leaf {i} is out of range or appears twice in the cluster tree"
            )));
        }
        seen[i] = true;
    }
    if leaves.len() != tree.n_leaves() {
        return Err(RiskfrontError::ClusteringError(format!(
            "Cluster tree covers {} of {} assets",
            leaves.len(),
            tree.n_leaves()
        )));
    }

    Ok(leaves)
}
