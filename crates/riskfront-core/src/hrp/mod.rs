//! Hierarchical Risk Parity.
//!
//! Four strictly ordered stages: correlation distance, single-linkage
//! clustering, quasi-diagonal ordering, recursive bisection.

pub mod allocation;
pub mod bisection;
pub mod distance;
pub mod linkage;
pub mod quasi_diag;

pub use allocation::{
    hrp_from_covariance, hrp_from_returns, run_hrp_allocation, HrpAllocation, HrpInput,
    HrpOutput, HrpPerformance,
};
pub use bisection::{cluster_variance, inverse_variance_weights, recursive_bisection};
pub use distance::correlation_distance;
pub use linkage::{single_linkage, ClusterNode, ClusterTree, MergeEvent};
pub use quasi_diag::quasi_diagonal_order;
