//! Derived sizing metrics and the human-readable summary.

use std::fmt;

use nodefit_core::AllocationParams;
use serde::Serialize;

use crate::allocator::Distribution;

/// Message shown whenever no executor fits a node.
pub const INFEASIBLE_MESSAGE: &str = "No executors fit in a node with given parameters.";

/// vCPUs left idle on each node of the distribution.
pub fn unused_vcpus_per_node(dist: &Distribution, params: &AllocationParams) -> Vec<u32> {
    let cores = params.executor_cores.max(1);
    dist.per_node
        .iter()
        .map(|&placed| params.node_vcpus.saturating_sub(placed.saturating_mul(cores)))
        .collect()
}

pub fn total_unused_vcpus(dist: &Distribution, params: &AllocationParams) -> u64 {
    unused_vcpus_per_node(dist, params)
        .into_iter()
        .map(u64::from)
        .sum()
}

/// Largest raw executor memory request that, once overhead is added back,
/// still lets `slots` executors share a node evenly.
///
/// Returns 0 when `slots` is 0.
pub fn max_feasible_executor_memory_gb(slots: u32, node_memory_gb: f64, overhead_factor: f64) -> u64 {
    if slots == 0 {
        return 0;
    }
    let share = (node_memory_gb / f64::from(slots)).floor();
    (share * (1.0 - overhead_factor)).floor().max(0.0) as u64
}

/// Headline numbers for one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub slots_per_node: u32,
    pub nodes_needed: Option<u32>,
    pub unplaced: u32,
    pub total_unused_vcpus: u64,
    pub max_executor_memory_gb: u64,
}

impl Summary {
    pub fn from_distribution(dist: &Distribution, params: &AllocationParams) -> Self {
        Self {
            slots_per_node: dist.slots_per_node,
            nodes_needed: dist.nodes_needed,
            unplaced: dist.unplaced,
            total_unused_vcpus: total_unused_vcpus(dist, params),
            max_executor_memory_gb: max_feasible_executor_memory_gb(
                dist.slots_per_node,
                params.node_memory_gb,
                params.overhead_factor,
            ),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.slots_per_node > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_feasible() {
            return f.write_str(INFEASIBLE_MESSAGE);
        }
        match self.nodes_needed {
            Some(nodes) => write!(f, "Nodes needed: {nodes}")?,
            None => f.write_str("Nodes needed: n/a")?,
        }
        if self.unplaced > 0 {
            write!(f, " • Unplaced executors: {}", self.unplaced)?;
        }
        write!(
            f,
            " • Unused vCPUs: {} • Max calculated executor memory: {} GB",
            self.total_unused_vcpus, self.max_executor_memory_gb
        )
    }
}
