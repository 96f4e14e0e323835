//! Optimal-combinations sweep.
//!
//! A what-if table over candidate executor core counts. Each row is
//! CPU-first: slots come from cores alone, and executor memory is then
//! sized to split the node evenly. The primary allocation never reads it.

use nodefit_core::AllocationParams;
use serde::Serialize;

use crate::allocator::slots_per_node;
use crate::metrics::max_feasible_executor_memory_gb;

/// Multiplier applied to total executor cores for the shuffle-partition hint.
pub const SHUFFLE_PARTITIONS_PER_CORE: u64 = 4;

/// One candidate executor shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepRow {
    pub executor_cores: u32,
    pub slots_per_node: u32,
    pub unused_vcpus_per_node: u32,
    pub max_executor_memory_gb: u64,
    /// Executors a cluster of the target size can host, reserved ones excluded.
    pub max_executors: u32,
    pub shuffle_partitions: u64,
}

impl SweepRow {
    /// Write this row's shape back into a parameter snapshot.
    pub fn apply_to(&self, params: &AllocationParams) -> AllocationParams {
        AllocationParams {
            executor_cores: self.executor_cores,
            executor_memory_gb: (self.max_executor_memory_gb as f64).max(1.0),
            max_executors: self.max_executors,
            ..*params
        }
    }
}

/// Evaluate every executor core count from 2 up to the node's vCPUs.
pub fn sweep(params: &AllocationParams, target_max_nodes: u32) -> Vec<SweepRow> {
    let target_nodes = target_max_nodes.max(1);
    let max_cores = params.node_vcpus.max(2);

    (2..=max_cores)
        .map(|cores| {
            let candidate = AllocationParams {
                executor_cores: cores,
                ..*params
            };
            let slots = slots_per_node(&candidate).by_cores;
            let unused = params.node_vcpus.saturating_sub(slots * cores);
            let max_memory =
                max_feasible_executor_memory_gb(slots, params.node_memory_gb, params.overhead_factor);
            let max_executors = slots
                .saturating_mul(target_nodes)
                .saturating_sub(params.reserved_executors);
            let shuffle_partitions =
                (u64::from(cores) * u64::from(max_executors) * SHUFFLE_PARTITIONS_PER_CORE).max(1);

            SweepRow {
                executor_cores: cores,
                slots_per_node: slots,
                unused_vcpus_per_node: unused,
                max_executor_memory_gb: max_memory,
                max_executors,
                shuffle_partitions,
            }
        })
        .collect()
}
