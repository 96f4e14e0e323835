//! Allocation engine — fits executors onto nodes.
//!
//! Given an executor shape and a node shape, the allocator decides:
//! 1. How many executor slots a node offers (CPU and memory limits)
//! 2. How many nodes are needed (elastic) or available (fixed)
//! 3. How executors fill those nodes, reserved slots first
//!
//! Placement is greedy and strictly ordered: node 0 is filled before
//! node 1, columns left to right, no gaps, no rebalancing.

use nodefit_core::AllocationParams;
use serde::Serialize;
use tracing::{debug, warn};

/// Per-node slot capacity and the terms it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCapacity {
    /// Slots allowed by cores alone.
    pub by_cores: u32,
    /// CPU slots after the even-memory-split reconciliation.
    pub by_cores_reconciled: u32,
    /// Slots allowed by memory (with overhead) alone.
    pub by_memory: u32,
    /// Final slot count: the smaller of the reconciled CPU and memory terms.
    pub slots: u32,
}

/// Where the reserved coordinator executors ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReservedPlacement {
    /// Reserved executors asked for.
    pub requested: u32,
    /// Reserved executors actually seated.
    pub seated: u32,
    /// First node hosting a reserved executor.
    pub node_index: Option<usize>,
}

impl ReservedPlacement {
    pub fn is_placed(&self) -> bool {
        self.seated > 0
    }
}

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// Maximum executors one node can host. Zero means infeasible.
    pub slots_per_node: u32,
    /// Elastic: nodes required for every executor. Fixed: the configured
    /// node count. `None` when elastic and no executor fits a node.
    pub nodes_needed: Option<u32>,
    /// Executors assigned to each node, in placement order.
    pub per_node: Vec<u32>,
    /// User-requested executors left without a slot.
    pub unplaced: u32,
    pub reserved: ReservedPlacement,
}

impl Distribution {
    pub fn is_feasible(&self) -> bool {
        self.slots_per_node > 0
    }

    pub fn node_count(&self) -> usize {
        self.per_node.len()
    }

    /// Slots across the nodes of this distribution.
    pub fn capacity(&self) -> u64 {
        u64::from(self.slots_per_node) * self.per_node.len() as u64
    }

    /// Executors seated, reserved ones included.
    pub fn placed_total(&self) -> u32 {
        self.per_node.iter().sum()
    }

    /// User executors seated, reserved ones excluded.
    pub fn placed_user(&self) -> u32 {
        self.placed_total().saturating_sub(self.reserved.seated)
    }

    /// Whether the slot at `column` of node `node` holds a reserved executor.
    ///
    /// Reserved executors take the first global slot positions, so this is
    /// the only place that maps them onto node/column coordinates.
    pub fn is_reserved_slot(&self, node: usize, column: u32) -> bool {
        let Some(&count) = self.per_node.get(node) else {
            return false;
        };
        if column >= count {
            return false;
        }
        let before: u32 = self.per_node[..node].iter().sum();
        before + column < self.reserved.seated
    }
}

/// Compute the slot capacity of a single node.
pub fn slots_per_node(params: &AllocationParams) -> SlotCapacity {
    let cores_per_exec = params.executor_cores.max(1);
    let mem_per_exec = params.effective_executor_memory_gb();
    let node_cores = params.node_vcpus.max(1);
    let node_memory = params.node_memory_gb.max(1.0);

    let by_cores = node_cores / cores_per_exec;
    let by_memory = (node_memory / mem_per_exec).floor() as u32;

    let by_cores_reconciled = if params.reconcile_memory {
        reconcile_with_memory(
            by_cores,
            node_memory,
            params.executor_memory_gb,
            params.overhead_factor,
        )
    } else {
        by_cores
    };

    SlotCapacity {
        by_cores,
        by_cores_reconciled,
        by_memory,
        slots: by_cores_reconciled.min(by_memory),
    }
}

/// Walk the CPU slot count down until an even split of node memory,
/// with overhead stripped back out, still covers the requested executor
/// memory. Whole gigabytes are compared on both sides.
///
/// A node that cannot give every CPU slot at least one whole gigabyte
/// gets no slots at all.
fn reconcile_with_memory(mut slots: u32, node_memory: f64, executor_memory: f64, overhead: f64) -> u32 {
    let requested = executor_memory.floor();
    while slots > 0 {
        let share = (node_memory / f64::from(slots)).floor();
        if share <= 0.0 {
            return 0;
        }
        let allowed = (share * (1.0 - overhead)).floor();
        if requested <= allowed {
            break;
        }
        slots -= 1;
    }
    slots
}

/// Compute the executor distribution for a parameter snapshot.
pub fn compute_distribution(params: &AllocationParams) -> Distribution {
    let capacity = slots_per_node(params);
    let slots = capacity.slots;
    let total = params.total_to_place();

    let (nodes_needed, per_node) = if params.fixed_nodes {
        let nodes = params.num_nodes;
        (Some(nodes), fill_nodes(total, slots, nodes))
    } else if slots == 0 {
        (None, Vec::new())
    } else {
        let nodes = total.div_ceil(slots);
        (Some(nodes), fill_nodes(total, slots, nodes))
    };

    if slots == 0 {
        warn!(
            by_cores = capacity.by_cores,
            by_memory = capacity.by_memory,
            executor_cores = params.executor_cores,
            node_vcpus = params.node_vcpus,
            "no executor fits a node"
        );
    }

    let placed_total: u32 = per_node.iter().sum();
    let seated = params.reserved_executors.min(placed_total);
    let placed_user = placed_total - seated;
    let unplaced = params.max_executors.saturating_sub(placed_user);

    let node_index = if seated > 0 {
        per_node.iter().position(|&count| count > 0)
    } else {
        None
    };

    let dist = Distribution {
        slots_per_node: slots,
        nodes_needed,
        per_node,
        unplaced,
        reserved: ReservedPlacement {
            requested: params.reserved_executors,
            seated,
            node_index,
        },
    };

    if dist.unplaced > 0 && dist.is_feasible() {
        warn!(
            unplaced = dist.unplaced,
            capacity = dist.capacity(),
            "could not place all executors, insufficient node capacity"
        );
    }

    dist
}

fn fill_nodes(total: u32, slots: u32, nodes: u32) -> Vec<u32> {
    let mut remaining = total;
    (0..nodes)
        .map(|node| {
            let take = remaining.min(slots);
            remaining -= take;
            if take > 0 {
                debug!(node, executors = take, slots, "filled node");
            }
            take
        })
        .collect()
}
