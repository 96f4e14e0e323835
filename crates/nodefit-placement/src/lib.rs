//! nodefit allocation engine — executor slots, node fill, sizing metrics.
//!
//! Everything in this crate is a pure function of an
//! [`AllocationParams`](nodefit_core::AllocationParams) snapshot. Nothing
//! is cached between calls and nothing here can fail: an infeasible
//! configuration is reported as `slots_per_node == 0`.
//!
//! # Components
//!
//! - **`allocator`** — Slot capacity per node and executor distribution
//! - **`metrics`** — Unused capacity, max feasible executor memory, summary
//! - **`sweep`** — Optimal-combinations what-if table over executor core counts

pub mod allocator;
pub mod metrics;
pub mod sweep;

pub use allocator::{Distribution, ReservedPlacement, SlotCapacity, compute_distribution, slots_per_node};
pub use metrics::{Summary, max_feasible_executor_memory_gb, total_unused_vcpus, unused_vcpus_per_node};
pub use sweep::{SweepRow, sweep};
