//! Allocation parameters and boundary sanitization.
//!
//! Every input surface produces a [`RawInputs`] value. Fields may be
//! missing, non-finite, negative or fractional; [`AllocationParams::from_raw`]
//! coerces them to safe values so the allocation engine never has to
//! validate anything itself.

use serde::{Deserialize, Serialize};

/// Overhead factor used when none is configured (Spark's 10% / 384MB
/// floor approximated as a single factor).
pub const DEFAULT_OVERHEAD_FACTOR: f64 = 0.1875;

/// Upper bound for the overhead factor; the model requires it to stay below 1.
pub const MAX_OVERHEAD_FACTOR: f64 = 0.99;

/// Target node count used by the optimal-combinations sweep.
pub const DEFAULT_TARGET_MAX_NODES: u32 = 3;

/// Ceiling for every count field so node vectors stay bounded.
pub const MAX_COUNT: u32 = 1_000_000;

pub const DEFAULT_EXECUTOR_CORES: u32 = 4;
pub const DEFAULT_EXECUTOR_MEMORY_GB: f64 = 8.0;
pub const DEFAULT_MAX_EXECUTORS: u32 = 10;
pub const DEFAULT_NODE_VCPUS: u32 = 16;
pub const DEFAULT_NODE_MEMORY_GB: f64 = 64.0;
pub const DEFAULT_NUM_NODES: u32 = 3;
pub const DEFAULT_RESERVED_EXECUTORS: u32 = 1;

/// Unvalidated input snapshot, one optional value per input field.
///
/// Numeric fields are `f64` regardless of their final type so that any
/// user-typed number survives until sanitization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub executor_cores: Option<f64>,
    pub executor_memory_gb: Option<f64>,
    pub overhead_factor: Option<f64>,
    pub max_executors: Option<f64>,
    pub target_max_nodes: Option<f64>,
    pub node_vcpus: Option<f64>,
    pub node_memory_gb: Option<f64>,
    pub num_nodes: Option<f64>,
    pub reserved_executors: Option<f64>,
    pub fixed_nodes: Option<bool>,
    pub reconcile_memory: Option<bool>,
}

impl RawInputs {
    /// Inputs holding every documented default.
    pub fn defaults() -> Self {
        let mut raw = Self {
            overhead_factor: Some(DEFAULT_OVERHEAD_FACTOR),
            target_max_nodes: Some(f64::from(DEFAULT_TARGET_MAX_NODES)),
            reserved_executors: Some(f64::from(DEFAULT_RESERVED_EXECUTORS)),
            reconcile_memory: Some(true),
            ..Self::default()
        };
        raw.reset();
        raw
    }

    /// Restore the reset-able fields to their documented defaults.
    ///
    /// Overhead, reserved executors, reconciliation and the sweep target
    /// are left untouched.
    pub fn reset(&mut self) {
        self.executor_cores = Some(f64::from(DEFAULT_EXECUTOR_CORES));
        self.executor_memory_gb = Some(DEFAULT_EXECUTOR_MEMORY_GB);
        self.max_executors = Some(f64::from(DEFAULT_MAX_EXECUTORS));
        self.node_vcpus = Some(f64::from(DEFAULT_NODE_VCPUS));
        self.node_memory_gb = Some(DEFAULT_NODE_MEMORY_GB);
        self.num_nodes = Some(f64::from(DEFAULT_NUM_NODES));
        self.fixed_nodes = Some(false);
    }

    /// Layer `other` on top of `self`: any field set in `other` wins.
    pub fn overlay(mut self, other: &RawInputs) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            executor_cores,
            executor_memory_gb,
            overhead_factor,
            max_executors,
            target_max_nodes,
            node_vcpus,
            node_memory_gb,
            num_nodes,
            reserved_executors,
            fixed_nodes,
            reconcile_memory,
        );
        self
    }

    /// Sweep target node count, at least 1.
    pub fn target_max_nodes(&self) -> u32 {
        positive_count(self.target_max_nodes).unwrap_or(1)
    }
}

/// Immutable, sanitized parameter snapshot consumed by the allocation
/// engine and the layout projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationParams {
    /// Cores consumed by one executor (>= 1).
    pub executor_cores: u32,
    /// Base memory requested per executor before overhead, in GB (> 0).
    pub executor_memory_gb: f64,
    /// Fraction of executor memory reserved as overhead, in `[0, 1)`.
    /// Zero disables overhead handling.
    pub overhead_factor: f64,
    /// Executors the user wants placed, excluding reserved ones.
    pub max_executors: u32,
    /// CPU cores per node (>= 1).
    pub node_vcpus: u32,
    /// Memory per node in GB (>= 1).
    pub node_memory_gb: f64,
    /// Node count ceiling, only consulted in fixed mode (>= 1).
    pub num_nodes: u32,
    /// Fixed-node policy instead of elastic.
    pub fixed_nodes: bool,
    /// Cluster-wide coordinator ("AM") slots. Zero disables reserved accounting.
    pub reserved_executors: u32,
    /// Shrink the CPU-derived slot count until an even memory split fits
    /// the configured executor memory.
    pub reconcile_memory: bool,
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self::from_raw(&RawInputs::defaults())
    }
}

impl AllocationParams {
    /// Coerce raw inputs into a safe parameter snapshot.
    ///
    /// Never fails: cores, memory and node counts fall back to 1, counts
    /// fall back to 0, and a missing overhead factor becomes
    /// [`DEFAULT_OVERHEAD_FACTOR`].
    pub fn from_raw(raw: &RawInputs) -> Self {
        let overhead_factor = match raw.overhead_factor {
            Some(v) if v.is_finite() => v.clamp(0.0, MAX_OVERHEAD_FACTOR),
            _ => DEFAULT_OVERHEAD_FACTOR,
        };
        let reserved_executors = match raw.reserved_executors {
            Some(v) if v.is_finite() => (v.max(0.0).floor() as u32).min(MAX_COUNT),
            _ => DEFAULT_RESERVED_EXECUTORS,
        };

        let params = Self {
            executor_cores: positive_count(raw.executor_cores).unwrap_or(1),
            executor_memory_gb: positive(raw.executor_memory_gb).unwrap_or(1.0),
            overhead_factor,
            max_executors: positive(raw.max_executors).map_or(0, |v| (v.floor() as u32).min(MAX_COUNT)),
            node_vcpus: positive_count(raw.node_vcpus).unwrap_or(1),
            node_memory_gb: positive(raw.node_memory_gb).map_or(1.0, |v| v.max(1.0)),
            num_nodes: positive_count(raw.num_nodes).unwrap_or(1),
            fixed_nodes: raw.fixed_nodes.unwrap_or(false),
            reserved_executors,
            reconcile_memory: raw.reconcile_memory.unwrap_or(true),
        };
        tracing::trace!(?params, "sanitized inputs");
        params
    }

    /// Memory one executor occupies once overhead is added, in GB.
    pub fn effective_executor_memory_gb(&self) -> f64 {
        (self.executor_memory_gb * (1.0 + self.overhead_factor)).max(0.001)
    }

    /// Executors to seat including reserved ones.
    pub fn total_to_place(&self) -> u32 {
        self.max_executors.saturating_add(self.reserved_executors)
    }
}

impl From<&AllocationParams> for RawInputs {
    fn from(p: &AllocationParams) -> Self {
        Self {
            executor_cores: Some(f64::from(p.executor_cores)),
            executor_memory_gb: Some(p.executor_memory_gb),
            overhead_factor: Some(p.overhead_factor),
            max_executors: Some(f64::from(p.max_executors)),
            target_max_nodes: None,
            node_vcpus: Some(f64::from(p.node_vcpus)),
            node_memory_gb: Some(p.node_memory_gb),
            num_nodes: Some(f64::from(p.num_nodes)),
            reserved_executors: Some(f64::from(p.reserved_executors)),
            fixed_nodes: Some(p.fixed_nodes),
            reconcile_memory: Some(p.reconcile_memory),
        }
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

fn positive_count(v: Option<f64>) -> Option<u32> {
    positive(v).map(|x| (x.floor() as u32).clamp(1, MAX_COUNT))
}
