//! Parsing of interactive edits.
//!
//! One edit per line, `key=value`. Keys accept `snake_case` or
//! `kebab-case`. Numeric values that do not parse are kept as NaN and
//! coerced later, the same way an empty form field would be.

use std::str::FromStr;

use nodefit_core::RawInputs;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected key=value, got {0:?}")]
    Malformed(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("no sweep row for {0} executor cores")]
    NoSweepRow(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    ExecutorCores,
    ExecutorMemoryGb,
    OverheadFactor,
    MaxExecutors,
    TargetMaxNodes,
    NodeVcpus,
    NodeMemoryGb,
    NumNodes,
    ReservedExecutors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    FixedNodes,
    ReconcileMemory,
}

/// A single user edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputChange {
    Number(NumericField, f64),
    Flag(FlagField, bool),
    /// Restore the documented defaults.
    Reset,
    /// Copy the optimal-combinations row for this core count into the inputs.
    ApplySweep(u32),
}

impl InputChange {
    /// Write a field edit into the snapshot. Returns `false` for actions
    /// that the session has to handle itself.
    pub fn write_to(&self, inputs: &mut RawInputs) -> bool {
        match *self {
            InputChange::Number(field, value) => {
                let slot = match field {
                    NumericField::ExecutorCores => &mut inputs.executor_cores,
                    NumericField::ExecutorMemoryGb => &mut inputs.executor_memory_gb,
                    NumericField::OverheadFactor => &mut inputs.overhead_factor,
                    NumericField::MaxExecutors => &mut inputs.max_executors,
                    NumericField::TargetMaxNodes => &mut inputs.target_max_nodes,
                    NumericField::NodeVcpus => &mut inputs.node_vcpus,
                    NumericField::NodeMemoryGb => &mut inputs.node_memory_gb,
                    NumericField::NumNodes => &mut inputs.num_nodes,
                    NumericField::ReservedExecutors => &mut inputs.reserved_executors,
                };
                *slot = Some(value);
                true
            }
            InputChange::Flag(field, value) => {
                match field {
                    FlagField::FixedNodes => inputs.fixed_nodes = Some(value),
                    FlagField::ReconcileMemory => inputs.reconcile_memory = Some(value),
                }
                true
            }
            InputChange::Reset | InputChange::ApplySweep(_) => false,
        }
    }
}

impl FromStr for InputChange {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.eq_ignore_ascii_case("reset") {
            return Ok(InputChange::Reset);
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(InputError::Malformed(line.to_string()));
        };
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        let value = value.trim();

        let numeric = match key.as_str() {
            "executor_cores" | "cores" => Some(NumericField::ExecutorCores),
            "executor_memory_gb" | "memory" => Some(NumericField::ExecutorMemoryGb),
            "overhead_factor" | "overhead" => Some(NumericField::OverheadFactor),
            "max_executors" => Some(NumericField::MaxExecutors),
            "target_max_nodes" => Some(NumericField::TargetMaxNodes),
            "node_vcpus" => Some(NumericField::NodeVcpus),
            "node_memory_gb" => Some(NumericField::NodeMemoryGb),
            "num_nodes" => Some(NumericField::NumNodes),
            "reserved_executors" | "reserved" => Some(NumericField::ReservedExecutors),
            _ => None,
        };
        if let Some(field) = numeric {
            return Ok(InputChange::Number(field, value.parse().unwrap_or(f64::NAN)));
        }

        let invalid = || InputError::InvalidValue {
            field: key.clone(),
            value: value.to_string(),
        };

        match key.as_str() {
            "fixed_nodes" => Ok(InputChange::Flag(
                FlagField::FixedNodes,
                parse_flag(value).ok_or_else(invalid)?,
            )),
            "reconcile_memory" => Ok(InputChange::Flag(
                FlagField::ReconcileMemory,
                parse_flag(value).ok_or_else(invalid)?,
            )),
            "apply" => value.parse().map(InputChange::ApplySweep).map_err(|_| invalid()),
            _ => Err(InputError::UnknownField(key.clone())),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
