//! Session state — one input snapshot, one latest report.

use nodefit_core::{AllocationParams, RawInputs};
use nodefit_placement::{Distribution, Summary, SweepRow, compute_distribution, sweep};
use serde::Serialize;
use tracing::{debug, info};

use crate::input::{InputChange, InputError};

/// Everything derived from one input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub params: AllocationParams,
    pub target_max_nodes: u32,
    pub distribution: Distribution,
    pub summary: Summary,
    pub sweep: Vec<SweepRow>,
}

impl Report {
    /// Build a report from scratch.
    pub fn compute(params: AllocationParams, target_max_nodes: u32) -> Self {
        let distribution = compute_distribution(&params);
        let summary = Summary::from_distribution(&distribution, &params);
        let sweep = sweep(&params, target_max_nodes);
        Self {
            params,
            target_max_nodes,
            distribution,
            summary,
            sweep,
        }
    }
}

/// Interactive session. Single writer: edits and recomputation happen on
/// whichever task owns the session.
#[derive(Debug, Clone)]
pub struct Session {
    inputs: RawInputs,
    latest: Option<Report>,
}

impl Session {
    pub fn new(inputs: RawInputs) -> Self {
        Self {
            inputs,
            latest: None,
        }
    }

    pub fn inputs(&self) -> &RawInputs {
        &self.inputs
    }

    /// Sanitized view of the current snapshot.
    pub fn params(&self) -> AllocationParams {
        AllocationParams::from_raw(&self.inputs)
    }

    /// Most recent report, if one has been computed.
    pub fn latest(&self) -> Option<&Report> {
        self.latest.as_ref()
    }

    /// Apply one edit to the snapshot. Does not recompute.
    pub fn apply(&mut self, change: InputChange) -> Result<(), InputError> {
        if change.write_to(&mut self.inputs) {
            debug!(?change, "input changed");
            return Ok(());
        }
        match change {
            InputChange::Reset => {
                self.reset();
                Ok(())
            }
            InputChange::ApplySweep(cores) => self.apply_sweep(cores),
            InputChange::Number(..) | InputChange::Flag(..) => Ok(()),
        }
    }

    /// Restore the documented defaults.
    pub fn reset(&mut self) {
        self.inputs.reset();
        info!("inputs reset to defaults");
    }

    fn apply_sweep(&mut self, cores: u32) -> Result<(), InputError> {
        let params = self.params();
        let row = sweep(&params, self.inputs.target_max_nodes())
            .into_iter()
            .find(|r| r.executor_cores == cores)
            .ok_or(InputError::NoSweepRow(cores))?;

        let applied = row.apply_to(&params);
        let target = self.inputs.target_max_nodes;
        self.inputs = RawInputs {
            target_max_nodes: target,
            ..RawInputs::from(&applied)
        };
        info!(
            executor_cores = applied.executor_cores,
            executor_memory_gb = applied.executor_memory_gb,
            max_executors = applied.max_executors,
            "applied sweep row"
        );
        Ok(())
    }

    /// Rebuild the report from the current snapshot.
    pub fn recompute(&mut self) -> &Report {
        let report = Report::compute(self.params(), self.inputs.target_max_nodes());
        info!(
            slots_per_node = report.distribution.slots_per_node,
            nodes_needed = ?report.distribution.nodes_needed,
            unplaced = report.distribution.unplaced,
            "recomputed distribution"
        );
        self.latest.insert(report)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RawInputs::defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FlagField, NumericField};

    #[test]
    fn default_session_reports_default_plan() {
        let mut session = Session::default();
        assert!(session.latest().is_none());

        let report = session.recompute();
        assert_eq!(report.distribution.per_node, vec![4, 4, 3]);
        assert_eq!(report.summary.max_executor_memory_gb, 13);
        assert_eq!(report.sweep.len(), 15);
        assert!(session.latest().is_some());
    }

    #[test]
    fn edits_apply_without_recomputing() {
        let mut session = Session::default();
        session.recompute();

        session
            .apply(InputChange::Number(NumericField::MaxExecutors, 20.0))
            .unwrap();
        assert_eq!(session.params().max_executors, 20);
        assert_eq!(session.latest().unwrap().params.max_executors, 10);

        let report = session.recompute();
        assert_eq!(report.distribution.nodes_needed, Some(6));
    }

    #[test]
    fn fixed_mode_edit_switches_policy() {
        let mut session = Session::default();
        session.apply(InputChange::Flag(FlagField::FixedNodes, true)).unwrap();
        session.apply(InputChange::Number(NumericField::NumNodes, 2.0)).unwrap();

        let report = session.recompute();
        assert_eq!(report.distribution.nodes_needed, Some(2));
        assert_eq!(report.distribution.unplaced, 3);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut session = Session::default();
        session.apply(InputChange::Number(NumericField::ExecutorCores, 7.0)).unwrap();
        session.apply(InputChange::Number(NumericField::OverheadFactor, 0.0)).unwrap();
        session.apply(InputChange::Reset).unwrap();

        let params = session.params();
        assert_eq!(params.executor_cores, 4);
        // Overhead is not one of the reset fields.
        assert_eq!(params.overhead_factor, 0.0);
    }

    #[test]
    fn apply_sweep_row_rewrites_executor_shape() {
        let mut session = Session::default();
        session.apply(InputChange::ApplySweep(5)).unwrap();

        let params = session.params();
        assert_eq!(params.executor_cores, 5);
        assert_eq!(params.executor_memory_gb, 17.0);
        assert_eq!(params.max_executors, 8);
        assert_eq!(session.inputs().target_max_nodes, Some(3.0));

        let report = session.recompute();
        assert_eq!(report.distribution.unplaced, 0);
        assert_eq!(report.distribution.nodes_needed, Some(3));
    }

    #[test]
    fn apply_sweep_outside_range_is_rejected() {
        let mut session = Session::default();
        assert_eq!(
            session.apply(InputChange::ApplySweep(1)),
            Err(InputError::NoSweepRow(1))
        );
        assert_eq!(
            session.apply(InputChange::ApplySweep(17)),
            Err(InputError::NoSweepRow(17))
        );
    }

    #[test]
    fn invalid_edits_are_coerced_not_rejected() {
        let mut session = Session::default();
        session
            .apply(InputChange::Number(NumericField::ExecutorCores, f64::NAN))
            .unwrap();
        session
            .apply(InputChange::Number(NumericField::NodeMemoryGb, -5.0))
            .unwrap();

        let report = session.recompute();
        assert_eq!(report.params.executor_cores, 1);
        assert_eq!(report.params.node_memory_gb, 1.0);
        assert_eq!(report.distribution.slots_per_node, 0);
    }
}
