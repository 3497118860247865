//! Process-wide profiler bookkeeping for one active walk.

use super::labels::MeasurementPhase;
use crate::tree::NodeId;
use std::collections::HashSet;

/// Counters and flags shared by all profiler scopes
///
/// Owned by a single [`Profiler`](super::Profiler); reset when the
/// scheduler goes idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingState {
    // Node to unwind from on pause
    pub(crate) current_node: Option<NodeId>,
    pub(crate) active_phase: Option<MeasurementPhase>,
    pub(crate) active_phase_node: Option<NodeId>,
    pub(crate) is_committing: bool,
    // Labels already shown in the current commit
    pub(crate) committed_labels: HashSet<String>,
    pub(crate) has_scheduled_update_in_commit: bool,
    pub(crate) has_scheduled_update_in_phase: bool,
    pub(crate) commit_count_in_work_loop: u32,
    pub(crate) effect_count_in_commit_subphase: u32,
    pub(crate) is_waiting_for_callback: bool,
}

impl TimingState {
    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node
    }

    pub fn active_phase(&self) -> Option<(NodeId, MeasurementPhase)> {
        self.active_phase_node.zip(self.active_phase)
    }

    pub fn is_committing(&self) -> bool {
        self.is_committing
    }

    pub fn commit_count_in_work_loop(&self) -> u32 {
        self.commit_count_in_work_loop
    }

    pub fn effect_count(&self) -> u32 {
        self.effect_count_in_commit_subphase
    }

    pub fn is_waiting_for_callback(&self) -> bool {
        self.is_waiting_for_callback
    }

    pub fn committed_labels(&self) -> &HashSet<String> {
        &self.committed_labels
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
