//! Hierarchical user-timing profiler.
//!
//! The scheduler notifies the profiler around work loops, node visits,
//! lifecycle phases, commits and commit sub-phases. Each scope opens a mark
//! on the injected [`MarkerBackend`] and closes it with a measure.
//!
//! Node measurements nest along the parent chain. When a work loop yields,
//! open node measurements are ended but their `is_currently_timed` flag is
//! left set; the next loop walks the same chain and reopens them,
//! outermost first. The flags are the only saved state.
//!
//! Nothing here is fallible from the caller's point of view. With timing
//! disabled or without a backend every method returns immediately.

use super::labels::{
    format_label, format_mark_name, node_label, node_mark_name, CommitSubphase, MeasurementPhase,
};
use super::marker::MarkerBackend;
use super::state::TimingState;
use crate::stack::{NameResolver, TypeNameResolver};
use crate::tree::{NodeId, NodeKind, WorkNode, WorkTree};
use crate::utils::config::{
    CALLBACK_WAIT_MARK, COMMIT_MARK, DEFAULT_CASCADE_EXEMPT_PHASES, UNKNOWN_COMPONENT,
    WORK_LOOP_COMPLETED_LABEL, WORK_LOOP_MARK, WORK_LOOP_YIELDED_LABEL,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Profiler switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Master switch for user-timing measurements
    pub user_timing_enabled: bool,

    /// Phases allowed to schedule updates without a cascade warning
    pub cascade_exempt_phases: Vec<MeasurementPhase>,

    /// Also skip host components and mode boundaries in node timers
    pub hide_host_nodes: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            user_timing_enabled: true,
            cascade_exempt_phases: DEFAULT_CASCADE_EXEMPT_PHASES.to_vec(),
            hide_host_nodes: false,
        }
    }
}

impl ProfilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_timing(mut self, enabled: bool) -> Self {
        self.user_timing_enabled = enabled;
        self
    }

    pub fn with_hidden_host_nodes(mut self, hide: bool) -> Self {
        self.hide_host_nodes = hide;
        self
    }

    pub fn with_cascade_exempt_phases(mut self, phases: Vec<MeasurementPhase>) -> Self {
        self.cascade_exempt_phases = phases;
        self
    }

    pub fn is_cascade_exempt(&self, phase: MeasurementPhase) -> bool {
        self.cascade_exempt_phases.contains(&phase)
    }
}

/// Profiler bound to one marker backend
///
/// **Public** - one instance per active walk
pub struct Profiler<B: MarkerBackend> {
    config: ProfilerConfig,
    backend: Option<B>,
    resolver: Box<dyn NameResolver>,
    state: TimingState,
}

impl<B: MarkerBackend> Profiler<B> {
    /// `backend = None` means the platform has no marker API
    pub fn new(config: ProfilerConfig, backend: Option<B>) -> Self {
        if backend.is_none() && config.user_timing_enabled {
            debug!("No marker backend available, user timing disabled");
        }
        Self {
            config,
            backend,
            resolver: Box::new(TypeNameResolver),
            state: TimingState::default(),
        }
    }

    pub fn with_resolver<R: NameResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn state(&self) -> &TimingState {
        &self.state
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn into_backend(self) -> Option<B> {
        self.backend
    }

    pub fn is_enabled(&self) -> bool {
        self.config.user_timing_enabled && self.backend.is_some()
    }

    /// Drop all bookkeeping; used when the scheduler goes idle
    ///
    /// Clears the per-node timing flags of `tree` too, so an abandoned walk
    /// cannot have its measurements reopened by a later loop.
    pub fn reset(&mut self, tree: &mut WorkTree) {
        self.state.reset();
        tree.clear_timed_flags();
    }

    // ---- marker primitives ----

    fn begin_mark(&mut self, mark_name: &str) {
        if let Some(backend) = self.backend.as_mut() {
            backend.mark(&format_mark_name(mark_name));
        }
    }

    fn clear_mark(&mut self, mark_name: &str) {
        if let Some(backend) = self.backend.as_mut() {
            backend.clear_marks(&format_mark_name(mark_name));
        }
    }

    fn end_mark(&mut self, label: &str, mark_name: &str, warning: Option<&str>) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let formatted_mark = format_mark_name(mark_name);
        let formatted_label = format_label(label, warning);
        // A missing start mark means an earlier crash skipped a begin.
        // Don't pile on.
        if let Err(err) = backend.measure(&formatted_label, &formatted_mark) {
            debug!("Dropped measurement {:?}: {}", label, err);
        }
        // Clear immediately so the marker buffer doesn't grow.
        backend.clear_marks(&formatted_mark);
        backend.clear_measures(&formatted_label);
    }

    // ---- node marks ----

    fn node_label_for(&self, tree: &WorkTree, id: NodeId, phase: Option<MeasurementPhase>) -> Option<String> {
        let node = tree.get(id)?;
        let name = self
            .resolver
            .display_name(node.component_type.as_deref())
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string());
        Some(node_label(&name, node.is_update(), phase))
    }

    fn begin_node_mark(&mut self, tree: &WorkTree, id: NodeId, phase: Option<MeasurementPhase>) -> bool {
        let Some(label) = self.node_label_for(tree, id, phase) else {
            return false;
        };
        if self.state.is_committing && self.state.committed_labels.contains(&label) {
            // Every measurement has a fixed cost; show each label once per
            // commit so the commit isn't stretched further.
            trace!("Suppressed duplicate commit measurement {}", label);
            return false;
        }
        let mark_name = node_mark_name(&label, id);
        self.state.committed_labels.insert(label);
        self.begin_mark(&mark_name);
        true
    }

    fn clear_node_mark(&mut self, tree: &WorkTree, id: NodeId, phase: Option<MeasurementPhase>) {
        if let Some(label) = self.node_label_for(tree, id, phase) {
            self.clear_mark(&node_mark_name(&label, id));
        }
    }

    fn end_node_mark(
        &mut self,
        tree: &WorkTree,
        id: NodeId,
        phase: Option<MeasurementPhase>,
        warning: Option<&str>,
    ) {
        if let Some(label) = self.node_label_for(tree, id, phase) {
            let mark_name = node_mark_name(&label, id);
            self.end_mark(&label, &mark_name, warning);
        }
    }

    fn should_ignore(&self, node: &WorkNode) -> bool {
        node.kind.is_structural() || (self.config.hide_host_nodes && node.kind.is_host_detail())
    }

    /// Resolve `id` to a node the node-level timers care about
    fn timed_kind(&self, tree: &WorkTree, id: NodeId) -> Option<NodeKind> {
        tree.get(id)
            .filter(|node| !self.should_ignore(node))
            .map(|node| node.kind)
    }

    // ---- pause / resume ----

    fn clear_pending_phase_measurement(&mut self, tree: &WorkTree) {
        if let (Some(node), Some(phase)) = (self.state.active_phase_node, self.state.active_phase) {
            self.clear_node_mark(tree, node, Some(phase));
        }
        self.state.active_phase_node = None;
        self.state.active_phase = None;
        self.state.has_scheduled_update_in_phase = false;
    }

    /// End every open node measurement on the unwind path, keeping flags
    fn pause_timers(&mut self, tree: &WorkTree) {
        let Some(start) = self.state.current_node else {
            return;
        };
        let timed: Vec<NodeId> = tree
            .ancestors(start)
            .filter(|id| tree.get(*id).is_some_and(WorkNode::is_currently_timed))
            .collect();
        for id in timed {
            self.end_node_mark(tree, id, None, None);
        }
    }

    /// Reopen measurements flagged on the unwind path, outermost first
    fn resume_timers(&mut self, tree: &WorkTree) {
        let Some(start) = self.state.current_node else {
            return;
        };
        let chain: Vec<NodeId> = tree.ancestors(start).collect();
        for id in chain.into_iter().rev() {
            if tree.get(id).is_some_and(WorkNode::is_currently_timed) {
                self.begin_node_mark(tree, id, None);
            }
        }
    }

    // ---- notifications ----

    /// Count one effect in the active commit sub-phase
    pub fn record_effect(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.state.effect_count_in_commit_subphase += 1;
    }

    /// New work was scheduled
    pub fn record_schedule_update(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if self.state.is_committing {
            self.state.has_scheduled_update_in_commit = true;
        }
        if let Some(phase) = self.state.active_phase {
            if !self.config.is_cascade_exempt(phase) {
                self.state.has_scheduled_update_in_phase = true;
            }
        }
    }

    pub fn start_callback_wait(&mut self) {
        if !self.is_enabled() || self.state.is_waiting_for_callback {
            return;
        }
        self.state.is_waiting_for_callback = true;
        self.begin_mark(CALLBACK_WAIT_MARK);
    }

    pub fn stop_callback_wait(&mut self, did_expire: bool, timeout_ms: u64) {
        if !self.is_enabled() {
            return;
        }
        self.state.is_waiting_for_callback = false;
        let warning = did_expire.then_some("Blocked by other work on the main thread");
        let label = format!(
            "(Waiting for async callback... will force flush in {} ms)",
            timeout_ms
        );
        self.end_mark(&label, CALLBACK_WAIT_MARK, warning);
    }

    /// A node is about to be processed
    pub fn start_node_work(&mut self, tree: &mut WorkTree, id: NodeId) {
        if !self.is_enabled() || self.timed_kind(tree, id).is_none() {
            return;
        }
        // If we pause, this is the node to unwind from.
        self.state.current_node = Some(id);
        if !self.begin_node_mark(tree, id, None) {
            return;
        }
        if let Some(node) = tree.get_mut(id) {
            node.is_currently_timed = true;
        }
    }

    /// Work on a node was thrown away; drop its mark without measuring
    pub fn cancel_node_work(&mut self, tree: &mut WorkTree, id: NodeId) {
        if !self.is_enabled() || self.timed_kind(tree, id).is_none() {
            return;
        }
        if !Self::take_timed_flag(tree, id) {
            return;
        }
        self.clear_node_mark(tree, id, None);
    }

    /// A node finished processing
    pub fn stop_node_work(&mut self, tree: &mut WorkTree, id: NodeId) {
        if !self.is_enabled() || self.timed_kind(tree, id).is_none() {
            return;
        }
        // If we pause now, unwinding starts at the parent.
        self.state.current_node = tree.parent_of(id);
        if !Self::take_timed_flag(tree, id) {
            return;
        }
        self.end_node_mark(tree, id, None, None);
    }

    /// A node finished processing by suspending or throwing
    pub fn stop_failed_node_work(&mut self, tree: &mut WorkTree, id: NodeId) {
        let Some(kind) = self.timed_kind(tree, id).filter(|_| self.is_enabled()) else {
            return;
        };
        self.state.current_node = tree.parent_of(id);
        if !Self::take_timed_flag(tree, id) {
            return;
        }
        let warning = if kind.is_suspense() {
            "Rendering was suspended"
        } else {
            "An error was thrown inside this error boundary"
        };
        self.end_node_mark(tree, id, None, Some(warning));
    }

    /// Clear the node's timing flag, returning whether it was set
    fn take_timed_flag(tree: &mut WorkTree, id: NodeId) -> bool {
        match tree.get_mut(id) {
            Some(node) if node.is_currently_timed => {
                node.is_currently_timed = false;
                true
            }
            _ => false,
        }
    }

    /// A lifecycle method is about to run; abandons any phase still open
    pub fn start_phase(&mut self, tree: &WorkTree, id: NodeId, phase: MeasurementPhase) {
        if !self.is_enabled() {
            return;
        }
        self.clear_pending_phase_measurement(tree);
        if !self.begin_node_mark(tree, id, Some(phase)) {
            return;
        }
        self.state.active_phase_node = Some(id);
        self.state.active_phase = Some(phase);
    }

    pub fn stop_phase(&mut self, tree: &WorkTree) {
        if !self.is_enabled() {
            return;
        }
        if let (Some(node), Some(phase)) = (self.state.active_phase_node, self.state.active_phase) {
            let warning = self
                .state
                .has_scheduled_update_in_phase
                .then_some("Scheduled a cascading update");
            self.end_node_mark(tree, node, Some(phase), warning);
        }
        self.state.active_phase = None;
        self.state.active_phase_node = None;
        self.state.has_scheduled_update_in_phase = false;
    }

    /// A work loop begins at `next`; reopens measurements paused earlier
    pub fn start_work_loop(&mut self, tree: &WorkTree, next: Option<NodeId>) {
        if !self.is_enabled() {
            return;
        }
        self.state.current_node = next;
        self.state.commit_count_in_work_loop = 0;
        // Top level: every other measurement happens inside this one.
        self.begin_mark(WORK_LOOP_MARK);
        self.resume_timers(tree);
    }

    /// A work loop ends, either finished or yielding
    pub fn stop_work_loop(&mut self, tree: &WorkTree, interrupted_by: Option<NodeId>, did_complete_root: bool) {
        if !self.is_enabled() {
            return;
        }
        let warning = match interrupted_by {
            Some(id) => Some(self.interruption_warning(tree, id)),
            None if self.state.commit_count_in_work_loop > 1 => {
                Some("There were cascading updates".to_string())
            }
            None => None,
        };
        self.state.commit_count_in_work_loop = 0;
        let label = if did_complete_root {
            WORK_LOOP_COMPLETED_LABEL
        } else {
            WORK_LOOP_YIELDED_LABEL
        };
        // Pause node measurements until the next loop.
        self.pause_timers(tree);
        self.end_mark(label, WORK_LOOP_MARK, warning.as_deref());
    }

    fn interruption_warning(&self, tree: &WorkTree, id: NodeId) -> String {
        match tree.get(id) {
            Some(node) if node.kind == NodeKind::HostRoot => {
                "A top-level update interrupted the previous render".to_string()
            }
            node => {
                let name = node
                    .and_then(|node| self.resolver.display_name(node.component_type.as_deref()))
                    .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string());
                format!("An update to {} interrupted the previous render", name)
            }
        }
    }

    pub fn start_commit(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.state.is_committing = true;
        self.state.has_scheduled_update_in_commit = false;
        self.state.committed_labels.clear();
        self.begin_mark(COMMIT_MARK);
    }

    pub fn stop_commit(&mut self) {
        if !self.is_enabled() {
            return;
        }
        let warning = if self.state.has_scheduled_update_in_commit {
            Some("Lifecycle hook scheduled a cascading update")
        } else if self.state.commit_count_in_work_loop > 0 {
            Some("Caused by a cascading update in earlier commit")
        } else {
            None
        };
        self.state.has_scheduled_update_in_commit = false;
        self.state.commit_count_in_work_loop += 1;
        self.state.is_committing = false;
        self.state.committed_labels.clear();
        self.end_mark(COMMIT_MARK, COMMIT_MARK, warning);
    }

    pub fn start_commit_subphase(&mut self, subphase: CommitSubphase) {
        if !self.is_enabled() {
            return;
        }
        self.state.effect_count_in_commit_subphase = 0;
        self.begin_mark(subphase.mark_name());
    }

    pub fn stop_commit_subphase(&mut self, subphase: CommitSubphase) {
        if !self.is_enabled() {
            return;
        }
        let count = self.state.effect_count_in_commit_subphase;
        self.state.effect_count_in_commit_subphase = 0;
        self.end_mark(&subphase.total_label(count), subphase.mark_name(), None);
    }
}
