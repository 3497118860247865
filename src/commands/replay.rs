//! Replay command implementation.
//!
//! The replay command:
//! 1. Reads and validates a replay script
//! 2. Drives the profiler and stack tracker through every event
//! 3. Builds collapsed stacks
//! 4. Generates flamegraph
//! 5. Calculates metrics
//! 6. Writes output files

use super::models::ReplayArgs;
use crate::aggregator::{build_collapsed_stacks, calculate_hot_labels, count_warnings, total_span_us};
use crate::flamegraph::{generate_flamegraph, generate_text_summary};
use crate::output::{write_profile, write_svg};
use crate::parser::{parse_script, CapturedStack, HotLabel, Profile, ReplayEvent, ReplayScript};
use crate::stack::{tracker, StackTracker};
use crate::timing::{Clock, ManualClock, Measurement, Profiler, ProfilerConfig, RecordingBackend};
use crate::tree::WorkTree;
use crate::utils::config::{MAX_TOP_LABELS, SCHEMA_VERSION};
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Everything a replay produced
#[derive(Debug, Clone, Default)]
pub struct ReplayOutcome {
    pub measurements: Vec<Measurement>,
    pub captured_stacks: Vec<CapturedStack>,
}

/// A tree, a profiler and a tracker wired to one manual clock
///
/// **Public** - lets tests and embedders feed events one at a time
pub struct ReplaySession {
    tree: WorkTree,
    clock: ManualClock,
    profiler: Profiler<RecordingBackend<ManualClock>>,
    tracker: Box<dyn StackTracker>,
    captured: Vec<CapturedStack>,
}

impl ReplaySession {
    pub fn new(tree: WorkTree, config: ProfilerConfig, dev_mode: bool) -> Self {
        let clock = ManualClock::new();
        let backend = RecordingBackend::manual(clock.clone());
        Self {
            tree,
            clock,
            profiler: Profiler::new(config, Some(backend)),
            tracker: tracker(dev_mode),
            captured: Vec::new(),
        }
    }

    pub fn tree(&self) -> &WorkTree {
        &self.tree
    }

    pub fn profiler(&self) -> &Profiler<RecordingBackend<ManualClock>> {
        &self.profiler
    }

    pub fn tracker(&self) -> &dyn StackTracker {
        self.tracker.as_ref()
    }

    /// Apply one event
    pub fn apply(&mut self, event: &ReplayEvent) {
        let tree = &mut self.tree;
        let profiler = &mut self.profiler;
        match *event {
            ReplayEvent::Advance { micros } => self.clock.advance(micros),
            ReplayEvent::StartWorkLoop { next } => profiler.start_work_loop(tree, next),
            ReplayEvent::StopWorkLoop {
                interrupted_by,
                completed_root,
            } => profiler.stop_work_loop(tree, interrupted_by, completed_root),
            ReplayEvent::StartNodeWork { node } => {
                self.tracker.set_current(node);
                profiler.start_node_work(tree, node);
            }
            ReplayEvent::CancelNodeWork { node } => profiler.cancel_node_work(tree, node),
            ReplayEvent::StopNodeWork { node } => profiler.stop_node_work(tree, node),
            ReplayEvent::StopFailedNodeWork { node } => profiler.stop_failed_node_work(tree, node),
            ReplayEvent::StartPhase { node, phase } => profiler.start_phase(tree, node, phase),
            ReplayEvent::StopPhase => profiler.stop_phase(tree),
            ReplayEvent::StartCommit => profiler.start_commit(),
            ReplayEvent::StopCommit => profiler.stop_commit(),
            ReplayEvent::StartCommitSubphase { subphase } => profiler.start_commit_subphase(subphase),
            ReplayEvent::StopCommitSubphase { subphase } => profiler.stop_commit_subphase(subphase),
            ReplayEvent::RecordEffect => profiler.record_effect(),
            ReplayEvent::RecordScheduleUpdate => profiler.record_schedule_update(),
            ReplayEvent::StartCallbackWait => profiler.start_callback_wait(),
            ReplayEvent::StopCallbackWait {
                did_expire,
                timeout_ms,
            } => profiler.stop_callback_wait(did_expire, timeout_ms),
            ReplayEvent::SetCurrent { node } => self.tracker.set_current(node),
            ReplayEvent::ResetCurrent => self.tracker.reset_current(),
            ReplayEvent::SetPhase { phase } => self.tracker.set_phase(phase),
            ReplayEvent::CaptureStack => {
                let stack = CapturedStack {
                    at_us: self.clock.now_us(),
                    node: self.tracker.current(),
                    owner: self.tracker.current_owner_name(tree),
                    trace: self.tracker.current_stack_trace(tree),
                };
                debug!("Captured stack at {} us:{}", stack.at_us, stack.trace);
                self.captured.push(stack);
            }
            ReplayEvent::Idle => {
                self.tracker.reset_current();
                profiler.reset(tree);
            }
        }
    }

    pub fn finish(self) -> ReplayOutcome {
        let measurements = self
            .profiler
            .into_backend()
            .map(|mut backend| backend.take_timeline())
            .unwrap_or_default();
        ReplayOutcome {
            measurements,
            captured_stacks: self.captured,
        }
    }
}

/// Run a whole script and collect its output
///
/// **Public** - the file-free core of the replay command
pub fn run_script(script: &ReplayScript, config: &ProfilerConfig, dev_mode: bool) -> ReplayOutcome {
    let mut session = ReplaySession::new(script.build_tree(), config.clone(), dev_mode);
    for event in &script.events {
        session.apply(event);
    }
    session.finish()
}

/// Assemble the profile document
pub fn to_profile(outcome: ReplayOutcome, hot_labels: Vec<HotLabel>) -> Profile {
    Profile {
        version: SCHEMA_VERSION.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_duration_us: total_span_us(&outcome.measurements),
        measurement_count: outcome.measurements.len(),
        warning_count: count_warnings(&outcome.measurements),
        measurements: outcome.measurements,
        hot_labels,
        captured_stacks: outcome.captured_stacks,
    }
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Script read or parse failures
/// * Flamegraph rendering failures
/// * File write errors
pub fn execute_replay(args: ReplayArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Starting replay of: {}", args.script.display());

    // Step 1: Read script
    info!("Step 1/6: Reading replay script...");
    let raw = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let script = parse_script(&raw).context("Failed to parse replay script")?;

    // Step 2: Replay events
    info!("Step 2/6: Replaying {} events...", script.events.len());
    let outcome = run_script(&script, &args.profiler, args.dev_mode);
    debug!(
        "Replay recorded {} measurements, {} captured stacks",
        outcome.measurements.len(),
        outcome.captured_stacks.len()
    );

    // Step 3: Build collapsed stacks
    info!("Step 3/6: Building collapsed stacks...");
    let stacks = build_collapsed_stacks(&outcome.measurements);

    // Step 4: Calculate hot labels
    info!("Step 4/6: Calculating top {} labels...", args.top_labels);
    let hot_labels = calculate_hot_labels(&outcome.measurements, args.top_labels);
    for (i, label) in hot_labels.iter().take(3).enumerate() {
        debug!("  {}. {} us ({:.1}%): {}", i + 1, label.total_us, label.percentage, label.label);
    }

    // Step 5: Generate flamegraph (if requested)
    let svg_content = if args.output_svg.is_some() {
        info!("Step 5/6: Generating flamegraph...");
        let svg = generate_flamegraph(&stacks, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        Some(svg)
    } else {
        info!("Step 5/6: Skipping flamegraph generation (not requested)");
        None
    };

    // Step 6: Write outputs
    info!("Step 6/6: Writing output files...");
    let profile = to_profile(outcome, hot_labels);

    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;
    info!("✓ Profile written to: {}", args.output_json.display());

    if let (Some(svg), Some(svg_path)) = (svg_content, &args.output_svg) {
        write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", svg_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("PROFILE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Script:        {}", args.script.display());
        println!("Duration:      {} us", profile.total_duration_us);
        println!("Measurements:  {}", profile.measurement_count);
        println!("Warnings:      {}", profile.warning_count);
        println!("Unique Stacks: {}", stacks.len());
        println!("\n{}", generate_text_summary(&stacks, 10));
        for captured in &profile.captured_stacks {
            println!("\nStack at {} us:{}", captured.at_us, captured.trace);
        }
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Replay completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate replay arguments
///
/// **Public** - can be called before execute_replay for early validation
pub fn validate_args(args: &ReplayArgs) -> Result<()> {
    if args.script.as_os_str().is_empty() {
        anyhow::bail!("Script path cannot be empty");
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.top_labels == 0 {
        anyhow::bail!("top_labels must be greater than 0");
    }

    if args.top_labels > MAX_TOP_LABELS {
        anyhow::bail!("top_labels is too large (max {})", MAX_TOP_LABELS);
    }

    if let Some(config) = &args.flamegraph_config {
        if config.width < 100 {
            anyhow::bail!("Flamegraph width must be at least 100 pixels");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::FlamegraphConfig;
    use crate::tree::NodeId;

    #[test]
    fn test_validate_args_valid() {
        assert!(validate_args(&ReplayArgs::default()).is_ok());
    }

    #[test]
    fn test_validate_args_empty_script() {
        let args = ReplayArgs {
            script: Default::default(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_labels_zero() {
        let args = ReplayArgs {
            top_labels: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_labels_too_large() {
        let args = ReplayArgs {
            top_labels: 2000,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_narrow_flamegraph() {
        let mut config = FlamegraphConfig::new();
        config.width = 10;
        let args = ReplayArgs {
            flamegraph_config: Some(config),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_capture_stack_event() {
        let script = parse_script(
            r#"{
                "nodes": [
                    { "kind": "HostRoot" },
                    { "kind": "ClassComponent", "name": "App", "parent": 0 },
                    { "kind": "FunctionComponent", "name": "Item", "parent": 1, "owner": 1 }
                ],
                "events": [
                    { "op": "start_node_work", "node": 2 },
                    { "op": "advance", "micros": 7 },
                    { "op": "capture_stack" },
                    { "op": "idle" },
                    { "op": "capture_stack" }
                ]
            }"#,
        )
        .unwrap();

        let outcome = run_script(&script, &ProfilerConfig::default(), true);

        assert_eq!(outcome.captured_stacks.len(), 2);
        let first = &outcome.captured_stacks[0];
        assert_eq!(first.at_us, 7);
        assert_eq!(first.node, Some(NodeId::from_index(2)));
        assert_eq!(first.owner.as_deref(), Some("App"));
        assert_eq!(first.trace, "\n    in Item (created by App)\n    in App");
        assert_eq!(outcome.captured_stacks[1].trace, "");
    }

    #[test]
    fn test_idle_clears_flags_of_abandoned_walk() {
        let script = parse_script(
            r#"{
                "nodes": [
                    { "kind": "HostRoot" },
                    { "kind": "ClassComponent", "name": "App", "parent": 0 }
                ],
                "events": [
                    { "op": "start_work_loop", "next": 0 },
                    { "op": "start_node_work", "node": 1 },
                    { "op": "stop_work_loop" }
                ]
            }"#,
        )
        .unwrap();

        let mut session = ReplaySession::new(script.build_tree(), ProfilerConfig::default(), true);
        for event in &script.events {
            session.apply(event);
        }
        assert_eq!(session.tree().timed_nodes(), vec![NodeId::from_index(1)]);

        session.apply(&ReplayEvent::Idle);
        assert!(session.tree().timed_nodes().is_empty());
        assert_eq!(session.tracker().current(), None);
        assert_eq!(session.profiler().state().current_node(), None);
    }

    #[test]
    fn test_production_mode_captures_empty_stacks() {
        let script = parse_script(
            r#"{
                "nodes": [ { "kind": "ClassComponent", "name": "App" } ],
                "events": [
                    { "op": "set_current", "node": 0 },
                    { "op": "capture_stack" }
                ]
            }"#,
        )
        .unwrap();

        let outcome = run_script(&script, &ProfilerConfig::default(), false);
        assert_eq!(outcome.captured_stacks[0].trace, "");
        assert_eq!(outcome.captured_stacks[0].node, None);
    }
}
