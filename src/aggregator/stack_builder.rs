//! Build collapsed stack format from recorded measurements.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "outer;inner;innermost weight"
//!
//! Example: "(Tree Reconciliation: Completed Root);App [mount];Button [mount] 120"
//! This means 120 us were spent in Button itself while App was being built
//! inside a completed work loop.

use crate::timing::Measurement;
use log::debug;
use std::cmp::Reverse;
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (self time in microseconds)
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Line in the `stack weight` format flamegraph tools consume
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a measurement timeline
///
/// **Public** - main entry point for stack building
///
/// # Algorithm
/// 1. Order intervals by start, outermost first
/// 2. Keep a stack of enclosing intervals while scanning
/// 3. Attribute each interval's self time (duration minus direct children)
/// 4. Aggregate by unique path (sum weights)
pub fn build_collapsed_stacks(measurements: &[Measurement]) -> Vec<CollapsedStack> {
    debug!("Building collapsed stacks from {} measurements", measurements.len());

    let mut order: Vec<usize> = (0..measurements.len()).collect();
    // Ties go to the later-completed interval: it closed last, so it is the outer one.
    order.sort_by_key(|&i| {
        let m = &measurements[i];
        (m.start_us, Reverse(m.end_us()), Reverse(i))
    });

    let mut parents: Vec<Option<usize>> = vec![None; measurements.len()];
    let mut paths: Vec<String> = vec![String::new(); measurements.len()];
    let mut open: Vec<usize> = Vec::new();

    for &i in &order {
        let m = &measurements[i];
        while let Some(&top) = open.last() {
            if measurements[top].contains(m) {
                break;
            }
            open.pop();
        }
        let frame = sanitize_frame(m.name());
        paths[i] = match open.last() {
            Some(&parent) => {
                parents[i] = Some(parent);
                format!("{};{}", paths[parent], frame)
            }
            None => frame,
        };
        open.push(i);
    }

    let mut self_time: Vec<u64> = measurements.iter().map(|m| m.duration_us).collect();
    for (i, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            self_time[*parent] = self_time[*parent].saturating_sub(measurements[i].duration_us);
        }
    }

    // Map to aggregate stacks: stack_string -> total_weight
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    for (path, weight) in paths.into_iter().zip(self_time) {
        *stack_map.entry(path).or_insert(0) += weight;
    }

    // Convert map to vector and sort by weight (descending)
    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

/// `;` separates frames, so it cannot appear inside one
fn sanitize_frame(name: &str) -> String {
    name.replace(';', ":")
}
