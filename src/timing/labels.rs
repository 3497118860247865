//! Mark names and measure labels.
//!
//! Marks are keyed by a formatted name; a node mark also carries the node's
//! debug id so two instances of the same component never share a mark.

use crate::tree::NodeId;
use crate::utils::config::{MEASURE_PREFIX, WARNING_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle methods that get their own measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementPhase {
    ComponentWillMount,
    ComponentWillUnmount,
    ComponentWillReceiveProps,
    ShouldComponentUpdate,
    ComponentWillUpdate,
    ComponentDidUpdate,
    ComponentDidMount,
    GetChildContext,
    GetSnapshotBeforeUpdate,
}

impl MeasurementPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementPhase::ComponentWillMount => "componentWillMount",
            MeasurementPhase::ComponentWillUnmount => "componentWillUnmount",
            MeasurementPhase::ComponentWillReceiveProps => "componentWillReceiveProps",
            MeasurementPhase::ShouldComponentUpdate => "shouldComponentUpdate",
            MeasurementPhase::ComponentWillUpdate => "componentWillUpdate",
            MeasurementPhase::ComponentDidUpdate => "componentDidUpdate",
            MeasurementPhase::ComponentDidMount => "componentDidMount",
            MeasurementPhase::GetChildContext => "getChildContext",
            MeasurementPhase::GetSnapshotBeforeUpdate => "getSnapshotBeforeUpdate",
        }
    }
}

impl fmt::Display for MeasurementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three passes of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitSubphase {
    SnapshotEffects,
    HostEffects,
    LifecycleMethods,
}

impl CommitSubphase {
    pub fn mark_name(self) -> &'static str {
        match self {
            CommitSubphase::SnapshotEffects => "(Committing Snapshot Effects)",
            CommitSubphase::HostEffects => "(Committing Host Effects)",
            CommitSubphase::LifecycleMethods => "(Calling Lifecycle Methods)",
        }
    }

    /// Closing label reporting how many effects ran
    pub fn total_label(self, effect_count: u32) -> String {
        let name = self.mark_name();
        let inner = &name[..name.len() - 1];
        format!("{}: {} Total)", inner, effect_count)
    }
}

pub fn format_mark_name(mark_name: &str) -> String {
    format!("{} {}", MEASURE_PREFIX, mark_name)
}

pub fn format_label(label: &str, warning: Option<&str>) -> String {
    match warning {
        Some(warning) => format!("{} {} Warning: {}", WARNING_PREFIX, label, warning),
        None => format!("{} {}", MEASURE_PREFIX, label),
    }
}

pub fn node_mark_name(label: &str, id: NodeId) -> String {
    format!("{} (#{})", label, id)
}

/// `Name [update]`, `Name [mount]` or `Name.phase`
pub fn node_label(component_name: &str, is_update: bool, phase: Option<MeasurementPhase>) -> String {
    match phase {
        None => format!(
            "{} [{}]",
            component_name,
            if is_update { "update" } else { "mount" }
        ),
        Some(phase) => format!("{}.{}", component_name, phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_labels() {
        assert_eq!(node_label("App", false, None), "App [mount]");
        assert_eq!(node_label("App", true, None), "App [update]");
        assert_eq!(
            node_label("App", true, Some(MeasurementPhase::ComponentDidUpdate)),
            "App.componentDidUpdate"
        );
    }

    #[test]
    fn test_label_warning_prefix() {
        assert_eq!(format_label("(Committing Changes)", None), "\u{269B} (Committing Changes)");
        assert_eq!(
            format_label("X", Some("Scheduled a cascading update")),
            "\u{26D4} X Warning: Scheduled a cascading update"
        );
    }

    #[test]
    fn test_mark_names() {
        assert_eq!(node_mark_name("App [mount]", NodeId::from_index(3)), "App [mount] (#3)");
        assert_eq!(format_mark_name("App [mount] (#3)"), "\u{269B} App [mount] (#3)");
    }

    #[test]
    fn test_subphase_total_label() {
        assert_eq!(
            CommitSubphase::HostEffects.total_label(4),
            "(Committing Host Effects: 4 Total)"
        );
        assert_eq!(
            CommitSubphase::LifecycleMethods.total_label(0),
            "(Calling Lifecycle Methods: 0 Total)"
        );
    }

    #[test]
    fn test_phase_serde_names() {
        let phase: MeasurementPhase = serde_json::from_str("\"componentWillReceiveProps\"").unwrap();
        assert_eq!(phase, MeasurementPhase::ComponentWillReceiveProps);
        assert_eq!(phase.to_string(), "componentWillReceiveProps");
    }
}
