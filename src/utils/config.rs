//! Configuration and constants shared by the profiler and the CLI.

use crate::timing::MeasurementPhase;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Prefix measurements so they can be filtered in a timeline view.
// Longer prefixes are hard to read, so these are single glyphs.
pub const MEASURE_PREFIX: &str = "\u{269B}";
pub const WARNING_PREFIX: &str = "\u{26D4}";

// Fixed mark names for the non-node scopes
pub const WORK_LOOP_MARK: &str = "(Tree Reconciliation)";
pub const WORK_LOOP_COMPLETED_LABEL: &str = "(Tree Reconciliation: Completed Root)";
pub const WORK_LOOP_YIELDED_LABEL: &str = "(Tree Reconciliation: Yielded)";
pub const COMMIT_MARK: &str = "(Committing Changes)";
pub const CALLBACK_WAIT_MARK: &str = "(Waiting for async callback...)";

/// Lifecycle phases allowed to schedule updates without a cascade warning.
/// Both run before the tree is mutated.
pub const DEFAULT_CASCADE_EXEMPT_PHASES: &[MeasurementPhase] = &[
    MeasurementPhase::ComponentWillMount,
    MeasurementPhase::ComponentWillReceiveProps,
];

/// Name printed for nodes whose component type cannot be resolved
pub const UNKNOWN_COMPONENT: &str = "Unknown";

/// Default number of hot labels kept in a profile
pub const DEFAULT_TOP_LABELS: usize = 20;

/// Upper bound accepted for `--top-labels`
pub const MAX_TOP_LABELS: usize = 1000;
