//! The three analyses run on locomotion exports, and their YAML
//! configuration.

mod blocked;
mod config;
mod intervals;
mod posthoc;

pub use blocked::{analyze_blocked, load_observations, write_blocked, BlockedComparison, BlockedReport};
pub use config::{AnalysisConfig, AnalysisKind, InputFile, PlotConfig};
pub use intervals::{
    analyze_intervals, interval_label, summary_table, write_intervals, IntervalComparison, IntervalReport,
    IntervalStat,
};
pub use posthoc::{
    analyze_posthoc, format_scientific, write_posthoc, PosthocMetric, PosthocReport, POSTHOC_METRICS,
};
