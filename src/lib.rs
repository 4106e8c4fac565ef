//! Zebrafish Larval Locomotion Assay Library
//!
//! This library turns per-animal, per-time-bin locomotion exports into
//! control vs treatment statistics and figures.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Recording ingestion, time-bin extraction, tidy observations
//! - **profile**: Descriptive summaries of samples and recordings
//! - **test**: Hypothesis tests (Shapiro-Wilk, t-tests, Mann-Whitney U,
//!   Kruskal-Wallis, Dunn) and normality-driven test selection
//! - **correct**: Multiple testing correction (Bonferroni, Holm, BH)
//! - **plot**: Violin figures and summary tables with plotters
//! - **pipeline**: The blocked, interval and post hoc analyses
//!
//! # Example
//!
//! ```no_run
//! use zebrafish_assay::prelude::*;
//!
//! let inputs = vec![
//!     InputFile::new("TCB-2_3DPF.csv"),
//!     InputFile::new("TCB-2_4DPF.csv"),
//! ];
//! let report = analyze_blocked(
//!     &inputs,
//!     &ExtractionConfig::default(),
//!     &SelectionConfig::default(),
//!     Correction::None,
//! )
//! .unwrap();
//!
//! for c in &report.comparisons {
//!     println!("{} {}: p = {:.4}", c.age, c.metric, c.comparison.p_value);
//! }
//! ```

pub mod correct;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod profile;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{correct_bh, correct_bonferroni, correct_holm, Correction};
    pub use crate::data::{
        extract, parse_file_label, Age, AnimalSeries, AnimalTable, ExtractionConfig, Group, Measures,
        Metric, Observation, ObservationSet, Parameter, Recording, RowSelection, SwimMode,
    };
    pub use crate::error::{AssayError, Result};
    pub use crate::pipeline::{
        analyze_blocked, analyze_intervals, analyze_posthoc, write_blocked, write_intervals,
        write_posthoc, AnalysisConfig, AnalysisKind, BlockedReport, InputFile, IntervalReport,
        IntervalStat, PlotConfig, PosthocReport,
    };
    pub use crate::plot::{
        save_figure, BlockedFigure, ColorScheme, Figure, OutputFormat, PairFigure, PanelRowFigure,
        PlotStyle, TableFigure,
    };
    pub use crate::profile::{describe, profile_table, Summary, TableProfile};
    pub use crate::test::{
        compare_groups, dunn, kruskal_wallis, mann_whitney_u, shapiro_wilk, t_test, DunnResult,
        GroupComparison, KruskalResult, MannWhitneyResult, SelectionConfig, ShapiroResult,
        Significance, TTestKind, TTestResult, TestKind,
    };
}
