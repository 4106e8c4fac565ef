//! Statistical hypothesis tests for control vs treatment comparisons.

mod normality;
mod select;

pub use dunn::{dunn, DunnResult};
pub use kruskal::{kruskal_wallis, KruskalResult};
pub use mann_whitney::{mann_whitney_u, MannWhitneyMethod, MannWhitneyResult};
pub use normality::{shapiro_wilk, ShapiroResult};
pub use select::{compare_groups, GroupComparison, SelectionConfig, Significance, TestKind};
pub use ttest::{t_test, TTestKind, TTestResult};
