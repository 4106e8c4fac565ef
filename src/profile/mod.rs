//! Descriptive profiling of samples and extracted recordings.

mod summary;
mod table;

pub use summary::{describe, Summary};
pub use table::{profile_table, MetricProfile, TableProfile};
