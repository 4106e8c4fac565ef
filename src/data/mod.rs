//! Data structures for locomotion assay analysis.

mod extract;
mod label;
mod metric;
mod observation;
mod recording;

pub use extract::{extract, AnimalSeries, AnimalTable, ExtractionConfig, RowSelection};
pub use label::{parse_file_label, Age, FileLabel};
pub use metric::{Group, Measures, Metric, Parameter, SwimMode};
pub use observation::{Observation, ObservationSet};
pub use recording::{BinRow, Recording};
