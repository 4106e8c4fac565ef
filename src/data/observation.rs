//! Long-format observations: one row per animal, metric, age and drug.

use crate::data::extract::AnimalTable;
use crate::data::label::Age;
use crate::data::metric::{Group, Metric};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// The summed value of one metric for one animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub drug: String,
    pub age: Age,
    pub animal: String,
    pub group: Group,
    pub metric: Metric,
    pub value: f64,
}

/// A tidy table of observations across recordings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

/// CSV row layout, matching the columns analysts already use downstream.
#[derive(Serialize)]
struct ObservationRecord<'a> {
    age: String,
    mode: &'a str,
    group: &'a str,
    value: f64,
    parameter: &'a str,
    drugname: &'a str,
    animal: &'a str,
    metric: &'a str,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build observations from the per-animal totals of one recording.
    pub fn from_totals(table: &AnimalTable, drug: &str, age: Age) -> Self {
        let mut observations = Vec::with_capacity(table.len() * Metric::ALL.len());
        for metric in Metric::ALL {
            for animal in table.animals() {
                observations.push(Observation {
                    drug: drug.to_string(),
                    age,
                    animal: animal.animal.clone(),
                    group: animal.group,
                    metric,
                    value: animal.total(metric, table.n_bins()),
                });
            }
        }
        Self { observations }
    }

    /// Append another set.
    pub fn extend(&mut self, other: ObservationSet) {
        self.observations.extend(other.observations);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Ages present, ascending.
    pub fn ages(&self) -> Vec<Age> {
        self.observations
            .iter()
            .map(|o| o.age)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Drug names present, in first-seen order.
    pub fn drugs(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for o in &self.observations {
            if !seen.contains(&o.drug.as_str()) {
                seen.push(&o.drug);
            }
        }
        seen
    }

    /// Drug name used for titles and output names (the first one seen).
    pub fn drug(&self) -> Option<&str> {
        self.observations.first().map(|o| o.drug.as_str())
    }

    /// Values for one age, metric and group.
    pub fn values(&self, age: Age, metric: Metric, group: Group) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.age == age && o.metric == metric && o.group == group)
            .map(|o| o.value)
            .collect()
    }

    /// Write the set to CSV.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for o in &self.observations {
            writer.serialize(ObservationRecord {
                age: o.age.label(),
                mode: o.metric.mode().name(),
                group: o.group.name(),
                value: o.value,
                parameter: o.metric.parameter().name(),
                drugname: &o.drug,
                animal: &o.animal,
                metric: o.metric.column(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
