//! Profiling of an extracted animal table.

use crate::data::{AnimalTable, Group, Metric};
use crate::profile::summary::{describe, Summary};
use serde::{Deserialize, Serialize};

/// Control/drug summaries of one metric's totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricProfile {
    pub metric: Metric,
    pub control: Summary,
    pub drug: Summary,
}

/// Overview of a recording after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    /// Number of animals.
    pub n_animals: usize,
    /// Number of control animals.
    pub n_control: usize,
    /// Number of treated animals.
    pub n_drug: usize,
    /// Number of time bins summed per animal.
    pub n_bins: usize,
    /// Animals with fewer bins than `n_bins`.
    pub incomplete: Vec<String>,
    /// Per-metric totals.
    pub metrics: Vec<MetricProfile>,
}

impl TableProfile {
    /// Check if every animal has all bins.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }

    /// Profile of one metric.
    pub fn metric(&self, metric: Metric) -> Option<&MetricProfile> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

impl std::fmt::Display for TableProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Animal Table Profile")?;
        writeln!(f, "  Animals: {}", self.n_animals)?;
        writeln!(f, "  Control: {}", self.n_control)?;
        writeln!(f, "  Drug:    {}", self.n_drug)?;
        writeln!(f, "  Bins:    {}", self.n_bins)?;
        if !self.incomplete.is_empty() {
            writeln!(f, "  Incomplete animals: {}", self.incomplete.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "Totals over {} bins", self.n_bins)?;
        for m in &self.metrics {
            writeln!(f, "  {} ({})", m.metric, m.metric.parameter().unit())?;
            writeln!(f, "    Control: {}", m.control)?;
            writeln!(f, "    Drug:    {}", m.drug)?;
        }
        Ok(())
    }
}

/// Profile an extracted table over its first `n_bins` bins.
pub fn profile_table(table: &AnimalTable, n_bins: usize) -> TableProfile {
    let incomplete = table
        .animals()
        .iter()
        .filter(|a| !a.is_complete(n_bins))
        .map(|a| a.animal.clone())
        .collect();

    let totals = |metric: Metric, group: Group| -> Vec<f64> {
        table.group(group).map(|a| a.total(metric, n_bins)).collect()
    };

    let metrics = Metric::ALL
        .iter()
        .map(|&metric| MetricProfile {
            metric,
            control: describe(&totals(metric, Group::Control)),
            drug: describe(&totals(metric, Group::Drug)),
        })
        .collect();

    TableProfile {
        n_animals: table.len(),
        n_control: table.n_group(Group::Control),
        n_drug: table.n_group(Group::Drug),
        n_bins,
        incomplete,
        metrics,
    }
}
