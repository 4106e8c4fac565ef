//! Kruskal-Wallis and Dunn tests across the control animals of several
//! experiments.
//!
//! Each file contributes one group, labelled by its file name, holding the
//! per-animal totals of its control animals. Files sharing a label are
//! pooled.

use crate::correct::Correction;
use crate::data::{extract, parse_file_label, ExtractionConfig, Group, Metric, Recording};
use crate::error::{AssayError, Result};
use crate::test::{dunn, kruskal_wallis, DunnResult, KruskalResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Metrics in reporting order.
pub const POSTHOC_METRICS: [Metric; 4] = [Metric::SmlDur, Metric::LarDur, Metric::SmlDist, Metric::LarDist];

/// Omnibus and pairwise results of one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosthocMetric {
    pub metric: Metric,
    pub kruskal: KruskalResult,
    pub dunn: DunnResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosthocReport {
    /// Group labels, sorted.
    pub labels: Vec<String>,
    /// Control animals per group.
    pub sizes: Vec<usize>,
    pub metrics: Vec<PosthocMetric>,
}

impl PosthocReport {
    pub fn metric(&self, metric: Metric) -> Option<&PosthocMetric> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Control totals of one file, per metric.
fn load_controls(path: &Path, extraction: &ExtractionConfig) -> Result<BTreeMap<Metric, Vec<f64>>> {
    let recording = Recording::from_csv(path, extraction.max_rows)?;
    let table = extract(&recording, extraction)?.only(Group::Control);
    tracing::info!(path = %path.display(), controls = table.len(), "loaded control animals");
    Ok(Metric::ALL
        .iter()
        .map(|&m| (m, table.totals(m, Group::Control)))
        .collect())
}

/// Compare the control groups of `inputs` on every metric.
pub fn analyze_posthoc(
    inputs: &[PathBuf],
    extraction: &ExtractionConfig,
    correction: Correction,
) -> Result<PosthocReport> {
    let loaded = inputs
        .par_iter()
        .map(|path| Ok((parse_file_label(path).stem, load_controls(path, extraction)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<String, BTreeMap<Metric, Vec<f64>>> = BTreeMap::new();
    for (label, values) in loaded {
        match groups.get_mut(&label) {
            Some(existing) => {
                tracing::warn!(label = %label, "several files share a label; pooling their animals");
                for (metric, v) in values {
                    existing.entry(metric).or_default().extend(v);
                }
            }
            None => {
                groups.insert(label, values);
            }
        }
    }
    if groups.len() < 2 {
        return Err(AssayError::InsufficientData(format!(
            "post hoc comparison needs at least 2 groups, got {}",
            groups.len()
        )));
    }

    let labels: Vec<String> = groups.keys().cloned().collect();
    let sizes = groups
        .values()
        .map(|v| v.get(&Metric::SmlDur).map_or(0, Vec::len))
        .collect();

    let metrics = POSTHOC_METRICS
        .par_iter()
        .map(|&metric| {
            let samples: Vec<Vec<f64>> = groups
                .values()
                .map(|v| v.get(&metric).cloned().unwrap_or_default())
                .collect();
            let kruskal = kruskal_wallis(&samples)?;
            let dunn = dunn(&samples, &labels, correction)?;
            tracing::debug!(metric = %metric, h = kruskal.h, p = kruskal.p_value, "kruskal-wallis");
            Ok(PosthocMetric { metric, kruskal, dunn })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PosthocReport {
        labels,
        sizes,
        metrics,
    })
}

/// `x` in C-style `%.3e` notation, e.g. `6.015e-01`.
pub fn format_scientific(x: f64) -> String {
    if !x.is_finite() {
        return if x.is_nan() {
            "nan".to_string()
        } else if x > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let formatted = format!("{:.3e}", x);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Write the Kruskal-Wallis summary and one Dunn matrix per metric.
pub fn write_posthoc(report: &PosthocReport, age_label: &str, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let path = output_dir.join(format!("kruskal_results_controls_only_{}.csv", age_label));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Metric", "H-statistic", "p-value", "Significant (p<0.05)"])?;
    for m in &report.metrics {
        writer.write_record([
            m.metric.column().to_string(),
            round4(m.kruskal.h).to_string(),
            format_scientific(m.kruskal.p_value),
            if m.kruskal.is_significant(0.05) { "Yes" } else { "No" }.to_string(),
        ])?;
    }
    writer.flush()?;
    written.push(path);

    for m in &report.metrics {
        let path = output_dir.join(format!("dunn_posthoc_{}_{}.csv", m.metric.column(), age_label));
        m.dunn.to_csv(&path)?;
        written.push(path);
    }

    tracing::info!(groups = report.labels.len(), files = written.len(), "post hoc analysis written");
    Ok(written)
}
