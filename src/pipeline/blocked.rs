//! Control vs drug comparisons of animal totals across ages.

use crate::correct::Correction;
use crate::data::{extract, Age, ExtractionConfig, Group, Metric, ObservationSet, Recording};
use crate::error::{AssayError, Result};
use crate::pipeline::config::{InputFile, PlotConfig};
use crate::plot::{save_figure, BlockedFigure};
use crate::test::{compare_groups, GroupComparison, SelectionConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The comparison of one age and metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedComparison {
    pub age: Age,
    pub metric: Metric,
    pub comparison: GroupComparison,
}

/// Observations and comparisons of one drug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedReport {
    pub drug: String,
    pub observations: ObservationSet,
    pub comparisons: Vec<BlockedComparison>,
    pub correction: Correction,
}

impl BlockedReport {
    /// Comparison of one age and metric, if both groups had data.
    pub fn get(&self, age: Age, metric: Metric) -> Option<&BlockedComparison> {
        self.comparisons
            .iter()
            .find(|c| c.age == age && c.metric == metric)
    }
}

#[derive(Serialize)]
struct ComparisonRecord<'a> {
    drug: &'a str,
    age: String,
    metric: &'a str,
    mode: &'a str,
    parameter: &'a str,
    control_n: usize,
    control_mean: f64,
    control_std: f64,
    drug_n: usize,
    drug_mean: f64,
    drug_std: f64,
    test: &'a str,
    statistic: f64,
    p_value: f64,
    p_adjusted: f64,
    significance: &'a str,
}

/// Load every input into one observation set, in input order.
pub fn load_observations(inputs: &[InputFile], extraction: &ExtractionConfig) -> Result<ObservationSet> {
    let sets = inputs
        .par_iter()
        .map(|input| {
            let drug = input.drug()?;
            let age = input.age()?;
            let recording = Recording::from_csv(&input.path, extraction.max_rows)?;
            let table = extract(&recording, extraction)?;
            tracing::info!(
                path = %input.path.display(),
                drug = %drug,
                age = %age,
                animals = table.len(),
                "loaded recording"
            );
            Ok(ObservationSet::from_totals(&table, &drug, age))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut observations = ObservationSet::new();
    for set in sets {
        observations.extend(set);
    }
    Ok(observations)
}

/// Compare control and drug totals for every age and metric.
pub fn analyze_blocked(
    inputs: &[InputFile],
    extraction: &ExtractionConfig,
    stats: &SelectionConfig,
    correction: Correction,
) -> Result<BlockedReport> {
    if inputs.is_empty() {
        return Err(AssayError::EmptyData("No input files given".to_string()));
    }
    let observations = load_observations(inputs, extraction)?;
    let drugs = observations.drugs();
    let drug = drugs
        .first()
        .map(|d| d.to_string())
        .ok_or_else(|| AssayError::EmptyData("No observations loaded".to_string()))?;
    if drugs.len() > 1 {
        tracing::warn!(drugs = ?drugs, using = %drug, "inputs name several drugs");
    }

    let mut comparisons = Vec::new();
    for age in observations.ages() {
        for metric in Metric::ALL {
            let control = observations.values(age, metric, Group::Control);
            let treated = observations.values(age, metric, Group::Drug);
            if control.is_empty() || treated.is_empty() {
                tracing::warn!(
                    age = %age,
                    metric = %metric,
                    control = control.len(),
                    drug = treated.len(),
                    "skipping comparison with an empty group"
                );
                continue;
            }
            let comparison = compare_groups(&control, &treated, stats)?;
            tracing::debug!(
                age = %age,
                metric = %metric,
                test = %comparison.test,
                p = comparison.p_value,
                "compared groups"
            );
            comparisons.push(BlockedComparison {
                age,
                metric,
                comparison,
            });
        }
    }

    let raw: Vec<f64> = comparisons.iter().map(|c| c.comparison.p_value).collect();
    for (c, p) in comparisons.iter_mut().zip(correction.apply(&raw)) {
        c.comparison.set_adjusted(p);
    }

    Ok(BlockedReport {
        drug,
        observations,
        comparisons,
        correction,
    })
}

fn write_comparisons(report: &BlockedReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for c in &report.comparisons {
        let g = &c.comparison;
        writer.serialize(ComparisonRecord {
            drug: &report.drug,
            age: c.age.label(),
            metric: c.metric.column(),
            mode: c.metric.mode().name(),
            parameter: c.metric.parameter().name(),
            control_n: g.control.n,
            control_mean: g.control.mean,
            control_std: g.control.std,
            drug_n: g.drug.n,
            drug_mean: g.drug.mean,
            drug_std: g.drug.std,
            test: g.test.name(),
            statistic: g.statistic,
            p_value: g.p_value,
            p_adjusted: g.p_adjusted,
            significance: g.significance.stars(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write observations, comparisons and the grouped figure.
pub fn write_blocked(report: &BlockedReport, plot: &PlotConfig, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let path = output_dir.join(format!("observations_{}.csv", report.drug));
    report.observations.to_csv(&path)?;
    written.push(path);

    let path = output_dir.join(format!("comparisons_{}.csv", report.drug));
    write_comparisons(report, &path)?;
    written.push(path);

    if !plot.formats.is_empty() {
        let mut figure = BlockedFigure::new(&report.observations, &plot.style);
        for c in &report.comparisons {
            figure.mark(c.age, c.metric, c.comparison.significance);
        }
        for format in &plot.formats {
            let path = output_dir.join(format!(
                "grouped_comparison_blocked_{}.{}",
                report.drug,
                format.extension()
            ));
            save_figure(&figure, &path)?;
            written.push(path);
        }
    }

    tracing::info!(drug = %report.drug, files = written.len(), "blocked analysis written");
    Ok(written)
}
