//! Control vs drug comparisons per time bin and over the whole recording.

use crate::data::{extract, ExtractionConfig, Group, Metric, Recording};
use crate::error::{AssayError, Result};
use crate::pipeline::config::{InputFile, PlotConfig};
use crate::plot::{save_figure, PairFigure, PanelRowFigure, TableFigure};
use crate::test::{compare_groups, GroupComparison, SelectionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of the statistics export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStat {
    pub interval: String,
    #[serde(rename = "column")]
    pub metric: Metric,
    pub control_mean: f64,
    pub drug_mean: f64,
    pub control_std: f64,
    pub drug_std: f64,
    pub p_value: f64,
    pub test: String,
}

/// The comparison of one metric in one interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalComparison {
    pub metric: Metric,
    /// Zero-based bin, `None` for the whole recording.
    pub bin: Option<usize>,
    /// e.g. `5-10 minutes`.
    pub label: String,
    pub control: Vec<f64>,
    pub drug: Vec<f64>,
    pub comparison: GroupComparison,
}

impl IntervalComparison {
    pub fn stat(&self) -> IntervalStat {
        IntervalStat {
            interval: self.label.clone(),
            metric: self.metric,
            control_mean: self.comparison.control.mean,
            drug_mean: self.comparison.drug.mean,
            control_std: self.comparison.control.std,
            drug_std: self.comparison.drug.std,
            p_value: self.comparison.p_value,
            test: self.comparison.test.name().to_string(),
        }
    }

    fn slug(&self) -> String {
        match self.bin {
            Some(bin) => format!("bin{}", bin + 1),
            None => "total".to_string(),
        }
    }
}

/// Interval comparisons of one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalReport {
    /// File name without extension, used in output names.
    pub stem: String,
    pub drug: String,
    pub bin_minutes: u32,
    pub n_bins: usize,
    /// Per metric: every bin in order, then the total.
    pub comparisons: Vec<IntervalComparison>,
}

impl IntervalReport {
    pub fn stats(&self) -> Vec<IntervalStat> {
        self.comparisons.iter().map(IntervalComparison::stat).collect()
    }

    /// Whole-recording comparison of a metric.
    pub fn total(&self, metric: Metric) -> Option<&IntervalComparison> {
        self.comparisons
            .iter()
            .find(|c| c.metric == metric && c.bin.is_none())
    }
}

/// Label of the minutes covered by bins `start..end`.
pub fn interval_label(start: usize, end: usize, bin_minutes: u32) -> String {
    let minutes = bin_minutes as usize;
    format!("{}-{} minutes", start * minutes, end * minutes)
}

/// Compare control and drug animals in each bin and in total.
pub fn analyze_intervals(
    input: &InputFile,
    extraction: &ExtractionConfig,
    stats: &SelectionConfig,
    bin_minutes: u32,
) -> Result<IntervalReport> {
    if bin_minutes == 0 {
        return Err(AssayError::InvalidParameter(
            "bin_minutes must be at least 1".to_string(),
        ));
    }
    let drug = input.drug()?;
    let recording = Recording::from_csv(&input.path, extraction.max_rows)?;
    let table = extract(&recording, extraction)?;
    let n_bins = table.n_bins();
    tracing::info!(
        path = %input.path.display(),
        drug = %drug,
        animals = table.len(),
        bins = n_bins,
        "loaded recording"
    );

    let mut comparisons = Vec::new();
    for metric in Metric::ALL {
        let intervals = (0..n_bins).map(Some).chain(std::iter::once(None));
        for bin in intervals {
            let (label, control, treated) = match bin {
                Some(b) => (
                    interval_label(b, b + 1, bin_minutes),
                    table.bin_values(metric, b, Group::Control),
                    table.bin_values(metric, b, Group::Drug),
                ),
                None => (
                    interval_label(0, n_bins, bin_minutes),
                    table.totals(metric, Group::Control),
                    table.totals(metric, Group::Drug),
                ),
            };
            if control.is_empty() || treated.is_empty() {
                tracing::warn!(metric = %metric, interval = %label, "skipping interval with an empty group");
                continue;
            }
            let comparison = compare_groups(&control, &treated, stats)?;
            comparisons.push(IntervalComparison {
                metric,
                bin,
                label,
                control,
                drug: treated,
                comparison,
            });
        }
    }

    Ok(IntervalReport {
        stem: input.stem(),
        drug,
        bin_minutes,
        n_bins,
        comparisons,
    })
}

/// The "Statistical Summary" page.
pub fn summary_table(report: &IntervalReport) -> Result<TableFigure> {
    let columns = ["Interval", "Parameter", "Test Used", "p-value"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = report
        .stats()
        .into_iter()
        .map(|s| {
            vec![
                s.interval,
                s.metric.column().to_string(),
                s.test,
                format!("{:.4}", s.p_value),
            ]
        })
        .collect();
    TableFigure::new("Statistical Summary", columns, rows)
}

fn pair_figure(report: &IntervalReport, c: &IntervalComparison, plot: &PlotConfig) -> Result<PairFigure> {
    PairFigure::new(
        c.control.clone(),
        c.drug.clone(),
        &report.drug,
        c.metric,
        c.comparison.significance,
        &plot.style,
    )
}

fn write_statistics(report: &IntervalReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let stats = report.stats();

    let csv_path = output_dir.join(format!("statistics_{}.csv", report.stem));
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for s in &stats {
        writer.serialize(s)?;
    }
    writer.flush()?;

    let json_path = output_dir.join(format!("statistics_{}.json", report.stem));
    std::fs::write(&json_path, serde_json::to_string_pretty(&stats)?)?;

    Ok(vec![csv_path, json_path])
}

/// Write the statistics export, one figure per comparison, the combined
/// totals figure and the summary table.
pub fn write_intervals(
    report: &IntervalReport,
    plot: &PlotConfig,
    letters: &[String],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = write_statistics(report, output_dir)?;

    if plot.formats.is_empty() {
        return Ok(written);
    }

    let totals: Vec<PairFigure> = Metric::ALL
        .iter()
        .filter_map(|&m| report.total(m))
        .zip(letters.iter().map(Some).chain(std::iter::repeat(None)))
        .map(|(c, letter)| {
            let figure = pair_figure(report, c, plot)?;
            Ok(match letter {
                Some(l) => figure.with_letter(l.as_str()),
                None => figure,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let combined = PanelRowFigure::new(totals)?;
    let table = summary_table(report)?;

    for format in &plot.formats {
        let ext = format.extension();
        for c in &report.comparisons {
            let figure = pair_figure(report, c, plot)?.with_title(c.label.clone());
            let path = output_dir.join(format!(
                "{}_{}_{}.{}",
                report.stem,
                c.metric.column(),
                c.slug(),
                ext
            ));
            save_figure(&figure, &path)?;
            written.push(path);
        }

        let path = output_dir.join(format!("combined_{}.{}", report.stem, ext));
        save_figure(&combined, &path)?;
        written.push(path);

        let path = output_dir.join(format!("summary_{}.{}", report.stem, ext));
        save_figure(&table, &path)?;
        written.push(path);
    }

    tracing::info!(stem = %report.stem, files = written.len(), "interval analysis written");
    Ok(written)
}
