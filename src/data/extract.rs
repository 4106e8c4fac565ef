//! Per-animal time-bin extraction from a recording.
//!
//! Exports interleave rows in different ways depending on the acquisition
//! protocol, so the rows that belong to the analysed time bins are picked by a
//! [`RowSelection`]:
//!
//! - `Stride { step: 2, offset: 0 }` keeps every other row; bin *i* of an
//!   animal is its *i*-th kept row.
//! - `Blocks { starts: [0, 48, 96, 144], len: 24 }` keeps fixed-offset blocks;
//!   bin *i* of an animal is the sum of its rows inside block *i*.
//!
//! Control/drug assignment follows the plate convention: after sorting animal
//! IDs, the first `n_control` are controls and the rest are treated.

use crate::data::metric::{Group, Measures, Metric};
use crate::data::recording::{BinRow, Recording};
use crate::error::{AssayError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How rows of a recording map onto time bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowSelection {
    /// Every row; bin *i* is the animal's *i*-th row.
    All,
    /// Every `step`-th row starting at `offset`.
    Stride { step: usize, offset: usize },
    /// Fixed blocks of `len` rows starting at each offset in `starts`.
    Blocks { starts: Vec<usize>, len: usize },
}

impl Default for RowSelection {
    fn default() -> Self {
        RowSelection::Stride { step: 2, offset: 0 }
    }
}

/// Parameters of the per-animal extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of data rows read from each export.
    pub max_rows: Option<usize>,
    /// Row-to-bin mapping.
    pub selection: RowSelection,
    /// Number of time bins summed into an animal's total.
    pub n_bins: usize,
    /// Number of leading (sorted) animal IDs that are controls.
    pub n_control: usize,
    /// Optional regex restricting which animal IDs are kept.
    pub animal_pattern: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_rows: Some(192),
            selection: RowSelection::default(),
            n_bins: 4,
            n_control: 12,
            animal_pattern: None,
        }
    }
}

impl ExtractionConfig {
    /// Layout of exports where each 48-row period starts with the 24 rows of
    /// one bin.
    pub fn blocks() -> Self {
        Self {
            max_rows: Some(193),
            selection: RowSelection::Blocks {
                starts: vec![0, 48, 96, 144],
                len: 24,
            },
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.n_bins == 0 {
            return Err(AssayError::InvalidParameter(
                "n_bins must be at least 1".to_string(),
            ));
        }
        match &self.selection {
            RowSelection::Stride { step, .. } if *step == 0 => Err(AssayError::InvalidParameter(
                "stride step must be at least 1".to_string(),
            )),
            RowSelection::Blocks { starts, len } if starts.is_empty() || *len == 0 => {
                Err(AssayError::InvalidParameter(
                    "blocks need at least one start and a non-zero length".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// The time-bin series of one animal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSeries {
    pub animal: String,
    pub group: Group,
    /// Measurements per bin; `None` when the animal is absent from a block.
    pub bins: Vec<Option<Measures>>,
}

impl AnimalSeries {
    /// Value of a metric in bin `bin`.
    pub fn bin(&self, bin: usize, metric: Metric) -> Option<f64> {
        self.bins.get(bin).copied().flatten().map(|m| m.get(metric))
    }

    /// Sum of the available bins among the first `n_bins`.
    pub fn total(&self, metric: Metric, n_bins: usize) -> f64 {
        self.bins
            .iter()
            .take(n_bins)
            .flatten()
            .map(|m| m.get(metric))
            .sum()
    }

    /// Whether all of the first `n_bins` bins are present.
    pub fn is_complete(&self, n_bins: usize) -> bool {
        self.bins.len() >= n_bins && self.bins.iter().take(n_bins).all(Option::is_some)
    }
}

/// Per-animal series of one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalTable {
    animals: Vec<AnimalSeries>,
    n_bins: usize,
}

impl AnimalTable {
    pub fn new(animals: Vec<AnimalSeries>, n_bins: usize) -> Self {
        Self { animals, n_bins }
    }

    /// Animals in sorted ID order.
    pub fn animals(&self) -> &[AnimalSeries] {
        &self.animals
    }

    /// Number of bins summed into totals.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    /// Animals of one group.
    pub fn group(&self, group: Group) -> impl Iterator<Item = &AnimalSeries> + '_ {
        self.animals.iter().filter(move |a| a.group == group)
    }

    /// Number of animals in one group.
    pub fn n_group(&self, group: Group) -> usize {
        self.group(group).count()
    }

    /// Totals of a metric for one group, in animal order.
    pub fn totals(&self, metric: Metric, group: Group) -> Vec<f64> {
        self.group(group).map(|a| a.total(metric, self.n_bins)).collect()
    }

    /// Values of a metric in bin `bin` for one group.
    ///
    /// Animals without that bin are skipped.
    pub fn bin_values(&self, metric: Metric, bin: usize, group: Group) -> Vec<f64> {
        self.group(group)
            .filter_map(|a| {
                let value = a.bin(bin, metric);
                if value.is_none() {
                    tracing::warn!(
                        animal = %a.animal,
                        metric = %metric,
                        bin = bin + 1,
                        "no data for animal in bin"
                    );
                }
                value
            })
            .collect()
    }

    /// Keep only the animals of one group.
    pub fn only(&self, group: Group) -> Self {
        Self {
            animals: self.group(group).cloned().collect(),
            n_bins: self.n_bins,
        }
    }
}

/// Extract per-animal bin series from a recording.
pub fn extract(recording: &Recording, config: &ExtractionConfig) -> Result<AnimalTable> {
    config.validate()?;
    let pattern = config
        .animal_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    // Group assignment uses the position among all animals of the recording.
    let groups: BTreeMap<String, Group> = recording
        .animals()
        .into_iter()
        .enumerate()
        .map(|(i, animal)| {
            let group = if i < config.n_control {
                Group::Control
            } else {
                Group::Drug
            };
            (animal, group)
        })
        .collect();

    let keep = |animal: &str| pattern.as_ref().map_or(true, |re| re.is_match(animal));

    let mut bins: BTreeMap<String, Vec<Option<Measures>>> = groups
        .keys()
        .filter(|a| keep(a.as_str()))
        .map(|a| (a.clone(), Vec::new()))
        .collect();

    let rows = recording.rows();
    match &config.selection {
        RowSelection::All => push_rows(&mut bins, rows.iter()),
        RowSelection::Stride { step, offset } => {
            push_rows(&mut bins, rows.iter().skip(*offset).step_by(*step))
        }
        RowSelection::Blocks { starts, len } => {
            for &start in starts {
                let end = (start + len).min(rows.len());
                let block = rows.get(start..end).unwrap_or(&[]);
                let mut sums: BTreeMap<&str, Measures> = BTreeMap::new();
                for row in block.iter().filter(|r| r.measures.is_finite()) {
                    *sums.entry(row.animal.as_str()).or_default() += row.measures;
                }
                for (animal, series) in bins.iter_mut() {
                    series.push(sums.get(animal.as_str()).copied());
                }
            }
        }
    }

    let animals: Vec<AnimalSeries> = bins
        .into_iter()
        .map(|(animal, bins)| AnimalSeries {
            group: groups[&animal],
            animal,
            bins,
        })
        .collect();

    if animals.is_empty() {
        return Err(AssayError::EmptyData(
            "No animals left after applying the animal pattern".to_string(),
        ));
    }

    let incomplete: Vec<&str> = animals
        .iter()
        .filter(|a| !a.is_complete(config.n_bins))
        .map(|a| a.animal.as_str())
        .collect();
    if !incomplete.is_empty() {
        tracing::warn!(
            n_bins = config.n_bins,
            animals = ?incomplete,
            "animals with fewer bins than expected; totals use the available bins"
        );
    }

    let table = AnimalTable::new(animals, config.n_bins);
    tracing::debug!(
        control = table.n_group(Group::Control),
        drug = table.n_group(Group::Drug),
        "extracted animal table"
    );
    Ok(table)
}

fn push_rows<'a>(
    bins: &mut BTreeMap<String, Vec<Option<Measures>>>,
    rows: impl Iterator<Item = &'a BinRow>,
) {
    for row in rows {
        if let Some(series) = bins.get_mut(&row.animal) {
            series.push(row.measures.is_finite().then_some(row.measures));
        }
    }
}
