//! YAML configuration of an analysis run.

use crate::correct::Correction;
use crate::data::{parse_file_label, Age, ExtractionConfig};
use crate::error::{AssayError, Result};
use crate::pipeline::blocked::{analyze_blocked, write_blocked};
use crate::pipeline::intervals::{analyze_intervals, write_intervals};
use crate::pipeline::posthoc::{analyze_posthoc, write_posthoc};
use crate::plot::{OutputFormat, PlotStyle};
use crate::test::SelectionConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An export file with optional label overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: PathBuf,
    /// Drug name; taken from the file name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,
    /// Age; taken from the file name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            drug: None,
            age: None,
        }
    }

    pub fn with_drug(mut self, drug: &str) -> Self {
        self.drug = Some(drug.to_string());
        self
    }

    pub fn with_age(mut self, age: Age) -> Self {
        self.age = Some(age);
        self
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        parse_file_label(&self.path).stem
    }

    /// Drug name, from the override or the file name.
    pub fn drug(&self) -> Result<String> {
        if let Some(drug) = &self.drug {
            return Ok(drug.clone());
        }
        let label = parse_file_label(&self.path);
        if label.drug.is_empty() {
            return Err(AssayError::InvalidLabel(format!(
                "cannot derive a drug name from {}",
                self.path.display()
            )));
        }
        Ok(label.drug)
    }

    /// Age, from the override or the file name.
    pub fn age(&self) -> Result<Age> {
        self.age
            .or_else(|| parse_file_label(&self.path).age)
            .ok_or_else(|| {
                AssayError::InvalidLabel(format!(
                    "cannot derive an age from {}; set `age` explicitly",
                    self.path.display()
                ))
            })
    }
}

fn default_bin_minutes() -> u32 {
    5
}

fn default_letters() -> Vec<String> {
    ["A", "D", "G", "J"].iter().map(|s| s.to_string()).collect()
}

fn default_posthoc_correction() -> Correction {
    Correction::Holm
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Which analysis to run, with its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Control vs drug across ages, one file per age.
    Blocked {
        inputs: Vec<InputFile>,
        #[serde(default)]
        correction: Correction,
    },
    /// Control vs drug per time bin and in total, for a single file.
    Intervals {
        input: InputFile,
        /// Length of one time bin.
        #[serde(default = "default_bin_minutes")]
        bin_minutes: u32,
        /// Panel letters of the combined totals figure.
        #[serde(default = "default_letters")]
        letters: Vec<String>,
    },
    /// Controls of several experiments compared with each other.
    Posthoc {
        inputs: Vec<PathBuf>,
        /// Suffix of the output files, e.g. `3dpf`.
        age_label: String,
        #[serde(default = "default_posthoc_correction")]
        correction: Correction,
    },
}

impl AnalysisKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Blocked { .. } => "blocked",
            AnalysisKind::Intervals { .. } => "intervals",
            AnalysisKind::Posthoc { .. } => "posthoc",
        }
    }

    /// Extraction used when a configuration leaves it out.
    pub fn default_extraction(&self) -> ExtractionConfig {
        match self {
            AnalysisKind::Posthoc { .. } => ExtractionConfig::blocks(),
            _ => ExtractionConfig::default(),
        }
    }

    /// Test selection used when a configuration leaves it out.
    pub fn default_stats(&self) -> SelectionConfig {
        match self {
            AnalysisKind::Intervals { .. } => SelectionConfig::welch(),
            _ => SelectionConfig::default(),
        }
    }
}

/// Figure output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// One file per format; empty to skip figures.
    pub formats: Vec<OutputFormat>,
    pub style: PlotStyle,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Svg, OutputFormat::Png],
            style: PlotStyle::default(),
        }
    }
}

/// A complete analysis run.
///
/// Keys missing from the `extraction` and `stats` sections of a YAML file
/// take the defaults of the analysis kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AnalysisConfigFile")]
pub struct AnalysisConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub output_dir: PathBuf,
    pub extraction: ExtractionConfig,
    pub stats: SelectionConfig,
    pub plot: PlotConfig,
    pub analysis: AnalysisKind,
}

/// An analysis configuration as written in YAML.
#[derive(Deserialize)]
struct AnalysisConfigFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default)]
    extraction: Option<serde_yaml::Value>,
    #[serde(default)]
    stats: Option<serde_yaml::Value>,
    #[serde(default)]
    plot: PlotConfig,
    analysis: AnalysisKind,
}

impl TryFrom<AnalysisConfigFile> for AnalysisConfig {
    type Error = AssayError;

    fn try_from(file: AnalysisConfigFile) -> Result<Self> {
        let extraction = overlay("extraction", file.analysis.default_extraction(), file.extraction)?;
        let stats = overlay("stats", file.analysis.default_stats(), file.stats)?;
        Ok(Self {
            name: file.name,
            description: file.description,
            output_dir: file.output_dir,
            extraction,
            stats,
            plot: file.plot,
            analysis: file.analysis,
        })
    }
}

/// Replace the keys of `base` present in a YAML mapping.
fn overlay<T: Serialize + DeserializeOwned>(section: &str, base: T, keys: Option<serde_yaml::Value>) -> Result<T> {
    let keys = match keys {
        None | Some(serde_yaml::Value::Null) => return Ok(base),
        Some(serde_yaml::Value::Mapping(keys)) => keys,
        Some(_) => {
            return Err(AssayError::InvalidParameter(format!(
                "`{}` must be a mapping",
                section
            )))
        }
    };
    let mut merged = match serde_yaml::to_value(&base)? {
        serde_yaml::Value::Mapping(m) => m,
        _ => serde_yaml::Mapping::new(),
    };
    for (key, value) in keys {
        merged.insert(key, value);
    }
    serde_yaml::from_value(serde_yaml::Value::Mapping(merged)).map_err(AssayError::from)
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(AssayError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(AssayError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Multi-age comparison of one drug, one export per age.
    pub fn example_blocked() -> Self {
        Self {
            name: "blocked-tcb2".to_string(),
            description: Some("Control vs TCB-2 totals at 3, 4 and 5 dpf".to_string()),
            output_dir: PathBuf::from("results/TCB-2"),
            extraction: ExtractionConfig::default(),
            stats: SelectionConfig::default(),
            plot: PlotConfig::default(),
            analysis: AnalysisKind::Blocked {
                inputs: vec![
                    InputFile::new("data/TCB-2_3DPF.csv"),
                    InputFile::new("data/TCB-2_4DPF.csv"),
                    InputFile::new("data/TCB-2_5DPF.csv"),
                ],
                correction: Correction::None,
            },
        }
    }

    /// Per-interval comparison of a single export.
    pub fn example_intervals() -> Self {
        Self {
            name: "intervals-skf38393".to_string(),
            description: Some("Control vs SKF-38393 per 5 minute bin at 3 dpf".to_string()),
            output_dir: PathBuf::from("results/SKF-38393"),
            extraction: ExtractionConfig::default(),
            stats: SelectionConfig::welch(),
            plot: PlotConfig::default(),
            analysis: AnalysisKind::Intervals {
                input: InputFile::new("data/SKF-38393_3dpf.csv"),
                bin_minutes: default_bin_minutes(),
                letters: default_letters(),
            },
        }
    }

    /// Controls of several experiments at one age.
    pub fn example_posthoc() -> Self {
        Self {
            name: "posthoc-controls-3dpf".to_string(),
            description: Some("Kruskal-Wallis and Dunn tests across control groups".to_string()),
            output_dir: PathBuf::from("results/posthoc"),
            extraction: ExtractionConfig::blocks(),
            stats: SelectionConfig::default(),
            plot: PlotConfig::default(),
            analysis: AnalysisKind::Posthoc {
                inputs: vec![
                    PathBuf::from("data/XE-991_3DPF_JAN_13_2025.csv"),
                    PathBuf::from("data/Muscarine_3dpf_1st_con.csv"),
                    PathBuf::from("data/Dopamine_3DPF_dopamine_2ndcon.csv"),
                ],
                age_label: "3dpf".to_string(),
                correction: Correction::Holm,
            },
        }
    }

    /// Example configuration by analysis name.
    pub fn example(kind: &str) -> Result<Self> {
        match kind {
            "blocked" => Ok(Self::example_blocked()),
            "intervals" => Ok(Self::example_intervals()),
            "posthoc" => Ok(Self::example_posthoc()),
            other => Err(AssayError::InvalidParameter(format!(
                "Unknown analysis '{}' (expected blocked, intervals or posthoc)",
                other
            ))),
        }
    }

    /// Run the analysis and write its outputs, returning the written paths.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        tracing::info!(name = %self.name, analysis = self.analysis.name(), "running analysis");
        std::fs::create_dir_all(&self.output_dir)?;
        match &self.analysis {
            AnalysisKind::Blocked { inputs, correction } => {
                let report = analyze_blocked(inputs, &self.extraction, &self.stats, *correction)?;
                write_blocked(&report, &self.plot, &self.output_dir)
            }
            AnalysisKind::Intervals {
                input,
                bin_minutes,
                letters,
            } => {
                let report = analyze_intervals(input, &self.extraction, &self.stats, *bin_minutes)?;
                write_intervals(&report, &self.plot, letters, &self.output_dir)
            }
            AnalysisKind::Posthoc {
                inputs,
                age_label,
                correction,
            } => {
                let report = analyze_posthoc(inputs, &self.extraction, *correction)?;
                write_posthoc(&report, age_label, &self.output_dir)
            }
        }
    }
}
