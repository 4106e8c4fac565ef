//! ZFA - Zebrafish locomotion assay CLI
//!
//! Command-line interface for control vs treatment analyses of larval
//! locomotion exports.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use zebrafish_assay::correct::Correction;
use zebrafish_assay::data::{extract, ExtractionConfig, Recording};
use zebrafish_assay::error::{AssayError, Result};
use zebrafish_assay::pipeline::{AnalysisConfig, AnalysisKind, InputFile, PlotConfig};
use zebrafish_assay::plot::{OutputFormat, PlotStyle};
use zebrafish_assay::profile::profile_table;
use zebrafish_assay::test::SelectionConfig;

/// CLI-friendly correction enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCorrection {
    /// Raw p-values
    None,
    Bonferroni,
    Holm,
    /// Benjamini-Hochberg FDR
    Bh,
}

impl From<CliCorrection> for Correction {
    fn from(c: CliCorrection) -> Self {
        match c {
            CliCorrection::None => Correction::None,
            CliCorrection::Bonferroni => Correction::Bonferroni,
            CliCorrection::Holm => Correction::Holm,
            CliCorrection::Bh => Correction::BenjaminiHochberg,
        }
    }
}

/// CLI-friendly figure format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Svg,
    Png,
    Jpeg,
}

impl From<CliFormat> for OutputFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Svg => OutputFormat::Svg,
            CliFormat::Png => OutputFormat::Png,
            CliFormat::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAnalysis {
    Blocked,
    Intervals,
    Posthoc,
}

/// Zebrafish larval locomotion assay analysis
#[derive(Parser)]
#[command(name = "zfa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Compare control and drug totals across ages (one export per age)
    Blocked {
        /// Export CSVs named like `DRUG_3DPF_....csv`
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Correction across the age x metric family
        #[arg(long, value_enum, default_value = "none")]
        correction: CliCorrection,

        /// Colour by age, distance in metres on a log axis
        #[arg(long)]
        poster: bool,

        /// Figure formats
        #[arg(long, value_enum, value_delimiter = ',', default_values = ["svg", "png"])]
        formats: Vec<CliFormat>,
    },

    /// Compare control and drug per time bin and in total for one export
    Intervals {
        /// Export CSV
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Minutes per time bin
        #[arg(long, default_value = "5")]
        bin_minutes: u32,

        /// Number of time bins
        #[arg(long, default_value = "4")]
        n_bins: usize,

        /// Drug colour of the violins
        #[arg(long, default_value = "#DC143C")]
        drug_color: String,

        /// Figure formats
        #[arg(long, value_enum, value_delimiter = ',', default_values = ["svg", "png"])]
        formats: Vec<CliFormat>,
    },

    /// Kruskal-Wallis and Dunn tests across the controls of several exports
    Posthoc {
        /// Export CSVs, one group each
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Age label used in output names (e.g. 3dpf)
        #[arg(short, long)]
        age: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Correction of the pairwise Dunn p-values
        #[arg(long, value_enum, default_value = "holm")]
        correction: CliCorrection,
    },

    /// Profile an export: animals, groups, bins and totals
    Describe {
        /// Export CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Read 24-row blocks at rows 0/48/96/144 instead of every other row
        #[arg(long)]
        blocks: bool,

        /// Output format: text (default), json or yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write an example configuration file
    Example {
        /// Analysis to configure
        #[arg(short, long, value_enum, default_value = "blocked")]
        kind: CliAnalysis,

        /// Output path for the YAML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run { config } => cmd_run(&config),

        Commands::Blocked {
            inputs,
            output,
            correction,
            poster,
            formats,
        } => cmd_blocked(inputs, output, correction.into(), poster, formats),

        Commands::Intervals {
            input,
            output,
            bin_minutes,
            n_bins,
            drug_color,
            formats,
        } => cmd_intervals(input, output, bin_minutes, n_bins, drug_color, formats),

        Commands::Posthoc {
            inputs,
            age,
            output,
            correction,
        } => cmd_posthoc(inputs, age, output, correction.into()),

        Commands::Describe {
            input,
            blocks,
            format,
        } => cmd_describe(&input, blocks, &format),

        Commands::Example { kind, output } => cmd_example(kind, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn plot_config(formats: Vec<CliFormat>, style: PlotStyle) -> PlotConfig {
    PlotConfig {
        formats: formats.into_iter().map(OutputFormat::from).collect(),
        style,
    }
}

fn run_config(config: &AnalysisConfig) -> Result<()> {
    eprintln!("Running {} analysis '{}'...", config.analysis.name(), config.name);
    let written = config.run()?;
    eprintln!("Done! Wrote {} files to {:?}", written.len(), config.output_dir);
    for path in &written {
        eprintln!("  {}", path.display());
    }
    Ok(())
}

/// Run an analysis from configuration
fn cmd_run(config_path: &Path) -> Result<()> {
    eprintln!("Loading analysis configuration from {:?}...", config_path);
    let config = AnalysisConfig::from_file(config_path)?;
    run_config(&config)
}

/// Multi-age control vs drug comparison
fn cmd_blocked(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    correction: Correction,
    poster: bool,
    formats: Vec<CliFormat>,
) -> Result<()> {
    let style = if poster { PlotStyle::poster() } else { PlotStyle::default() };
    let config = AnalysisConfig {
        name: "blocked".to_string(),
        description: None,
        output_dir: output,
        extraction: ExtractionConfig::default(),
        stats: SelectionConfig::default(),
        plot: plot_config(formats, style),
        analysis: AnalysisKind::Blocked {
            inputs: inputs.into_iter().map(InputFile::new).collect(),
            correction,
        },
    };
    run_config(&config)
}

/// Per-interval control vs drug comparison
fn cmd_intervals(
    input: PathBuf,
    output: PathBuf,
    bin_minutes: u32,
    n_bins: usize,
    drug_color: String,
    formats: Vec<CliFormat>,
) -> Result<()> {
    let style = PlotStyle {
        drug_color,
        ..Default::default()
    };
    let config = AnalysisConfig {
        name: "intervals".to_string(),
        description: None,
        output_dir: output,
        extraction: ExtractionConfig {
            max_rows: Some(2 * 24 * n_bins),
            n_bins,
            ..Default::default()
        },
        stats: SelectionConfig::welch(),
        plot: plot_config(formats, style),
        analysis: AnalysisKind::Intervals {
            input: InputFile::new(input),
            bin_minutes,
            letters: ["A", "D", "G", "J"].iter().map(|s| s.to_string()).collect(),
        },
    };
    run_config(&config)
}

/// Post hoc comparison of control groups
fn cmd_posthoc(inputs: Vec<PathBuf>, age: String, output: PathBuf, correction: Correction) -> Result<()> {
    let config = AnalysisConfig {
        name: format!("posthoc-{}", age),
        description: None,
        output_dir: output,
        extraction: ExtractionConfig::blocks(),
        stats: SelectionConfig::default(),
        plot: PlotConfig::default(),
        analysis: AnalysisKind::Posthoc {
            inputs,
            age_label: age,
            correction,
        },
    };
    run_config(&config)
}

/// Profile an export
fn cmd_describe(input: &Path, blocks: bool, format: &str) -> Result<()> {
    let extraction = if blocks {
        ExtractionConfig::blocks()
    } else {
        ExtractionConfig::default()
    };
    eprintln!("Loading recording...");
    let recording = Recording::from_csv(input, extraction.max_rows)?;
    let table = extract(&recording, &extraction)?;
    let profile = profile_table(&table, extraction.n_bins);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&profile)?),
        "yaml" => print!("{}", serde_yaml::to_string(&profile)?),
        "text" => print!("{}", profile),
        other => {
            return Err(AssayError::InvalidParameter(format!(
                "Unknown format '{}' (use text, json or yaml)",
                other
            )))
        }
    }
    Ok(())
}

/// Generate example analysis configuration
fn cmd_example(kind: CliAnalysis, output_path: &Path) -> Result<()> {
    let config = match kind {
        CliAnalysis::Blocked => AnalysisConfig::example_blocked(),
        CliAnalysis::Intervals => AnalysisConfig::example_intervals(),
        CliAnalysis::Posthoc => AnalysisConfig::example_posthoc(),
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
