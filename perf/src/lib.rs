use std::path::PathBuf;

use structopt::StructOpt;
use strum::VariantNames;
use log::{info, warn};

use simplelog::LevelFilter;

pub mod error;
use crate::error::Error;

pub mod config;
use config::Config;

pub mod experiment;
pub use experiment::{ExperimentType, experiment_name, experiment_type};

pub mod metric;
pub use metric::{Kind, Metric, Direction};

pub mod schema;
pub mod stats;

pub mod results;
pub use results::{MetricRow, RunRow, Corpus};

pub mod requirements;
use requirements::RequirementsTable;

pub mod check;
use check::CheckSummary;

pub mod compare;
use compare::CompareSummary;

pub mod process;

pub mod helpers;

/// Options shared by the analysis binaries
#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct Options {
    /// Analysis configuration file
    #[structopt(long, default_value = "perf.toml", env = "PERF_CONFIG")]
    pub config: PathBuf,

    #[structopt(long = "log-level", default_value = "info")]
    /// Configure app logging levels (warn, info, debug, trace)
    pub log_level: LevelFilter,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct ProcessArgs {
    #[structopt(short = "c", long)]
    /// Raw benchmark CSV to summarise
    pub raw_csv: PathBuf,

    #[structopt(short = "o", long)]
    /// Output summary CSV
    pub output_csv: PathBuf,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct RequirementsArgs {
    #[structopt(short = "e", long)]
    /// Directory containing one sub-directory per historical run
    pub experiments_results: PathBuf,

    #[structopt(short = "o", long)]
    /// Output requirements CSV
    pub output_file: PathBuf,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct CheckArgs {
    #[structopt(short = "r", long)]
    /// Requirements CSV
    pub requirements: PathBuf,

    #[structopt(short = "e", long)]
    /// Directory containing the summaries of the run to check
    pub experiment_directory: PathBuf,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct CompareArgs {
    #[structopt(short = "R", long)]
    /// Reference summaries directory
    pub reference: PathBuf,

    #[structopt(short = "r", long)]
    /// Result summaries directory
    pub results: PathBuf,

    #[structopt(short = "o", long, default_value = "comparison")]
    /// Output directory for comparison reports
    pub output_dir: PathBuf,

    #[structopt(short = "t", long)]
    /// Allowed excess over the reference in base 1, overrides the config file
    pub fail_threshold: Option<f64>,

    #[structopt(long, possible_values=Metric::VARIANTS)]
    /// Columns to compare (Min, Median, Max, 99% by default)
    pub columns: Vec<Metric>,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct SubexperimentArgs {
    #[structopt(short = "e", long, required = true, min_values = 1)]
    /// Sub-experiment summary files to aggregate
    pub subexperiment_summaries: Vec<PathBuf>,

    #[structopt(short = "o", long)]
    /// Output aggregate CSV
    pub output_csv: PathBuf,
}

/// Derive requirements from a directory of historical runs and write them out
pub fn determine_requirements(kind: Kind, args: &RequirementsArgs, config: &Config) -> Result<RequirementsTable, Error> {
    let dir = helpers::directory(&args.experiments_results, false)?;

    info!("Determining {} requirements from {:?}", kind, dir);

    let corpus = results::load_corpus(&dir, kind, &config.summary_marker)?;
    let table = requirements::derive(&corpus, kind, config.requirement_percentile)?;

    table.write_csv(&args.output_file)?;
    info!("Requirements saved in {:?}", args.output_file);

    Ok(table)
}

/// Share of passed checks, in percent
pub fn passed_percentage(passed: usize, total: usize) -> f64 {
    match total {
        0 => 100.0,
        _ => passed as f64 * 100.0 / total as f64,
    }
}

/// Check a run against a requirements file, logging the verdict
pub fn check_experiments(kind: Kind, args: &CheckArgs, config: &Config) -> Result<CheckSummary, Error> {
    let dir = helpers::directory(&args.experiment_directory, false)?;

    info!("Checking {:?} against {:?}", dir, args.requirements);

    let requirements = RequirementsTable::read_csv(&args.requirements, kind)?;
    let summary = check::check_directory(&requirements, &dir, &config.summary_marker, config.zero_requirement)?;

    let (passed, total) = (summary.passed_checks(), summary.total_checks());
    info!("{:.3}% checks passed: ({}/{})", passed_percentage(passed, total), passed, total);

    match summary.failed() {
        0 => info!("All {} sub-experiments passed", summary.outcomes.len()),
        n => warn!("{} of {} sub-experiments failed", n, summary.outcomes.len()),
    }

    Ok(summary)
}

/// Compare a run against a reference run
pub fn compare_experiments(args: &CompareArgs, config: &Config) -> Result<CompareSummary, Error> {
    let reference = helpers::directory(&args.reference, false)?;
    let results = helpers::directory(&args.results, false)?;
    let output = helpers::directory(&args.output_dir, true)?;

    let threshold = args.fail_threshold.unwrap_or(config.fail_threshold);
    let columns = match args.columns.is_empty() {
        true => compare::DEFAULT_COLUMNS.to_vec(),
        false => args.columns.clone(),
    };

    info!("Comparing {:?} against {:?} (fail threshold: {})", results, reference, threshold);

    compare::compare_directories(&reference, &results, &output, &config.summary_marker, &columns, threshold)
}
