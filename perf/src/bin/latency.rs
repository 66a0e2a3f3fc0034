use structopt::StructOpt;

use log::{debug, error, info};

use dds_perf::{Options, Kind, ProcessArgs, RequirementsArgs, CheckArgs, CompareArgs, SubexperimentArgs};
use dds_perf::{check_experiments, compare_experiments, determine_requirements};
use dds_perf::config::Config;
use dds_perf::compare::compare_subexperiments;
use dds_perf::helpers::init_logging;
use dds_perf::process::process_latency;

#[derive(PartialEq, Clone, Debug, StructOpt)]
/// Latency benchmark analysis
pub struct Args {
    #[structopt(flatten)]
    pub options: Options,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub enum Command {
    /// Summarise raw latency samples per payload
    Process(ProcessArgs),
    /// Derive latency requirements from historical runs
    Requirements(RequirementsArgs),
    /// Check a run against latency requirements
    Check(CheckArgs),
    /// Compare a run against a reference run
    Compare(CompareArgs),
    /// Aggregate sub-experiment summaries into a single CSV
    CompareSubexperiments(SubexperimentArgs),
}

fn main() -> Result<(), anyhow::Error> {
    // Load options
    let opts = Args::from_args();

    // Initialise logging
    init_logging(opts.options.log_level)?;

    // Load configuration from file
    let config = Config::load(&opts.options.config)?;
    debug!("Config: {:?}", config);

    let code = match run(&opts.command, &config) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        },
    };

    info!("Exit code: {}", code);
    std::process::exit(code);
}

fn run(command: &Command, config: &Config) -> Result<i32, dds_perf::error::Error> {
    match command {
        Command::Process(a) => {
            process_latency(&a.raw_csv, &a.output_csv)?;
            Ok(0)
        },
        Command::Requirements(a) => {
            determine_requirements(Kind::Latency, a, config)?;
            Ok(0)
        },
        Command::Check(a) => {
            let s = check_experiments(Kind::Latency, a, config)?;
            Ok(s.exit_code())
        },
        Command::Compare(a) => {
            let s = compare_experiments(a, config)?;
            Ok(s.exit_code())
        },
        Command::CompareSubexperiments(a) => {
            compare_subexperiments(&a.subexperiment_summaries, &a.output_csv)?;
            Ok(0)
        },
    }
}
