use structopt::StructOpt;

use log::{debug, error, info};

use dds_perf::{Options, Kind, ProcessArgs, RequirementsArgs, CheckArgs, SubexperimentArgs};
use dds_perf::{check_experiments, determine_requirements};
use dds_perf::config::Config;
use dds_perf::compare::compare_subexperiments;
use dds_perf::helpers::init_logging;
use dds_perf::process::process_throughput;

#[derive(PartialEq, Clone, Debug, StructOpt)]
/// Throughput benchmark analysis
pub struct Args {
    #[structopt(flatten)]
    pub options: Options,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub enum Command {
    /// Keep the maximum subscription throughput row per payload
    Process(ProcessArgs),
    /// Derive throughput requirements from historical runs
    Requirements(RequirementsArgs),
    /// Check a run against throughput requirements
    Check(CheckArgs),
    /// Aggregate sub-experiment summaries into a single CSV
    CompareSubexperiments(SubexperimentArgs),
}

fn main() -> Result<(), anyhow::Error> {
    let opts = Args::from_args();

    init_logging(opts.options.log_level)?;

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
            process_throughput(&a.raw_csv, &a.output_csv)?;
            Ok(0)
        },
        Command::Requirements(a) => {
            determine_requirements(Kind::Throughput, a, config)?;
            Ok(0)
        },
        Command::Check(a) => {
            let s = check_experiments(Kind::Throughput, a, config)?;
            Ok(s.exit_code())
        },
        Command::CompareSubexperiments(a) => {
            compare_subexperiments(&a.subexperiment_summaries, &a.output_csv)?;
            Ok(0)
        },
    }
}
