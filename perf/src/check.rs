//! Threshold checks of a new run against derived requirements.

use std::io::Write;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};
use strum_macros::{Display, EnumString};

use crate::config::ZeroRequirement;
use crate::error::Error;
use crate::experiment::{experiment_type, ExperimentType};
use crate::metric::{Kind, Metric};
use crate::requirements::RequirementsTable;
use crate::results::{read_metric_rows, single_row, summary_files, MetricRow};
use crate::schema::{format_float, CHECK_HEADER};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

/// Outcome of checking one metric at one payload
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult {
    pub metric: Metric,
    pub payload: u64,
    pub requirement: f64,
    pub experiment: f64,
    /// Absolute difference between requirement and experiment
    pub difference: f64,
    pub percentage: f64,
    pub status: Status,
}

/// Percentage of the experiment value over the requirement
pub fn percentage(requirement: f64, experiment: f64) -> Option<f64> {
    let diff = requirement - experiment;
    match requirement == 0.0 {
        true => None,
        false => Some((-diff * 100.0) / requirement),
    }
}

/// Check a single metric value against its requirement
pub fn check_metric(metric: Metric, payload: u64, requirement: f64, experiment: f64, zero: ZeroRequirement) -> Result<CheckResult, Error> {
    let diff = requirement - experiment;

    let percentage = match (percentage(requirement, experiment), zero) {
        (Some(p), _) => p,
        (None, ZeroRequirement::Fallback) => {
            warn!("Zero requirement for {} at {} bytes, reporting absolute difference", metric, payload);
            -diff * 100.0
        },
        (None, ZeroRequirement::Error) => {
            return Err(Error::ZeroRequirement{ metric: metric.column(), payload });
        },
    };

    let status = match metric.direction().passes(diff) {
        true => Status::Passed,
        false => Status::Failed,
    };

    debug!("Check for \"{}\" {} bytes {} (requirement: {}, experiment: {})", metric, payload, status, requirement, experiment);

    Ok(CheckResult {
        metric,
        payload,
        requirement,
        experiment,
        difference: diff.abs(),
        percentage,
        status,
    })
}

/// Checks of every payload and metric of one experiment type
#[derive(Clone, Debug, PartialEq)]
pub struct CheckOutcome {
    pub experiment: ExperimentType,
    pub kind: Kind,

    /// Bit `i` is set when `kind.checks()[i]` fails for any payload
    pub status: u32,

    /// Results grouped by metric, then by payload
    pub results: Vec<CheckResult>,
}

/// Check the summary rows of one experiment type against its requirements
pub fn check_experiment(experiment: ExperimentType, requirements: &[MetricRow], rows: &[MetricRow], kind: Kind, zero: ZeroRequirement) -> Result<CheckOutcome, Error> {
    if requirements.is_empty() {
        return Err(Error::NoRequirements(experiment.to_string()));
    }

    let checks = kind.checks();
    let mut by_metric: Vec<Vec<CheckResult>> = checks.iter().map(|_| vec![]).collect();
    let mut status = 0u32;

    let payloads: Vec<_> = requirements.iter().map(|r| r.payload).unique().collect();

    for payload in payloads {
        let req = single_row(requirements, payload, "requirement", experiment)?;
        let exp = single_row(rows, payload, "experiment", experiment)?;

        for (i, metric) in checks.iter().enumerate() {
            let r = check_metric(*metric, payload, req.values[i], exp.values[i], zero)?;

            if r.status == Status::Failed {
                status |= 1 << i;
            }

            by_metric[i].push(r);
        }
    }

    for r in rows {
        if !requirements.iter().any(|q| q.payload == r.payload) {
            warn!("No requirement for {} bytes of {}, skipping", r.payload, experiment);
        }
    }

    debug!("Return code for {}: {}", experiment, status);

    Ok(CheckOutcome {
        experiment,
        kind,
        status,
        results: by_metric.into_iter().flatten().collect(),
    })
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.status == 0
    }

    pub fn passed_checks(&self) -> usize {
        self.results.iter().filter(|r| r.status == Status::Passed).count()
    }

    pub fn total_checks(&self) -> usize {
        self.results.len()
    }

    /// Write the check report CSV
    pub fn to_writer<W: Write>(&self, w: W) -> Result<(), Error> {
        let mut w = csv::Writer::from_writer(w);

        let mut header = vec!["Check", self.kind.payload_column()];
        header.extend_from_slice(&CHECK_HEADER);
        w.write_record(&header)?;

        for r in &self.results {
            w.write_record(&[
                r.metric.column(),
                r.payload.to_string(),
                format_float(r.requirement),
                format_float(r.experiment),
                format_float(r.difference),
                format_float(r.percentage),
                r.status.to_string(),
            ])?;
        }

        w.flush()?;

        Ok(())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let f = std::fs::File::create(path.as_ref())?;
        self.to_writer(f)
    }
}

/// Aggregate results of checking every summary of an experiment directory
#[derive(Clone, Debug, PartialEq)]
pub struct CheckSummary {
    pub outcomes: Vec<CheckOutcome>,
    pub reports: Vec<PathBuf>,
}

impl CheckSummary {
    /// Number of experiment types with at least one failed check
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    pub fn passed_checks(&self) -> usize {
        self.outcomes.iter().map(|o| o.passed_checks()).sum()
    }

    pub fn total_checks(&self) -> usize {
        self.outcomes.iter().map(|o| o.total_checks()).sum()
    }

    /// Process exit code, the number of failed sub-experiments
    pub fn exit_code(&self) -> i32 {
        self.failed() as i32
    }
}

/// Check every summary in `dir` against `requirements`, writing a
/// `checks_<experiment_type>.csv` report per summary
pub fn check_directory<P: AsRef<Path>>(requirements: &RequirementsTable, dir: P, marker: &str, zero: ZeroRequirement) -> Result<CheckSummary, Error> {
    let dir = dir.as_ref();
    let kind = requirements.kind;

    let mut outcomes = vec![];
    let mut reports = vec![];

    for summary in summary_files(dir, marker)? {
        debug!("Checking summary {:?}", summary);

        let t = experiment_type(&summary)?;
        let reqs = requirements.for_experiment(t);
        let rows = read_metric_rows(&summary, kind)?;

        let outcome = check_experiment(t, &reqs, &rows, kind, zero)?;

        match outcome.passed() {
            true => info!("Check for {} [PASSED]", t),
            false => warn!("Check for {} [FAILED]", t),
        }

        let report = dir.join(format!("checks_{}.csv", t));
        debug!("Check saved in {:?}", report);
        outcome.write_csv(&report)?;

        reports.push(report);
        outcomes.push(outcome);
    }

    Ok(CheckSummary{ outcomes, reports })
}
