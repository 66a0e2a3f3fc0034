//! Comparison of latency summaries against a reference run, and aggregation
//! of sub-experiment summaries.

use std::io::Write;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::error::Error;
use crate::experiment::experiment_name;
use crate::metric::{Kind, Metric};
use crate::results::{column_index, read_columns, single_row, summary_files, MetricRow};
use crate::schema::{ComparisonRow, SUB_EXPERIMENT};

/// Columns compared when none are specified
pub const DEFAULT_COLUMNS: [Metric; 4] = [Metric::Min, Metric::Median, Metric::Max, Metric::P99];

pub fn validate_threshold(threshold: f64) -> Result<f64, Error> {
    match (0.0..=1.0).contains(&threshold) {
        true => Ok(threshold),
        false => Err(Error::InvalidThreshold(threshold)),
    }
}

/// Comparison of one result summary against its reference
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonOutcome {
    /// Experiment name taken from the summary file name
    pub experiment: String,
    pub passed: bool,

    /// Rows grouped by column, then by ascending payload
    pub rows: Vec<ComparisonRow>,
}

/// Compare `result` against `reference`, a value fails when it exceeds the
/// reference by more than `threshold` (expressed as a fraction)
pub fn compare_reference(experiment: &str, reference: &[MetricRow], result: &[MetricRow], columns: &[Metric], threshold: f64) -> Result<ComparisonOutcome, Error> {
    let threshold = validate_threshold(threshold)?;

    let payloads: Vec<_> = reference.iter().map(|r| r.payload).unique().sorted().collect();

    for r in result {
        if !payloads.contains(&r.payload) {
            warn!("No reference for {} bytes of {}, skipping", r.payload, experiment);
        }
    }

    let mut passed = true;
    let mut rows = vec![];

    for (i, column) in columns.iter().enumerate() {
        for payload in &payloads {
            let r = single_row(reference, *payload, "reference", experiment)?;
            let v = single_row(result, *payload, "result", experiment)?;

            let (reference, result) = (r.values[i], v.values[i]);

            let ok = result <= reference * (1.0 + threshold);
            if !ok {
                passed = false;
            }

            debug!("Comparison for \"{}\" {} bytes: {} vs. {} ({})", column, payload, result, reference, ok);

            rows.push(ComparisonRow {
                check: column.column(),
                bytes: *payload,
                reference,
                result,
                fail_threshold: threshold,
                comparison: match ok {
                    true => "passed",
                    false => "failed",
                }.to_string(),
            });
        }
    }

    Ok(ComparisonOutcome{ experiment: experiment.to_string(), passed, rows })
}

impl ComparisonOutcome {
    pub fn to_writer<W: Write>(&self, w: W) -> Result<(), Error> {
        let mut w = csv::Writer::from_writer(w);

        for r in &self.rows {
            w.serialize(r)?;
        }

        w.flush()?;

        Ok(())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let f = std::fs::File::create(path.as_ref())?;
        self.to_writer(f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompareSummary {
    pub outcomes: Vec<ComparisonOutcome>,
    pub reports: Vec<PathBuf>,
}

impl CompareSummary {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// 1 if any comparison failed, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        match self.passed() == self.outcomes.len() {
            true => 0,
            false => 1,
        }
    }
}

/// Compare every summary in `results` with the same-named summary in
/// `reference`, writing `<experiment>_comparison.csv` reports to `output`
pub fn compare_directories(reference: &Path, results: &Path, output: &Path, marker: &str, columns: &[Metric], threshold: f64) -> Result<CompareSummary, Error> {
    let threshold = validate_threshold(threshold)?;
    let payload_col = Kind::Latency.payload_column();

    let summaries = summary_files(results, marker)?;

    // Every result needs a reference before anything is written
    let mut pairs = vec![];
    for s in summaries {
        let r = match s.file_name() {
            Some(n) => reference.join(n),
            None => return Err(Error::InvalidFileName(s)),
        };
        if !r.is_file() {
            return Err(Error::MissingReference(r));
        }
        pairs.push((r, s));
    }

    let mut outcomes = vec![];
    let mut reports = vec![];
    let mut failed = vec![];

    for (r, s) in pairs {
        let t = experiment_name(&s)?;

        let reference_rows = read_columns(&r, payload_col, columns)?;
        let result_rows = read_columns(&s, payload_col, columns)?;

        let outcome = compare_reference(&t, &reference_rows, &result_rows, columns, threshold)?;

        let name = s.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match outcome.passed {
            true => info!("Comparison for {} PASSED", name),
            false => {
                warn!("Comparison for {} FAILED", name);
                failed.push(name);
            },
        }

        let report = output.join(format!("{}_comparison.csv", t));
        outcome.write_csv(&report)?;
        debug!("Comparison saved in {:?}", report);

        reports.push(report);
        outcomes.push(outcome);
    }

    let summary = CompareSummary{ outcomes, reports };
    info!("{}/{} comparisons passed", summary.passed(), summary.outcomes.len());

    if !failed.is_empty() {
        warn!("Failed comparisons: {}", failed.join(", "));
    }

    Ok(summary)
}

/// Concatenate sub-experiment summaries into `output`, tagging each row with
/// its sub-experiment name. Columns follow the first summary's header, every
/// summary is validated before the output is created.
pub fn compare_subexperiments<P: AsRef<Path>>(summaries: &[P], output: &Path) -> Result<usize, Error> {
    let mut header: Vec<String> = vec![];
    let mut inputs = vec![];

    for s in summaries {
        let path = s.as_ref();
        let name = experiment_name(path)?;

        let mut r = csv::Reader::from_path(path)?;
        let headers = r.headers()?.clone();

        if header.is_empty() {
            header = headers.iter().map(|h| h.trim().to_string()).collect();
        }

        let index = header.iter()
            .map(|c| column_index(&headers, c, path))
            .collect::<Result<Vec<_>, _>>()?;

        let records = r.records().collect::<Result<Vec<_>, _>>()?;

        inputs.push((name, index, records));
    }

    if inputs.is_empty() {
        warn!("No sub-experiment summaries to aggregate");
        return Ok(0);
    }

    let mut w = csv::Writer::from_path(output)?;

    let mut out_header = header.clone();
    out_header.push(SUB_EXPERIMENT.to_string());
    w.write_record(&out_header)?;

    let mut count = 0;
    for (name, index, records) in &inputs {
        for record in records {
            let mut row: Vec<&str> = index.iter().map(|i| record.get(*i).unwrap_or("")).collect();
            row.push(name);
            w.write_record(&row)?;

            count += 1;
        }

        debug!("Added {} to {:?}", name, output);
    }

    w.flush()?;

    info!("Aggregated {} rows from {} sub-experiments into {:?}", count, inputs.len(), output);

    Ok(count)
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(payload: u64, values: &[f64]) -> MetricRow {
        MetricRow{ payload, values: values.to_vec() }
    }

    #[test]
    fn within_threshold() {
        let reference = vec![row(16, &[100.0]), row(32, &[200.0])];
        let result = vec![row(32, &[220.0]), row(16, &[90.0])];

        let o = compare_reference("intraprocess_reliable", &reference, &result, &[Metric::Median], 0.1).unwrap();

        assert!(o.passed);
        assert_eq!(o.rows.len(), 2);
        assert_eq!(o.rows[0].bytes, 16);
        assert_eq!(o.rows[1].comparison, "passed");
    }

    #[test]
    fn over_threshold() {
        let reference = vec![row(16, &[100.0, 10.0])];
        let result = vec![row(16, &[100.0, 11.5])];

        let o = compare_reference("intraprocess_reliable", &reference, &result, &[Metric::Median, Metric::Max], 0.1).unwrap();

        assert!(!o.passed);
        assert_eq!(o.rows[0].comparison, "passed");
        assert_eq!(o.rows[1].check, "Max");
        assert_eq!(o.rows[1].comparison, "failed");
    }

    #[test]
    fn threshold_bounds() {
        let rows = vec![row(16, &[1.0])];

        let r = compare_reference("intraprocess_reliable", &rows, &rows, &[Metric::Median], 1.5);
        assert!(matches!(r, Err(Error::InvalidThreshold(_))));

        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
    }

    #[test]
    fn missing_result_payload() {
        let reference = vec![row(16, &[1.0]), row(32, &[1.0])];
        let result = vec![row(16, &[1.0])];

        let r = compare_reference("intraprocess_reliable", &reference, &result, &[Metric::Median], 0.1);
        assert!(matches!(r, Err(Error::MissingPayload{ payload: 32, .. })));
    }

    #[test]
    fn report_csv() {
        let o = compare_reference("intraprocess_reliable", &[row(16, &[2.0])], &[row(16, &[2.5])], &[Metric::P99], 0.1).unwrap();

        let mut buff = vec![];
        o.to_writer(&mut buff).unwrap();
        let out = String::from_utf8(buff).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, vec![
            "Check,Bytes,Reference,Result,Fail threshold,Comparison",
            "99%,16,2.000,2.500,0.100,failed",
        ]);
    }

    #[test]
    fn subexperiments_tagged() {
        let d = tempfile::tempdir().unwrap();
        let a = d.path().join("measurements_interprocess_reliable_summary.csv");
        let b = d.path().join("measurements_interprocess_reliable_shm_summary.csv");
        std::fs::write(&a, "Bytes,Median\n16,1.000\n32,2.000\n").unwrap();
        std::fs::write(&b, "Median,Bytes\n0.500,16\n").unwrap();

        let out = d.path().join("subexperiments.csv");
        let n = compare_subexperiments(&[&a, &b], &out).unwrap();
        assert_eq!(n, 3);

        let data = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = data.lines().collect();
        assert_eq!(lines, vec![
            "Bytes,Median,Sub-experiment",
            "16,1.000,interprocess_reliable",
            "32,2.000,interprocess_reliable",
            "16,0.500,interprocess_reliable_shm",
        ]);
    }

    #[test]
    fn subexperiments_validated_before_writing() {
        let d = tempfile::tempdir().unwrap();
        let a = d.path().join("measurements_interprocess_reliable_summary.csv");
        let b = d.path().join("measurements_interprocess_reliable_shm_summary.csv");
        std::fs::write(&a, "Bytes,Median\n16,1.000\n").unwrap();
        std::fs::write(&b, "Bytes,Max\n16,2.000\n").unwrap();

        let out = d.path().join("subexperiments.csv");
        let r = compare_subexperiments(&[&a, &b], &out);

        assert!(matches!(r, Err(Error::MissingColumn{ .. })));
        assert!(!out.exists());
    }

    #[test]
    fn unlisted_experiment_names() {
        let o = compare_reference("interprocess_reliable_fastdds", &[row(16, &[2.0])], &[row(16, &[2.0]), row(64, &[9.0])], &[Metric::Median], 0.1).unwrap();

        assert!(o.passed);
        assert_eq!(o.experiment, "interprocess_reliable_fastdds");
        assert_eq!(o.rows.len(), 1);
    }
}
