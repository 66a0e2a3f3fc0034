//! Loading of benchmark output and summary files.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::StringRecord;
use itertools::Itertools;
use log::{debug, info};

use crate::error::Error;
use crate::experiment::{experiment_type, ExperimentType};
use crate::metric::{Kind, Metric};
use crate::schema::{LatencySample, THROUGHPUT_COLUMNS, PAYLOAD, LATENCY};

/// Payload and checked metric values of one summary or requirement row,
/// values are ordered as `Kind::checks`
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRow {
    pub payload: u64,
    pub values: Vec<f64>,
}

/// Summary row tagged with the run it was loaded from
#[derive(Clone, Debug, PartialEq)]
pub struct RunRow {
    pub run: String,
    pub row: MetricRow,
}

/// Historical summaries grouped by experiment type
pub type Corpus = BTreeMap<ExperimentType, Vec<RunRow>>;

pub(crate) fn column_index(headers: &StringRecord, column: &str, path: &Path) -> Result<usize, Error> {
    headers.iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::MissingColumn { column: column.to_string(), path: path.to_path_buf() })
}

pub(crate) fn parse_cell<T: FromStr>(record: &StringRecord, index: usize, column: &str, path: &Path) -> Result<T, Error> {
    let v = record.get(index).unwrap_or("").trim();

    v.parse().map_err(|_| Error::InvalidValue {
        column: column.to_string(),
        value: v.to_string(),
        path: path.to_path_buf(),
    })
}

/// Payloads are integers, but tolerate `16.0` style cells
pub(crate) fn parse_payload(record: &StringRecord, index: usize, column: &str, path: &Path) -> Result<u64, Error> {
    if let Ok(v) = parse_cell::<u64>(record, index, column, path) {
        return Ok(v);
    }

    let v: f64 = parse_cell(record, index, column, path)?;
    if v < 0.0 || v.fract() != 0.0 {
        return Err(Error::InvalidValue {
            column: column.to_string(),
            value: v.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(v as u64)
}

/// The single row for `payload`, missing and repeated rows are errors
pub(crate) fn single_row<'a, E: Display>(rows: &'a [MetricRow], payload: u64, what: &'static str, experiment: E) -> Result<&'a MetricRow, Error> {
    let mut matching = rows.iter().filter(|r| r.payload == payload);

    match (matching.next(), matching.count()) {
        (Some(r), 0) => Ok(r),
        (None, _) => Err(Error::MissingPayload { what, experiment: experiment.to_string(), payload }),
        (Some(_), n) => Err(Error::DuplicateRow { what, experiment: experiment.to_string(), payload, count: n + 1 }),
    }
}

/// Read payload and checked metric columns from a summary or requirements file
pub fn read_metric_rows<P: AsRef<Path>>(path: P, kind: Kind) -> Result<Vec<MetricRow>, Error> {
    read_columns(path, kind.payload_column(), kind.checks())
}

/// Read the payload column and the named metric columns, values are ordered
/// as `metrics`
pub fn read_columns<P: AsRef<Path>>(path: P, payload_col: &str, metrics: &[Metric]) -> Result<Vec<MetricRow>, Error> {
    let path = path.as_ref();
    let mut r = csv::Reader::from_path(path)?;
    let headers = r.headers()?.clone();

    let payload_index = column_index(&headers, payload_col, path)?;

    let metric_index = metrics.iter()
        .map(|m| column_index(&headers, &m.column(), path).map(|i| (m.column(), i)) )
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = vec![];
    for record in r.records() {
        let record = record?;

        let payload = parse_payload(&record, payload_index, payload_col, path)?;
        let values = metric_index.iter()
            .map(|(c, i)| parse_cell(&record, *i, c, path) )
            .collect::<Result<Vec<f64>, _>>()?;

        rows.push(MetricRow{ payload, values });
    }

    Ok(rows)
}

/// List files in `dir` containing `marker` in their name, sorted by name
pub fn summary_files<P: AsRef<Path>>(dir: P, marker: &str) -> Result<Vec<PathBuf>, Error> {
    let mut files = vec![];

    for e in std::fs::read_dir(dir.as_ref())? {
        let p = e?.path();
        if !p.is_file() {
            continue;
        }

        let matches = p.file_name()
            .map(|n| n.to_string_lossy().contains(marker))
            .unwrap_or(false);
        if matches {
            files.push(p);
        }
    }

    files.sort();
    Ok(files)
}

/// List per-run result directories, sorted by name
pub fn run_directories<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, Error> {
    let mut dirs = vec![];

    for e in std::fs::read_dir(dir.as_ref())? {
        let p = e?.path();
        if p.is_dir() {
            dirs.push(p);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Load every run's summaries below `dir`, grouped by experiment type
pub fn load_corpus<P: AsRef<Path>>(dir: P, kind: Kind, marker: &str) -> Result<Corpus, Error> {
    let mut corpus = Corpus::new();

    for run_dir in run_directories(dir)? {
        let run = run_dir.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let files = summary_files(&run_dir, marker)?;
        debug!("Summaries for {}: {:?}", run, files);

        for f in files {
            // Unsupported types abort the whole derivation
            let t = experiment_type(&f)?;

            debug!("Loading {:?} ({})", f, t);
            let rows = read_metric_rows(&f, kind)?;

            corpus.entry(t)
                .or_insert_with(Vec::new)
                .extend(rows.into_iter().map(|row| RunRow{ run: run.clone(), row }));
        }
    }

    info!("Loaded {} experiment types", corpus.len());

    Ok(corpus)
}

/// Read raw latency samples, grouped by payload in order of first appearance
pub fn read_latency_samples<P: AsRef<Path>>(path: P) -> Result<Vec<(u64, Vec<f64>)>, Error> {
    let path = path.as_ref();
    let mut r = csv::Reader::from_path(path)?;

    let headers = r.headers()?.clone();
    column_index(&headers, PAYLOAD, path)?;
    column_index(&headers, LATENCY, path)?;

    let samples = r.deserialize::<LatencySample>()
        .collect::<Result<Vec<_>, _>>()?;

    let payloads: Vec<_> = samples.iter().map(|s| s.payload).unique().collect();

    let grouped = payloads.iter().map(|p| {
        let series = samples.iter()
            .filter(|s| s.payload == *p)
            .map(|s| s.latency)
            .collect();
        (*p, series)
    }).collect();

    Ok(grouped)
}

/// Raw throughput benchmark output
#[derive(Clone, Debug)]
pub struct ThroughputTable {
    pub path: PathBuf,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl ThroughputTable {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut r = csv::Reader::from_path(path)?;

        let headers = r.headers()?.clone();
        for c in THROUGHPUT_COLUMNS.iter() {
            column_index(&headers, c, path)?;
        }

        let records = r.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self { path: path.to_path_buf(), headers, records })
    }

    pub fn index(&self, column: &str) -> Result<usize, Error> {
        column_index(&self.headers, column, &self.path)
    }
}
