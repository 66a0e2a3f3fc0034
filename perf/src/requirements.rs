//! Requirement derivation from historical benchmark runs.
//!
//! Each requirement is the configured percentile (99 by default) of a checked
//! metric across every historical run sharing an experiment type and payload.
//! Derivation is deterministic: experiment types are visited in declaration
//! order and payloads in order of first appearance, so an unchanged corpus
//! always produces an identical requirements file.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use log::{debug, info};

use crate::error::Error;
use crate::experiment::ExperimentType;
use crate::metric::Kind;
use crate::results::{column_index, parse_payload, parse_cell, Corpus, MetricRow};
use crate::schema::{format_float, EXPERIMENT_TYPE};
use crate::stats;

/// Requirement thresholds for one experiment type and payload
#[derive(Clone, Debug, PartialEq)]
pub struct Requirement {
    pub experiment: ExperimentType,
    pub row: MetricRow,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RequirementsTable {
    pub kind: Kind,
    pub rows: Vec<Requirement>,
}

/// Derive a requirements table from a corpus of historical summaries
pub fn derive(corpus: &Corpus, kind: Kind, percentile: f64) -> Result<RequirementsTable, Error> {
    let mut rows = vec![];

    for (t, runs) in corpus {
        let payloads: Vec<_> = runs.iter().map(|r| r.row.payload).unique().collect();

        for payload in payloads {
            let matching: Vec<_> = runs.iter()
                .filter(|r| r.row.payload == payload)
                .collect();

            let values = (0..kind.checks().len()).map(|i| {
                let column: Vec<_> = matching.iter().map(|r| r.row.values[i]).collect();
                stats::percentile(&column, percentile)
            }).collect::<Result<Vec<_>, _>>()?;

            debug!("Requirements for {} {} bytes from {} runs: {:?}", t, payload, matching.len(), values);

            rows.push(Requirement {
                experiment: *t,
                row: MetricRow{ payload, values },
            });
        }
    }

    info!("Derived {} requirements", rows.len());

    Ok(RequirementsTable{ kind, rows })
}

impl RequirementsTable {
    /// Requirement rows for a single experiment type
    pub fn for_experiment(&self, experiment: ExperimentType) -> Vec<MetricRow> {
        self.rows.iter()
            .filter(|r| r.experiment == experiment)
            .map(|r| r.row.clone())
            .collect()
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![EXPERIMENT_TYPE.to_string(), self.kind.payload_column().to_string()];
        header.extend(self.kind.checks().iter().map(|m| m.column()));
        header
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<(), Error> {
        let mut w = csv::Writer::from_writer(w);

        w.write_record(self.header())?;

        for r in &self.rows {
            let mut record = vec![r.experiment.to_string(), r.row.payload.to_string()];
            record.extend(r.row.values.iter().map(|v| format_float(*v)));
            w.write_record(record)?;
        }

        w.flush()?;

        Ok(())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let f = std::fs::File::create(path.as_ref())?;
        self.to_writer(f)
    }

    /// Load a requirements file, rejecting unsupported types and duplicated rows
    pub fn read_csv<P: AsRef<Path>>(path: P, kind: Kind) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut r = csv::Reader::from_path(path)?;
        let headers = r.headers()?.clone();

        let type_index = column_index(&headers, EXPERIMENT_TYPE, path)?;
        let payload_col = kind.payload_column();
        let payload_index = column_index(&headers, payload_col, path)?;
        let metric_index = kind.checks().iter()
            .map(|m| column_index(&headers, &m.column(), path).map(|i| (m.column(), i)) )
            .collect::<Result<Vec<_>, _>>()?;

        let location = path.display().to_string();
        let mut seen = HashSet::new();
        let mut rows = vec![];

        for record in r.records() {
            let record = record?;

            let name = record.get(type_index).unwrap_or("").trim();
            let experiment = ExperimentType::parse(name, &location)?;
            let payload = parse_payload(&record, payload_index, payload_col, path)?;

            if !seen.insert((experiment, payload)) {
                return Err(Error::DuplicateRow {
                    what: "requirement",
                    experiment: experiment.to_string(),
                    payload,
                    count: 2,
                });
            }

            let values = metric_index.iter()
                .map(|(c, i)| parse_cell(&record, *i, c, path) )
                .collect::<Result<Vec<f64>, _>>()?;

            rows.push(Requirement{ experiment, row: MetricRow{ payload, values } });
        }

        Ok(Self{ kind, rows })
    }
}
