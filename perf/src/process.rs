//! Reduction of raw benchmark output to per-payload summaries.

use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use log::{debug, info};

use crate::error::Error;
use crate::results::{parse_cell, parse_payload, read_latency_samples, ThroughputTable};
use crate::schema::{LatencySummary, PAYLOAD};
use crate::metric::Metric;
use crate::stats::summarise_latency;

/// Summarise raw latency samples, one row per payload in order of appearance
pub fn latency_summaries<P: AsRef<Path>>(raw: P) -> Result<Vec<LatencySummary>, Error> {
    let raw = raw.as_ref();

    let grouped = read_latency_samples(raw)?;
    debug!("Loaded {} payloads from {:?}", grouped.len(), raw);

    grouped.iter()
        .map(|(payload, samples)| summarise_latency(*payload, samples))
        .collect()
}

pub fn write_latency_summaries<W: Write>(summaries: &[LatencySummary], w: W) -> Result<(), Error> {
    let mut w = csv::Writer::from_writer(w);

    for s in summaries {
        w.serialize(s)?;
    }

    w.flush()?;

    Ok(())
}

/// Process a raw latency CSV into a summary CSV
pub fn process_latency(raw: &Path, output: &Path) -> Result<Vec<LatencySummary>, Error> {
    let summaries = latency_summaries(raw)?;

    let f = std::fs::File::create(output)?;
    write_latency_summaries(&summaries, f)?;

    info!("Latency summary for {:?} saved in {:?}", raw, output);

    Ok(summaries)
}

impl ThroughputTable {
    /// Keep, per payload, the first row with the maximum subscription
    /// throughput. Payloads are reported in order of appearance.
    pub fn max_throughput(&self) -> Result<ThroughputTable, Error> {
        let payload_index = self.index(PAYLOAD)?;
        let column = Metric::SubscriptionThroughput.column();
        let throughput_index = self.index(&column)?;

        let mut parsed = vec![];
        for r in &self.records {
            let payload = parse_payload(r, payload_index, PAYLOAD, &self.path)?;
            let throughput: f64 = parse_cell(r, throughput_index, &column, &self.path)?;
            parsed.push((payload, throughput, r));
        }

        let payloads: Vec<_> = parsed.iter().map(|(p, _, _)| *p).unique().collect();

        let mut records = vec![];
        for payload in payloads {
            let mut best: Option<(f64, &csv::StringRecord)> = None;

            for (p, t, r) in &parsed {
                if *p != payload {
                    continue;
                }
                match best {
                    Some((b, _)) if *t <= b => (),
                    _ => best = Some((*t, *r)),
                }
            }

            if let Some((t, r)) = best {
                debug!("Max throughput for {} bytes: {}", payload, t);
                records.push(r.clone());
            }
        }

        Ok(ThroughputTable {
            path: self.path.clone(),
            headers: self.headers.clone(),
            records,
        })
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<(), Error> {
        let mut w = csv::Writer::from_writer(w);

        w.write_record(&self.headers)?;
        for r in &self.records {
            w.write_record(r)?;
        }

        w.flush()?;

        Ok(())
    }
}

/// Process a raw throughput CSV into a summary CSV
pub fn process_throughput(raw: &Path, output: &Path) -> Result<ThroughputTable, Error> {
    let table = ThroughputTable::read(raw)?;
    let summary = table.max_throughput()?;

    let f = std::fs::File::create(output)?;
    summary.to_writer(f)?;

    info!("Throughput summary for {:?} saved in {:?}", raw, output);

    Ok(summary)
}
