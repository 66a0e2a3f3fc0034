//! CSV schemas shared with the benchmark executables and report consumers.

use serde::{Serialize, Serializer, Deserialize};

pub const PAYLOAD: &str = "Payload [Bytes]";
pub const LATENCY: &str = "Latency [us]";
pub const EXPERIMENT_TYPE: &str = "Experiment type";
pub const SUB_EXPERIMENT: &str = "Sub-experiment";

pub const CHECK_HEADER: [&str; 5] = ["Requirement", "Experiment", "Difference", "Percentage over requirement", "Status"];

/// Serialise floats with three decimals
pub fn fixed<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_float(*value))
}

pub fn format_float(value: f64) -> String {
    format!("{:.3}", value)
}

/// Single latency sample as output by the latency benchmark
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LatencySample {
    #[serde(rename = "Payload [Bytes]")]
    pub payload: u64,

    #[serde(rename = "Latency [us]")]
    pub latency: f64,
}

/// Per-payload latency summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LatencySummary {
    #[serde(rename = "Bytes")]
    pub bytes: u64,
    #[serde(rename = "Samples")]
    pub samples: usize,
    #[serde(rename = "Max", serialize_with = "fixed")]
    pub max: f64,
    #[serde(rename = "Min", serialize_with = "fixed")]
    pub min: f64,
    #[serde(rename = "Mean", serialize_with = "fixed")]
    pub mean: f64,
    #[serde(rename = "Median", serialize_with = "fixed")]
    pub median: f64,
    #[serde(rename = "Stdev", serialize_with = "fixed")]
    pub stdev: f64,
    #[serde(rename = "Mean jitter", serialize_with = "fixed")]
    pub mean_jitter: f64,
    #[serde(rename = "Max jitter", serialize_with = "fixed")]
    pub max_jitter: f64,
    #[serde(rename = "90%", serialize_with = "fixed")]
    pub p90: f64,
    #[serde(rename = "99%", serialize_with = "fixed")]
    pub p99: f64,
    #[serde(rename = "99.99%", serialize_with = "fixed")]
    pub p9999: f64,
}

/// Columns the throughput benchmark is required to output
pub const THROUGHPUT_COLUMNS: [&str; 6] = [
    PAYLOAD,
    "Sent [samples]",
    "Received [samples]",
    "Lost [samples]",
    "Publication throughput [Mb/s]",
    "Subscription throughput [Mb/s]",
];

/// Reference comparison entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    #[serde(rename = "Check")]
    pub check: String,
    #[serde(rename = "Bytes")]
    pub bytes: u64,
    #[serde(rename = "Reference", serialize_with = "fixed")]
    pub reference: f64,
    #[serde(rename = "Result", serialize_with = "fixed")]
    pub result: f64,
    #[serde(rename = "Fail threshold", serialize_with = "fixed")]
    pub fail_threshold: f64,
    #[serde(rename = "Comparison")]
    pub comparison: String,
}
