use std::path::Path;
use std::str::FromStr;

use strum_macros::{Display, EnumString, EnumVariantNames};

use crate::error::Error;

/// Transport and QoS combinations exercised by the benchmark suite
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, EnumString, Display, EnumVariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum ExperimentType {
    InterprocessBestEffort,
    InterprocessBestEffortShm,
    InterprocessBestEffortSecurity,
    InterprocessBestEffortShmSecurity,
    InterprocessBestEffortTcp,
    InterprocessBestEffortTcpSecurity,
    InterprocessReliable,
    InterprocessReliableShm,
    InterprocessReliableSecurity,
    InterprocessReliableShmSecurity,
    InterprocessReliableTcp,
    InterprocessReliableTcpSecurity,
    IntraprocessBestEffort,
    IntraprocessReliable,
}

impl ExperimentType {
    /// Parse an experiment name, `location` is reported if it is not supported
    pub fn parse(name: &str, location: &str) -> Result<Self, Error> {
        ExperimentType::from_str(name).map_err(|_| Error::UnsupportedExperiment {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

/// Fetch the experiment name from a `<prefix>_<experiment>_<suffix>.<ext>` file name,
/// for example `measurements_interprocess_reliable_tcp_summary.csv`
pub fn experiment_name<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let path = path.as_ref();

    let stem = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_path_buf()))?;

    let parts: Vec<_> = stem.split('_').collect();
    if parts.len() < 3 {
        return Err(Error::InvalidFileName(path.to_path_buf()));
    }

    Ok(parts[1..parts.len() - 1].join("_"))
}

/// Fetch and validate the experiment type of a summary file
pub fn experiment_type<P: AsRef<Path>>(path: P) -> Result<ExperimentType, Error> {
    let path = path.as_ref();
    let name = experiment_name(path)?;

    let location = path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    ExperimentType::parse(&name, &location)
}
