use std::path::Path;

use log::debug;
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

use crate::error::Error;

/// Analysis configuration, loaded from an optional TOML file
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Percentile of the historical corpus used as requirement
    pub requirement_percentile: f64,

    /// Allowed excess over the reference when comparing runs, base 1
    pub fail_threshold: f64,

    /// File name fragment identifying summary files
    pub summary_marker: String,

    /// Handling of checks against a zero requirement
    pub zero_requirement: ZeroRequirement,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            requirement_percentile: 99.0,
            fail_threshold: 0.1,
            summary_marker: "summary".to_string(),
            zero_requirement: ZeroRequirement::Fallback,
        }
    }
}

impl Config {
    /// Load configuration from `path`, using defaults if the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Loading config from {:?}", path);
        let data = std::fs::read_to_string(path)?;
        let config = toml::from_str(&data)?;

        Ok(config)
    }
}

/// Percentage computation when the requirement is zero
#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize, EnumString, Display, EnumVariantNames)]
#[strum(serialize_all = "kebab_case")]
#[serde(rename_all = "lowercase")]
pub enum ZeroRequirement {
    /// Use the absolute difference times 100 as percentage
    Fallback,
    /// Abort the check
    Error,
}
