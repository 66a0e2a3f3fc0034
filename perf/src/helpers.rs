use std::path::{Path, PathBuf};

use log::debug;
use simplelog::{LevelFilter, SimpleLogger, TermLogger, TerminalMode};

use crate::error::Error;

/// Resolve a directory argument, creating it if missing and `create` is set
pub fn directory<P: AsRef<Path>>(path: P, create: bool) -> Result<PathBuf, Error> {
    let s = path.as_ref().to_string_lossy();
    let trimmed = match s.len() > 1 {
        true => s.trim_end_matches('/'),
        false => &s[..],
    };
    let dir = PathBuf::from(trimmed);

    if dir.is_dir() {
        return Ok(dir);
    }

    if !create {
        return Err(Error::NotADirectory(dir));
    }

    debug!("Creating directory {:?}", dir);
    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Initialise terminal logging, falling back to a plain logger
pub fn init_logging(level: LevelFilter) -> Result<(), anyhow::Error> {
    let log_config = simplelog::ConfigBuilder::new()
        .build();

    if let Err(_e) = TermLogger::init(level, log_config.clone(), TerminalMode::Mixed) {
        SimpleLogger::init(level, log_config)?;
    }

    Ok(())
}
