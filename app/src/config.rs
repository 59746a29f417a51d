use std::{fs::read_to_string, path::Path};

use common::config::Config;
use eyre::{Context, Result};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Loads the yaml config
///
/// Without an explicit path the default `config.yaml` is optional and every setting
/// falls back to its default. An explicitly named file has to exist.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    if !explicit && !path.exists() {
        return Ok(Config::default());
    }

    let content = read_to_string(path).context(format!("Reading {}", path.display()))?;
    let config = parse_config(&content).context(format!("Parsing {}", path.display()))?;
    debug!("Loaded config {:?} from {}", config.name, path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(serde_yml::from_str(content)?)
}
