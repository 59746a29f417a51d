use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::plot::Plot;

pub const DEFAULT_COMBINED_FILE: &str = "combined_stats.json";
pub const DEFAULT_FILE_PATTERN: &str = r"^.+\.json$";
pub const DEFAULT_VERSION_PARAMETER: &str = "python_version";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub plots: Option<Vec<Box<dyn Plot>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory scanned for hyperfine `--export-json` files
    pub results_dir: PathBuf,
    /// File name of the combined artifact, relative to `results_dir`
    pub combined_file: String,
    /// Regex a file name has to match to be picked up as a result file
    pub file_pattern: String,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub theme: Theme,
    /// Default tracing level, overridden by `RUST_LOG`
    pub log: String,
    pub log_file: Option<PathBuf>,
    /// Key in a record's `parameters` holding the version plotted on the x-axis
    pub version_parameter: String,
    pub version_order: VersionOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("."),
            combined_file: DEFAULT_COMBINED_FILE.to_owned(),
            file_pattern: DEFAULT_FILE_PATTERN.to_owned(),
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            theme: Theme::default(),
            log: "warn".to_owned(),
            log_file: None,
            version_parameter: DEFAULT_VERSION_PARAMETER.to_owned(),
            version_order: VersionOrder::default(),
        }
    }
}

impl Settings {
    pub fn combined_path(&self) -> PathBuf {
        self.results_dir.join(&self.combined_file)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// How version strings are ordered along the x-axis
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    /// Dot separated numeric components, "3.9" < "3.10"
    #[default]
    Semantic,
    /// Plain string ordering, "3.10" < "3.9"
    Lexical,
}
