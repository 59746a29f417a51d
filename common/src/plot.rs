use core::fmt::Debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result};
use tracing::debug;

use crate::config::Settings;

#[typetag::serde(tag = "type")]
pub trait Plot: Debug + DynClone + Send + Sync {
    /// Name of the plot, for identification in logs
    fn name(&self) -> &'static str;
    /// Plots the data
    ///
    /// Arguments:
    /// * `combined_path` - The combined results file, ie. combined_stats.json
    /// * `plot_path` - Directory the charts are written to
    /// * `settings` - The settings from the config yaml
    ///
    /// Returns every file that was written.
    fn plot(
        &self,
        combined_path: &Path,
        plot_path: &Path,
        settings: &Settings,
    ) -> Result<Vec<PathBuf>>;
}
clone_trait_object!(Plot);

/// Where a chart for a single key ends up, ie. `plot_import.svg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotTarget {
    pub prefix: &'static str,
    pub key: String,
}

impl PlotTarget {
    pub fn new(prefix: &'static str, key: impl Into<String>) -> Self {
        Self {
            prefix,
            key: key.into(),
        }
    }

    pub fn path(&self, plot_path: &Path, settings: &Settings) -> PathBuf {
        plot_path.join(format!(
            "{}_{}.{}",
            self.prefix,
            sanitize_file_stem(&self.key),
            settings.format.extension()
        ))
    }
}

/// Keeps `[A-Za-z0-9._-]`, everything else becomes `_`
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn ensure_plot_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).context(format!("Create plot dir {}", dir.display()))?;
    }
    Ok(())
}

/// Runs every configured plot in order, stopping at the first failure
pub fn plot(
    plots: &Option<Vec<Box<dyn Plot>>>,
    combined_path: &Path,
    plot_path: &Path,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    let Some(plots) = plots else {
        debug!("No plots");
        return Ok(Vec::new());
    };

    ensure_plot_dir(plot_path)?;
    let mut written = Vec::new();
    for plot in plots {
        debug!("Running plot {}", plot.name());
        let files = plot
            .plot(combined_path, plot_path, settings)
            .wrap_err_with(|| format!("Plot {}", plot.name()))?;
        written.extend(files);
    }
    Ok(written)
}
