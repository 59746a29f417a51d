use std::path::{Path, PathBuf};

use common::{
    config::Settings,
    plot::{Plot, PlotTarget, ensure_plot_dir},
};
use eyre::{Context, Result};
use hyperfine::ResultSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod chart;
pub mod rows;

use chart::{ensure_format_supported, render_bar_chart, render_errorbar_chart};
use rows::{chart_data, derive_rows, errorbar_data};

const DEFAULT_SIZE: (u32, u32) = (1000, 600);

/// One bar chart per canonical command, bars per version and cache variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperfineBasic {
    pub width: u32,
    pub height: u32,
}

impl Default for HyperfineBasic {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
        }
    }
}

#[typetag::serde]
impl Plot for HyperfineBasic {
    fn name(&self) -> &'static str {
        "hyperfine-basic"
    }

    fn plot(
        &self,
        combined_path: &Path,
        plot_path: &Path,
        settings: &Settings,
    ) -> Result<Vec<PathBuf>> {
        ensure_format_supported(settings.format)?;
        let results = read_combined(combined_path)?;
        let rows = derive_rows(&results, settings)?;
        let charts = chart_data(&rows);
        debug!("Got {} commands", charts.len());
        if charts.is_empty() {
            return Ok(Vec::new());
        }

        ensure_plot_dir(plot_path)?;
        let mut written = Vec::with_capacity(charts.len());
        for data in &charts {
            let path = PlotTarget::new("plot", &data.command).path(plot_path, settings);
            render_bar_chart(data, &path, settings, (self.width, self.height))
                .wrap_err_with(|| format!("Render {}", path.display()))?;
            info!("Generated: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Mean and stddev per raw command as reported by hyperfine, one line per command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperfineErrorbar {
    pub width: u32,
    pub height: u32,
}

impl Default for HyperfineErrorbar {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
        }
    }
}

#[typetag::serde]
impl Plot for HyperfineErrorbar {
    fn name(&self) -> &'static str {
        "hyperfine-errorbar"
    }

    fn plot(
        &self,
        combined_path: &Path,
        plot_path: &Path,
        settings: &Settings,
    ) -> Result<Vec<PathBuf>> {
        ensure_format_supported(settings.format)?;
        let results = read_combined(combined_path)?;
        let charts = errorbar_data(&results, settings)?;
        debug!("Got {} commands", charts.len());
        if charts.is_empty() {
            return Ok(Vec::new());
        }

        ensure_plot_dir(plot_path)?;
        let mut written = Vec::with_capacity(charts.len());
        for data in &charts {
            let path = PlotTarget::new("errorbar", &data.command).path(plot_path, settings);
            render_errorbar_chart(data, &path, settings, (self.width, self.height))
                .wrap_err_with(|| format!("Render {}", path.display()))?;
            info!("Generated: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

pub fn read_combined(path: &Path) -> Result<ResultSet> {
    ResultSet::from_path(path).wrap_err("Read combined results")
}

/// Plots used when the config does not list any
pub fn default_plots() -> Vec<Box<dyn Plot>> {
    vec![Box::new(HyperfineBasic::default())]
}
