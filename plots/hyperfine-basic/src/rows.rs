use std::fmt;

use common::{
    config::Settings,
    util::{compare_versions, mean, stddev, title_case},
};
use eyre::{ContextCompat, Result};
use hyperfine::{ResultRecord, ResultSet};
use itertools::Itertools;
use tracing::{debug, warn};

/// Separates the canonical command from its variant suffix, ie. `import-with-cache`
pub const COMMAND_SEPARATOR: char = '-';

/// Known command variants, encoded as a suffix after [`COMMAND_SEPARATOR`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Baseline,
    WithCache,
}

impl Variant {
    const SUFFIXES: &'static [(&'static str, Variant)] = &[("with-cache", Variant::WithCache)];

    /// Variant whose marker ends `raw`, after a separator
    pub fn from_command(raw: &str) -> Option<Self> {
        Self::SUFFIXES
            .iter()
            .find(|(known, _)| {
                raw.strip_suffix(known)
                    .is_some_and(|rest| rest.ends_with(COMMAND_SEPARATOR))
            })
            .map(|(_, variant)| *variant)
    }

    pub fn with_cache(&self) -> bool {
        matches!(self, Variant::WithCache)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variant::Baseline => "without cache",
            Variant::WithCache => "with cache",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Splits a raw hyperfine command name into its canonical command and variant
///
/// The variant is found by its marker at the end of the raw command, so
/// `import-numpy-with-cache` is still [`Variant::WithCache`]. Everything after the
/// first separator is dropped from the canonical command. A suffix without a known
/// marker is reported and treated as [`Variant::Baseline`].
pub fn parse_command(raw: &str) -> (&str, Variant) {
    let Some((command, suffix)) = raw.split_once(COMMAND_SEPARATOR) else {
        return (raw, Variant::Baseline);
    };
    match Variant::from_command(raw) {
        Some(variant) => (command, variant),
        None => {
            warn!("Unknown variant {suffix:?} in command {raw:?}, treating it as baseline");
            (command, Variant::Baseline)
        }
    }
}

/// One timing sample of a record, the unit the bar charts aggregate over
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub command: String,
    pub variant: Variant,
    pub version: String,
    pub time: f64,
}

impl DerivedRow {
    pub fn with_cache(&self) -> bool {
        self.variant.with_cache()
    }
}

/// One row per element of `times`, all sharing the record's command, variant and version
pub fn explode(record: &ResultRecord, version_parameter: &str) -> Result<Vec<DerivedRow>> {
    let version = record.parameter(version_parameter).context(format!(
        "Missing parameter {version_parameter:?} for command {:?}",
        record.command
    ))?;
    let (command, variant) = parse_command(&record.command);
    Ok(record
        .times
        .iter()
        .map(|time| DerivedRow {
            command: command.to_owned(),
            variant,
            version: version.to_owned(),
            time: *time,
        })
        .collect())
}

/// Explodes every record and sorts the rows by `(version, command)`
pub fn derive_rows(results: &ResultSet, settings: &Settings) -> Result<Vec<DerivedRow>> {
    let mut rows = Vec::new();
    for record in &results.results {
        rows.extend(explode(record, &settings.version_parameter)?);
    }
    rows.sort_by(|a, b| {
        compare_versions(&a.version, &b.version, settings.version_order)
            .then_with(|| a.command.cmp(&b.command))
    });
    debug!("Derived {} rows from {} records", rows.len(), results.len());
    Ok(rows)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
}

impl Bar {
    fn from_samples(samples: &[f64]) -> Option<Self> {
        Some(Bar {
            mean: mean(samples)?,
            stddev: stddev(samples)?,
            samples: samples.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub variant: Variant,
    /// Aligned with [`ChartData::versions`], `None` where the variant has no samples
    pub bars: Vec<Option<Bar>>,
}

/// Everything needed to draw the chart of one canonical command
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub command: String,
    pub title: String,
    pub versions: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    /// `rows` must already be in plotting order, see [`derive_rows`]
    pub fn from_rows(command: &str, rows: &[&DerivedRow]) -> Self {
        let versions = rows
            .iter()
            .map(|row| row.version.clone())
            .unique()
            .collect::<Vec<_>>();
        let series = rows
            .iter()
            .map(|row| row.variant)
            .unique()
            .sorted()
            .map(|variant| Series {
                variant,
                bars: versions
                    .iter()
                    .map(|version| {
                        let samples = rows
                            .iter()
                            .filter(|row| row.variant == variant && row.version == *version)
                            .map(|row| row.time)
                            .collect::<Vec<_>>();
                        Bar::from_samples(&samples)
                    })
                    .collect(),
            })
            .collect();

        ChartData {
            command: command.to_owned(),
            title: title_case(command),
            versions,
            series,
        }
    }

    /// More than one variant, drawn as side by side bars with a legend
    pub fn is_grouped(&self) -> bool {
        self.series.len() > 1
    }

    /// Top of the tallest whisker
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|series| series.bars.iter().flatten())
            .map(|bar| bar.mean + bar.stddev)
            .fold(0.0, f64::max)
    }
}

/// One chart per distinct canonical command, ordered by command
pub fn chart_data(rows: &[DerivedRow]) -> Vec<ChartData> {
    rows.iter()
        .map(|row| row.command.as_str())
        .unique()
        .sorted()
        .map(|command| {
            let group = rows
                .iter()
                .filter(|row| row.command == command)
                .collect::<Vec<_>>();
            ChartData::from_rows(command, &group)
        })
        .collect()
}

/// A record's own mean and stddev, the legacy errorbar plot's data points
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorbarPoint {
    pub version: String,
    pub mean: f64,
    pub stddev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorbarData {
    pub command: String,
    pub points: Vec<ErrorbarPoint>,
}

impl ErrorbarData {
    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.mean + point.stddev)
            .fold(0.0, f64::max)
    }
}

/// Groups records by their raw command, points sorted by version
///
/// A lone record keeps the mean and stddev hyperfine reported. Records sharing a raw
/// command and version are merged into one point whose stats are taken over their
/// pooled `times`.
pub fn errorbar_data(results: &ResultSet, settings: &Settings) -> Result<Vec<ErrorbarData>> {
    let mut grouped = Vec::with_capacity(results.len());
    for record in &results.results {
        let version = record
            .parameter(&settings.version_parameter)
            .context(format!(
                "Missing parameter {:?} for command {:?}",
                settings.version_parameter, record.command
            ))?;
        grouped.push(((record.command.as_str(), version), record));
    }

    Ok(grouped
        .into_iter()
        .into_group_map()
        .into_iter()
        .map(|((command, version), records)| (command, errorbar_point(version, &records)))
        .into_group_map()
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .map(|(command, mut points)| {
            points.sort_by(|a, b| compare_versions(&a.version, &b.version, settings.version_order));
            ErrorbarData {
                command: command.to_owned(),
                points,
            }
        })
        .collect())
}

fn errorbar_point(version: &str, records: &[&ResultRecord]) -> ErrorbarPoint {
    if let [record] = records {
        return ErrorbarPoint {
            version: version.to_owned(),
            mean: record.mean,
            stddev: record.stddev.unwrap_or(0.0),
        };
    }
    debug!("Merging {} records for version {version}", records.len());
    let times = records
        .iter()
        .flat_map(|record| record.times.iter().copied())
        .collect::<Vec<_>>();
    ErrorbarPoint {
        version: version.to_owned(),
        mean: mean(&times).unwrap_or(0.0),
        stddev: stddev(&times).unwrap_or(0.0),
    }
}
