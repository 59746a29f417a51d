use std::path::Path;

use common::config::{OutputFormat, Settings, Theme};
use eyre::{Result, bail};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::rows::{ChartData, ErrorbarData, Variant};

const TITLE_FONT_SIZE: u32 = 36;
const AXIS_LABEL_FONT_SIZE: u32 = 24;
const TICK_LABEL_FONT_SIZE: u32 = 18;
const LEGEND_FONT_SIZE: u32 = 18;
const DATA_LABEL_FONT_SIZE: u32 = 14;

const X_LABEL_AREA_SIZE: u32 = 60;
const Y_LABEL_AREA_SIZE: u32 = 80;
const GROUP_WIDTH: f64 = 0.8;
const BAR_GAP: f64 = 0.02;
const CAP_WIDTH: u32 = 10;
/// Headroom above the tallest whisker for the value labels
const Y_HEADROOM: f64 = 1.15;

pub const X_DESC: &str = "Python Version";
pub const Y_DESC: &str = "Time (s)";

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub grid: RGBColor,
    pub series: [RGBColor; 2],
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: WHITE,
                foreground: BLACK,
                grid: RGBColor(220, 220, 220),
                series: [RGBColor(66, 133, 244), RGBColor(251, 188, 5)],
            },
            Theme::Dark => Palette {
                background: RGBColor(30, 30, 30),
                foreground: RGBColor(230, 230, 230),
                grid: RGBColor(70, 70, 70),
                series: [RGBColor(129, 180, 255), RGBColor(255, 167, 38)],
            },
        }
    }

    pub fn variant_color(&self, variant: Variant) -> RGBColor {
        match variant {
            Variant::Baseline => self.series[0],
            Variant::WithCache => self.series[1],
        }
    }
}

/// PNG output needs a font rasterizer, only available with the `ttf` feature
pub fn ensure_format_supported(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Svg => Ok(()),
        OutputFormat::Png if cfg!(feature = "ttf") => Ok(()),
        OutputFormat::Png => bail!("PNG output requires building with the `ttf` feature"),
    }
}

pub fn render_bar_chart(
    data: &ChartData,
    path: &Path,
    settings: &Settings,
    size: (u32, u32),
) -> Result<()> {
    let palette = Palette::for_theme(settings.theme);
    match settings.format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_bar_chart(&root, data, &palette)?;
            root.present()?;
        }
        #[cfg(feature = "ttf")]
        OutputFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_bar_chart(&root, data, &palette)?;
            root.present()?;
        }
        #[cfg(not(feature = "ttf"))]
        OutputFormat::Png => ensure_format_supported(OutputFormat::Png)?,
    }
    Ok(())
}

pub fn render_errorbar_chart(
    data: &ErrorbarData,
    path: &Path,
    settings: &Settings,
    size: (u32, u32),
) -> Result<()> {
    let palette = Palette::for_theme(settings.theme);
    match settings.format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_errorbar_chart(&root, data, &palette)?;
            root.present()?;
        }
        #[cfg(feature = "ttf")]
        OutputFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_errorbar_chart(&root, data, &palette)?;
            root.present()?;
        }
        #[cfg(not(feature = "ttf"))]
        OutputFormat::Png => ensure_format_supported(OutputFormat::Png)?,
    }
    Ok(())
}

fn y_upper(max_value: f64) -> f64 {
    let upper = max_value * Y_HEADROOM;
    if upper.is_finite() && upper > 0.0 {
        upper
    } else {
        1.0
    }
}

fn version_label(versions: &[String], x: f64) -> String {
    let idx = x.round();
    if idx >= 0.0 && (x - idx).abs() < 0.3 {
        versions.get(idx as usize).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}

fn format_seconds(value: f64) -> String {
    format!("{value:.3}")
}

fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &ChartData,
    palette: &Palette,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&palette.background)?;

    let num_versions = data.versions.len();
    let num_series = data.series.len();
    let y_max = y_upper(data.max_value());

    let mut chart = ChartBuilder::on(root)
        .caption(
            &data.title,
            ("sans-serif", TITLE_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .margin(20)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(-0.5..(num_versions as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_versions)
        .x_label_formatter(&|x| version_label(&data.versions, *x))
        .y_desc(Y_DESC)
        .x_desc(X_DESC)
        .axis_style(palette.foreground)
        .bold_line_style(palette.grid)
        .light_line_style(palette.grid.mix(0.4))
        .label_style(
            ("sans-serif", TICK_LABEL_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .axis_desc_style(
            ("sans-serif", AXIS_LABEL_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .draw()?;

    let bar_width = GROUP_WIDTH / num_series.max(1) as f64;
    let bar_span = |series_idx: usize, version_idx: usize| {
        let x_center = version_idx as f64;
        let x_offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;
        (
            x_center + x_offset - bar_width / 2.0 + BAR_GAP,
            x_center + x_offset + bar_width / 2.0 - BAR_GAP,
        )
    };

    for (series_idx, series) in data.series.iter().enumerate() {
        let color = palette.variant_color(series.variant);
        let bars = series
            .bars
            .iter()
            .enumerate()
            .filter_map(|(version_idx, bar)| bar.map(|bar| (version_idx, bar)))
            .collect::<Vec<_>>();

        let anno = chart.draw_series(bars.iter().map(|(version_idx, bar)| {
            let (x_left, x_right) = bar_span(series_idx, *version_idx);
            Rectangle::new([(x_left, 0.0), (x_right, bar.mean)], color.filled())
        }))?;
        if data.is_grouped() {
            anno.label(series.variant.label()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled())
            });
        }

        chart.draw_series(bars.iter().map(|(version_idx, bar)| {
            let (x_left, x_right) = bar_span(series_idx, *version_idx);
            ErrorBar::new_vertical(
                (x_left + x_right) / 2.0,
                (bar.mean - bar.stddev).max(0.0),
                bar.mean,
                bar.mean + bar.stddev,
                palette.foreground.stroke_width(2),
                CAP_WIDTH,
            )
        }))?;

        if data.is_grouped() {
            chart.draw_series(bars.iter().map(|(version_idx, bar)| {
                let (x_left, x_right) = bar_span(series_idx, *version_idx);
                Text::new(
                    format_seconds(bar.mean),
                    ((x_left + x_right) / 2.0, bar.mean),
                    ("sans-serif", DATA_LABEL_FONT_SIZE)
                        .into_font()
                        .color(&palette.foreground)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )
            }))?;
        }
    }

    if data.is_grouped() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(palette.background.mix(0.8))
            .border_style(palette.foreground)
            .label_font(
                ("sans-serif", LEGEND_FONT_SIZE)
                    .into_font()
                    .color(&palette.foreground),
            )
            .draw()?;
    }

    Ok(())
}

fn draw_errorbar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &ErrorbarData,
    palette: &Palette,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&palette.background)?;

    let versions = data
        .points
        .iter()
        .map(|point| point.version.clone())
        .collect::<Vec<_>>();
    let num_versions = versions.len();
    let y_max = y_upper(data.max_value());
    let color = palette.series[0];

    let mut chart = ChartBuilder::on(root)
        .caption(
            &data.command,
            ("sans-serif", TITLE_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .margin(20)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(-0.5..(num_versions as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_versions)
        .x_label_formatter(&|x| version_label(&versions, *x))
        .y_desc(Y_DESC)
        .x_desc(X_DESC)
        .axis_style(palette.foreground)
        .bold_line_style(palette.grid)
        .light_line_style(palette.grid.mix(0.4))
        .label_style(
            ("sans-serif", TICK_LABEL_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .axis_desc_style(
            ("sans-serif", AXIS_LABEL_FONT_SIZE)
                .into_font()
                .color(&palette.foreground),
        )
        .draw()?;

    chart.draw_series(LineSeries::new(
        data.points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx as f64, point.mean)),
        color.stroke_width(2),
    ))?;
    chart.draw_series(data.points.iter().enumerate().map(|(idx, point)| {
        ErrorBar::new_vertical(
            idx as f64,
            (point.mean - point.stddev).max(0.0),
            point.mean,
            point.mean + point.stddev,
            color.filled(),
            CAP_WIDTH,
        )
    }))?;

    Ok(())
}
