//! Multi-axis forecast chart rendered with tiny-skia.
//!
//! One shared category axis of hourly buckets, three fixed-range value
//! axes, and the wind-arrow overlay on top. Text (tick labels, axis
//! titles, tooltips) is left to the page that hosts the image; the chart
//! exposes the geometry needed to place it.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tiny_skia::{FillRule, PathBuilder, Pixmap, Rect, Stroke, Transform};
use wxc_core::ChartConfig;
use wxc_weather::{ForecastSeries, Variable};

use crate::dataset::{standard_datasets, Axis, Dataset, DatasetKind, Rgba};
use crate::error::ChartError;
use crate::labels::{format_labels, grid_color};
use crate::overlay::WindArrows;
use crate::tooltip::Tooltip;

const PADDING_LEFT: f32 = 8.0;
const PADDING_RIGHT: f32 = 8.0;
const PADDING_TOP: f32 = 8.0;
const PADDING_BOTTOM: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    /// Draw the wind-direction overlay
    pub wind_direction_arrows: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 150,
            background: Rgba::rgb(0x1e, 0x1e, 0x1e),
            wind_direction_arrows: true,
        }
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            wind_direction_arrows: config.wind_direction_arrows,
            ..Self::default()
        }
    }
}

/// Rectangle the series are drawn into, with the scale mappings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Number of time buckets
    pub buckets: usize,
}

impl PlotArea {
    fn new(options: &ChartOptions, buckets: usize) -> Self {
        Self {
            left: PADDING_LEFT,
            top: PADDING_TOP,
            width: (options.width as f32 - PADDING_LEFT - PADDING_RIGHT).max(1.0),
            height: (options.height as f32 - PADDING_TOP - PADDING_BOTTOM).max(1.0),
            buckets,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn bucket_width(&self) -> f32 {
        self.width / self.buckets.max(1) as f32
    }

    /// Horizontal centre of bucket `index`
    pub fn x_center(&self, index: usize) -> f32 {
        self.left + (index as f32 + 0.5) * self.bucket_width()
    }

    /// Vertical position of `value` on `axis`, clamped to the plot area
    pub fn y_for(&self, axis: Axis, value: f64) -> f32 {
        let (min, max) = axis.range();
        let t = ((value - min) / (max - min)).clamp(0.0, 1.0) as f32;
        self.top + self.height * (1.0 - t)
    }

    /// Bucket under horizontal position `x`, if inside the plot
    pub fn index_at(&self, x: f32) -> Option<usize> {
        if x < self.left || x >= self.left + self.width {
            return None;
        }
        let index = ((x - self.left) / self.bucket_width()) as usize;
        (index < self.buckets).then_some(index)
    }
}

/// A rendered chart for one location.
///
/// Owns its surface, the series it was drawn from and the derived labels;
/// charts are rebuilt from scratch rather than updated.
pub struct Chart {
    location: String,
    series: ForecastSeries,
    labels: Vec<String>,
    plot: PlotArea,
    pixmap: Pixmap,
    arrows_drawn: usize,
}

impl std::fmt::Debug for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("location", &self.location)
            .field("points", &self.series.len())
            .field("plot", &self.plot)
            .field("arrows_drawn", &self.arrows_drawn)
            .finish()
    }
}

impl Chart {
    /// Render `series` for `location`.
    ///
    /// `tz` is the zone the timestamps are expressed in and `now` drives the
    /// current-time grid highlight.
    pub fn render(
        location: &str,
        series: ForecastSeries,
        options: &ChartOptions,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<Self, ChartError> {
        if series.is_empty() {
            return Err(ChartError::EmptySeries(location.to_string()));
        }

        let mut pixmap = Pixmap::new(options.width, options.height).ok_or(
            ChartError::InvalidSize {
                width: options.width,
                height: options.height,
            },
        )?;
        let bg = options.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let plot = PlotArea::new(options, series.len());

        draw_time_grid(&mut pixmap, &plot, &series.timestamps, tz, now);
        draw_value_grid(&mut pixmap, &plot);

        // Earlier datasets end up on top.
        for dataset in standard_datasets().iter().rev() {
            draw_dataset(&mut pixmap, &plot, dataset, series.values(dataset.variable));
        }

        let arrows_drawn = if options.wind_direction_arrows {
            let points = points_for(&plot, Axis::Primary, series.values(Variable::WindSpeed));
            WindArrows::default().draw(&mut pixmap, &points, &series.wind_direction)
        } else {
            0
        };

        tracing::debug!(
            location,
            points = series.len(),
            arrows_drawn,
            "Rendered chart"
        );

        Ok(Self {
            location: location.to_string(),
            labels: format_labels(&series.timestamps),
            series,
            plot,
            pixmap,
            arrows_drawn,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.series.timestamps
    }

    /// Time-axis labels, one per bucket (mostly empty)
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn plot_area(&self) -> PlotArea {
        self.plot
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn arrows_drawn(&self) -> usize {
        self.arrows_drawn
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Tooltip for bucket `index`
    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        Tooltip::at(&self.series, index)
    }

    /// Tooltip for the bucket under horizontal pixel `x`
    pub fn tooltip_at_x(&self, x: f32) -> Option<Tooltip> {
        self.plot.index_at(x).and_then(|i| self.tooltip(i))
    }

    /// Tick values of `axis` with their vertical pixel positions
    pub fn y_ticks(&self, axis: Axis) -> Vec<(f64, f32)> {
        axis.ticks()
            .into_iter()
            .map(|v| (v, self.plot.y_for(axis, v)))
            .collect()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ChartError> {
        self.pixmap
            .encode_png()
            .map_err(|e| ChartError::Encode(e.to_string()))
    }
}

fn points_for(plot: &PlotArea, axis: Axis, values: &[Option<f64>]) -> Vec<Option<(f32, f32)>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.map(|v| (plot.x_center(i), plot.y_for(axis, v))))
        .collect()
}

/// Runs of consecutive drawn points; gaps split a line.
fn runs(points: &[Option<(f32, f32)>]) -> Vec<Vec<(f32, f32)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(p) => current.push(*p),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn hairline(pixmap: &mut Pixmap, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y1);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &color.to_paint(), &stroke, Transform::identity(), None);
    }
}

fn draw_time_grid(
    pixmap: &mut Pixmap,
    plot: &PlotArea,
    timestamps: &[NaiveDateTime],
    tz: &Tz,
    now: DateTime<Utc>,
) {
    for (i, ts) in timestamps.iter().enumerate() {
        let color = grid_color(ts, tz, now);
        if !color.is_visible() {
            continue;
        }
        let x = plot.x_center(i);
        hairline(pixmap, x, plot.top, x, plot.bottom(), color.rgba());
    }
}

fn draw_value_grid(pixmap: &mut Pixmap, plot: &PlotArea) {
    for value in Axis::Primary.ticks() {
        let color = if value % 10.0 == 0.0 {
            Rgba::rgb(0x66, 0x66, 0x66)
        } else {
            Rgba::rgb(0x33, 0x33, 0x33)
        };
        let y = plot.y_for(Axis::Primary, value);
        hairline(pixmap, plot.left, y, plot.left + plot.width, y, color);
    }
}

fn draw_dataset(pixmap: &mut Pixmap, plot: &PlotArea, dataset: &Dataset, values: &[Option<f64>]) {
    let paint = dataset.color.to_paint();

    match dataset.kind {
        DatasetKind::Line { width } => {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            for run in runs(&points_for(plot, dataset.axis, values)) {
                let mut pb = PathBuilder::new();
                pb.move_to(run[0].0, run[0].1);
                for &(x, y) in &run[1..] {
                    pb.line_to(x, y);
                }
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
        DatasetKind::Area => {
            let baseline = plot.y_for(dataset.axis, dataset.axis.range().0);
            for run in runs(&points_for(plot, dataset.axis, values)) {
                let (first, last) = (run[0], run[run.len() - 1]);
                let mut pb = PathBuilder::new();
                pb.move_to(first.0, baseline);
                for &(x, y) in &run {
                    pb.line_to(x, y);
                }
                pb.line_to(last.0, baseline);
                pb.close();
                if let Some(path) = pb.finish() {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }
        DatasetKind::Bar { bar_fraction } => {
            let bar_width = plot.bucket_width() * bar_fraction;
            let baseline = plot.y_for(dataset.axis, dataset.axis.range().0);
            for (i, value) in values.iter().enumerate() {
                let Some(value) = value else { continue };
                let top = plot.y_for(dataset.axis, *value);
                let x = plot.x_center(i) - bar_width / 2.0;
                // Zero-height bars produce no rect.
                if let Some(rect) = Rect::from_xywh(x, top, bar_width, baseline - top) {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }
}
