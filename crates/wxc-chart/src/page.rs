//! Static HTML dashboard hosting the rendered charts.
//!
//! Each chart is written next to the page as a PNG; the page lays out the
//! location label, the image, the day labels and an image map whose area
//! titles carry the per-hour tooltips. Markup lives in an embedded Tera
//! template with HTML autoescaping.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::dataset::Axis;
use crate::error::ChartError;
use crate::render::Chart;

pub const CONTAINER_ID: &str = "charts";
pub const INDEX_FILE: &str = "index.html";
pub const DEFAULT_REFRESH_SECS: u64 = 3600;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Template data for one location
#[derive(Debug, Clone, Serialize)]
struct ChartBlock {
    location: String,
    image: String,
    map_name: String,
    width: u32,
    height: u32,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
    areas: Vec<Area>,
    axis_titles: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
struct Tick {
    /// CSS class of the value axis; empty for the time axis
    axis: &'static str,
    pos: String,
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct Area {
    coords: String,
    title: String,
}

/// Ordered collection of chart blocks.
///
/// Blocks appear in the order they were appended.
#[derive(Debug, Clone)]
pub struct Dashboard {
    refresh_secs: u64,
    blocks: Vec<ChartBlock>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_SECS)
    }
}

impl Dashboard {
    pub fn new(refresh_secs: u64) -> Self {
        Self {
            refresh_secs,
            blocks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Location names in page order
    pub fn locations(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.location.as_str()).collect()
    }

    /// Write the chart image into `dir` and add its block to the page.
    ///
    /// Returns the path of the written PNG.
    pub fn append(&mut self, chart: &Chart, dir: &Path) -> Result<PathBuf, ChartError> {
        let image = format!("{}.png", slug(chart.location()));
        let path = write_replacing(dir, &image, &chart.encode_png()?)?;

        self.blocks.push(chart_block(chart, image));

        tracing::debug!(location = chart.location(), path = %path.display(), "Added chart to dashboard");
        Ok(path)
    }

    pub fn render_html(&self) -> Result<String, ChartError> {
        let mut context = Context::new();
        context.insert("refresh_secs", &self.refresh_secs);
        context.insert("container_id", CONTAINER_ID);
        context.insert("charts", &self.blocks);

        Ok(templates()?.render(INDEX_FILE, &context)?)
    }

    /// Write `index.html` into `dir`, replacing any previous page atomically.
    pub fn write_index(&self, dir: &Path) -> Result<PathBuf, ChartError> {
        let path = write_replacing(dir, INDEX_FILE, self.render_html()?.as_bytes())?;

        tracing::info!(
            charts = self.blocks.len(),
            images = ?self.blocks.iter().map(|b| b.image.as_str()).collect::<Vec<_>>(),
            path = %path.display(),
            "Wrote dashboard"
        );
        Ok(path)
    }
}

fn templates() -> Result<Tera, ChartError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html"]);
    tera.add_raw_template(INDEX_FILE, INDEX_TEMPLATE)?;
    Ok(tera)
}

/// Write `name` in `dir` through a temporary file so readers never see a
/// partial file.
fn write_replacing(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, ChartError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let tmp = dir.join(format!("{}.tmp", name));
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, &path)?;
    Ok(path)
}

fn chart_block(chart: &Chart, image: String) -> ChartBlock {
    let plot = chart.plot_area();

    let x_ticks = chart
        .labels()
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_empty())
        .map(|(i, label)| Tick {
            axis: "",
            pos: format!("{:.1}", plot.x_center(i)),
            text: label.clone(),
        })
        .collect();

    let y_ticks = [
        (Axis::Primary, "primary"),
        (Axis::Secondary, "secondary"),
        (Axis::Tertiary, "tertiary"),
    ]
    .into_iter()
    .flat_map(|(axis, class)| {
        chart.y_ticks(axis).into_iter().map(move |(value, y)| Tick {
            axis: class,
            pos: format!("{:.1}", y),
            text: value.to_string(),
        })
    })
    .collect();

    let bucket = plot.bucket_width();
    let areas = (0..chart.len())
        .filter_map(|i| {
            let tooltip = chart.tooltip(i)?;
            let x0 = plot.left + i as f32 * bucket;
            Some(Area {
                coords: format!(
                    "{},{},{},{}",
                    x0.round() as i64,
                    plot.top.round() as i64,
                    (x0 + bucket).round() as i64,
                    plot.bottom().round() as i64
                ),
                title: tooltip.to_text(),
            })
        })
        .collect();

    ChartBlock {
        location: chart.location().to_string(),
        map_name: format!("map-{}", slug(chart.location())),
        image,
        width: chart.width(),
        height: chart.height(),
        x_ticks,
        y_ticks,
        areas,
        axis_titles: Axis::ALL.iter().map(|a| a.title()).collect(),
    }
}

/// File-name-safe form of a location name
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("chart");
    }
    out
}
