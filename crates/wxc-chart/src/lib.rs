//! Forecast chart rendering for weather-charts
//!
//! Turns a [`wxc_weather::ForecastSeries`] into a multi-axis raster chart
//! with a wind-direction arrow overlay, and collects the charts into a
//! static HTML dashboard.

pub mod dataset;
pub mod error;
pub mod labels;
pub mod overlay;
pub mod page;
pub mod render;
pub mod tooltip;

pub use dataset::{standard_datasets, Axis, Dataset, DatasetKind, Rgba};
pub use error::ChartError;
pub use labels::{format_labels, grid_color, tooltip_title, GridColor};
pub use overlay::WindArrows;
pub use page::Dashboard;
pub use render::{Chart, ChartOptions, PlotArea};
pub use tooltip::Tooltip;
