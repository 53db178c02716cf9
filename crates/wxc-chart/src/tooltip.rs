use wxc_weather::{ForecastSeries, Variable};

use crate::labels::tooltip_title;

/// Order of value lines in a tooltip
const TOOLTIP_ORDER: [Variable; 7] = [
    Variable::Temperature,
    Variable::RelativeHumidity,
    Variable::WindSpeed,
    Variable::WindDirection,
    Variable::CloudCover,
    Variable::PrecipitationProbability,
    Variable::Precipitation,
];

/// Synchronized tooltip for one time index across all series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl Tooltip {
    /// Tooltip at `index`, or `None` past the end of the series.
    ///
    /// Series with no value at that index contribute no line.
    pub fn at(series: &ForecastSeries, index: usize) -> Option<Self> {
        let ts = series.timestamps.get(index)?;
        let lines = TOOLTIP_ORDER
            .iter()
            .filter_map(|&variable| {
                series
                    .value_at(variable, index)
                    .map(|value| format_value(variable, value))
            })
            .collect();

        Some(Self {
            title: tooltip_title(ts),
            lines,
        })
    }

    /// Title and lines joined by newlines
    pub fn to_text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Unit-suffixed value for a single series.
pub fn format_value(variable: Variable, value: f64) -> String {
    match variable {
        Variable::Temperature => format!("{} °C", trim(value.round())),
        Variable::RelativeHumidity => format!("{}% RH", trim(value)),
        Variable::WindSpeed => format!("{} km/h wind", trim(value.round())),
        Variable::WindDirection => format!("{}° direction", trim(value)),
        Variable::CloudCover => format!("{}% cloud", trim(value)),
        Variable::PrecipitationProbability => format!("{}% rain chance", trim(value)),
        Variable::Precipitation => format!("{} mm/h rain", trim(value)),
    }
}

/// At most two decimals, trailing zeros dropped
fn trim(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
