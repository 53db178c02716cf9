use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wxc_core::{AppError, DatabaseError, NetworkError};

/// Named point a forecast is fetched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Hourly variables requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Temperature,
    RelativeHumidity,
    WindSpeed,
    WindDirection,
    CloudCover,
    PrecipitationProbability,
    Precipitation,
}

impl Variable {
    pub const ALL: [Variable; 7] = [
        Variable::Temperature,
        Variable::RelativeHumidity,
        Variable::WindSpeed,
        Variable::WindDirection,
        Variable::CloudCover,
        Variable::PrecipitationProbability,
        Variable::Precipitation,
    ];

    /// Open-Meteo query/response key
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature_2m",
            Self::RelativeHumidity => "relative_humidity_2m",
            Self::WindSpeed => "wind_speed_10m",
            Self::WindDirection => "wind_direction_10m",
            Self::CloudCover => "cloud_cover",
            Self::PrecipitationProbability => "precipitation_probability",
            Self::Precipitation => "precipitation",
        }
    }

    /// Comma-separated list for the `hourly` query parameter
    pub fn hourly_query() -> String {
        Self::ALL
            .iter()
            .map(Variable::api_name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Raw provider response, cached verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_units: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyBlock>,
}

/// Parallel hourly arrays keyed by variable name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlyBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<Vec<Option<f64>>>,
}

impl HourlyBlock {
    fn values(&self, variable: Variable) -> Option<&Vec<Option<f64>>> {
        match variable {
            Variable::Temperature => self.temperature_2m.as_ref(),
            Variable::RelativeHumidity => self.relative_humidity_2m.as_ref(),
            Variable::WindSpeed => self.wind_speed_10m.as_ref(),
            Variable::WindDirection => self.wind_direction_10m.as_ref(),
            Variable::CloudCover => self.cloud_cover.as_ref(),
            Variable::PrecipitationProbability => self.precipitation_probability.as_ref(),
            Variable::Precipitation => self.precipitation.as_ref(),
        }
    }
}

/// Aligned hourly series for one location.
///
/// Every value sequence has the same length as `timestamps`; index `i`
/// refers to the same hour in all of them. Timestamps are wall-clock times
/// in the zone the forecast was requested in.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub temperature: Vec<Option<f64>>,
    pub relative_humidity: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub wind_direction: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation_amount: Vec<Option<f64>>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn values(&self, variable: Variable) -> &[Option<f64>] {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::RelativeHumidity => &self.relative_humidity,
            Variable::WindSpeed => &self.wind_speed,
            Variable::WindDirection => &self.wind_direction,
            Variable::CloudCover => &self.cloud_cover,
            Variable::PrecipitationProbability => &self.precipitation_probability,
            Variable::Precipitation => &self.precipitation_amount,
        }
    }

    pub fn value_at(&self, variable: Variable, index: usize) -> Option<f64> {
        self.values(variable).get(index).copied().flatten()
    }
}

impl TryFrom<&ForecastResponse> for ForecastSeries {
    type Error = SchemaError;

    fn try_from(response: &ForecastResponse) -> Result<Self, Self::Error> {
        let hourly = response.hourly.as_ref().ok_or(SchemaError::MissingHourly)?;
        let time = hourly.time.as_ref().ok_or(SchemaError::MissingTime)?;
        if hourly.temperature_2m.is_none() {
            return Err(SchemaError::MissingTemperature);
        }

        let timestamps = time
            .iter()
            .map(|t| parse_timestamp(t))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = timestamps.len();

        let aligned = |variable: Variable| -> Result<Vec<Option<f64>>, SchemaError> {
            match hourly.values(variable) {
                Some(values) if values.len() == expected => Ok(values.clone()),
                Some(values) => Err(SchemaError::Misaligned {
                    series: variable.api_name(),
                    expected,
                    actual: values.len(),
                }),
                None => Ok(vec![None; expected]),
            }
        };

        Ok(Self {
            temperature: aligned(Variable::Temperature)?,
            relative_humidity: aligned(Variable::RelativeHumidity)?,
            wind_speed: aligned(Variable::WindSpeed)?,
            wind_direction: aligned(Variable::WindDirection)?,
            cloud_cover: aligned(Variable::CloudCover)?,
            precipitation_probability: aligned(Variable::PrecipitationProbability)?,
            precipitation_amount: aligned(Variable::Precipitation)?,
            timestamps,
        })
    }
}

/// Parse an Open-Meteo local timestamp (`2026-02-05T14:00`, seconds optional)
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, SchemaError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| SchemaError::BadTimestamp(s.to_string()))
}

/// Provider response did not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("response has no hourly block")]
    MissingHourly,
    #[error("hourly block has no time series")]
    MissingTime,
    #[error("hourly block has no temperature series")]
    MissingTemperature,
    #[error("series {series} has {actual} values, expected {expected}")]
    Misaligned {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unparseable timestamp: {0}")]
    BadTimestamp(String),
}

/// Weather fetch errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Cache error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid coordinates for {0}")]
    InvalidCoordinates(String),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Network(e) => AppError::Network(e),
            WeatherError::Database(e) => AppError::Database(e),
            other => AppError::Other(anyhow::Error::new(other)),
        }
    }
}
