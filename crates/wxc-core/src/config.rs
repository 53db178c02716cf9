use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "weather-charts";

/// A single problem found in the configuration, keyed by TOML path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.field)
    }
}

/// Errors block startup; warnings are only logged.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn issue(field: impl Into<String>, message: impl Into<String>) -> ConfigIssue {
        ConfigIssue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Self::issue(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Self::issue(field, message));
    }

    /// All errors on one line, `; `-separated
    pub fn error_summary(&self) -> String {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        parts.join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Forecast provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Local forecast cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chart rendering
    #[serde(default)]
    pub chart: ChartConfig,

    /// Where the dashboard is written
    #[serde(default)]
    pub output: OutputConfig,

    /// Periodic full reload
    #[serde(default)]
    pub reload: ReloadConfig,
}

/// Open-Meteo request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL, without the `/forecast` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Forecast model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// IANA zone the provider reports hourly timestamps in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_past_days")]
    pub past_days: u8,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_model() -> String {
    "ecmwf_ifs025".to_string()
}

fn default_timezone() -> String {
    "Australia/Sydney".to_string()
}

fn default_past_days() -> u8 {
    1
}

fn default_forecast_days() -> u8 {
    15
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timezone: default_timezone(),
            past_days: default_past_days(),
            forecast_days: default_forecast_days(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Parse the configured zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Unknown time zone {}: {}", self.timezone, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// SQLite file backing the cache
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Entries younger than this are served without a network call
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_cache_path() -> PathBuf {
    default_data_dir().join("cache.db")
}

fn default_ttl_minutes() -> u32 {
    60
}

fn default_key_prefix() -> String {
    "weather-charts-data-".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_minutes: default_ttl_minutes(),
            key_prefix: default_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// Draw the wind-direction arrow overlay
    #[serde(default = "default_true")]
    pub wind_direction_arrows: bool,
}

fn default_chart_width() -> u32 {
    1000
}

fn default_chart_height() -> u32 {
    150
}

fn default_true() -> bool {
    true
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            wind_direction_arrows: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving index.html and the chart images
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    default_data_dir().join("site")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Seconds between full reloads
    #[serde(default = "default_reload_secs")]
    pub interval_secs: u64,
}

fn default_reload_secs() -> u64 {
    3600
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reload_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            cache: CacheConfig::default(),
            chart: ChartConfig::default(),
            output: OutputConfig::default(),
            reload: ReloadConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load and validate the default config file, creating it if missing
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let path = Self::config_path().map_err(|e| ConfigError::Unreadable(format!("{:#}", e)))?;
        Self::load_validated_from(&path)
    }

    /// Load `path` and validate it.
    ///
    /// A file that cannot be read or parsed is `Unreadable`; one that parses
    /// but fails validation is `Invalid`. Warnings are logged.
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load_from(path).map_err(|e| {
            ConfigError::Unreadable(format!("{}: {:#}", path.display(), e))
        })?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!(field = %warning.field, "Config warning: {}", warning.message);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.model.trim().is_empty() {
            result.add_error("provider.model", "Model identifier must not be empty");
        }

        if self.provider.timezone.parse::<Tz>().is_err() {
            result.add_error(
                "provider.timezone",
                format!("Unknown time zone: {}", self.provider.timezone),
            );
        }

        if self.provider.forecast_days == 0 || self.provider.forecast_days > 16 {
            result.add_error(
                "provider.forecast_days",
                "Forecast days must be between 1 and 16",
            );
        }

        if self.provider.past_days > 92 {
            result.add_error("provider.past_days", "Past days must be at most 92");
        }

        if self.provider.timeout_secs == 0 {
            result.add_error("provider.timeout_secs", "Timeout must be greater than 0");
        }

        if self.cache.ttl_minutes == 0 {
            result.add_warning("cache.ttl_minutes", "Cache disabled (0 minutes)");
        }

        if self.chart.width == 0 {
            result.add_error("chart.width", "Chart width must be greater than 0");
        } else if self.chart.width > 10000 {
            result.add_warning("chart.width", "Chart width is unusually large (>10000)");
        }

        if self.chart.height == 0 {
            result.add_error("chart.height", "Chart height must be greater than 0");
        } else if self.chart.height > 10000 {
            result.add_warning("chart.height", "Chart height is unusually large (>10000)");
        }

        if self.reload.interval_secs == 0 {
            result.add_error("reload.interval_secs", "Reload interval must be greater than 0");
        } else if u64::from(self.cache.ttl_minutes) * 60 > self.reload.interval_secs {
            result.add_warning(
                "reload.interval_secs",
                "Reload runs more often than the cache expires; some cycles will not refetch",
            );
        }

        if self.output.dir.as_os_str().is_empty() {
            result.add_error("output.dir", "Output directory must be set");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        let url = match Url::parse(url_str) {
            Ok(url) => url,
            Err(e) => {
                result.add_error(field_name, format!("Not a valid URL: {}", e));
                return;
            }
        };

        if !matches!(url.scheme(), "http" | "https") {
            result.add_error(
                field_name,
                format!("Scheme must be http or https, found {}", url.scheme()),
            );
        }
        if url.host().is_none() {
            result.add_error(field_name, "Missing host");
        }
        if url.port() == Some(0) {
            result.add_error(field_name, "Port 0 is not usable");
        }
        if url.path().trim_end_matches('/').ends_with("/forecast") {
            result.add_warning(
                field_name,
                "Base URL already ends in /forecast; requests will go to /forecast/forecast",
            );
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_defaults_match_provider_contract() {
        let config = Config::default();
        assert_eq!(config.provider.model, "ecmwf_ifs025");
        assert_eq!(config.provider.past_days, 1);
        assert_eq!(config.provider.forecast_days, 15);
        assert_eq!(config.cache.ttl_minutes, 60);
        assert_eq!(config.cache.key_prefix, "weather-charts-data-");
        assert_eq!(config.reload.interval_secs, 3600);
        assert!(config.chart.wind_direction_arrows);
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.provider.base_url = "ftp://api.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.provider.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "provider.base_url"));
    }

    #[test]
    fn test_unknown_timezone() {
        let mut config = Config::default();
        config.provider.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "provider.timezone"));
        assert!(config.provider.tz().is_err());
    }

    #[test]
    fn test_forecast_days_out_of_range() {
        let mut config = Config::default();
        config.provider.forecast_days = 17;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_zero_chart_dimensions() {
        let mut config = Config::default();
        config.chart.height = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "chart.height"));
    }

    #[test]
    fn test_short_reload_is_warning() {
        let mut config = Config::default();
        config.reload.interval_secs = 600;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "reload.interval_secs"));
    }

    #[test]
    fn test_load_from_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.provider.timezone, "Australia/Sydney");
    }

    #[test]
    fn test_unparseable_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chart\nwidth = ").unwrap();

        let err = Config::load_validated_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable(_)));
    }

    #[test]
    fn test_bad_values_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chart]\nwidth = 0\n").unwrap();

        match Config::load_validated_from(&path).unwrap_err() {
            ConfigError::Invalid(summary) => assert!(summary.contains("chart.width")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_load_validated_from_accepts_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (config, validation) = Config::load_validated_from(&path).unwrap();
        assert!(validation.is_valid());
        assert_eq!(config.reload.interval_secs, 3600);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[chart]\nwind_direction_arrows = false\n\n[reload]\ninterval_secs = 7200\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.chart.wind_direction_arrows);
        assert_eq!(config.chart.width, 1000);
        assert_eq!(config.reload.interval_secs, 7200);
        assert_eq!(config.provider.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_error_summary_joins_issues() {
        let mut config = Config::default();
        config.chart.width = 0;
        config.reload.interval_secs = 0;
        assert_eq!(
            config.validate().error_summary(),
            "Chart width must be greater than 0 (chart.width); \
             Reload interval must be greater than 0 (reload.interval_secs)"
        );
    }

    #[test]
    fn test_forecast_suffix_is_warning() {
        let mut config = Config::default();
        config.provider.base_url = "https://api.open-meteo.com/v1/forecast".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
