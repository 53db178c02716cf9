//! Open-Meteo forecast fetcher with cache-first resolution.

use chrono::Duration;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};
use wxc_core::{CacheConfig, NetworkError, ProviderConfig, ReqwestErrorExt};

use crate::cache::{KeyValueStore, SqliteStore, WeatherCache};
use crate::types::{ForecastResponse, ForecastSeries, Location, Variable, WeatherError};

pub struct WeatherProvider<S = SqliteStore> {
    client: Client,
    config: ProviderConfig,
    cache: WeatherCache<S>,
}

impl<S: KeyValueStore> WeatherProvider<S> {
    pub fn new(config: ProviderConfig, cache: WeatherCache<S>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Build a provider whose cache follows `cache_config` over `store`.
    pub fn from_config(
        provider: ProviderConfig,
        cache_config: &CacheConfig,
        store: S,
    ) -> Result<Self, WeatherError> {
        let cache = WeatherCache::new(
            store,
            Duration::minutes(i64::from(cache_config.ttl_minutes)),
            cache_config.key_prefix.clone(),
        );
        Self::new(provider, cache)
    }

    pub fn cache(&self) -> &WeatherCache<S> {
        &self.cache
    }

    /// Forecast for `location`, from cache when fresh, otherwise from the network.
    ///
    /// `Ok(None)` means the provider answered without the series we need;
    /// that is logged here and nothing is cached. Transport failures are
    /// returned as errors. No retries are attempted.
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch(&self, location: &Location) -> Result<Option<ForecastSeries>, WeatherError> {
        if !location.has_valid_coordinates() {
            return Err(WeatherError::InvalidCoordinates(location.name.clone()));
        }

        let key = self.cache.key_for(&location.name);

        if let Some(cached) = self.cache.get(&key) {
            match ForecastSeries::try_from(&cached) {
                Ok(series) => {
                    debug!(points = series.len(), "Using cached forecast");
                    return Ok(Some(series));
                }
                Err(e) => warn!("Cached forecast is unusable, refetching: {}", e),
            }
        }

        let response = self.request(location).await?;

        let series = match ForecastSeries::try_from(&response) {
            Ok(series) => series,
            Err(e) => {
                error!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "Missing expected data: {}",
                    e
                );
                return Ok(None);
            }
        };

        if let Err(e) = self.cache.put(&key, &response) {
            warn!("Failed to cache forecast: {}", e);
        }

        info!(points = series.len(), "Fetched forecast");
        Ok(Some(series))
    }

    async fn request(&self, location: &Location) -> Result<ForecastResponse, WeatherError> {
        let url = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, "Requesting forecast");

        let response = self
            .client
            .get(&url)
            .query(&self.query_params(location))
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = error_reason(&response.text().await.unwrap_or_default());
            error!(
                latitude = location.latitude,
                longitude = location.longitude,
                status = status.as_u16(),
                "Forecast request failed: {}",
                message
            );
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                body: message,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }

    fn query_params(&self, location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("models", self.config.model.clone()),
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("hourly", Variable::hourly_query()),
            ("past_days", self.config.past_days.to_string()),
            ("forecast_days", self.config.forecast_days.to_string()),
            ("timezone", self.config.timezone.clone()),
        ]
    }
}

/// Open-Meteo error bodies look like `{"error": true, "reason": "..."}`;
/// anything else is passed through as-is.
fn error_reason(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("reason")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason() {
        assert_eq!(
            error_reason(r#"{"error":true,"reason":"Latitude must be in range of -90 to 90°."}"#),
            "Latitude must be in range of -90 to 90°."
        );
        assert_eq!(error_reason("maintenance\n"), "maintenance");
        assert_eq!(error_reason(""), "");
    }
    use crate::cache::MemoryStore;

    fn provider() -> WeatherProvider<MemoryStore> {
        WeatherProvider::new(
            ProviderConfig::default(),
            WeatherCache::with_defaults(MemoryStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_query_params() {
        let params = provider().query_params(&Location::new("Sydney", -33.8688, 151.2093));
        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
        };

        assert_eq!(get("models").as_deref(), Some("ecmwf_ifs025"));
        assert_eq!(get("latitude").as_deref(), Some("-33.8688"));
        assert_eq!(get("longitude").as_deref(), Some("151.2093"));
        assert_eq!(get("past_days").as_deref(), Some("1"));
        assert_eq!(get("forecast_days").as_deref(), Some("15"));
        assert_eq!(get("timezone").as_deref(), Some("Australia/Sydney"));
        assert!(get("hourly").unwrap().contains("wind_direction_10m"));
    }

    #[tokio::test]
    async fn test_invalid_coordinates_short_circuit() {
        let result = provider()
            .fetch(&Location::new("Nowhere", 123.0, 0.0))
            .await;
        assert!(matches!(result, Err(WeatherError::InvalidCoordinates(_))));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        // Base URL points nowhere; a network call would fail the test.
        let mut config = ProviderConfig::default();
        config.base_url = "http://127.0.0.1:9".to_string();
        let provider =
            WeatherProvider::new(config, WeatherCache::with_defaults(MemoryStore::new())).unwrap();

        let location = Location::new("Sydney", -33.8688, 151.2093);
        let payload: ForecastResponse = serde_json::from_value(serde_json::json!({
            "hourly": {
                "time": ["2026-10-19T00:00", "2026-10-19T01:00"],
                "temperature_2m": [15.0, 14.5]
            }
        }))
        .unwrap();
        provider
            .cache()
            .put(&provider.cache().key_for("Sydney"), &payload)
            .unwrap();

        let series = provider.fetch(&location).await.unwrap().unwrap();
        assert_eq!(series.len(), 2);
    }
}
