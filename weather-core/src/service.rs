use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    Config, WeatherError,
    error::Stage,
    forecast::{self, MAX_FORECAST_DAYS},
    model::{Coordinate, Place, Units, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
};

/// Combines current conditions and the normalized forecast for one location.
///
/// Holds no per-request state; clones share the provider.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    offset: FixedOffset,
}

impl WeatherService {
    /// `offset` is the fixed reference timezone calendar days are taken in.
    pub fn new(provider: Arc<dyn WeatherProvider>, offset: FixedOffset) -> Self {
        Self { provider, offset }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(Arc::new(provider), config.utc_offset()?))
    }

    pub async fn geocode(&self, city: &str) -> Result<Place, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::validation("City name is required"));
        }

        self.provider.geocode(city).await
    }

    pub async fn get_weather(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.get_weather_at(coord, units, Utc::now()).await
    }

    /// Like [`get_weather`](Self::get_weather) with an explicit invocation time.
    ///
    /// The forecast is only requested once current conditions succeeded, and
    /// either failure aborts the whole lookup.
    pub async fn get_weather_at(
        &self,
        coord: Coordinate,
        units: Units,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        coord.validate()?;

        let current = self
            .provider
            .fetch_current(coord, units)
            .await
            .map_err(|err| WeatherError::aggregation(Stage::Current, err))?;

        let samples = self
            .provider
            .fetch_forecast_samples(coord, units)
            .await
            .map_err(|err| WeatherError::aggregation(Stage::Forecast, err))?;

        let today = now.with_timezone(&self.offset).date_naive();
        let forecast = forecast::normalize(&samples, today, &self.offset, MAX_FORECAST_DAYS);

        tracing::debug!(
            lat = coord.latitude,
            lon = coord.longitude,
            %units,
            samples = samples.len(),
            days = forecast.len(),
            "weather snapshot assembled"
        );

        Ok(WeatherSnapshot { current, forecast })
    }
}
