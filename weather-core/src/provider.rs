use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, WeatherError,
    model::{Coordinate, CurrentConditions, ForecastSample, Place, Units},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Outbound access to the weather and geocoding service.
///
/// Every call issues exactly one request and never retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a city name to the best matching place.
    ///
    /// Fails with [`WeatherError::NotFound`] when nothing matches or the
    /// request itself fails.
    async fn geocode(&self, city: &str) -> Result<Place, WeatherError>;

    async fn fetch_current(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError>;

    /// Raw forecast feed in the provider's (chronological) order.
    async fn fetch_forecast_samples(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<Vec<ForecastSample>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;

    Ok(OpenWeatherProvider::new(api_key.to_owned())
        .with_base_url(&config.base_url)
        .with_utc_offset(config.utc_offset()?))
}
