use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    WeatherError,
    model::{Coordinate, CurrentConditions, ForecastSample, Place, Units},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    offset: FixedOffset,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            offset: Utc.fix(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Reference timezone used to date current observations.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "OpenWeather {what} request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }

    async fn fetch_places(&self, city: &str) -> Result<Vec<OwPlace>> {
        self.get_json(
            "/geo/1.0/direct",
            &[("q", city.to_string()), ("limit", "1".to_string())],
            "geocoding",
        )
        .await
    }

    async fn fetch_current_raw(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse = self
            .get_json("/data/2.5/weather", &weather_query(coord, units), "current weather")
            .await?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather current response contained no conditions"))?;

        let observed = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

        Ok(CurrentConditions::new(
            parsed.main.temp,
            condition.description,
            condition.icon,
            parsed.wind.speed,
            parsed.main.humidity,
            observed.with_timezone(&self.offset).date_naive(),
        ))
    }

    async fn fetch_forecast_raw(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<Vec<ForecastSample>> {
        let parsed: OwForecastResponse = self
            .get_json("/data/2.5/forecast", &weather_query(coord, units), "forecast")
            .await?;

        parsed
            .list
            .into_iter()
            .map(|entry| -> Result<ForecastSample> {
                let icon = entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.icon)
                    .ok_or_else(|| {
                        anyhow!(
                            "OpenWeather forecast entry at {} contained no conditions",
                            entry.dt
                        )
                    })?;

                Ok(ForecastSample {
                    timestamp: entry.dt,
                    temperature: entry.main.temp,
                    icon_code: icon,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, city: &str) -> Result<Place, WeatherError> {
        let places = match self.fetch_places(city).await {
            Ok(places) => places,
            Err(err) => {
                tracing::warn!("Geocoding '{city}' failed: {err:#}");
                return Err(WeatherError::not_found("City not found"));
            }
        };

        let place = places.into_iter().next().ok_or_else(|| {
            tracing::debug!("Geocoding '{city}' returned no matches");
            WeatherError::not_found("City not found")
        })?;

        Ok(Place {
            name: place.name,
            coordinate: Coordinate::new(place.lat, place.lon),
        })
    }

    async fn fetch_current(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current_raw(coord, units).await.map_err(|err| {
            tracing::warn!("Current weather fetch failed: {err:#}");
            WeatherError::Provider(err)
        })
    }

    async fn fetch_forecast_samples(
        &self,
        coord: Coordinate,
        units: Units,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        self.fetch_forecast_raw(coord, units).await.map_err(|err| {
            tracing::warn!("Forecast fetch failed: {err:#}");
            WeatherError::Provider(err)
        })
    }
}

fn weather_query(coord: Coordinate, units: Units) -> [(&'static str, String); 3] {
    [
        ("lat", coord.latitude.to_string()),
        ("lon", coord.longitude.to_string()),
        ("units", units.as_str().to_string()),
    ]
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
