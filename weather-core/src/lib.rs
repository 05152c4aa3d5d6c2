//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - Forecast normalization into daily summaries
//! - The [`WeatherService`] aggregator and its JSON HTTP API
//!
//! It is used by `weather-cli`, but can also be embedded in other binaries or services.

pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use error::WeatherError;
pub use model::{
    Coordinate, CurrentConditions, DailyForecastSummary, ForecastSample, Place, Units,
    WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use service::WeatherService;
