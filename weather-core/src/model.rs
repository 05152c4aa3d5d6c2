use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Kilometres per hour in one metre per second.
const MPS_TO_KMH: f64 = 3.6;

const OBSERVED_DATE_FORMAT: &str = "%d %b %Y";
const FORECAST_DATE_FORMAT: &str = "%d %b";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::validation(format!(
                "Latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::validation(format!(
                "Longitude must be between -180 and 180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A geocoded place: the provider's name for the match plus its coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    #[serde(rename = "city")]
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(WeatherError::validation(format!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            ))),
        }
    }
}

impl std::str::FromStr for Units {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::try_from(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub description: String,
    #[serde(rename = "icon")]
    pub icon_code: String,
    #[serde(rename = "wind_speed")]
    pub wind_speed_kmh: f64,
    #[serde(rename = "humidity")]
    pub humidity_percent: u8,
    #[serde(rename = "date")]
    pub observed_date: String,
}

impl CurrentConditions {
    /// `wind_speed_mps` is converted to km/h whatever units the request used.
    pub fn new(
        temperature: f64,
        description: String,
        icon_code: String,
        wind_speed_mps: f64,
        humidity_percent: u8,
        observed_on: NaiveDate,
    ) -> Self {
        Self {
            temperature,
            description,
            icon_code,
            wind_speed_kmh: wind_speed_mps * MPS_TO_KMH,
            humidity_percent,
            observed_date: observed_on.format(OBSERVED_DATE_FORMAT).to_string(),
        }
    }
}

/// One raw entry of the provider's periodic forecast feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub timestamp: i64,
    pub temperature: f64,
    pub icon_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastSummary {
    #[serde(skip)]
    pub day: NaiveDate,
    #[serde(rename = "date")]
    pub calendar_date: String,
    pub temperature: f64,
    #[serde(rename = "icon")]
    pub icon_code: String,
}

impl DailyForecastSummary {
    pub fn new(day: NaiveDate, sample: &ForecastSample) -> Self {
        Self {
            day,
            calendar_date: day.format(FORECAST_DATE_FORMAT).to_string(),
            temperature: sample.temperature,
            icon_code: sample.icon_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecastSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn units_parse_is_case_insensitive() {
        assert_eq!("Imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!(" METRIC ".parse::<Units>().unwrap(), Units::Metric);
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(matches!(err, WeatherError::Validation(_)));
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(51.5, -0.12).validate().is_ok());
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(90.1, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn current_conditions_converts_metric_wind_to_kmh() {
        let current = CurrentConditions::new(
            12.5,
            "light rain".into(),
            "10d".into(),
            5.0,
            81,
            date(2026, 10, 19),
        );
        assert!((current.wind_speed_kmh - 18.0).abs() < 1e-9);
        assert_eq!(current.observed_date, "19 Oct 2026");
    }

    #[test]
    fn snapshot_serializes_with_wire_keys() {
        let snapshot = WeatherSnapshot {
            current: CurrentConditions::new(
                20.0,
                "few clouds".into(),
                "02d".into(),
                1.0,
                50,
                date(2026, 10, 19),
            ),
            forecast: vec![DailyForecastSummary::new(
                date(2026, 10, 20),
                &ForecastSample {
                    timestamp: 0,
                    temperature: 18.0,
                    icon_code: "03d".into(),
                },
            )],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["current"]["icon"], "02d");
        assert_eq!(json["current"]["humidity"], 50);
        assert_eq!(json["current"]["date"], "19 Oct 2026");
        assert_eq!(json["forecast"][0]["date"], "20 Oct");
        assert_eq!(json["forecast"][0]["icon"], "03d");
        assert!(json["forecast"][0].get("day").is_none());
    }

    #[test]
    fn place_serializes_as_lat_lon_city() {
        let place = Place {
            name: "London".into(),
            coordinate: Coordinate::new(51.5, -0.12),
        };
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["city"], "London");
        assert_eq!(json["lat"], 51.5);
        assert_eq!(json["lon"], -0.12);
    }
}
