use thiserror::Error;

/// Which half of a weather lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Current,
    Forecast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Current => "current",
            Stage::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or malformed request input. Raised before any provider call.
    #[error("{0}")]
    Validation(String),

    /// Geocoding produced no match.
    #[error("{0}")]
    NotFound(String),

    /// Upstream transport or data failure.
    #[error("weather provider failed: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("{stage} unavailable")]
    Aggregation {
        stage: Stage,
        #[source]
        source: Box<WeatherError>,
    },
}

impl WeatherError {
    pub fn validation(msg: impl Into<String>) -> Self {
        WeatherError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        WeatherError::NotFound(msg.into())
    }

    pub(crate) fn aggregation(stage: Stage, source: WeatherError) -> Self {
        WeatherError::Aggregation {
            stage,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn aggregation_message_names_the_stage() {
        let err = WeatherError::aggregation(
            Stage::Current,
            WeatherError::Provider(anyhow::anyhow!("503")),
        );
        assert_eq!(err.to_string(), "current unavailable");

        let source = err.source().expect("aggregation keeps its source");
        assert!(source.to_string().contains("503"));
    }

    #[test]
    fn provider_message_includes_context_chain() {
        let inner = anyhow::anyhow!("connection refused").context("Failed to send request");
        let err = WeatherError::from(inner);
        let msg = err.to_string();
        assert!(msg.contains("Failed to send request"));
        assert!(msg.contains("connection refused"));
    }
}
