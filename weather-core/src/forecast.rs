//! Collapses the provider's periodic forecast feed into daily summaries.
//!
//! The feed usually carries one sample every three hours over five days.
//! Each future calendar day is represented by the first sample seen for it;
//! there is no min/max/average over the day.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::model::{DailyForecastSummary, ForecastSample};

/// Number of days returned to callers.
pub const MAX_FORECAST_DAYS: usize = 3;

/// Returns at most `max_days` summaries, one per distinct calendar day after
/// skipping `today`, in first-occurrence order.
///
/// Calendar days are derived in `tz`, which must be the timezone `today` was
/// computed in.
pub fn normalize<Tz: TimeZone>(
    samples: &[ForecastSample],
    today: NaiveDate,
    tz: &Tz,
    max_days: usize,
) -> Vec<DailyForecastSummary> {
    let mut days = Vec::with_capacity(max_days);
    let mut seen = HashSet::with_capacity(max_days);

    for sample in samples {
        if days.len() >= max_days {
            break;
        }

        let Some(day) = calendar_day(sample.timestamp, tz) else {
            tracing::debug!(
                timestamp = sample.timestamp,
                "skipping unrepresentable forecast timestamp"
            );
            continue;
        };

        if day == today || !seen.insert(day) {
            continue;
        }

        days.push(DailyForecastSummary::new(day, sample));
    }

    days
}

fn calendar_day<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz).date_naive())
}
