//! Historical + forecast series merged into one renderable timeline.

use crate::debug_hooks;
use chrono::NaiveDate;
use forecast_client::{PredictionResponse, StockDataPoint};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelinePoint {
    /// Unix seconds at 00:00 UTC of `date`.
    pub timestamp: i64,
    pub date: NaiveDate,
    pub value: f64,
    pub is_forecast: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

pub fn day_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp()
}

/// Sorts by date; of several bars on one date the last one wins.
pub fn normalize_history(mut points: Vec<StockDataPoint>) -> Vec<StockDataPoint> {
    points.sort_by_key(|p| p.date);
    points.reverse();
    points.dedup_by_key(|p| p.date);
    points.reverse();
    points
}

/// Keeps only points dated on or after `cutoff`.
pub fn filter_from_cutoff(points: &[StockDataPoint], cutoff: Option<NaiveDate>) -> Vec<StockDataPoint> {
    match cutoff {
        Some(cutoff) => points.iter().filter(|p| p.date >= cutoff).cloned().collect(),
        None => points.to_vec(),
    }
}

pub fn forecast_points(resp: &PredictionResponse) -> Vec<ForecastPoint> {
    let mut points: Vec<ForecastPoint> = resp
        .forecast_pairs()
        .map(|(date, value)| ForecastPoint { date, value })
        .collect();
    points.sort_by_key(|p| p.date);
    points.reverse();
    points.dedup_by_key(|p| p.date);
    points.reverse();
    points
}

/// Ordered timeline: historical points first, then forecast points.
///
/// Timestamps are strictly increasing. A forecast point dated on or before the
/// last historical day is dropped, so the join never repeats a day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    points: Vec<TimelinePoint>,
    historical_len: usize,
}

impl Timeline {
    pub fn historical(history: &[StockDataPoint]) -> Self {
        Self::merge(history, &[])
    }

    pub fn merge(history: &[StockDataPoint], forecast: &[ForecastPoint]) -> Self {
        let mut points = Vec::with_capacity(history.len() + forecast.len());
        let mut last_ts = i64::MIN;

        for p in history {
            let ts = day_timestamp(p.date);
            if ts <= last_ts {
                continue;
            }
            last_ts = ts;
            points.push(TimelinePoint {
                timestamp: ts,
                date: p.date,
                value: p.close,
                is_forecast: false,
            });
        }
        let historical_len = points.len();
        debug_hooks::log_timeline_drop("historical", history.len() - historical_len);

        for p in forecast {
            let ts = day_timestamp(p.date);
            if ts <= last_ts {
                continue;
            }
            last_ts = ts;
            points.push(TimelinePoint {
                timestamp: ts,
                date: p.date,
                value: p.value,
                is_forecast: true,
            });
        }
        debug_hooks::log_timeline_drop("forecast", forecast.len() - (points.len() - historical_len));

        Self {
            points,
            historical_len,
        }
    }

    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn historical_len(&self) -> usize {
        self.historical_len
    }

    pub fn forecast_len(&self) -> usize {
        self.points.len() - self.historical_len
    }

    /// Index of the first forecast point, if any forecast point was merged.
    pub fn seam_index(&self) -> Option<usize> {
        (self.forecast_len() > 0).then_some(self.historical_len)
    }

    pub fn historical_points(&self) -> &[TimelinePoint] {
        &self.points[..self.historical_len]
    }

    pub fn forecast_points(&self) -> &[TimelinePoint] {
        &self.points[self.historical_len..]
    }

    pub fn forecast_values(&self) -> Vec<f64> {
        self.forecast_points().iter().map(|p| p.value).collect()
    }

    /// Close of the last historical day.
    pub fn last_close(&self) -> Option<f64> {
        self.historical_points().last().map(|p| p.value)
    }

    pub fn span(&self) -> Option<(i64, i64)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }
}
