//! Figures derived from the forecast series only.
//!
//! Day-direction convention: the first forecast day is compared with the
//! baseline (last historical close). Without a baseline it counts as bullish.
//! With one it is bullish when strictly above it, bearish when strictly below,
//! and neither when equal. Every later day is compared the same way with the
//! previous predicted day.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForecastStats {
    pub average: f64,
    pub bullish_days: usize,
    pub bearish_days: usize,
    /// Day-over-day change in percent, same length as the forecast.
    pub daily_changes: Vec<f64>,
    pub first: Option<f64>,
    pub last: Option<f64>,
    /// Last forecast day vs. baseline, in percent.
    pub total_change: f64,
}

impl ForecastStats {
    pub fn compute(forecast: &[f64], baseline: Option<f64>) -> Self {
        if forecast.is_empty() {
            return Self::default();
        }
        Self {
            average: average(forecast),
            bullish_days: bullish_days(forecast, baseline),
            bearish_days: bearish_days(forecast, baseline),
            daily_changes: daily_changes(forecast, baseline),
            first: forecast.first().copied(),
            last: forecast.last().copied(),
            total_change: match (baseline, forecast.last()) {
                (Some(base), Some(last)) => pct_change(base, *last),
                _ => 0.0,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily_changes.is_empty()
    }
}

pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn bullish_days(forecast: &[f64], baseline: Option<f64>) -> usize {
    let Some(first) = forecast.first() else {
        return 0;
    };
    let first_up = baseline.map_or(true, |base| *first > base);
    let steps_up = forecast.windows(2).filter(|w| w[1] > w[0]).count();
    usize::from(first_up) + steps_up
}

pub fn bearish_days(forecast: &[f64], baseline: Option<f64>) -> usize {
    let Some(first) = forecast.first() else {
        return 0;
    };
    let first_down = baseline.is_some_and(|base| *first < base);
    let steps_down = forecast.windows(2).filter(|w| w[1] < w[0]).count();
    usize::from(first_down) + steps_down
}

pub fn daily_changes(forecast: &[f64], baseline: Option<f64>) -> Vec<f64> {
    let mut prev = baseline;
    forecast
        .iter()
        .map(|&v| {
            let change = prev.map_or(0.0, |p| pct_change(p, v));
            prev = Some(v);
            change
        })
        .collect()
}

fn pct_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}
