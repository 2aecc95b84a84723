use super::event::FetchError;
use crate::debug_hooks;
use crate::settings::AppSettings;
use crate::stats::ForecastStats;
use crate::timeline::{filter_from_cutoff, ForecastPoint, Timeline};
use chrono::NaiveDate;
use forecast_client::{fallback_tickers, PredictionHistory, PredictionResponse, StockDataPoint, Ticker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Predict,
    History,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Predict, Route::History];

    pub fn path(self) -> &'static str {
        match self {
            Route::Predict => "predict",
            Route::History => "history",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Predict => "Predict",
            Route::History => "History",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.path().eq_ignore_ascii_case(path.trim_matches('/')))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerSource {
    /// Built-in list shown until the service answers.
    Builtin,
    Remote,
    /// The service failed or returned nothing.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Tickers,
    Stock,
    Predict,
    Latest,
    History,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Tickers => "tickers",
            RequestKind::Stock => "stock",
            RequestKind::Predict => "predict",
            RequestKind::Latest => "latest",
            RequestKind::History => "history",
        }
    }
}

/// One counter per request type. A response is current only if it carries the latest value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generations {
    pub tickers: u64,
    pub stock: u64,
    pub predict: u64,
    pub latest: u64,
    pub history: u64,
}

impl Generations {
    fn slot(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Tickers => &mut self.tickers,
            RequestKind::Stock => &mut self.stock,
            RequestKind::Predict => &mut self.predict,
            RequestKind::Latest => &mut self.latest,
            RequestKind::History => &mut self.history,
        }
    }

    pub fn bump(&mut self, kind: RequestKind) -> u64 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }

    pub fn current(&self, kind: RequestKind) -> u64 {
        match kind {
            RequestKind::Tickers => self.tickers,
            RequestKind::Stock => self.stock,
            RequestKind::Predict => self.predict,
            RequestKind::Latest => self.latest,
            RequestKind::History => self.history,
        }
    }

    pub fn is_current(&self, kind: RequestKind, generation: u64) -> bool {
        self.current(kind) == generation
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loading {
    pub tickers: bool,
    pub stock: bool,
    pub predict: bool,
    pub history: bool,
}

impl Loading {
    pub fn any(&self) -> bool {
        self.tickers || self.stock || self.predict || self.history
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub route: Route,

    pub tickers: Vec<Ticker>,
    pub ticker_source: TickerSource,
    pub current_ticker: String,

    pub days: u32,
    pub days_back: Option<u32>,
    pub forecast_days: u32,
    pub cutoff: Option<NaiveDate>,
    pub history_limit: u32,

    /// Normalized series as fetched, before the cutoff filter.
    pub raw_history: Vec<StockDataPoint>,
    pub history: Vec<StockDataPoint>,
    pub prediction: Option<PredictionResponse>,
    pub forecast: Vec<ForecastPoint>,
    pub timeline: Timeline,
    pub stats: ForecastStats,

    pub last_saved: Option<PredictionHistory>,
    pub history_rows: Vec<PredictionHistory>,

    pub loading: Loading,
    pub generations: Generations,
    pub status_message: String,
    pub last_error: Option<FetchError>,

    pub zoom: f64,
    /// Bumped whenever `timeline` changes.
    pub timeline_revision: u64,
    /// Bumped when the chart must be disposed and rebuilt.
    pub chart_epoch: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

impl AppState {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let tickers = fallback_tickers();
        let current_ticker = if settings.default_ticker.is_empty() {
            tickers.first().map(|t| t.symbol.clone()).unwrap_or_default()
        } else {
            settings.default_ticker.clone()
        };
        Self {
            route: Route::default(),
            tickers,
            ticker_source: TickerSource::Builtin,
            current_ticker,
            days: settings.days,
            days_back: settings.days_back,
            forecast_days: settings.forecast_days,
            cutoff: settings.cutoff_date,
            history_limit: settings.history_limit,
            raw_history: Vec::new(),
            history: Vec::new(),
            prediction: None,
            forecast: Vec::new(),
            timeline: Timeline::default(),
            stats: ForecastStats::default(),
            last_saved: None,
            history_rows: Vec::new(),
            loading: Loading::default(),
            generations: Generations::default(),
            status_message: "Ready.".to_string(),
            last_error: None,
            zoom: 1.0,
            timeline_revision: 0,
            chart_epoch: 0,
        }
    }

    pub fn has_ticker(&self, symbol: &str) -> bool {
        self.tickers.iter().any(|t| t.symbol == symbol)
    }

    pub fn ticker_label(&self, symbol: &str) -> String {
        match self.tickers.iter().find(|t| t.symbol == symbol) {
            Some(t) if !t.name.is_empty() => format!("{} ({})", t.name, t.symbol),
            _ => symbol.to_string(),
        }
    }

    /// Drops the forecast and everything fetched for the previous ticker.
    pub fn reset_series(&mut self, reason: &str) {
        debug_hooks::log_timeline_reset(reason);
        self.raw_history.clear();
        self.history.clear();
        self.prediction = None;
        self.forecast.clear();
        self.last_saved = None;
        self.history_rows.clear();
        self.last_error = None;
        self.zoom = 1.0;
        self.chart_epoch += 1;
        self.rebuild_timeline();
    }

    /// Re-applies the cutoff to the fetched history, then re-merges.
    pub fn refilter(&mut self) {
        self.history = filter_from_cutoff(&self.raw_history, self.cutoff);
        self.rebuild_timeline();
    }

    pub fn rebuild_timeline(&mut self) {
        self.timeline = Timeline::merge(&self.history, &self.forecast);
        self.stats = ForecastStats::compute(&self.timeline.forecast_values(), self.timeline.last_close());
        self.timeline_revision += 1;
        debug_hooks::log_timeline_merge(
            &self.current_ticker,
            self.timeline.historical_len(),
            self.timeline.forecast_len(),
            self.timeline.seam_index(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_bump_independently() {
        let mut g = Generations::default();
        assert_eq!(g.bump(RequestKind::Stock), 1);
        assert_eq!(g.bump(RequestKind::Stock), 2);
        assert_eq!(g.bump(RequestKind::Predict), 1);
        assert!(g.is_current(RequestKind::Stock, 2));
        assert!(!g.is_current(RequestKind::Stock, 1));
        assert_eq!(g.current(RequestKind::History), 0);
    }

    #[test]
    fn routes_round_trip_paths() {
        assert_eq!(Route::from_path("/history"), Some(Route::History));
        assert_eq!(Route::from_path("predict"), Some(Route::Predict));
        assert_eq!(Route::from_path("settings"), None);
    }

    #[test]
    fn default_state_starts_on_builtin_list() {
        let s = AppState::default();
        assert_eq!(s.ticker_source, TickerSource::Builtin);
        assert_eq!(s.tickers.len(), 5);
        assert_eq!(s.current_ticker, "ENEL.MI");
        assert_eq!(s.ticker_label("ENEL.MI"), "Enel (ENEL.MI)");
        assert_eq!(s.route, Route::Predict);
        assert!(s.timeline.is_empty());
    }
}
