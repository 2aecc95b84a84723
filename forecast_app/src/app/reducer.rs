use super::event::*;
use super::state::*;
use crate::chart::MAX_ZOOM;
use crate::debug_hooks;
use crate::settings::{MAX_DAYS, MAX_FORECAST_DAYS, MAX_HISTORY_LIMIT};
use crate::timeline::{forecast_points, normalize_history};
use forecast_client::{fallback_tickers, PredictionRequest};

/// Result of one reduction step.
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
    /// Whether anything visible changed.
    pub changed: bool,
}

/// Pure: the next state and the requests it needs. No I/O happens here.
pub fn reduce(state: AppState, ev: AppEvent) -> Transition {
    let mut state = state;
    let mut effects = Vec::new();
    let changed = match ev {
        AppEvent::Ui(u) => reduce_ui(&mut state, &mut effects, u),
        AppEvent::Api(a) => reduce_api(&mut state, &mut effects, a),
    };
    Transition {
        state,
        effects,
        changed,
    }
}

fn reduce_ui(state: &mut AppState, fx: &mut Vec<Effect>, ev: UiEvent) -> bool {
    match ev {
        UiEvent::Started => {
            request_tickers(state, fx);
            request_stock(state, fx);
            request_latest(state, fx);
            if state.route == Route::History {
                request_history(state, fx);
            }
            state.status_message = "Loading…".to_string();
            true
        }
        UiEvent::RouteChanged { route } => {
            if state.route == route {
                return false;
            }
            state.route = route;
            if route == Route::History {
                request_history(state, fx);
            }
            true
        }
        UiEvent::TickerChanged { ticker } => {
            let ticker = ticker.trim().to_string();
            if ticker.is_empty() || ticker == state.current_ticker {
                return false;
            }
            if !state.has_ticker(&ticker) {
                state.status_message = format!("Ticker {} is not available.", ticker);
                return true;
            }
            switch_ticker(state, fx, ticker);
            true
        }
        UiEvent::DaysChanged { days } => {
            let days = days.clamp(1, MAX_DAYS);
            if days == state.days {
                return false;
            }
            state.days = days;
            request_stock(state, fx);
            true
        }
        UiEvent::DaysBackChanged { days_back } => {
            let days_back = days_back.map(|d| d.clamp(1, MAX_DAYS));
            if days_back == state.days_back {
                return false;
            }
            state.days_back = days_back;
            true
        }
        UiEvent::ForecastDaysChanged { days } => {
            let days = days.clamp(1, MAX_FORECAST_DAYS);
            if days == state.forecast_days {
                return false;
            }
            state.forecast_days = days;
            true
        }
        UiEvent::CutoffChanged { cutoff } => {
            if cutoff == state.cutoff {
                return false;
            }
            state.cutoff = cutoff;
            state.refilter();
            state.status_message = match cutoff {
                Some(d) => format!(
                    "Showing history from {} ({} days).",
                    d.format("%d/%m/%Y"),
                    state.history.len()
                ),
                None => format!("Cutoff cleared ({} days).", state.history.len()),
            };
            true
        }
        UiEvent::HistoryLimitChanged { limit } => {
            let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
            if limit == state.history_limit {
                return false;
            }
            state.history_limit = limit;
            if state.route == Route::History {
                request_history(state, fx);
            }
            true
        }
        UiEvent::PredictRequested => {
            if state.current_ticker.is_empty() {
                state.status_message = "Pick a ticker first.".to_string();
                return true;
            }
            request_predict(state, fx);
            state.status_message = format!("Predicting {}…", state.current_ticker);
            true
        }
        UiEvent::ReloadRequested => {
            request_stock(state, fx);
            true
        }
        UiEvent::HistoryRefreshRequested => {
            request_history(state, fx);
            true
        }
        UiEvent::ZoomBy { factor } => {
            if !factor.is_finite() || factor <= 0.0 {
                return false;
            }
            let zoom = (state.zoom * factor).clamp(1.0, MAX_ZOOM);
            if (zoom - state.zoom).abs() < f64::EPSILON {
                return false;
            }
            state.zoom = zoom;
            true
        }
        UiEvent::ResetZoom => {
            state.zoom = 1.0;
            state.chart_epoch += 1;
            true
        }
    }
}

fn reduce_api(state: &mut AppState, fx: &mut Vec<Effect>, ev: ApiEvent) -> bool {
    let kind = ev.kind();
    let generation = ev.generation();
    if !state.generations.is_current(kind, generation) {
        debug_hooks::log_stale_response(kind.as_str(), generation, state.generations.current(kind));
        return false;
    }

    match ev {
        ApiEvent::TickersLoaded { result, .. } => {
            state.loading.tickers = false;
            match result {
                Ok(list) if !list.is_empty() => {
                    tracing::info!("ticker list loaded ({} symbols)", list.len());
                    state.tickers = list;
                    state.ticker_source = TickerSource::Remote;
                }
                other => {
                    match other {
                        Err(err) => {
                            tracing::warn!("ticker list unavailable: {err}");
                            state.last_error = Some(err);
                        }
                        Ok(_) => tracing::warn!("ticker list is empty"),
                    }
                    state.tickers = fallback_tickers();
                    state.ticker_source = TickerSource::Fallback;
                    state.status_message = "Ticker list unavailable; showing the built-in list.".to_string();
                }
            }
            if !state.has_ticker(&state.current_ticker) {
                if let Some(first) = state.tickers.first().map(|t| t.symbol.clone()) {
                    switch_ticker(state, fx, first);
                }
            }
            true
        }
        ApiEvent::StockDataLoaded { ticker, result, .. } => {
            if ticker != state.current_ticker {
                return false;
            }
            state.loading.stock = false;
            match result {
                Ok(points) => {
                    state.raw_history = normalize_history(points);
                    state.refilter();
                    state.last_error = None;
                    state.status_message = if state.raw_history.is_empty() {
                        format!("No historical data for {ticker}.")
                    } else if state.history.is_empty() {
                        format!("No data for {ticker} after the cutoff date.")
                    } else {
                        format!("Loaded {} days for {ticker}.", state.history.len())
                    };
                }
                Err(err) => {
                    tracing::warn!(%ticker, "stock data failed: {err}");
                    state.status_message = format!("Could not load history for {ticker}: {}", err.message);
                    state.last_error = Some(err);
                }
            }
            true
        }
        ApiEvent::PredictionLoaded { ticker, result, .. } => {
            if ticker != state.current_ticker {
                return false;
            }
            state.loading.predict = false;
            match result {
                Ok(resp) => {
                    if !resp.is_aligned() {
                        tracing::debug!(
                            %ticker,
                            dates = resp.dates.len(),
                            predicted = resp.predicted.len(),
                            "forecast arrays differ in length; extra entries ignored"
                        );
                    }
                    state.forecast = forecast_points(&resp);
                    let confidence = resp.confidence;
                    state.prediction = Some(resp);
                    state.rebuild_timeline();
                    state.last_error = None;
                    let days = state.timeline.forecast_len();
                    state.status_message = if days == 0 {
                        format!("Forecast for {ticker} has no days after the last close.")
                    } else {
                        format!("Forecast for {ticker}: {days} days, confidence {confidence:.2}.")
                    };
                    request_latest(state, fx);
                }
                Err(err) => {
                    tracing::warn!(%ticker, "prediction failed: {err}");
                    state.status_message = format!("Prediction failed for {ticker}: {}", err.message);
                    state.last_error = Some(err);
                }
            }
            true
        }
        ApiEvent::LatestLoaded { ticker, result, .. } => {
            if ticker != state.current_ticker {
                return false;
            }
            match result {
                Ok(row) => {
                    state.last_saved = Some(row);
                    true
                }
                Err(err) => {
                    tracing::debug!(%ticker, "no latest prediction: {err}");
                    false
                }
            }
        }
        ApiEvent::HistoryLoaded { ticker, result, .. } => {
            if ticker != state.current_ticker {
                return false;
            }
            state.loading.history = false;
            match result {
                Ok(rows) => {
                    state.status_message = format!("{} saved forecasts for {ticker}.", rows.len());
                    state.history_rows = rows;
                }
                Err(err) => {
                    tracing::warn!(%ticker, "prediction history failed: {err}");
                    state.status_message = format!("Could not load saved forecasts for {ticker}: {}", err.message);
                    state.last_error = Some(err);
                }
            }
            true
        }
    }
}

fn switch_ticker(state: &mut AppState, fx: &mut Vec<Effect>, ticker: String) {
    state.current_ticker = ticker;
    // In-flight work for the previous ticker must not land on the new one.
    state.generations.bump(RequestKind::Predict);
    state.generations.bump(RequestKind::History);
    state.loading.predict = false;
    state.loading.history = false;
    state.reset_series("ticker changed; dropping forecast");
    state.status_message = format!("Loading {}…", state.current_ticker);

    request_stock(state, fx);
    request_latest(state, fx);
    if state.route == Route::History {
        request_history(state, fx);
    }
}

fn request_tickers(state: &mut AppState, fx: &mut Vec<Effect>) {
    let generation = state.generations.bump(RequestKind::Tickers);
    state.loading.tickers = true;
    debug_hooks::log_request_start("tickers", generation, "");
    fx.push(Effect::FetchTickers { generation });
}

fn request_stock(state: &mut AppState, fx: &mut Vec<Effect>) {
    if state.current_ticker.is_empty() {
        return;
    }
    let generation = state.generations.bump(RequestKind::Stock);
    state.loading.stock = true;
    debug_hooks::log_request_start(
        "stock",
        generation,
        format!("ticker={} days={}", state.current_ticker, state.days),
    );
    fx.push(Effect::FetchStockData {
        generation,
        ticker: state.current_ticker.clone(),
        days: state.days,
    });
}

fn request_predict(state: &mut AppState, fx: &mut Vec<Effect>) {
    let generation = state.generations.bump(RequestKind::Predict);
    state.loading.predict = true;
    let mut request = PredictionRequest::new(state.current_ticker.clone()).forecast_days(state.forecast_days);
    if let Some(days_back) = state.days_back {
        request = request.days_back(days_back);
    }
    debug_hooks::log_request_start("predict", generation, format!("{request:?}"));
    fx.push(Effect::Predict { generation, request });
}

fn request_latest(state: &mut AppState, fx: &mut Vec<Effect>) {
    if state.current_ticker.is_empty() {
        return;
    }
    let generation = state.generations.bump(RequestKind::Latest);
    debug_hooks::log_request_start("latest", generation, format!("ticker={}", state.current_ticker));
    fx.push(Effect::FetchLatest {
        generation,
        ticker: state.current_ticker.clone(),
    });
}

fn request_history(state: &mut AppState, fx: &mut Vec<Effect>) {
    if state.current_ticker.is_empty() {
        return;
    }
    let generation = state.generations.bump(RequestKind::History);
    state.loading.history = true;
    debug_hooks::log_request_start(
        "history",
        generation,
        format!("ticker={} limit={}", state.current_ticker, state.history_limit),
    );
    fx.push(Effect::FetchHistory {
        generation,
        ticker: state.current_ticker.clone(),
        limit: state.history_limit,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_client::{ErrorKind, PredictionHistory, PredictionResponse, StockDataPoint, Ticker};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(date: &str, close: f64) -> StockDataPoint {
        StockDataPoint {
            date: d(date),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    fn prediction(dates: &[&str], predicted: &[f64]) -> PredictionResponse {
        PredictionResponse {
            actual: vec![],
            predicted: predicted.to_vec(),
            dates: dates.iter().map(|s| d(s)).collect(),
            confidence: 0.8,
        }
    }

    fn ui(state: AppState, ev: UiEvent) -> Transition {
        reduce(state, AppEvent::Ui(ev))
    }

    fn api(state: AppState, ev: ApiEvent) -> Transition {
        reduce(state, AppEvent::Api(ev))
    }

    fn net_error() -> FetchError {
        FetchError::new(ErrorKind::Network, "prediction service unreachable")
    }

    fn stock_generation(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::FetchStockData { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("stock request")
    }

    /// State with ENEL.MI history 2024-01-02..2024-01-04 loaded.
    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.cutoff = None;
        let t = ui(state, UiEvent::ReloadRequested);
        let generation = stock_generation(&t.effects);
        api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0), bar("2024-01-04", 12.0)]),
            },
        )
        .state
    }

    #[test]
    fn started_requests_tickers_history_and_latest() {
        let t = ui(AppState::default(), UiEvent::Started);
        let kinds: Vec<_> = t.effects.iter().map(Effect::kind).collect();
        assert_eq!(kinds, vec![RequestKind::Tickers, RequestKind::Stock, RequestKind::Latest]);
        assert!(t.state.loading.tickers);
        assert!(t.state.loading.stock);
        assert!(t.changed);
    }

    #[test]
    fn history_response_is_filtered_and_merged() {
        let mut state = AppState::default();
        state.cutoff = Some(d("2024-01-03"));
        let t = ui(state, UiEvent::ReloadRequested);
        let generation = stock_generation(&t.effects);
        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![bar("2024-01-04", 12.0), bar("2024-01-02", 10.0), bar("2024-01-03", 11.0)]),
            },
        );
        assert!(t.changed);
        assert!(!t.state.loading.stock);
        assert_eq!(t.state.raw_history.len(), 3);
        assert_eq!(t.state.history.len(), 2);
        assert_eq!(t.state.timeline.len(), 2);
        assert_eq!(t.state.timeline.seam_index(), None);
    }

    #[test]
    fn predict_appends_forecast_without_refetching_history() {
        let state = loaded();
        let revision = state.timeline_revision;
        let t = ui(state, UiEvent::PredictRequested);
        assert!(t.state.loading.predict);
        let (generation, request) = match &t.effects[..] {
            [Effect::Predict { generation, request }] => (*generation, request.clone()),
            other => panic!("unexpected effects {other:?}"),
        };
        assert_eq!(request.ticker, "ENEL.MI");
        assert_eq!(request.forecast_days, Some(30));
        assert_eq!(request.days_back, None);

        let t = api(
            t.state,
            ApiEvent::PredictionLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(prediction(&["2024-01-05", "2024-01-08"], &[12.5, 12.0])),
            },
        );
        let s = &t.state;
        assert!(!s.loading.predict);
        assert_eq!(s.timeline.len(), 5);
        assert_eq!(s.timeline.seam_index(), Some(3));
        assert_eq!(s.history.len(), 3);
        assert!(s.timeline_revision > revision);
        assert_eq!(s.stats.bullish_days, 1);
        assert_eq!(s.stats.bearish_days, 1);
        assert!(t.effects.iter().all(|e| e.kind() == RequestKind::Latest));
        assert_eq!(t.effects.len(), 1);
    }

    #[test]
    fn predict_request_carries_window() {
        let mut state = loaded();
        state.days_back = Some(60);
        state.forecast_days = 10;
        let t = ui(state, UiEvent::PredictRequested);
        match &t.effects[..] {
            [Effect::Predict { request, .. }] => {
                assert_eq!(request.days_back, Some(60));
                assert_eq!(request.forecast_days, Some(10));
            }
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn forecast_only_stats_follow_convention() {
        let t = ui(AppState::default(), UiEvent::PredictRequested);
        let generation = t.state.generations.predict;
        let t = api(
            t.state,
            ApiEvent::PredictionLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(prediction(
                    &["2024-02-01", "2024-02-02", "2024-02-05", "2024-02-06"],
                    &[10.0, 12.0, 11.0, 13.0],
                )),
            },
        );
        assert_eq!(t.state.timeline.seam_index(), Some(0));
        assert_eq!(t.state.stats.bullish_days, 3);
        assert_eq!(t.state.stats.bearish_days, 1);
        assert!((t.state.stats.average - 11.5).abs() < 1e-9);
    }

    #[test]
    fn ticker_change_discards_forecast_and_refetches() {
        let state = loaded();
        let t = ui(state, UiEvent::PredictRequested);
        let generation = t.state.generations.predict;
        let mut state = api(
            t.state,
            ApiEvent::PredictionLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(prediction(&["2024-01-05"], &[12.5])),
            },
        )
        .state;
        state.route = Route::History;
        let epoch = state.chart_epoch;
        state.zoom = 4.0;

        let t = ui(state, UiEvent::TickerChanged { ticker: "ENI.MI".into() });
        let s = &t.state;
        assert!(t.changed);
        assert_eq!(s.current_ticker, "ENI.MI");
        assert!(s.prediction.is_none());
        assert!(s.forecast.is_empty());
        assert!(s.timeline.is_empty());
        assert_eq!(s.timeline.seam_index(), None);
        assert!(s.history_rows.is_empty());
        assert_eq!(s.chart_epoch, epoch + 1);
        assert_eq!(s.zoom, 1.0);
        let kinds: Vec<_> = t.effects.iter().map(Effect::kind).collect();
        assert_eq!(kinds, vec![RequestKind::Stock, RequestKind::Latest, RequestKind::History]);
        assert!(t.effects.contains(&Effect::FetchStockData {
            generation: s.generations.stock,
            ticker: "ENI.MI".into(),
            days: 365,
        }));
    }

    #[test]
    fn unknown_or_same_ticker_is_ignored() {
        let t = ui(AppState::default(), UiEvent::TickerChanged { ticker: "XYZ.MI".into() });
        assert_eq!(t.state.current_ticker, "ENEL.MI");
        assert!(t.effects.is_empty());
        assert!(t.state.status_message.contains("not available"));

        let t = ui(AppState::default(), UiEvent::TickerChanged { ticker: "ENEL.MI".into() });
        assert!(!t.changed);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn stale_stock_response_is_discarded() {
        let t = ui(AppState::default(), UiEvent::ReloadRequested);
        let first = stock_generation(&t.effects);
        let t = ui(t.state, UiEvent::ReloadRequested);
        let second = stock_generation(&t.effects);
        assert!(second > first);

        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation: first,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![bar("2024-01-02", 1.0)]),
            },
        );
        assert!(!t.changed);
        assert!(t.state.history.is_empty());
        assert!(t.state.loading.stock);

        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation: second,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![bar("2024-01-02", 2.0)]),
            },
        );
        assert!(t.changed);
        assert_eq!(t.state.history[0].close, 2.0);
    }

    #[test]
    fn rapid_ticker_switch_keeps_only_latest_response() {
        let t = ui(AppState::default(), UiEvent::ReloadRequested);
        let enel = stock_generation(&t.effects);
        let t = ui(t.state, UiEvent::TickerChanged { ticker: "ENI.MI".into() });
        let t = ui(t.state, UiEvent::TickerChanged { ticker: "G.MI".into() });
        let g = stock_generation(&t.effects);

        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation: enel,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![bar("2024-01-02", 1.0)]),
            },
        );
        assert!(t.state.history.is_empty());

        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation: g,
                ticker: "G.MI".into(),
                result: Ok(vec![bar("2024-01-02", 30.0)]),
            },
        );
        assert_eq!(t.state.current_ticker, "G.MI");
        assert_eq!(t.state.history.len(), 1);
    }

    #[test]
    fn prediction_for_previous_ticker_is_discarded() {
        let t = ui(loaded(), UiEvent::PredictRequested);
        let generation = t.state.generations.predict;
        let t = ui(t.state, UiEvent::TickerChanged { ticker: "ISP.MI".into() });
        assert!(!t.state.loading.predict);
        let t = api(
            t.state,
            ApiEvent::PredictionLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(prediction(&["2024-01-05"], &[12.5])),
            },
        );
        assert!(!t.changed);
        assert!(t.state.forecast.is_empty());
    }

    #[test]
    fn ticker_list_failure_falls_back_to_builtin_list() {
        let t = ui(AppState::default(), UiEvent::Started);
        let generation = t.state.generations.tickers;
        let t = api(
            t.state,
            ApiEvent::TickersLoaded {
                generation,
                result: Err(net_error()),
            },
        );
        let s = &t.state;
        assert_eq!(s.ticker_source, TickerSource::Fallback);
        let symbols: Vec<_> = s.tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ENEL.MI", "ENI.MI", "G.MI", "ISP.MI", "UCG.MI"]);
        assert!(!s.loading.tickers);
        assert!(s.status_message.contains("built-in"));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn remote_list_without_current_ticker_switches_to_first() {
        let t = ui(AppState::default(), UiEvent::Started);
        let generation = t.state.generations.tickers;
        let t = api(
            t.state,
            ApiEvent::TickersLoaded {
                generation,
                result: Ok(vec![Ticker::new("STLAM.MI", "Stellantis"), Ticker::new("ENI.MI", "Eni")]),
            },
        );
        assert_eq!(t.state.ticker_source, TickerSource::Remote);
        assert_eq!(t.state.current_ticker, "STLAM.MI");
        assert!(t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::FetchStockData { ticker, .. } if ticker == "STLAM.MI")));
    }

    #[test]
    fn stock_error_keeps_previous_data() {
        let state = loaded();
        let t = ui(state, UiEvent::ReloadRequested);
        let generation = stock_generation(&t.effects);
        let t = api(
            t.state,
            ApiEvent::StockDataLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Err(FetchError::new(ErrorKind::Status, "HTTP 404: Ticker not found")),
            },
        );
        let s = &t.state;
        assert!(!s.loading.stock);
        assert_eq!(s.history.len(), 3);
        assert_eq!(s.last_error.as_ref().map(|e| e.kind), Some(ErrorKind::Status));
        assert!(s.status_message.contains("Ticker not found"));
    }

    #[test]
    fn prediction_error_resets_loading() {
        let t = ui(loaded(), UiEvent::PredictRequested);
        let generation = t.state.generations.predict;
        let t = api(
            t.state,
            ApiEvent::PredictionLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Err(net_error()),
            },
        );
        assert!(!t.state.loading.predict);
        assert_eq!(t.state.timeline.len(), 3);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn cutoff_change_refilters_without_refetch() {
        let state = loaded();
        let t = ui(state, UiEvent::CutoffChanged { cutoff: Some(d("2024-01-04")) });
        assert!(t.effects.is_empty());
        assert_eq!(t.state.history.len(), 1);
        assert_eq!(t.state.raw_history.len(), 3);
        assert_eq!(t.state.timeline.len(), 1);

        let t = ui(t.state, UiEvent::CutoffChanged { cutoff: None });
        assert_eq!(t.state.history.len(), 3);
    }

    #[test]
    fn days_change_refetches_history() {
        let t = ui(AppState::default(), UiEvent::DaysChanged { days: 90 });
        assert_eq!(t.state.days, 90);
        assert!(matches!(t.effects[..], [Effect::FetchStockData { days: 90, .. }]));

        let t = ui(t.state, UiEvent::DaysChanged { days: 90 });
        assert!(!t.changed);

        let t = ui(t.state, UiEvent::ForecastDaysChanged { days: 0 });
        assert_eq!(t.state.forecast_days, 1);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn zoom_is_clamped_and_reset_recreates_chart() {
        let t = ui(AppState::default(), UiEvent::ZoomBy { factor: 0.5 });
        assert!(!t.changed);
        assert_eq!(t.state.zoom, 1.0);

        let t = ui(t.state, UiEvent::ZoomBy { factor: 1000.0 });
        assert_eq!(t.state.zoom, MAX_ZOOM);

        let t = ui(t.state, UiEvent::ZoomBy { factor: f64::NAN });
        assert!(!t.changed);

        let epoch = t.state.chart_epoch;
        let t = ui(t.state, UiEvent::ResetZoom);
        assert_eq!(t.state.zoom, 1.0);
        assert_eq!(t.state.chart_epoch, epoch + 1);
    }

    #[test]
    fn history_route_fetches_saved_forecasts() {
        let t = ui(AppState::default(), UiEvent::RouteChanged { route: Route::History });
        assert!(t.state.loading.history);
        let generation = match &t.effects[..] {
            [Effect::FetchHistory { generation, ticker, limit }] => {
                assert_eq!(ticker, "ENEL.MI");
                assert_eq!(*limit, 10);
                *generation
            }
            other => panic!("unexpected effects {other:?}"),
        };
        let row = PredictionHistory {
            ts: "2024-03-01T00:00:00".into(),
            ticker: "ENEL.MI".into(),
            yhat: 6.5,
            yhat_lower: 6.1,
            yhat_upper: 6.9,
            created_at: String::new(),
        };
        let t = api(
            t.state,
            ApiEvent::HistoryLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Ok(vec![row]),
            },
        );
        assert!(!t.state.loading.history);
        assert_eq!(t.state.history_rows.len(), 1);

        let t = ui(t.state, UiEvent::HistoryLimitChanged { limit: 25 });
        assert!(matches!(t.effects[..], [Effect::FetchHistory { limit: 25, .. }]));
    }

    #[test]
    fn latest_failure_is_quiet() {
        let t = ui(AppState::default(), UiEvent::Started);
        let generation = t.state.generations.latest;
        let status = t.state.status_message.clone();
        let t = api(
            t.state,
            ApiEvent::LatestLoaded {
                generation,
                ticker: "ENEL.MI".into(),
                result: Err(FetchError::new(ErrorKind::Status, "HTTP 404")),
            },
        );
        assert!(!t.changed);
        assert!(t.state.last_saved.is_none());
        assert_eq!(t.state.status_message, status);
    }
}
