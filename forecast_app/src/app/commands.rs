use super::event::{ApiEvent, AppEvent, Effect, FetchError};
use forecast_client::ForecastApi;
use std::sync::mpsc::Sender;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;

/// Executes one effect and turns its outcome into the event the reducer expects.
pub async fn run_effect(api: &dyn ForecastApi, effect: Effect) -> AppEvent {
    let ev = match effect {
        Effect::FetchTickers { generation } => ApiEvent::TickersLoaded {
            generation,
            result: api.get_mib_tickers().await.map_err(FetchError::from),
        },
        Effect::FetchStockData { generation, ticker, days } => {
            let result = api.get_stock_data(&ticker, days).await.map_err(FetchError::from);
            ApiEvent::StockDataLoaded {
                generation,
                ticker,
                result,
            }
        }
        Effect::Predict { generation, request } => {
            let result = api.predict_stock(&request).await.map_err(FetchError::from);
            ApiEvent::PredictionLoaded {
                generation,
                ticker: request.ticker,
                result,
            }
        }
        Effect::FetchLatest { generation, ticker } => {
            let result = api.latest(&ticker).await.map_err(FetchError::from);
            ApiEvent::LatestLoaded {
                generation,
                ticker,
                result,
            }
        }
        Effect::FetchHistory { generation, ticker, limit } => {
            let result = api.history(&ticker, limit).await.map_err(FetchError::from);
            ApiEvent::HistoryLoaded {
                generation,
                ticker,
                result,
            }
        }
    };
    AppEvent::Api(ev)
}

/// Runs effects on the tokio runtime and posts results back to the UI thread.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn ForecastApi>,
    handle: Handle,
    tx: Sender<AppEvent>,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn ForecastApi>, handle: Handle, tx: Sender<AppEvent>) -> Self {
        Self {
            api,
            handle,
            tx,
            repaint: Arc::new(OnceLock::new()),
        }
    }

    /// Responses arriving after this wake the UI.
    pub fn attach(&self, ctx: &egui::Context) {
        let _ = self.repaint.set(ctx.clone());
    }

    pub fn dispatch(&self, effect: Effect) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let repaint = Arc::clone(&self.repaint);
        self.handle.spawn(async move {
            let kind = effect.kind();
            let ev = run_effect(api.as_ref(), effect).await;
            if tx.send(ev).is_err() {
                tracing::debug!("ui gone; dropping {} response", kind.as_str());
                return;
            }
            if let Some(ctx) = repaint.get() {
                ctx.request_repaint();
            }
        });
    }
}
