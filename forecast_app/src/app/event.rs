use super::state::{RequestKind, Route};
use chrono::NaiveDate;
use forecast_client::{
    ApiError, ErrorKind, PredictionHistory, PredictionRequest, PredictionResponse, StockDataPoint,
    Ticker,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Ui(UiEvent),
    Api(ApiEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Started,
    RouteChanged { route: Route },
    TickerChanged { ticker: String },

    DaysChanged { days: u32 },
    DaysBackChanged { days_back: Option<u32> },
    ForecastDaysChanged { days: u32 },
    CutoffChanged { cutoff: Option<NaiveDate> },
    HistoryLimitChanged { limit: u32 },

    PredictRequested,
    ReloadRequested,
    HistoryRefreshRequested,

    ZoomBy { factor: f64 },
    ResetZoom,
}

/// Completion of an [`Effect`]. `generation` is the one the effect was issued with.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    TickersLoaded {
        generation: u64,
        result: Result<Vec<Ticker>, FetchError>,
    },
    StockDataLoaded {
        generation: u64,
        ticker: String,
        result: Result<Vec<StockDataPoint>, FetchError>,
    },
    PredictionLoaded {
        generation: u64,
        ticker: String,
        result: Result<PredictionResponse, FetchError>,
    },
    LatestLoaded {
        generation: u64,
        ticker: String,
        result: Result<PredictionHistory, FetchError>,
    },
    HistoryLoaded {
        generation: u64,
        ticker: String,
        result: Result<Vec<PredictionHistory>, FetchError>,
    },
}

impl ApiEvent {
    pub fn kind(&self) -> RequestKind {
        match self {
            ApiEvent::TickersLoaded { .. } => RequestKind::Tickers,
            ApiEvent::StockDataLoaded { .. } => RequestKind::Stock,
            ApiEvent::PredictionLoaded { .. } => RequestKind::Predict,
            ApiEvent::LatestLoaded { .. } => RequestKind::Latest,
            ApiEvent::HistoryLoaded { .. } => RequestKind::History,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            ApiEvent::TickersLoaded { generation, .. }
            | ApiEvent::StockDataLoaded { generation, .. }
            | ApiEvent::PredictionLoaded { generation, .. }
            | ApiEvent::LatestLoaded { generation, .. }
            | ApiEvent::HistoryLoaded { generation, .. } => *generation,
        }
    }
}

/// Work the reducer asks for. Executed off the UI thread by `commands`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchTickers {
        generation: u64,
    },
    FetchStockData {
        generation: u64,
        ticker: String,
        days: u32,
    },
    Predict {
        generation: u64,
        request: PredictionRequest,
    },
    FetchLatest {
        generation: u64,
        ticker: String,
    },
    FetchHistory {
        generation: u64,
        ticker: String,
        limit: u32,
    },
}

impl Effect {
    pub fn kind(&self) -> RequestKind {
        match self {
            Effect::FetchTickers { .. } => RequestKind::Tickers,
            Effect::FetchStockData { .. } => RequestKind::Stock,
            Effect::Predict { .. } => RequestKind::Predict,
            Effect::FetchLatest { .. } => RequestKind::Latest,
            Effect::FetchHistory { .. } => RequestKind::History,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Effect::FetchTickers { generation }
            | Effect::FetchStockData { generation, .. }
            | Effect::Predict { generation, .. }
            | Effect::FetchLatest { generation, .. }
            | Effect::FetchHistory { generation, .. } => *generation,
        }
    }
}

/// Cloneable summary of an [`ApiError`], so failures can travel in events.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&ApiError> for FetchError {
    fn from(err: &ApiError) -> Self {
        Self::new(err.kind(), err.message())
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}
