//! Asynchronous client for the stock prediction service.
//!
//! [`ApiClient`] talks to one configured base URL and exposes the service
//! operations through the [`ForecastApi`] trait, so callers can swap in a fake.

pub mod config;
pub mod error;
pub mod http;
pub mod services;
pub mod types;

pub use config::{ClientConfig, RouteSet};
pub use error::{ApiError, ErrorBody, ErrorKind};
pub use http::ApiClient;
pub use services::tickers::{fallback_tickers, FALLBACK_TICKERS};
pub use services::ForecastApi;
pub use types::{
    PredictionHistory, PredictionRequest, PredictionResponse, StockDataPoint, StockDataResponse,
    Ticker,
};
