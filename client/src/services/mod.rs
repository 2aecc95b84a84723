pub mod predictions;
pub mod stocks;
pub mod tickers;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{PredictionHistory, PredictionRequest, PredictionResponse, StockDataPoint, Ticker};
use async_trait::async_trait;

pub const DEFAULT_STOCK_DAYS: u32 = 365;
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Operations of the prediction service.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    async fn get_stock_data(&self, ticker: &str, days: u32) -> Result<Vec<StockDataPoint>, ApiError>;

    async fn predict_stock(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError>;

    async fn latest(&self, ticker: &str) -> Result<PredictionHistory, ApiError>;

    async fn history(&self, ticker: &str, limit: u32) -> Result<Vec<PredictionHistory>, ApiError>;

    async fn get_mib_tickers(&self) -> Result<Vec<Ticker>, ApiError>;
}

#[async_trait]
impl ForecastApi for ApiClient {
    async fn get_stock_data(&self, ticker: &str, days: u32) -> Result<Vec<StockDataPoint>, ApiError> {
        ApiClient::get_stock_data(self, ticker, days).await
    }

    async fn predict_stock(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        ApiClient::predict_stock(self, request).await
    }

    async fn latest(&self, ticker: &str) -> Result<PredictionHistory, ApiError> {
        ApiClient::latest(self, ticker).await
    }

    async fn history(&self, ticker: &str, limit: u32) -> Result<Vec<PredictionHistory>, ApiError> {
        ApiClient::history(self, ticker, limit).await
    }

    async fn get_mib_tickers(&self) -> Result<Vec<Ticker>, ApiError> {
        ApiClient::get_mib_tickers(self).await
    }
}

pub(crate) fn require_ticker(ticker: &str) -> Result<&str, ApiError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::InvalidRequest("ticker is empty".to_string()));
    }
    Ok(ticker)
}
