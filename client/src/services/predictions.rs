use super::require_ticker;
use crate::config::RouteSet;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{PredictionHistory, PredictionRequest, PredictionResponse};

impl ApiClient {
    pub async fn predict_stock(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        require_ticker(&request.ticker)?;
        if request.forecast_days == Some(0) {
            return Err(ApiError::InvalidRequest("forecast_days must be at least 1".to_string()));
        }
        let url = match self.routes() {
            RouteSet::Api => self.url(&["api", "predict"])?,
            RouteSet::Predictions => self.url(&["predictions", "predict"])?,
        };
        let mut request = request.clone();
        request.ticker = request.ticker.trim().to_string();
        let resp: PredictionResponse = self.post_json(url, &request).await?;
        if !resp.is_aligned() {
            log::warn!(
                "prediction for {} has {} dates but {} values",
                request.ticker,
                resp.dates.len(),
                resp.predicted.len()
            );
        }
        Ok(resp)
    }

    /// `GET /predictions/latest?ticker=`: most recent saved forecast row.
    pub async fn latest(&self, ticker: &str) -> Result<PredictionHistory, ApiError> {
        let ticker = require_ticker(ticker)?;
        let url = self.url(&["predictions", "latest"])?;
        self.get_json(url, &[("ticker", ticker.to_string())]).await
    }

    pub async fn history(&self, ticker: &str, limit: u32) -> Result<Vec<PredictionHistory>, ApiError> {
        let ticker = require_ticker(ticker)?;
        let limit = limit.max(1).to_string();
        match self.routes() {
            RouteSet::Api => {
                let url = self.url(&["api", "history", ticker])?;
                self.get_json(url, &[("limit", limit)]).await
            }
            RouteSet::Predictions => {
                let url = self.url(&["predictions", "history"])?;
                self.get_json(url, &[("ticker", ticker.to_string()), ("limit", limit)])
                    .await
            }
        }
    }
}
