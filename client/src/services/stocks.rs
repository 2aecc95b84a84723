use super::require_ticker;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{StockDataPoint, StockDataResponse};

impl ApiClient {
    /// `GET /api/stocks/{ticker}?days=`: daily bars, oldest first.
    pub async fn get_stock_data(&self, ticker: &str, days: u32) -> Result<Vec<StockDataPoint>, ApiError> {
        let ticker = require_ticker(ticker)?;
        let url = self.url(&["api", "stocks", ticker])?;
        let resp: StockDataResponse = self.get_json(url, &[("days", days.max(1).to_string())]).await?;
        let mut data = resp.data;
        // Some backends answer newest first.
        if data.windows(2).any(|w| w[0].date > w[1].date) {
            data.sort_by_key(|p| p.date);
        }
        Ok(data)
    }
}
