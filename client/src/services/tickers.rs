use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::Ticker;

/// Shown when the ticker list cannot be fetched.
pub const FALLBACK_TICKERS: [(&str, &str); 5] = [
    ("ENEL.MI", "Enel"),
    ("ENI.MI", "Eni"),
    ("G.MI", "Generali"),
    ("ISP.MI", "Intesa Sanpaolo"),
    ("UCG.MI", "UniCredit"),
];

pub fn fallback_tickers() -> Vec<Ticker> {
    FALLBACK_TICKERS
        .iter()
        .map(|(symbol, name)| Ticker::new(*symbol, *name))
        .collect()
}

impl ApiClient {
    /// `GET /api/mib-tickers`
    pub async fn get_mib_tickers(&self) -> Result<Vec<Ticker>, ApiError> {
        let url = self.url(&["api", "mib-tickers"])?;
        self.get_json(url, &[]).await
    }
}
