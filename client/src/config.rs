use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Env var that overrides [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "FORECAST_API_BASE";
/// Env var that overrides [`ClientConfig::routes`].
pub const ROUTES_ENV: &str = "FORECAST_API_ROUTES";

/// The two URL layouts the prediction service has shipped with.
///
/// `Api` serves `/api/predict` and `/api/history/{ticker}`, `Predictions`
/// serves `/predictions/predict` and `/predictions/history?ticker=`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RouteSet {
    #[default]
    Api,
    Predictions,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub routes: RouteSet,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            routes: RouteSet::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `FORECAST_API_BASE` / `FORECAST_API_ROUTES` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            if !base.trim().is_empty() {
                self.base_url = base.trim().to_string();
            }
        }
        if let Ok(routes) = std::env::var(ROUTES_ENV) {
            match RouteSet::from_str(routes.trim()) {
                Ok(r) => self.routes = r,
                Err(_) => log::warn!("ignoring unknown {ROUTES_ENV}={routes:?}"),
            }
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = ClientConfig::from_toml("base_url = \"http://api.local:9000\"").unwrap();
        assert_eq!(cfg.base_url, "http://api.local:9000");
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.routes, RouteSet::Api);
    }

    #[test]
    fn route_set_parses_lowercase() {
        let cfg = ClientConfig::from_toml("routes = \"predictions\"\ntimeout_ms = 500").unwrap();
        assert_eq!(cfg.routes, RouteSet::Predictions);
        assert_eq!(cfg.timeout(), Duration::from_millis(500));
        assert_eq!(RouteSet::from_str("API").unwrap(), RouteSet::Api);
        assert_eq!(RouteSet::Predictions.to_string(), "predictions");
    }

    #[test]
    fn unknown_route_set_is_rejected() {
        assert!(ClientConfig::from_toml("routes = \"v2\"").is_err());
    }
}
