use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use forecast_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "FORECAST_APP_CONFIG";
pub const CUTOFF_ENV: &str = "FORECAST_CUTOFF_DATE";

pub const DEFAULT_TICKER: &str = "ENEL.MI";
pub const MAX_DAYS: u32 = 3650;
pub const MAX_FORECAST_DAYS: u32 = 365;
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// Startup settings. Read once; the app never writes them back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub api: ClientConfig,
    /// Historical points before this day are not shown.
    pub cutoff_date: Option<NaiveDate>,
    /// Lookback of the historical series request.
    pub days: u32,
    pub days_back: Option<u32>,
    pub forecast_days: u32,
    pub history_limit: u32,
    pub default_ticker: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            cutoff_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            days: 365,
            days_back: None,
            forecast_days: 30,
            history_limit: 10,
            default_ticker: DEFAULT_TICKER.to_string(),
        }
    }
}

impl AppSettings {
    /// Settings from `$FORECAST_APP_CONFIG` or the platform config dir, then env overrides.
    /// A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p.trim())),
            _ => default_settings_path(),
        };
        let settings = match path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            Some(path) => {
                tracing::info!("no settings at {}; using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read settings {:?}", path))?;
        let settings = Self::from_toml(&raw).with_context(|| format!("parse settings {:?}", path))?;
        tracing::info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let settings: Self = toml::from_str(raw)?;
        Ok(settings.clamped())
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.api = self.api.with_env_overrides();
        if let Ok(raw) = std::env::var(CUTOFF_ENV) {
            let raw = raw.trim();
            self.cutoff_date = match raw {
                "" => self.cutoff_date,
                "none" | "off" => None,
                _ => Some(
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .with_context(|| format!("{CUTOFF_ENV}={raw:?} is not YYYY-MM-DD"))?,
                ),
            };
        }
        Ok(self)
    }

    fn clamped(mut self) -> Self {
        self.days = self.days.clamp(1, MAX_DAYS);
        self.days_back = self.days_back.map(|d| d.clamp(1, MAX_DAYS));
        self.forecast_days = self.forecast_days.clamp(1, MAX_FORECAST_DAYS);
        self.history_limit = self.history_limit.clamp(1, MAX_HISTORY_LIMIT);
        self.default_ticker = self.default_ticker.trim().to_string();
        self
    }
}

fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "mib", "forecast_app").map(|p| p.config_dir().join("settings.toml"))
}
