//! Desktop viewer for stock forecasts served by the prediction API.

pub mod app;
pub mod chart;
pub mod debug_hooks;
pub mod settings;
pub mod stats;
pub mod timeline;
