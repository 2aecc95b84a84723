use anyhow::{anyhow, Context, Result};
use forecast_app::app::commands::Dispatcher;
use forecast_app::app::{AppRuntime, AppState};
use forecast_app::settings::AppSettings;
use forecast_client::ApiClient;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,forecast_app=debug";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let settings = AppSettings::load().context("load settings")?;
    tracing::info!(
        base_url = %settings.api.base_url,
        routes = %settings.api.routes,
        cutoff = ?settings.cutoff_date,
        "starting forecast viewer"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("forecast-io")
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let client = ApiClient::new(&settings.api).context("build API client")?;
    let (tx, rx) = std::sync::mpsc::channel();
    let dispatcher = Dispatcher::new(Arc::new(client), rt.handle().clone(), tx);
    let state = AppState::from_settings(&settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("FTSE MIB Forecast"),
        ..Default::default()
    };

    eframe::run_native(
        "FTSE MIB Forecast",
        options,
        Box::new(move |cc| {
            let mut app = AppRuntime::new(state, dispatcher, rx);
            app.start(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow!("eframe error: {e}"))?;

    rt.shutdown_background();
    Ok(())
}
