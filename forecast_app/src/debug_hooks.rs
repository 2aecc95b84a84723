use std::sync::OnceLock;

static ENABLED: OnceLock<bool> = OnceLock::new();

pub const DEBUG_HOOKS_ENV: &str = "FORECAST_DEBUG_HOOKS";

fn hooks_enabled() -> bool {
    *ENABLED.get_or_init(|| {
        std::env::var(DEBUG_HOOKS_ENV)
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(false)
    })
}

fn log_line(topic: &str, msg: impl AsRef<str>) {
    if !hooks_enabled() {
        return;
    }
    tracing::debug!(target: "forecast_app::hooks", topic, "{}", msg.as_ref());
}

pub fn log_timeline_reset(reason: &str) {
    log_line("timeline.reset", reason);
}

pub fn log_timeline_merge(ticker: &str, historical: usize, forecast: usize, seam: Option<usize>) {
    log_line(
        "timeline.merge",
        format!("ticker={ticker} historical={historical} forecast={forecast} seam={seam:?}"),
    );
}

pub fn log_timeline_drop(series: &str, dropped: usize) {
    if dropped == 0 {
        return;
    }
    log_line(
        "timeline.drop",
        format!("dropped {dropped} {series} point(s) out of order or overlapping"),
    );
}

pub fn log_request_start(kind: &str, generation: u64, detail: impl AsRef<str>) {
    log_line(
        "request.start",
        format!("{kind} gen={generation} {}", detail.as_ref()),
    );
}

/// Stale responses are dropped silently; this is the only trace of them.
pub fn log_stale_response(kind: &str, generation: u64, current: u64) {
    log_line(
        "request.stale",
        format!("discarding {kind} response gen={generation} (current gen={current})"),
    );
}

pub fn log_chart_dispose(instance: u64) {
    log_line("chart.dispose", format!("plot instance #{instance}"));
}

pub fn log_chart_series(instance: u64, points: usize, seam: Option<usize>) {
    log_line(
        "chart.series",
        format!("plot instance #{instance} points={points} seam={seam:?}"),
    );
}
