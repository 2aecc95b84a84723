use super::event::UiEvent;
use super::state::{AppState, Route, TickerSource};
use crate::chart::{show_history_chart, ChartHost};
use crate::settings::{MAX_DAYS, MAX_FORECAST_DAYS, MAX_HISTORY_LIMIT};
use chrono::NaiveDate;
use egui::{Color32, RichText};

const UP_COLOR: Color32 = Color32::from_rgb(38, 166, 91);
const DOWN_COLOR: Color32 = Color32::from_rgb(214, 69, 65);
const DEFAULT_DAYS_BACK: u32 = 365;

/// Widget buffers that only become events once the user commits them.
#[derive(Debug, Clone, PartialEq)]
pub struct Drafts {
    pub cutoff: String,
    pub cutoff_error: Option<String>,
    pub days: u32,
    pub history_limit: u32,
}

impl Drafts {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            cutoff: state
                .cutoff
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            cutoff_error: None,
            days: state.days,
            history_limit: state.history_limit,
        }
    }
}

/// Accepts `YYYY-MM-DD` or `dd/mm/YYYY`; blank clears the cutoff.
pub fn parse_cutoff(text: &str) -> Result<Option<NaiveDate>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .map(Some)
        .map_err(|_| format!("'{text}' is not a date (YYYY-MM-DD)"))
}

pub fn format_pct(pct: f64) -> String {
    format!("{pct:+.2}%")
}

fn direction_color(value: f64) -> Color32 {
    if value > 0.0 {
        UP_COLOR
    } else if value < 0.0 {
        DOWN_COLOR
    } else {
        Color32::GRAY
    }
}

/// Draws one frame and returns what the user asked for.
pub fn render(ctx: &egui::Context, state: &AppState, chart: &ChartHost, drafts: &mut Drafts) -> Vec<UiEvent> {
    let mut out = Vec::new();

    egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
        ui_top_bar(ui, state, &mut out);
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui_status_bar(ui, state);
    });

    if state.route == Route::Predict {
        egui::SidePanel::right("stats_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| ui_stats_panel(ui, state));
    }

    egui::CentralPanel::default().show(ctx, |ui| match state.route {
        Route::Predict => ui_predict(ui, state, chart, drafts, &mut out),
        Route::History => ui_history(ui, state, drafts, &mut out),
    });

    out
}

fn ui_top_bar(ui: &mut egui::Ui, state: &AppState, out: &mut Vec<UiEvent>) {
    ui.horizontal(|ui| {
        ui.heading("FTSE MIB Forecast");
        ui.separator();
        for route in Route::ALL {
            if ui.selectable_label(state.route == route, route.title()).clicked() && state.route != route {
                out.push(UiEvent::RouteChanged { route });
            }
        }
        ui.separator();
        ticker_combo(ui, state, out);
        match state.ticker_source {
            TickerSource::Fallback => {
                ui.label(RichText::new("built-in list").color(Color32::YELLOW).small());
            }
            TickerSource::Builtin if state.loading.tickers => {
                ui.spinner();
            }
            _ => {}
        }
    });
}

fn ui_status_bar(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        if state.loading.any() {
            ui.spinner();
        }
        ui.label(state.status_message.as_str());
        if let Some(err) = &state.last_error {
            ui.separator();
            ui.label(RichText::new(format!("last error: {}", err.kind)).color(DOWN_COLOR).small());
        }
    });
}

fn ticker_combo(ui: &mut egui::Ui, state: &AppState, out: &mut Vec<UiEvent>) {
    ui.label("Ticker:");
    egui::ComboBox::from_id_source("ticker_combo")
        .selected_text(state.ticker_label(&state.current_ticker))
        .width(220.0)
        .show_ui(ui, |ui| {
            for t in &state.tickers {
                let selected = t.symbol == state.current_ticker;
                if ui.selectable_label(selected, state.ticker_label(&t.symbol)).clicked() && !selected {
                    out.push(UiEvent::TickerChanged {
                        ticker: t.symbol.clone(),
                    });
                }
            }
        });
}

fn ui_predict(ui: &mut egui::Ui, state: &AppState, chart: &ChartHost, drafts: &mut Drafts, out: &mut Vec<UiEvent>) {
    ui.horizontal_wrapped(|ui| {
        ui.label("History days:");
        let resp = ui.add(
            egui::DragValue::new(&mut drafts.days)
                .speed(5.0)
                .clamp_range(1..=MAX_DAYS),
        );
        // Commit once the drag or edit is over, not on every step.
        if drafts.days != state.days && !resp.dragged() && !resp.has_focus() {
            out.push(UiEvent::DaysChanged { days: drafts.days });
        }

        ui.separator();
        ui.label("Forecast days:");
        let mut forecast_days = state.forecast_days;
        if ui
            .add(
                egui::DragValue::new(&mut forecast_days)
                    .speed(1.0)
                    .clamp_range(1..=MAX_FORECAST_DAYS),
            )
            .changed()
        {
            out.push(UiEvent::ForecastDaysChanged { days: forecast_days });
        }

        ui.separator();
        let mut use_back = state.days_back.is_some();
        let mut back = state.days_back.unwrap_or(DEFAULT_DAYS_BACK);
        let toggled = ui.checkbox(&mut use_back, "Training days:").changed();
        let edited = ui
            .add_enabled(
                use_back,
                egui::DragValue::new(&mut back).speed(5.0).clamp_range(1..=MAX_DAYS),
            )
            .changed();
        if toggled || edited {
            out.push(UiEvent::DaysBackChanged {
                days_back: use_back.then_some(back),
            });
        }
    });

    ui.horizontal_wrapped(|ui| {
        ui.label("From:");
        let resp = ui.add(
            egui::TextEdit::singleline(&mut drafts.cutoff)
                .hint_text("YYYY-MM-DD")
                .desired_width(100.0),
        );
        let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Apply").clicked() || submitted {
            match parse_cutoff(&drafts.cutoff) {
                Ok(cutoff) => {
                    drafts.cutoff_error = None;
                    if cutoff != state.cutoff {
                        out.push(UiEvent::CutoffChanged { cutoff });
                    }
                }
                Err(msg) => drafts.cutoff_error = Some(msg),
            }
        }
        if let Some(msg) = &drafts.cutoff_error {
            ui.label(RichText::new(msg).color(DOWN_COLOR));
        }

        ui.separator();
        let predict_label = if state.loading.predict { "Predicting…" } else { "Predict" };
        if ui
            .add_enabled(!state.current_ticker.is_empty(), egui::Button::new(predict_label))
            .clicked()
        {
            out.push(UiEvent::PredictRequested);
        }
        if ui.button("Reload").clicked() {
            out.push(UiEvent::ReloadRequested);
        }

        ui.separator();
        if ui.small_button("−").clicked() {
            out.push(UiEvent::ZoomBy { factor: 0.5 });
        }
        ui.label(format!("zoom {:.1}x", state.zoom));
        if ui.small_button("+").clicked() {
            out.push(UiEvent::ZoomBy { factor: 2.0 });
        }
        if ui.button("Reset zoom").clicked() {
            out.push(UiEvent::ResetZoom);
        }
    });

    ui.separator();

    if state.timeline.is_empty() && !state.loading.stock {
        ui.label(RichText::new(format!("No data for {}.", state.current_ticker)).weak());
    }
    match chart.chart() {
        Some(plot) => {
            let height = ui.available_height().max(200.0);
            let input = plot.show(ui, state.zoom, height);
            if let Some(factor) = input.zoom_factor {
                out.push(UiEvent::ZoomBy { factor });
            }
        }
        None => {
            ui.spinner();
        }
    }
}

fn ui_stats_panel(ui: &mut egui::Ui, state: &AppState) {
    let stats = &state.stats;
    ui.heading(state.current_ticker.as_str());
    ui.separator();

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            ui.label("Last close");
            match state.timeline.last_close() {
                Some(v) => ui.label(format!("{v:.3}")),
                None => ui.label("—"),
            };
            ui.end_row();

            ui.label("Forecast days");
            ui.label(state.timeline.forecast_len().to_string());
            ui.end_row();

            ui.label("Average");
            ui.label(format!("{:.3}", stats.average));
            ui.end_row();

            if let (Some(first), Some(last)) = (stats.first, stats.last) {
                ui.label("First / last");
                ui.label(format!("{first:.3} / {last:.3}"));
                ui.end_row();

                ui.label("Total change");
                ui.label(RichText::new(format_pct(stats.total_change)).color(direction_color(stats.total_change)));
                ui.end_row();
            }

            ui.label("Bullish days");
            ui.label(RichText::new(stats.bullish_days.to_string()).color(UP_COLOR));
            ui.end_row();

            ui.label("Bearish days");
            ui.label(RichText::new(stats.bearish_days.to_string()).color(DOWN_COLOR));
            ui.end_row();

            if let Some(p) = &state.prediction {
                ui.label("Confidence");
                ui.label(format!("{:.2}", p.confidence));
                ui.end_row();
            }
        });

    if let Some(saved) = &state.last_saved {
        ui.separator();
        ui.label(RichText::new("Last saved forecast").strong());
        let day = saved
            .timestamp()
            .map(|t| t.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| saved.ts.clone());
        ui.label(format!(
            "{day}: {:.3} [{:.3} – {:.3}]",
            saved.yhat, saved.yhat_lower, saved.yhat_upper
        ));
    }

    if stats.is_empty() {
        return;
    }
    ui.separator();
    ui.label(RichText::new("Daily changes").strong());
    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("daily_changes_grid").striped(true).show(ui, |ui| {
            for (p, pct) in state.timeline.forecast_points().iter().zip(&stats.daily_changes) {
                ui.label(p.date.format("%d/%m/%Y").to_string());
                ui.label(format!("{:.3}", p.value));
                ui.label(RichText::new(format_pct(*pct)).color(direction_color(*pct)));
                ui.end_row();
            }
        });
    });
}

fn ui_history(ui: &mut egui::Ui, state: &AppState, drafts: &mut Drafts, out: &mut Vec<UiEvent>) {
    ui.horizontal(|ui| {
        ui.label("Rows:");
        let resp = ui.add(
            egui::DragValue::new(&mut drafts.history_limit)
                .speed(1.0)
                .clamp_range(1..=MAX_HISTORY_LIMIT),
        );
        if drafts.history_limit != state.history_limit && !resp.dragged() && !resp.has_focus() {
            out.push(UiEvent::HistoryLimitChanged {
                limit: drafts.history_limit,
            });
        }
        if ui.button("Refresh").clicked() {
            out.push(UiEvent::HistoryRefreshRequested);
        }
        if state.loading.history {
            ui.spinner();
        }
    });
    ui.separator();

    if state.history_rows.is_empty() {
        if !state.loading.history {
            ui.label(RichText::new(format!("No saved forecasts for {}.", state.current_ticker)).weak());
        }
        return;
    }

    show_history_chart(ui, &state.history_rows, 260.0);
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("history_grid")
            .num_columns(5)
            .striped(true)
            .show(ui, |ui| {
                for h in ["Date", "Predicted", "Lower", "Upper", "Saved"] {
                    ui.label(RichText::new(h).strong());
                }
                ui.end_row();
                for row in &state.history_rows {
                    let day = row
                        .timestamp()
                        .map(|t| t.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| row.ts.clone());
                    ui.label(day);
                    ui.label(format!("{:.3}", row.yhat));
                    ui.label(format!("{:.3}", row.yhat_lower));
                    ui.label(format!("{:.3}", row.yhat_upper));
                    ui.label(row.created_at.as_str());
                    ui.end_row();
                }
            });
    });
}
