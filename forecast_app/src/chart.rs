//! Chart adapter: timeline → plot datasets, and the live plot instance.

use crate::debug_hooks;
use crate::timeline::TimelinePoint;
use chrono::DateTime;
use egui::Color32;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotBounds, PlotPoints, Points, VLine};
use forecast_client::PredictionHistory;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Empty space kept right of the last point.
pub const TRAILING_MARGIN_DAYS: f64 = 5.0;
pub const MAX_ZOOM: f64 = 32.0;

const Y_PADDING: f64 = 0.05;

const HISTORICAL_COLOR: Color32 = Color32::from_rgb(37, 99, 235);
const FORECAST_COLOR: Color32 = Color32::from_rgb(234, 88, 12);
const BAND_COLOR: Color32 = Color32::from_rgb(147, 197, 253);

/// Rendering seam between view logic and the plotting library.
pub trait ChartAdapter {
    /// Replace all datasets. Points at or after `seam` are drawn as forecast.
    fn set_series(&mut self, points: &[TimelinePoint], seam: Option<usize>);

    /// Release the instance. No drawing happens after this.
    fn dispose(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Historical,
    Forecast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesStyle {
    pub dashed: bool,
    pub markers: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub points: Vec<[f64; 2]>,
    pub style: SeriesStyle,
}

impl Dataset {
    pub fn label(&self) -> &'static str {
        match self.kind {
            DatasetKind::Historical => "Historical",
            DatasetKind::Forecast => "Forecast",
        }
    }
}

/// Library-independent description of what the plot shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartModel {
    pub datasets: Vec<Dataset>,
    /// Full span of the data plus the trailing margin.
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    /// X of the first forecast point.
    pub seam_x: Option<f64>,
}

impl ChartModel {
    pub fn build(points: &[TimelinePoint], seam: Option<usize>) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let seam = seam.filter(|&s| s < points.len());
        let split = seam.unwrap_or(points.len());
        let (hist, fut) = points.split_at(split);

        let mut datasets = Vec::with_capacity(2);
        if !hist.is_empty() {
            datasets.push(Dataset {
                kind: DatasetKind::Historical,
                points: hist.iter().map(xy).collect(),
                style: SeriesStyle {
                    dashed: false,
                    markers: true,
                },
            });
        }
        if !fut.is_empty() {
            // Start the forecast line on the last historical point so the two connect.
            let bridge = hist.last().map(xy);
            datasets.push(Dataset {
                kind: DatasetKind::Forecast,
                points: bridge.into_iter().chain(fut.iter().map(xy)).collect(),
                style: SeriesStyle {
                    dashed: true,
                    markers: false,
                },
            });
        }

        let first_x = points[0].timestamp as f64;
        let last_x = points[points.len() - 1].timestamp as f64;
        let x_range = (first_x, last_x + TRAILING_MARGIN_DAYS * SECONDS_PER_DAY);

        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        });
        let pad = ((hi - lo) * Y_PADDING).max(hi.abs() * 0.01).max(1e-6);

        Self {
            datasets,
            x_range: Some(x_range),
            y_range: Some((lo - pad, hi + pad)),
            seam_x: seam.map(|s| points[s].timestamp as f64),
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

fn xy(p: &TimelinePoint) -> [f64; 2] {
    [p.timestamp as f64, p.value]
}

/// Visible x window for `zoom` (≥ 1), anchored at the right edge of `full`.
pub fn visible_x_range(full: (f64, f64), zoom: f64) -> (f64, f64) {
    let zoom = zoom.clamp(1.0, MAX_ZOOM);
    let span = (full.1 - full.0).max(SECONDS_PER_DAY);
    (full.1 - span / zoom, full.1)
}

pub fn format_day(ts: f64, fmt: &str) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_default()
}

/// What the user did to the plot this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChartInput {
    pub zoom_factor: Option<f64>,
}

/// One live egui plot.
#[derive(Debug)]
pub struct PlotChart {
    instance: u64,
    model: ChartModel,
    disposed: bool,
}

impl PlotChart {
    fn new(instance: u64) -> Self {
        Self {
            instance,
            model: ChartModel::default(),
            disposed: false,
        }
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn model(&self) -> &ChartModel {
        &self.model
    }

    pub fn show(&self, ui: &mut egui::Ui, zoom: f64, height: f32) -> ChartInput {
        if self.disposed {
            return ChartInput::default();
        }
        let model = &self.model;
        let plot = Plot::new(("forecast_chart", self.instance))
            .height(height)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .x_axis_formatter(|mark, _chars, _range| format_day(mark.value, "%d/%m/%y"))
            .label_formatter(|name, value| {
                let day = format_day(value.x, "%Y-%m-%d");
                if name.is_empty() {
                    format!("{day}\n{:.3}", value.y)
                } else {
                    format!("{name}\n{day}\n{:.3}", value.y)
                }
            });

        let resp = plot.show(ui, |plot_ui| {
            if let (Some(x_full), Some((y_min, y_max))) = (model.x_range, model.y_range) {
                let (x_min, x_max) = visible_x_range(x_full, zoom);
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
            }
            for ds in &model.datasets {
                let color = match ds.kind {
                    DatasetKind::Historical => HISTORICAL_COLOR,
                    DatasetKind::Forecast => FORECAST_COLOR,
                };
                let mut line = Line::new(PlotPoints::new(ds.points.clone()))
                    .name(ds.label())
                    .color(color)
                    .width(2.0);
                if ds.style.dashed {
                    line = line.style(LineStyle::Dashed { length: 8.0 });
                }
                plot_ui.line(line);
                if ds.style.markers {
                    plot_ui.points(Points::new(PlotPoints::new(ds.points.clone())).radius(2.0).color(color));
                }
            }
            if let Some(x) = model.seam_x {
                plot_ui.vline(
                    VLine::new(x)
                        .color(Color32::from_gray(140))
                        .style(LineStyle::Dotted { spacing: 4.0 }),
                );
            }
        });

        // Mouse wheel over the plot zooms the x axis.
        let mut input = ChartInput::default();
        if resp.response.hovered() {
            let scroll_y = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll_y != 0.0 {
                input.zoom_factor = Some((1.0 + scroll_y as f64 * 0.002).clamp(0.2, 5.0));
            }
        }
        input
    }
}

impl ChartAdapter for PlotChart {
    fn set_series(&mut self, points: &[TimelinePoint], seam: Option<usize>) {
        self.model = ChartModel::build(points, seam);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug_hooks::log_chart_dispose(self.instance);
        self.model = ChartModel::default();
        self.disposed = true;
    }
}

/// Owns the single live chart; a new one is only created after the old one is disposed.
#[derive(Debug, Default)]
pub struct ChartHost {
    current: Option<PlotChart>,
    next_instance: u64,
    applied_revision: Option<u64>,
}

impl ChartHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self) -> Option<&PlotChart> {
        self.current.as_ref()
    }

    /// Push the timeline into the chart when `revision` changed since the last push.
    pub fn sync(&mut self, revision: u64, points: &[TimelinePoint], seam: Option<usize>) -> bool {
        if self.applied_revision == Some(revision) && self.current.is_some() {
            return false;
        }
        let chart = self.ensure_chart();
        chart.set_series(points, seam);
        debug_hooks::log_chart_series(chart.instance, points.len(), seam);
        self.applied_revision = Some(revision);
        true
    }

    /// Dispose the live plot; the next `sync` builds one under a new plot id.
    /// egui still holds the old id's memory entry, but nothing reads it again.
    pub fn recreate(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.dispose();
        }
        self.applied_revision = None;
    }

    fn ensure_chart(&mut self) -> &mut PlotChart {
        let instance = self.next_instance;
        if self.current.is_none() {
            self.next_instance += 1;
        }
        self.current.get_or_insert_with(|| PlotChart::new(instance))
    }
}

/// Predicted value and its confidence band for the history view.
pub struct HistorySeries {
    pub yhat: Vec<[f64; 2]>,
    pub lower: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
}

pub fn history_series(rows: &[PredictionHistory]) -> HistorySeries {
    let mut dated: Vec<(f64, &PredictionHistory)> = rows
        .iter()
        .filter_map(|r| {
            let ts = r.timestamp()?;
            Some((ts.and_utc().timestamp() as f64, r))
        })
        .collect();
    dated.sort_by(|a, b| a.0.total_cmp(&b.0));

    HistorySeries {
        yhat: dated.iter().map(|(x, r)| [*x, r.yhat]).collect(),
        lower: dated.iter().map(|(x, r)| [*x, r.yhat_lower]).collect(),
        upper: dated.iter().map(|(x, r)| [*x, r.yhat_upper]).collect(),
    }
}

pub fn show_history_chart(ui: &mut egui::Ui, rows: &[PredictionHistory], height: f32) {
    let series = history_series(rows);
    Plot::new("history_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_formatter(|mark, _chars, _range| format_day(mark.value, "%d/%m/%Y"))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(series.upper))
                    .name("Upper")
                    .color(BAND_COLOR)
                    .style(LineStyle::Dashed { length: 5.0 }),
            );
            plot_ui.line(
                Line::new(PlotPoints::new(series.lower))
                    .name("Lower")
                    .color(BAND_COLOR)
                    .style(LineStyle::Dashed { length: 5.0 }),
            );
            let yhat = series.yhat;
            plot_ui.line(
                Line::new(PlotPoints::new(yhat.clone()))
                    .name("Prediction (yhat)")
                    .color(HISTORICAL_COLOR)
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::new(yhat)).radius(3.0).color(HISTORICAL_COLOR));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{day_timestamp, ForecastPoint, Timeline};
    use chrono::NaiveDate;
    use forecast_client::StockDataPoint;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn timeline(hist: &[(&str, f64)], fc: &[(&str, f64)]) -> Timeline {
        let history: Vec<StockDataPoint> = hist
            .iter()
            .map(|(date, close)| StockDataPoint {
                date: d(date),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 0.0,
            })
            .collect();
        let forecast: Vec<ForecastPoint> = fc
            .iter()
            .map(|(date, value)| ForecastPoint { date: d(date), value: *value })
            .collect();
        Timeline::merge(&history, &forecast)
    }

    #[test]
    fn forecast_dataset_is_dashed_without_markers_and_bridged() {
        let tl = timeline(&[("2024-01-02", 10.0), ("2024-01-03", 11.0)], &[("2024-01-04", 12.0)]);
        let model = ChartModel::build(tl.points(), tl.seam_index());

        let hist = model.dataset(DatasetKind::Historical).unwrap();
        assert_eq!(hist.points.len(), 2);
        assert!(!hist.style.dashed && hist.style.markers);

        let fc = model.dataset(DatasetKind::Forecast).unwrap();
        assert!(fc.style.dashed && !fc.style.markers);
        assert_eq!(fc.points.len(), 2);
        assert_eq!(fc.points[0], hist.points[1]);
        assert_eq!(model.seam_x, Some(day_timestamp(d("2024-01-04")) as f64));
    }

    #[test]
    fn x_range_covers_data_plus_margin() {
        let tl = timeline(&[("2024-01-02", 10.0)], &[("2024-01-10", 12.0)]);
        let model = ChartModel::build(tl.points(), tl.seam_index());
        let (x0, x1) = model.x_range.unwrap();
        assert_eq!(x0, day_timestamp(d("2024-01-02")) as f64);
        assert_eq!(x1, day_timestamp(d("2024-01-15")) as f64);
        let (y0, y1) = model.y_range.unwrap();
        assert!(y0 < 10.0 && y1 > 12.0);
    }

    #[test]
    fn historical_only_and_empty_models() {
        let tl = timeline(&[("2024-01-02", 10.0), ("2024-01-03", 10.0)], &[]);
        let model = ChartModel::build(tl.points(), tl.seam_index());
        assert_eq!(model.datasets.len(), 1);
        assert!(model.dataset(DatasetKind::Forecast).is_none());
        assert!(model.seam_x.is_none());
        let (y0, y1) = model.y_range.unwrap();
        assert!(y0 < y1);

        let empty = ChartModel::build(&[], None);
        assert!(empty.is_empty());
        assert!(empty.x_range.is_none());
    }

    #[test]
    fn zoom_narrows_from_the_right() {
        let full = (0.0, 100.0 * SECONDS_PER_DAY);
        assert_eq!(visible_x_range(full, 1.0), full);
        assert_eq!(visible_x_range(full, 4.0), (75.0 * SECONDS_PER_DAY, full.1));
        assert_eq!(visible_x_range(full, 0.5), full);
    }

    #[test]
    fn host_disposes_before_recreating() {
        let tl = timeline(&[("2024-01-02", 10.0)], &[]);
        let mut host = ChartHost::new();

        assert!(host.sync(1, tl.points(), tl.seam_index()));
        assert!(!host.sync(1, tl.points(), tl.seam_index()));
        let first = host.chart().unwrap().instance();

        host.recreate();
        assert!(host.chart().is_none());
        assert!(host.sync(1, tl.points(), tl.seam_index()));
        let second = host.chart().unwrap().instance();
        assert_ne!(first, second);
        assert_eq!(host.chart().unwrap().model().datasets.len(), 1);
    }

    #[test]
    fn recreate_never_reuses_a_plot_id() {
        let tl = timeline(&[("2024-01-02", 10.0)], &[]);
        let mut host = ChartHost::new();
        let mut seen = Vec::new();
        for revision in 0..4 {
            host.sync(revision, tl.points(), tl.seam_index());
            seen.push(host.chart().unwrap().instance());
            host.recreate();
        }
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(host.chart().is_none());
    }

    #[test]
    fn disposed_chart_drops_its_model() {
        let tl = timeline(&[("2024-01-02", 10.0)], &[]);
        let mut chart = PlotChart::new(7);
        chart.set_series(tl.points(), None);
        assert!(!chart.model().is_empty());
        chart.dispose();
        assert!(chart.model().is_empty());
    }

    #[test]
    fn history_rows_sorted_by_timestamp() {
        let row = |ts: &str, yhat: f64| PredictionHistory {
            ts: ts.into(),
            ticker: "ENI.MI".into(),
            yhat,
            yhat_lower: yhat - 1.0,
            yhat_upper: yhat + 1.0,
            created_at: String::new(),
        };
        let rows = vec![row("2024-01-05", 2.0), row("bogus", 9.0), row("2024-01-04", 1.0)];
        let s = history_series(&rows);
        assert_eq!(s.yhat.len(), 2);
        assert_eq!(s.yhat[0][1], 1.0);
        assert_eq!(s.lower[1][1], 1.0);
        assert_eq!(s.upper[1][1], 3.0);
    }

    #[test]
    fn day_labels() {
        let ts = day_timestamp(d("2024-03-09")) as f64;
        assert_eq!(format_day(ts, "%d/%m/%Y"), "09/03/2024");
    }
}
