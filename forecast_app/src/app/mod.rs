pub mod commands;
pub mod event;
pub mod reducer;
pub mod render;
pub mod state;

pub use event::*;
pub use state::*;

use crate::chart::ChartHost;
use commands::Dispatcher;
use render::Drafts;
use std::sync::mpsc::Receiver;

/// Owns the view state on the UI thread and wires reducer, effects and chart together.
pub struct AppRuntime {
    pub state: AppState,
    chart: ChartHost,
    dispatcher: Dispatcher,
    rx: Receiver<AppEvent>,
    drafts: Drafts,
    chart_epoch: u64,
}

impl AppRuntime {
    pub fn new(state: AppState, dispatcher: Dispatcher, rx: Receiver<AppEvent>) -> Self {
        let drafts = Drafts::from_state(&state);
        let chart_epoch = state.chart_epoch;
        let mut runtime = Self {
            state,
            chart: ChartHost::new(),
            dispatcher,
            rx,
            drafts,
            chart_epoch,
        };
        runtime.sync_chart();
        runtime
    }

    /// Hooks repaint wake-ups to `ctx` and kicks off the initial loads.
    pub fn start(&mut self, ctx: &egui::Context) {
        self.dispatcher.attach(ctx);
        self.handle_event(AppEvent::Ui(UiEvent::Started));
    }

    pub fn handle_event(&mut self, ev: AppEvent) {
        let state = std::mem::take(&mut self.state);
        let transition = reducer::reduce(state, ev);
        self.state = transition.state;
        for effect in transition.effects {
            self.dispatcher.dispatch(effect);
        }
        if transition.changed {
            self.sync_chart();
        }
    }

    pub fn drain_events(&mut self) -> usize {
        let mut n = 0;
        while let Ok(ev) = self.rx.try_recv() {
            self.handle_event(ev);
            n += 1;
        }
        n
    }

    fn sync_chart(&mut self) {
        if self.state.chart_epoch != self.chart_epoch {
            self.chart.recreate();
            self.chart_epoch = self.state.chart_epoch;
        }
        self.chart.sync(
            self.state.timeline_revision,
            self.state.timeline.points(),
            self.state.timeline.seam_index(),
        );
    }
}

impl eframe::App for AppRuntime {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        let events = render::render(ctx, &self.state, &self.chart, &mut self.drafts);
        for ev in events {
            self.handle_event(AppEvent::Ui(ev));
        }
    }
}
