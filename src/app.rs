use eframe::egui::{self, Ui};

use crate::config::ChartKind;
use crate::state::{AppState, Tab};
use crate::ui::{analysis, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TabulaApp {
    pub state: AppState,
}

impl TabulaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TabulaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.sync_with_store();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: operations ----
        egui::SidePanel::left("operations_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut self.state.tab, Tab::Data, "Data");
                ui.selectable_value(&mut self.state.tab, Tab::Analysis, "Analysis");
                ui.selectable_value(&mut self.state.tab, Tab::Visualisation, "Visualisation");
            });
            ui.separator();

            match self.state.tab {
                Tab::Data => table::data_table(ui, &mut self.state),
                Tab::Analysis => analysis::analysis_view(ui, &mut self.state),
                Tab::Visualisation => {
                    chart_controls(ui, &mut self.state);
                    ui.separator();
                    plot::chart(ui, &self.state);
                }
            }
        });
    }
}

fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    let columns = state.store.column_names().to_vec();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Chart Type:");
        let mut kind = state.chart.kind;
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(kind.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for k in ChartKind::ALL {
                    ui.selectable_value(&mut kind, k, k.to_string());
                }
            });
        state.set_chart_kind(kind);

        ui.label("X-Axis:");
        panels::column_picker(ui, "chart_x", &columns, &mut state.chart.x);
        if kind.needs_y() {
            ui.label("Y-Axis:");
            panels::column_picker(ui, "chart_y", &columns, &mut state.chart.y);
        }
    });
}
