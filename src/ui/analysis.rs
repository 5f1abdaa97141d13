use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::panels::column_picker;

// ---------------------------------------------------------------------------
// Analysis tab
// ---------------------------------------------------------------------------

pub fn analysis_view(ui: &mut Ui, state: &mut AppState) {
    let columns = state.store.column_names().to_vec();
    if columns.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Import data to analyse it  (File → Import…)");
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Column 1:");
        column_picker(ui, "analysis_first", &columns, &mut state.analysis.first);
        ui.label("Column 2:");
        column_picker(ui, "analysis_second", &columns, &mut state.analysis.second);
        if ui.button("Calculate Correlation").clicked() {
            state.run_correlation();
        }
        ui.separator();
        if ui.button("Generate Summary").clicked() {
            state.run_summary();
        }
    });

    ui.separator();

    if state.analysis.report.is_empty() {
        ui.label(RichText::new("Pick two columns for a correlation or generate a summary.").weak());
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add(
                egui::Label::new(RichText::new(state.analysis.report.as_str()).monospace())
                    .selectable(true),
            );
        });
}
