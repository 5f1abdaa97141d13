use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data grid (data tab)
// ---------------------------------------------------------------------------

/// Render the dataset as a table. Clicking a cell loads it into the
/// "Edit cell" form of the side panel.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    let columns = state.store.column_names().to_vec();
    if columns.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Import a CSV, JSON or Parquet file  (File → Import…)");
        });
        return;
    }

    let types = state.store.column_types().clone();
    let selected = (state.edit.row, state.edit.column.clone());
    let mut clicked: Option<(usize, String)> = None;
    let rows = state.store.data();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .columns(Column::initial(110.0).at_least(40.0).clip(true), columns.len())
        .header(36.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for col in &columns {
                header.col(|ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        ui.strong(col);
                        let tag = types.get(col).map(|t| t.to_string()).unwrap_or_default();
                        ui.label(RichText::new(tag).small().weak());
                    });
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut table_row| {
                let i = table_row.index();
                let data_row = &rows[i];
                table_row.col(|ui: &mut Ui| {
                    ui.label(RichText::new(i.to_string()).weak());
                });
                for col in &columns {
                    table_row.col(|ui: &mut Ui| {
                        let text = data_row.get(col).map(|v| v.to_string()).unwrap_or_default();
                        let is_selected = selected.0 == i && selected.1.as_deref() == Some(col);
                        if ui.selectable_label(is_selected, &text).clicked() {
                            clicked = Some((i, col.clone()));
                        }
                    });
                }
            });
        });

    if let Some((row, column)) = clicked {
        state.select_cell(row, &column);
    }
}
