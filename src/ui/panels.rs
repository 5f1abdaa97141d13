use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::transform::AggregationKind;
use crate::state::{AppState, FilterOp, Status};

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

/// Combo box listing the dataset's columns.
pub fn column_picker(ui: &mut Ui, id: &str, columns: &[String], selected: &mut Option<String>) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.as_deref().unwrap_or("—"))
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(selected, Some(col.clone()), col);
            }
        });
}

// ---------------------------------------------------------------------------
// Left side panel – cleaning, transformations, statistics
// ---------------------------------------------------------------------------

/// Render the left operations panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Operations");
    ui.separator();

    if state.store.column_names().is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let columns = state.store.column_names().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Statistics").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| statistics_section(ui, state, &columns));

            egui::CollapsingHeader::new(RichText::new("Clean").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.button("Remove Nulls").clicked() {
                            state.remove_nulls();
                        }
                        if ui.button("Remove Duplicates").clicked() {
                            state.remove_duplicates();
                        }
                    });
                    ui.label(RichText::new("Nulls are removed from the statistics column.").small().weak());
                });

            egui::CollapsingHeader::new(RichText::new("Filter").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    column_picker(ui, "filter_column", &columns, &mut state.filter.column);
                    egui::ComboBox::from_id_salt("filter_op")
                        .selected_text(state.filter.op.label())
                        .show_ui(ui, |ui: &mut Ui| {
                            for op in FilterOp::ALL {
                                ui.selectable_value(&mut state.filter.op, op, op.label());
                            }
                        });
                    if state.filter.op.takes_operand() {
                        ui.text_edit_singleline(&mut state.filter.operand);
                    }
                    if ui.button("Apply Filter").clicked() {
                        state.filter();
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Sort").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    column_picker(ui, "sort_column", &columns, &mut state.sort.column);
                    ui.horizontal(|ui: &mut Ui| {
                        ui.radio_value(&mut state.sort.ascending, true, "Ascending");
                        ui.radio_value(&mut state.sort.ascending, false, "Descending");
                    });
                    if ui.button("Apply Sort").clicked() {
                        state.sort();
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Aggregate").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("aggregate_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                        ui.label("Group by");
                        column_picker(ui, "agg_group", &columns, &mut state.aggregate.group_column);
                        ui.end_row();
                        ui.label("Value");
                        column_picker(ui, "agg_value", &columns, &mut state.aggregate.value_column);
                        ui.end_row();
                        ui.label("Function");
                        egui::ComboBox::from_id_salt("agg_kind")
                            .selected_text(state.aggregate.kind.clone())
                            .show_ui(ui, |ui: &mut Ui| {
                                for kind in AggregationKind::ALL {
                                    ui.selectable_value(&mut state.aggregate.kind, kind.to_string(), kind.to_string());
                                }
                            });
                        ui.end_row();
                    });
                    if ui.button("Apply Aggregation").clicked() {
                        state.aggregate();
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Edit cell").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    let max_row = state.store.len().saturating_sub(1);
                    egui::Grid::new("edit_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                        ui.label("Row");
                        ui.add(egui::DragValue::new(&mut state.edit.row).range(0..=max_row));
                        ui.end_row();
                        ui.label("Column");
                        column_picker(ui, "edit_column", &columns, &mut state.edit.column);
                        ui.end_row();
                        ui.label("Value");
                        ui.text_edit_singleline(&mut state.edit.text);
                        ui.end_row();
                    });
                    if ui.button("Update").clicked() {
                        state.edit_cell();
                    }
                });
        });
}

fn statistics_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    column_picker(ui, "stats_column", columns, &mut state.stats_column);
    let Some(column) = state.stats_column.as_deref() else {
        return;
    };
    match state.store.basic_stats(column) {
        Some(stats) => {
            egui::Grid::new("stats_grid").num_columns(2).striped(true).show(ui, |ui: &mut Ui| {
                for (label, value) in stats.entries() {
                    ui.label(label);
                    ui.label(format!("{value:.4}"));
                    ui.end_row();
                }
            });
        }
        None => {
            ui.label(RichText::new("No numeric values in this column.").weak());
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Import Data…").clicked() {
                import_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.store.column_names().is_empty(), egui::Button::new("Export Data…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Exit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("Edit", |ui: &mut Ui| {
            let (undo_steps, redo_steps) = state.store.history_depth();
            if ui
                .add_enabled(state.store.can_undo(), egui::Button::new(format!("Undo ({undo_steps})")))
                .clicked()
            {
                state.undo();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.store.can_redo(), egui::Button::new(format!("Redo ({redo_steps})")))
                .clicked()
            {
                state.redo();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Clear Data").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows × {} columns",
            state.store.len(),
            state.store.column_names().len()
        ));

        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn import_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Import Data File")
        .add_filter("All Data Files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV Files", &["csv"])
        .add_filter("JSON Files", &["json"])
        .add_filter("Parquet Files", &["parquet", "pq"]);
    if let Some(dir) = &state.config.last_directory {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.pick_file() {
        state.import_file(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export Data File")
        .add_filter("CSV Files", &["csv"])
        .add_filter("JSON Files", &["json"]);
    if let Some(dir) = &state.config.last_directory {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.save_file() {
        state.export_file(&path);
    }
}
