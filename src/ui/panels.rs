use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use panda_explorer::data::model::{CellValue, Table};
use panda_explorer::{ColumnSelection, Domain, Session};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(session);
                ui.close_menu();
            }
            if ui
                .add_enabled(session.dataset().is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(session);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = session.dataset() {
            let (rows, cols) = ds.table.shape();
            ui.label(format!("{}: {rows} rows × {cols} columns", ds.source_name));
            if let Some(view) = session.filtered() {
                ui.label(format!("{} visible", view.table.row_count()));
            }
        }

        if let Some(msg) = &session.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.separator();
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one widget per viewed column.
pub fn side_panel(ui: &mut Ui, session: &mut Session) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = session.dataset() else {
        ui.label("Upload your file and explore the data interactively.");
        return;
    };

    // Clone what we need so we can mutate the session inside the loop.
    let schema: Vec<_> = session
        .view_columns()
        .iter()
        .filter_map(|name| dataset.schema.iter().find(|s| &s.name == name).cloned())
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in &schema {
                let Some(selection) = session.selection_for(&column.name) else {
                    continue;
                };
                match (&column.domain, selection) {
                    (Domain::Categorical(all_values), ColumnSelection::Values(mut selected)) => {
                        let header_text =
                            format!("{}  ({}/{})", column.name, selected.len(), all_values.len());
                        let mut changed = false;
                        egui::CollapsingHeader::new(RichText::new(header_text).strong())
                            .id_salt(&column.name)
                            .default_open(true)
                            .show(ui, |ui: &mut Ui| {
                                ui.horizontal(|ui: &mut Ui| {
                                    if ui.small_button("All").clicked() {
                                        selected = all_values.clone();
                                        changed = true;
                                    }
                                    if ui.small_button("None").clicked() {
                                        selected.clear();
                                        changed = true;
                                    }
                                });
                                for val in all_values {
                                    let mut checked = selected.contains(val);
                                    if ui.checkbox(&mut checked, val.to_string()).changed() {
                                        if checked {
                                            selected.insert(val.clone());
                                        } else {
                                            selected.remove(val);
                                        }
                                        changed = true;
                                    }
                                }
                            });
                        if changed {
                            report(session.set_selection(&column.name, ColumnSelection::Values(selected)));
                        }
                    }
                    (Domain::Numeric(Some(bounds)), ColumnSelection::Range { mut low, mut high }) => {
                        ui.strong(format!("Filter {}", column.name));
                        let range = bounds.min..=bounds.max;
                        let low_changed = ui
                            .add(egui::Slider::new(&mut low, range.clone()).text("min"))
                            .changed();
                        let high_changed = ui
                            .add(egui::Slider::new(&mut high, range).text("max"))
                            .changed();
                        if low_changed || high_changed {
                            report(session.set_selection(&column.name, ColumnSelection::Range { low, high }));
                        }
                    }
                    (Domain::Numeric(None), _) => {
                        ui.strong(format!("Filter {}", column.name));
                        ui.label("No values to filter on.");
                    }
                    _ => {}
                }
                ui.separator();
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – overview, cleaning, filtered data, download
// ---------------------------------------------------------------------------

/// Dataset preview, missing-value handling, view-column picker and the
/// filtered table.
pub fn overview(ui: &mut Ui, session: &mut Session) {
    let Some(dataset) = session.dataset() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Please upload a file to start exploring  (File → Open…)");
        });
        return;
    };

    ui.heading("Dataset Overview");
    ui.strong("Preview");
    data_table(ui, "preview", &dataset.table.head(session.config.preview_rows));
    let (rows, cols) = dataset.table.shape();
    ui.label(format!("Rows: {rows}, Columns: {cols}"));

    let missing = dataset.missing.clone();
    let columns = dataset.table.column_names();

    if missing.has_missing() {
        ui.label(
            RichText::new(format!(
                "⚠ Your dataset contains {} missing values.",
                missing.total
            ))
            .color(Color32::from_rgb(200, 140, 0)),
        );
        if ui.button("Drop Missing Values").clicked() {
            report(session.drop_missing());
        }
    }

    ui.separator();
    ui.heading("Data Filtering");
    ui.label("Select columns to view:");
    if let Some(cols) = column_picker(ui, "view_columns", &columns, session.view_columns()) {
        report(session.set_view_columns(cols));
    }

    if let Some(view) = session.filtered() {
        ui.strong("Filtered Data");
        data_table(ui, "filtered", &view.table);
    }

    ui.separator();
    ui.heading("Download Filtered Data");
    if ui.button("Download CSV").clicked() {
        save_file_dialog(session);
    }
    ui.separator();
}

/// Checkbox list keeping the order in which columns were picked.
/// Returns the new selection when it changed.
pub fn column_picker(ui: &mut Ui, id: &str, columns: &[String], selected: &[String]) -> Option<Vec<String>> {
    let mut result = None;
    ui.push_id(id, |ui: &mut Ui| {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for col in columns {
                let mut checked = selected.contains(col);
                if ui.checkbox(&mut checked, col.as_str()).changed() {
                    let mut next: Vec<String> = selected.to_vec();
                    if checked {
                        next.push(col.clone());
                    } else {
                        next.retain(|c| c != col);
                    }
                    result = Some(next);
                }
            }
        });
    });
    result
}

/// Scrollable grid of a table's cells.
fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    if table.column_count() == 0 {
        ui.label("(no columns)");
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(240.0)
            .columns(TableColumn::auto().at_least(60.0), table.column_count())
            .header(20.0, |mut header| {
                for col in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.name());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.row_count(), |mut row| {
                    let r = row.index();
                    for col in table.columns() {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(&col.values()[r]));
                        });
                    }
                });
            });
    });
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NaN".to_string(),
        other => other.to_text().unwrap_or_default(),
    }
}

/// Errors are already in the session's status line.
fn report(result: panda_explorer::Result<()>) {
    if let Err(e) = result {
        log::debug!("interaction rejected: {e}");
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(session: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a file (CSV, XLSX, JSON)")
        .add_filter("Supported files", &["csv", "xlsx", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = load_path(session, &path) {
            log::error!("Failed to load file: {e:#}");
            session.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn load_path(session: &mut Session, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    session.load(&name, &bytes)?;
    Ok(())
}

pub fn save_file_dialog(session: &mut Session) {
    let Ok(Some(export)) = session.export() else {
        return;
    };
    let target = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(&export.file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = target {
        let written = std::fs::write(&path, &export.bytes)
            .with_context(|| format!("writing {}", path.display()));
        match written {
            Ok(()) => session.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Failed to save export: {e:#}");
                session.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
