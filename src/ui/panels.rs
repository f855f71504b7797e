use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Field;
use crate::state::{price_slider_bounds, AppState, Status, Tab, MULTISELECT_FIELDS};
use crate::ui::format_number;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("🏙 Real Estate Dashboard").strong());
    });
    ui.label("Analytics and visualisations of the listings market. Use the filters to explore macro and micro trends.");
    ui.separator();

    ui.heading("🔎 Filter Data");

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let options: Vec<(Field, Vec<_>)> = MULTISELECT_FIELDS
        .into_iter()
        .map(|f| {
            let values = table
                .categories(f)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default();
            (f, values)
        })
        .collect();
    let (price_lo, price_hi) = price_slider_bounds(table);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-field multiselects (collapsible) ----
            for (field, all_values) in &options {
                let field = *field;
                let Some(selected) = state.selections.selected(field) else {
                    continue;
                };

                // Empty selection on area/type/furnishing means "any".
                let n_selected = selected.len();
                let n_total = all_values.len();
                let summary = if n_selected == 0 && field != Field::Beds {
                    "any".to_string()
                } else {
                    format!("{n_selected}/{n_total}")
                };
                let header_text = format!("{}  ({summary})", field.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field.column_names()[0])
                    .default_open(field == Field::Beds)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(field);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(field);
                            }
                        });

                        for val in all_values {
                            let is_selected = state
                                .selections
                                .selected(field)
                                .is_some_and(|s| s.contains(val));

                            let mut text = RichText::new(val.to_string());
                            if let Some(cm) = state.color_map(field) {
                                text = text.color(cm.color_for(&val.to_string()));
                            }

                            let mut checked = is_selected;
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(field, val);
                            }
                        }
                    });
            }

            ui.separator();

            // ---- Price range ----
            ui.strong("Price range (AED)");
            let (mut lo, mut hi) = state.selections.price;
            let step = state.config.price_step;
            let lo_changed = ui
                .add(egui::Slider::new(&mut lo, price_lo..=price_hi).step_by(step).text("min"))
                .changed();
            let hi_changed = ui
                .add(egui::Slider::new(&mut hi, price_lo..=price_hi).step_by(step).text("max"))
                .changed();
            ui.label(format!("{} – {}", format_number(lo, 0), format_number(hi, 0)));
            if lo_changed || hi_changed {
                state.set_price_range(lo, hi);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.table.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Download filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} listings loaded, {} visible",
                table.len(),
                state.view.len()
            ));
        }

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).weak());
            }
            None => {}
        }
    });
}

/// Tab selector row above the central panel.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => state.set_table(table, Some(path)),
            Err(e) => {
                // The current dataset stays loaded.
                log::error!("Failed to load file: {e:#}");
                state.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(state.export_file_name().to_string_lossy())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.status = Some(match state.export_to(&path) {
            Ok(()) => Status::Info(format!(
                "Exported {} listings to {}",
                state.view.len(),
                path.display()
            )),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                Status::Error(format!("Export failed: {e:#}"))
            }
        });
    }
}
