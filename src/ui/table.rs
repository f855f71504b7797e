use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::shade;
use crate::data::aggregate::CrossTab;
use crate::data::model::{CellValue, Field, ListingTable};
use crate::ui::format_number;

const ROW_HEIGHT: f32 = 18.0;

fn cell_text(value: Option<&CellValue>, field: Option<Field>) -> String {
    match (value, field) {
        (None | Some(CellValue::Null), _) => String::new(),
        (Some(v), Some(Field::Price | Field::AverageRent)) => {
            v.as_f64().map(|x| format_number(x, 0)).unwrap_or_else(|| v.to_string())
        }
        (Some(CellValue::Float(x)), _) => format_number(*x, 2),
        (Some(v), _) => v.to_string(),
    }
}

/// Selected known fields for the given rows (the "top 10" tables).
pub fn field_table(ui: &mut Ui, id: &str, table: &ListingTable, rows: &[usize], fields: &[Field]) {
    let fields: Vec<Field> = fields.iter().copied().filter(|f| table.has_field(*f)).collect();
    ui.push_id(id, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(300.0)
                .columns(Column::auto().at_least(60.0).clip(true), fields.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for f in &fields {
                        header.col(|ui| {
                            ui.strong(f.label());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let r = rows[row.index()];
                        for &f in &fields {
                            row.col(|ui| {
                                ui.label(cell_text(table.value(r, f), Some(f)));
                            });
                        }
                    });
                });
        });
    });
}

/// Every column of the sheet for the given rows.
pub fn listings_table(ui: &mut Ui, id: &str, table: &ListingTable, rows: &[usize]) {
    let known: Vec<Option<Field>> = table
        .columns
        .iter()
        .map(|c| {
            Field::ALL
                .into_iter()
                .find(|f| table.column_name(*f) == Some(c.as_str()))
        })
        .collect();

    ui.push_id(id, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .column(Column::auto().at_least(40.0))
                .columns(Column::auto().at_least(70.0).clip(true), table.columns.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for name in &table.columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let r = rows[row.index()];
                        row.col(|ui| {
                            ui.label(RichText::new(r.to_string()).weak());
                        });
                        for (cell, field) in table.rows[r].cells.iter().zip(&known) {
                            row.col(|ui| {
                                ui.label(cell_text(Some(cell), *field));
                            });
                        }
                    });
                });
        });
    });
}

/// Count matrix with a green intensity per cell.
pub fn crosstab_table(ui: &mut Ui, id: &str, tab: &CrossTab) {
    if tab.row_keys.is_empty() {
        ui.label("No data.");
        return;
    }
    let max = tab.max_count().max(1) as f32;
    let green = Color32::from_rgb(35, 139, 69);

    ui.push_id(id, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(false)
                .max_scroll_height(350.0)
                .column(Column::auto().at_least(120.0))
                .columns(Column::auto().at_least(50.0), tab.col_keys.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Area");
                    });
                    for key in &tab.col_keys {
                        header.col(|ui| {
                            ui.strong(key.to_string());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, tab.row_keys.len(), |mut row| {
                        let i = row.index();
                        row.col(|ui| {
                            ui.label(tab.row_keys[i].to_string());
                        });
                        for &count in &tab.counts[i] {
                            row.col(|ui| {
                                let t = count as f32 / max;
                                let fill = shade(green, t);
                                ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
                                let text_color = if t > 0.6 { Color32::WHITE } else { Color32::BLACK };
                                ui.label(RichText::new(count.to_string()).color(text_color));
                            });
                        }
                    });
                });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_get_separators_and_nulls_are_blank() {
        assert_eq!(
            cell_text(Some(&CellValue::Integer(1_500_000)), Some(Field::Price)),
            "1,500,000"
        );
        assert_eq!(cell_text(Some(&CellValue::Null), Some(Field::Price)), "");
        assert_eq!(cell_text(None, None), "");
        assert_eq!(cell_text(Some(&CellValue::Float(6.1234)), Some(Field::RentalYield)), "6.12");
        assert_eq!(cell_text(Some(&CellValue::Integer(3)), Some(Field::Beds)), "3");
    }
}
