use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::pivot::PivotMatrix;

/// Text for a pivot cell. Missing cells show a dash, never zero.
pub fn format_cell(cell: Option<f64>) -> String {
    match cell {
        Some(v) => format!("{v:.0}"),
        None => "–".to_string(),
    }
}

/// Year × month table of monthly means.
pub fn pivot_table(ui: &mut Ui, pivot: &PivotMatrix) {
    if pivot.is_empty() {
        ui.label("No monthly averages: the cleaned series is empty.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(48.0))
        .columns(Column::auto().at_least(56.0), pivot.columns().len())
        .header(22.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Year");
            });
            for month in pivot.columns() {
                header.col(|ui: &mut Ui| {
                    ui.strong(month.short_name());
                });
            }
        })
        .body(|mut body| {
            for row in pivot.rows() {
                body.row(20.0, |mut table_row| {
                    table_row.col(|ui: &mut Ui| {
                        ui.strong(row.year.to_string());
                    });
                    for cell in row.cells {
                        table_row.col(|ui: &mut Ui| {
                            let text = RichText::new(format_cell(cell));
                            if cell.is_none() {
                                ui.label(text.color(Color32::GRAY));
                            } else {
                                ui.label(text);
                            }
                        });
                    }
                });
            }
        });
}
