use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable raw view of the uploaded table, every column included.
pub fn preview(ui: &mut Ui, dataset: &Dataset) {
    ui.strong("Data Preview:");
    ui.label(format!(
        "{} rows × {} columns",
        dataset.len(),
        dataset.headers().len()
    ));

    let headers = dataset.headers();
    let rows = dataset.cells();

    ScrollArea::horizontal()
        .id_salt("preview_hscroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(true)
                .max_scroll_height(280.0)
                .columns(Column::auto().at_least(60.0).clip(true), headers.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for name in headers {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let cells = &rows[row.index()];
                        for col in 0..headers.len() {
                            row.col(|ui| {
                                ui.label(cells.get(col).map(String::as_str).unwrap_or(""));
                            });
                        }
                    });
                });
        });
}
