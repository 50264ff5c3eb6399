use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use gapminder_explorer::query::SortOrder;

use crate::state::DataTable;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 22.0;

// ---------------------------------------------------------------------------
// Sortable data table
// ---------------------------------------------------------------------------

/// Render a data table; clicking a header sorts by that column.
pub fn data_table(ui: &mut Ui, id: &str, table: &mut DataTable) {
    if table.rows.is_empty() {
        super::plot::no_data(ui, "this selection");
        return;
    }

    let mut clicked = None;
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(TableColumn::auto().at_least(90.0), table.columns.len())
            .header(HEADER_HEIGHT, |mut header| {
                for &col in &table.columns {
                    header.col(|ui: &mut Ui| {
                        let marker = match table.sort {
                            Some((c, SortOrder::Ascending)) if c == col => " ▲",
                            Some((c, SortOrder::Descending)) if c == col => " ▼",
                            _ => "",
                        };
                        if ui.button(format!("{}{marker}", col.label())).clicked() {
                            clicked = Some(col);
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let data = &table.rows[row.index()];
                    for (_, value) in data.iter() {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });

    if let Some(col) = clicked {
        log::debug!("Sorting table {id} by {col}");
        table.sort_by(col);
    }
}
