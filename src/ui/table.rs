use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::agg::TableRow;
use crate::state::{AppState, TableColumn, TableSort};
use crate::ui::panels::format_usd;

const COLUMNS: [(TableColumn, &str); 6] = [
    (TableColumn::Country, "Country"),
    (TableColumn::Partner, "Trading Partner"),
    (TableColumn::Year, "Year"),
    (TableColumn::Export, "Export (USD)"),
    (TableColumn::Import, "Import (USD)"),
    (TableColumn::TradeValue, "Total Trade (USD)"),
];

// ---------------------------------------------------------------------------
// Filtered data table
// ---------------------------------------------------------------------------

/// Render the filtered records as a sortable table. Clicking a header
/// sorts by that column; clicking it again flips the direction. Without a
/// sort, source row order is kept.
pub fn data_table(ui: &mut Ui, state: &mut AppState, rows: &[TableRow]) {
    let mut view: Vec<&TableRow> = rows.iter().collect();
    if let Some(sort) = state.table_sort {
        sort_view(&mut view, sort);
    }

    let mut builder = TableBuilder::new(ui).striped(true).resizable(true);
    for _ in COLUMNS {
        builder = builder.column(Column::auto().at_least(90.0));
    }

    builder
        .header(22.0, |mut header| {
            for (column, label) in COLUMNS {
                header.col(|ui: &mut Ui| {
                    let text = match state.table_sort {
                        Some(TableSort {
                            column: current,
                            ascending,
                        }) if current == column => {
                            format!("{label} {}", if ascending { "↑" } else { "↓" })
                        }
                        _ => label.to_string(),
                    };
                    if ui.button(text).clicked() {
                        state.toggle_table_sort(column);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let rec = view[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.country);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.partner_name);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.year.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format_usd(rec.export_usd));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format_usd(rec.import_usd));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format_usd(rec.trade_value));
                });
            });
        });
}

fn sort_view(view: &mut [&TableRow], sort: TableSort) {
    view.sort_by(|a, b| {
        let ordering = match sort.column {
            TableColumn::Country => a.country.cmp(&b.country),
            TableColumn::Partner => a.partner_name.cmp(&b.partner_name),
            TableColumn::Year => a.year.cmp(&b.year),
            TableColumn::Export => a.export_usd.total_cmp(&b.export_usd),
            TableColumn::Import => a.import_usd.total_cmp(&b.import_usd),
            TableColumn::TradeValue => a.trade_value.total_cmp(&b.trade_value),
        };
        if sort.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}
