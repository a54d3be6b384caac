use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::agg::Kpis;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        if ui
            .selectable_label(state.sidebar_open, "☰ Settings")
            .clicked()
        {
            state.sidebar_open = !state.sidebar_open;
        }

        ui.separator();
        ui.strong("SEA International Trade Dashboard");
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records, {} partners",
                ds.len(),
                ds.partners.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Sidebar – the two filter inputs
// ---------------------------------------------------------------------------

/// Render the settings sidebar: country dropdown and year slider. These
/// two values drive every view; changing either recomputes everything on
/// the next frame.
pub fn sidebar(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.strong("Country");
    egui::ComboBox::from_id_salt("selected_country")
        .selected_text(&state.filter.country)
        .show_ui(ui, |ui: &mut Ui| {
            for country in &dataset.countries {
                if ui
                    .selectable_label(state.filter.country == *country, country)
                    .clicked()
                {
                    state.filter.country = country.clone();
                }
            }
        });
    ui.add_space(8.0);

    ui.strong("Year");
    ui.add(egui::Slider::new(
        &mut state.filter.year,
        dataset.year_min..=dataset.year_max,
    ));
    ui.label(
        RichText::new(format!("Selected Year: {}", state.filter.year))
            .small()
            .weak(),
    );
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// Render the four KPI cards for the current (country, year).
pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    let cards = [
        ("Total Trade Value (USD)", kpis.total_trade),
        ("Total Exports (USD)", kpis.total_export),
        ("Total Imports (USD)", kpis.total_import),
        ("Trade Balance (USD)", kpis.trade_balance),
    ];

    ui.columns(cards.len(), |columns| {
        for (col, (label, value)) in columns.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.heading(format_usd(value));
                    ui.label(RichText::new(label).small().weak());
                });
            });
        }
    });
}

/// Whole-dollar formatting with thousands separators, matching the
/// original KPI cards.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Pick a new data directory and reload. A failed reload keeps the
/// previous dataset and surfaces the error in the status line.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open trade data folder")
        .pick_folder();

    if let Some(path) = folder {
        match crate::data::loader::load_dir(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records covering {} reporters",
                    dataset.len(),
                    dataset.countries.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data folder: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
