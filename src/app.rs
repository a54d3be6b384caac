use eframe::egui;

use crate::config::Config;
use crate::data::agg;
use crate::data::model::{TradeDataset, PRIORITY_COUNTRIES};
use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TradeScopeApp {
    pub state: AppState,
}

impl TradeScopeApp {
    /// Build the app from configuration and the startup dataset.
    pub fn new(config: Config, dataset: TradeDataset) -> Self {
        let mut state = AppState {
            configured_colors: config.country_colors,
            default_country: config.default_country,
            default_year: config.default_year,
            ..AppState::default()
        };
        state.set_dataset(dataset);
        Self { state }
    }
}

impl eframe::App for TradeScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filter settings (toggleable) ----
        if self.state.sidebar_open {
            egui::SidePanel::left("settings_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::sidebar(ui, &mut self.state);
                });
        }

        // ---- Central panel: tab strip + active view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui: &mut egui::Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.label());
                }
            });
            ui.separator();

            let Some(dataset) = self.state.dataset.clone() else {
                ui.centered_and_justified(|ui: &mut egui::Ui| {
                    ui.heading("Open a data folder to begin  (File → Open data folder…)");
                });
                return;
            };

            match self.state.tab {
                Tab::Overview => self.overview_tab(ui, &dataset),
                Tab::Trends => self.trends_tab(ui, &dataset),
                Tab::Table => self.table_tab(ui, &dataset),
                Tab::Contribution => self.contribution_tab(ui, &dataset),
            }
        });
    }
}

impl TradeScopeApp {
    fn overview_tab(&self, ui: &mut egui::Ui, dataset: &TradeDataset) {
        let totals = agg::totals_by_country_year(dataset, &PRIORITY_COUNTRIES);
        let matrix = agg::balance_matrix(dataset);

        let half = ui.available_height() / 2.0 - 24.0;
        ui.heading("Total Trade Value Comparison Across SEA");
        ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui: &mut egui::Ui| {
            plot::grouped_totals_chart(ui, &totals, &PRIORITY_COUNTRIES, &self.state.colors);
        });
        ui.separator();
        ui.heading("Trade Balance Value Across SEA");
        plot::balance_heatmap(ui, &matrix);
    }

    fn trends_tab(&self, ui: &mut egui::Ui, dataset: &TradeDataset) {
        let filter = &self.state.filter;
        let trend = agg::trend_by_country(dataset, &filter.country);
        let scatter = agg::scatter_with_fit(dataset, &filter.country, filter.year);

        let half = ui.available_height() / 2.0 - 24.0;
        ui.heading(format!("Export vs Import Trend Line for {}", filter.country));
        ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui: &mut egui::Ui| {
            plot::trend_lines(ui, &trend);
        });
        ui.separator();
        ui.heading(format!(
            "Export vs Import for {} in {}",
            filter.country, filter.year
        ));
        plot::scatter_fit_plot(ui, &scatter, self.state.colors.color_for(&filter.country));
    }

    fn table_tab(&mut self, ui: &mut egui::Ui, dataset: &TradeDataset) {
        let filter = self.state.filter.clone();
        let kpis = agg::kpis(dataset, &filter.country, filter.year);
        let rows = agg::filtered_table(dataset, &filter.country, filter.year);
        let top = agg::top_partners(dataset, &filter.country, filter.year, 10);

        panels::kpi_row(ui, &kpis);
        ui.add_space(8.0);
        ui.heading(format!(
            "Full International Trade Data for {} in {}",
            filter.country, filter.year
        ));
        let table_height = (ui.available_height() * 0.55).max(160.0);
        ui.allocate_ui(
            egui::vec2(ui.available_width(), table_height),
            |ui: &mut egui::Ui| {
                table::data_table(ui, &mut self.state, &rows);
            },
        );
        ui.separator();
        ui.heading(format!(
            "Top 10 Trading Partners for {} in {}",
            filter.country, filter.year
        ));
        plot::top_partners_chart(ui, &top, self.state.colors.color_for(&filter.country));
    }

    fn contribution_tab(&self, ui: &mut egui::Ui, dataset: &TradeDataset) {
        let filter = &self.state.filter;
        let contribution = agg::partner_contribution(dataset, &filter.country, filter.year);

        ui.heading(format!(
            "International Trade Contribution for {} in {}",
            filter.country, filter.year
        ));
        plot::contribution_chart(ui, &contribution);
    }
}
