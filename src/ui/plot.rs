use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{self, CountryColors};
use crate::data::agg::{BalanceMatrix, CountryYearTotal, PartnerTrade, ScatterFit, TrendPoint};

/// Colour of the OLS fit line.
const FIT_LINE_COLOR: Color32 = Color32::from_rgb(0x2E, 0x8B, 0xE8);

// ---------------------------------------------------------------------------
// Overview: grouped totals bar chart
// ---------------------------------------------------------------------------

/// Grouped bar chart of total trade value by country and year. One bar
/// group per year, one coloured bar per reporter inside it.
pub fn grouped_totals_chart(
    ui: &mut Ui,
    totals: &[CountryYearTotal],
    countries: &[&str],
    colors: &CountryColors,
) {
    let n = countries.len().max(1);
    let width = 0.8 / n as f64;

    let charts: Vec<BarChart> = countries
        .iter()
        .enumerate()
        .map(|(rank, country)| {
            let offset = (rank as f64 - (n as f64 - 1.0) / 2.0) * width;
            let bars: Vec<Bar> = totals
                .iter()
                .filter(|t| t.country == *country)
                .map(|t| Bar::new(t.year as f64 + offset, t.trade_value).width(width * 0.9))
                .collect();
            BarChart::new(bars)
                .name(*country)
                .color(colors.color_for(country))
        })
        .collect();

    Plot::new("grouped_totals")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Total Trade Value (USD)")
        .x_axis_formatter(|mark: GridMark, _range| format_year_tick(mark))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Overview: trade-balance heatmap
// ---------------------------------------------------------------------------

/// Country × year heatmap of summed trade balance. Absent cells are left
/// unpainted; the ramp is symmetric around zero.
pub fn balance_heatmap(ui: &mut Ui, matrix: &BalanceMatrix) {
    let max_abs = matrix.max_abs();
    let countries = matrix.countries.clone();

    let mut cells: Vec<Polygon> = Vec::new();
    for (ci, country) in matrix.countries.iter().enumerate() {
        for (yi, year) in matrix.years.iter().enumerate() {
            let Some(balance) = matrix.get(ci, yi) else {
                continue;
            };
            let t = if max_abs > 0.0 {
                0.5 + 0.5 * balance / max_abs
            } else {
                0.5
            };
            let (x, y) = (*year as f64, ci as f64);
            let corners: PlotPoints = vec![
                [x - 0.5, y - 0.5],
                [x + 0.5, y - 0.5],
                [x + 0.5, y + 0.5],
                [x - 0.5, y + 0.5],
            ]
            .into();
            cells.push(
                Polygon::new(corners)
                    .fill_color(color::balance_ramp(t))
                    .stroke(Stroke::new(0.5, Color32::from_gray(40)))
                    .name(format!("{country} {year}: {}", format_compact_usd(balance))),
            );
        }
    }

    Plot::new("balance_heatmap")
        .x_axis_label("Year")
        .y_axis_label("Country")
        .x_axis_formatter(|mark: GridMark, _range| format_year_tick(mark))
        .y_axis_formatter(move |mark: GridMark, _range| index_tick(mark, &countries))
        .show_grid(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for cell in cells {
                plot_ui.polygon(cell);
            }
        });
}

// ---------------------------------------------------------------------------
// Trends: export vs import lines
// ---------------------------------------------------------------------------

/// Export and import trend lines over the years for one reporter.
pub fn trend_lines(ui: &mut Ui, trend: &[TrendPoint]) {
    let exports: PlotPoints = trend
        .iter()
        .map(|p| [p.year as f64, p.export_usd])
        .collect();
    let imports: PlotPoints = trend
        .iter()
        .map(|p| [p.year as f64, p.import_usd])
        .collect();

    Plot::new("trend_lines")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Trade Value (USD)")
        .x_axis_formatter(|mark: GridMark, _range| format_year_tick(mark))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(exports)
                    .name("Export")
                    .color(Color32::from_rgb(0x2C, 0xA0, 0x2C))
                    .width(2.0),
            );
            plot_ui.line(
                Line::new(imports)
                    .name("Import")
                    .color(Color32::from_rgb(0xD6, 0x27, 0x28))
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Trends: scatter with OLS fit
// ---------------------------------------------------------------------------

/// Export/import scatter for one (country, year); the OLS line only shows
/// when the engine produced a fit (two or more points).
pub fn scatter_fit_plot(ui: &mut Ui, scatter: &ScatterFit, marker_color: Color32) {
    let points: PlotPoints = scatter.points.clone().into();

    Plot::new("scatter_fit")
        .legend(Legend::default())
        .x_axis_label("Export (USD)")
        .y_axis_label("Import (USD)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .name("Partners")
                    .color(marker_color)
                    .radius(3.0),
            );
            if let Some(fit) = &scatter.fit {
                let samples: PlotPoints = fit.samples.clone().into();
                plot_ui.line(
                    Line::new(samples)
                        .name("OLS fit")
                        .color(FIT_LINE_COLOR)
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Partners: top-k horizontal bars
// ---------------------------------------------------------------------------

/// Horizontal bar chart of the top trading partners, largest at the top.
pub fn top_partners_chart(ui: &mut Ui, partners: &[PartnerTrade], bar_color: Color32) {
    let names: Vec<String> = partners
        .iter()
        .rev()
        .map(|p| p.partner_name.clone())
        .collect();
    let bars: Vec<Bar> = partners
        .iter()
        .rev()
        .enumerate()
        .map(|(i, p)| Bar::new(i as f64, p.total_trade).width(0.7))
        .collect();

    Plot::new("top_partners")
        .x_axis_label("Total Trade Value (USD)")
        .y_axis_label("Partner Country")
        .y_axis_formatter(move |mark: GridMark, _range| index_tick(mark, &names))
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(bar_color).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Contribution: ramp-coloured partner bars
// ---------------------------------------------------------------------------

/// Contribution view: every partner for the selected (country, year),
/// bar length and ramp colour both carrying total trade. A stand-in for
/// the original choropleth; unresolved partner names render like any
/// other label.
pub fn contribution_chart(ui: &mut Ui, partners: &[PartnerTrade]) {
    let mut sorted: Vec<&PartnerTrade> = partners.iter().collect();
    sorted.sort_by(|a, b| b.total_trade.total_cmp(&a.total_trade));

    let max_trade = sorted
        .first()
        .map(|p| p.total_trade)
        .filter(|v| *v > 0.0)
        .unwrap_or(1.0);
    let names: Vec<String> = sorted
        .iter()
        .rev()
        .map(|p| p.partner_name.clone())
        .collect();
    let bars: Vec<Bar> = sorted
        .iter()
        .rev()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.total_trade)
                .width(0.7)
                .fill(color::contribution_ramp(p.total_trade / max_trade))
        })
        .collect();

    Plot::new("contribution")
        .x_axis_label("Total Trade Value (USD)")
        .y_axis_label("Partner Country")
        .y_axis_formatter(move |mark: GridMark, _range| index_tick(mark, &names))
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(true)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Tick helpers
// ---------------------------------------------------------------------------

/// Integer year ticks; fractional grid marks stay unlabeled.
fn format_year_tick(mark: GridMark) -> String {
    if mark.value.fract().abs() < f64::EPSILON {
        format!("{}", mark.value as i64)
    } else {
        String::new()
    }
}

/// Label integer positions with entries from `labels`.
fn index_tick(mark: GridMark, labels: &[String]) -> String {
    if mark.value.fract().abs() > f64::EPSILON || mark.value < 0.0 {
        return String::new();
    }
    labels
        .get(mark.value as usize)
        .cloned()
        .unwrap_or_default()
}

/// Compact magnitude formatting for hover labels.
fn format_compact_usd(v: f64) -> String {
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (v / 1e12, "T")
    } else if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else {
        (v, "")
    };
    format!("{scaled:.1}{suffix} USD")
}
