use std::collections::BTreeMap;
use std::sync::Arc;

use crate::color::CountryColors;
use crate::data::model::TradeDataset;

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// The two scalar inputs driving every view. There is no other filter
/// state; each view is a pure function of (dataset, selection).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub country: String,
    pub year: i32,
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// The four dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Trends,
    Table,
    Contribution,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Trends, Tab::Table, Tab::Contribution];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Trade Trends Overview",
            Tab::Trends => "Specific Trade Trends",
            Tab::Table => "SEA Trade Data",
            Tab::Contribution => "SEA Trade Contribution",
        }
    }
}

// ---------------------------------------------------------------------------
// Table sorting
// ---------------------------------------------------------------------------

/// Sortable columns of the filtered data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Country,
    Partner,
    Year,
    Export,
    Import,
    TradeValue,
}

/// Current sort of the data table. `None` keeps source row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub column: TableColumn,
    pub ascending: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset; immutable once set, shared read-only with every
    /// aggregation call.
    pub dataset: Option<Arc<TradeDataset>>,

    /// Selected (country, year).
    pub filter: FilterSelection,

    /// Active tab.
    pub tab: Tab,

    /// Whether the settings sidebar is shown.
    pub sidebar_open: bool,

    /// Current data-table sort, if any.
    pub table_sort: Option<TableSort>,

    /// Country → colour mapping for the charts.
    pub colors: CountryColors,

    /// Configured hex palette, re-applied whenever a dataset loads.
    pub configured_colors: BTreeMap<String, String>,

    /// Configured default filter values, applied when a dataset loads.
    pub default_country: Option<String>,
    pub default_year: Option<i32>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filter: FilterSelection {
                country: String::new(),
                year: 0,
            },
            tab: Tab::Overview,
            sidebar_open: false,
            table_sort: None,
            colors: CountryColors::default(),
            configured_colors: BTreeMap::new(),
            default_country: None,
            default_year: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: rebuild colours and reset the filter
    /// to the configured defaults (first priority country, latest year).
    pub fn set_dataset(&mut self, dataset: TradeDataset) {
        self.colors = CountryColors::new(&self.configured_colors, &dataset.countries);

        let country = self
            .default_country
            .clone()
            .filter(|c| dataset.countries.contains(c))
            .or_else(|| dataset.countries.first().cloned())
            .unwrap_or_default();
        let year = self
            .default_year
            .filter(|y| (dataset.year_min..=dataset.year_max).contains(y))
            .unwrap_or(dataset.year_max);

        self.filter = FilterSelection { country, year };
        self.table_sort = None;
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
    }

    /// Toggle or flip the data-table sort for a column: first click sorts
    /// ascending, the second flips to descending.
    pub fn toggle_table_sort(&mut self, column: TableColumn) {
        self.table_sort = match self.table_sort {
            Some(TableSort {
                column: current,
                ascending,
            }) if current == column => Some(TableSort {
                column,
                ascending: !ascending,
            }),
            _ => Some(TableSort {
                column,
                ascending: true,
            }),
        };
    }
}
