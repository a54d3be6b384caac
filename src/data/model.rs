use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// TradeRecord – one row of the loaded table
// ---------------------------------------------------------------------------

/// A single bilateral trade observation: one (reporter, partner, year) row.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    /// Reporting country name.
    pub country: String,
    /// Reporting country ISO-style code.
    pub country_code: String,
    /// Counterparty country name.
    pub partner_name: String,
    /// Counterparty country code.
    pub partner_code: String,
    /// Observation year.
    pub year: i32,
    /// Export value in USD (non-negative in well-formed data).
    pub export_usd: f64,
    /// Import value in USD (non-negative in well-formed data).
    pub import_usd: f64,
    /// Trade balance in USD as reported in the source file.
    /// Expected to equal export − import, carried through unvalidated.
    pub trade_balance_usd: f64,
}

impl TradeRecord {
    /// Export + import for this row.
    pub fn trade_value(&self) -> f64 {
        self.export_usd + self.import_usd
    }
}

// ---------------------------------------------------------------------------
// Country display order
// ---------------------------------------------------------------------------

/// Reporters shown first, in this order, in every country listing.
pub const PRIORITY_COUNTRIES: [&str; 4] = ["Malaysia", "Indonesia", "Singapore", "Thailand"];

/// Year slider lower bound when the data starts later.
pub const YEAR_FLOOR: i32 = 2015;
/// Year slider upper bound when the data ends earlier.
pub const YEAR_CEIL: i32 = 2022;

// ---------------------------------------------------------------------------
// TradeDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed label domains and year bounds.
///
/// Immutable after construction; shared read-only (via `Arc`) by every
/// aggregation call, so no locking is ever needed.
#[derive(Debug, Clone)]
pub struct TradeDataset {
    /// All records, in file-then-row order. No missing fields.
    pub records: Vec<TradeRecord>,
    /// Reporter display order: the priority list, then every other
    /// discovered reporter alphabetically.
    pub countries: Vec<String>,
    /// Sorted unique partner names.
    pub partners: BTreeSet<String>,
    /// min(data, 2015)
    pub year_min: i32,
    /// max(data, 2022)
    pub year_max: i32,
}

impl TradeDataset {
    /// Build label domains and year bounds from cleaned records.
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        let discovered: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
        let partners: BTreeSet<String> =
            records.iter().map(|r| r.partner_name.clone()).collect();

        // Priority reporters always lead the listing; everything else
        // follows alphabetically (BTreeSet iteration order).
        let mut countries: Vec<String> =
            PRIORITY_COUNTRIES.iter().map(|c| c.to_string()).collect();
        countries.extend(
            discovered
                .iter()
                .filter(|c| !PRIORITY_COUNTRIES.contains(*c))
                .map(|c| c.to_string()),
        );

        let data_min = records.iter().map(|r| r.year).min();
        let data_max = records.iter().map(|r| r.year).max();
        let year_min = data_min.map_or(YEAR_FLOOR, |y| y.min(YEAR_FLOOR));
        let year_max = data_max.map_or(YEAR_CEIL, |y| y.max(YEAR_CEIL));

        TradeDataset {
            records,
            countries,
            partners,
            year_min,
            year_max,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique observation years actually present in the data.
    pub fn observed_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        years.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, partner: &str, year: i32) -> TradeRecord {
        TradeRecord {
            country: country.to_string(),
            country_code: country[..2].to_ascii_uppercase(),
            partner_name: partner.to_string(),
            partner_code: partner[..2].to_ascii_uppercase(),
            year,
            export_usd: 1.0,
            import_usd: 2.0,
            trade_balance_usd: -1.0,
        }
    }

    #[test]
    fn priority_countries_lead_then_alphabetical() {
        let ds = TradeDataset::from_records(vec![
            record("Vietnam", "China", 2019),
            record("Malaysia", "China", 2019),
            record("Cambodia", "China", 2019),
        ]);
        assert_eq!(
            ds.countries,
            vec![
                "Malaysia",
                "Indonesia",
                "Singapore",
                "Thailand",
                "Cambodia",
                "Vietnam"
            ]
        );
    }

    #[test]
    fn year_bounds_widened_to_floor_and_ceiling() {
        let ds = TradeDataset::from_records(vec![
            record("Malaysia", "China", 2018),
            record("Malaysia", "China", 2020),
        ]);
        assert_eq!(ds.year_min, 2015);
        assert_eq!(ds.year_max, 2022);
    }

    #[test]
    fn year_bounds_follow_data_outside_defaults() {
        let ds = TradeDataset::from_records(vec![
            record("Malaysia", "China", 2010),
            record("Malaysia", "China", 2024),
        ]);
        assert_eq!(ds.year_min, 2010);
        assert_eq!(ds.year_max, 2024);
    }

    #[test]
    fn observed_years_sorted_and_deduplicated() {
        let ds = TradeDataset::from_records(vec![
            record("Malaysia", "China", 2021),
            record("Malaysia", "Japan", 2019),
            record("Thailand", "China", 2021),
        ]);
        assert_eq!(ds.observed_years(), vec![2019, 2021]);
    }
}
