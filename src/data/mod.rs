/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  data/*.csv, *.parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  concat files → clean rows → TradeDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ TradeDataset  │  Vec<TradeRecord>, label domains, year bounds
///   └──────────────┘  (immutable, shared via Arc)
///        │
///        ▼
///   ┌──────────┐
///   │   agg     │  pure (dataset, filter) → tabular results / KPIs
///   └──────────┘
/// ```

pub mod agg;
pub mod loader;
pub mod model;
