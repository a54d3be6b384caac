use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{TradeDataset, TradeRecord};

/// Canonical column order. Source files are renamed positionally, so their
/// own header names never survive the load.
pub const CANONICAL_COLUMNS: [&str; 8] = [
    "country",
    "country_code",
    "partner_name",
    "partner_code",
    "year",
    "export_USD",
    "import_USD",
    "trade_balance_USD",
];

/// Fatal startup errors. Anything here means the dataset cannot be built;
/// there is no partial recovery.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no .csv or .parquet files found in {0}")]
    NoFiles(PathBuf),
    #[error("{path}: expected {expected} columns, found {found}")]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("{path}: header {found:?} does not match {reference:?} from the first file")]
    SchemaMismatch {
        path: PathBuf,
        found: Vec<String>,
        reference: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every tabular file in `dir` into one dataset.
///
/// Files are read in file-name order so repeated loads of the same
/// directory produce the same record order. Rows with any missing or
/// unparseable field are dropped silently; files that cannot be aligned to
/// the 8-column schema abort the whole load.
pub fn load_dir(dir: &Path) -> Result<TradeDataset> {
    let files = list_data_files(dir)?;
    if files.is_empty() {
        return Err(LoadError::NoFiles(dir.to_path_buf()).into());
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;
    // Header of the first CSV file; later CSVs must match it exactly.
    let mut reference_header: Option<Vec<String>> = None;

    for path in &files {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => load_csv(path, &mut reference_header, &mut records, &mut dropped)?,
            "parquet" | "pq" => load_parquet(path, &mut records, &mut dropped)?,
            _ => unreachable!("list_data_files only yields csv/parquet"),
        }
    }

    log::info!(
        "Loaded {} records from {} files in {} ({} rows dropped)",
        records.len(),
        files.len(),
        dir.display(),
        dropped
    );

    Ok(TradeDataset::from_records(records))
}

/// Enumerate `*.csv`, `*.parquet`, `*.pq` in the directory, sorted by name.
fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading data directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            matches!(ext.as_str(), "csv" | "parquet" | "pq")
        })
        .collect();
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: one header row, then one trade observation per row. The
/// header names are arbitrary (World Bank exports use verbose ones); only
/// the column *positions* matter, but every CSV in a directory must carry
/// the same header so we know the files actually align.
fn load_csv(
    path: &Path,
    reference_header: &mut Option<Vec<String>>,
    records: &mut Vec<TradeRecord>,
    dropped: &mut usize,
) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let header: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading CSV header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if header.len() != CANONICAL_COLUMNS.len() {
        return Err(LoadError::ColumnCount {
            path: path.to_path_buf(),
            expected: CANONICAL_COLUMNS.len(),
            found: header.len(),
        }
        .into());
    }
    match reference_header {
        Some(reference) if *reference != header => {
            return Err(LoadError::SchemaMismatch {
                path: path.to_path_buf(),
                found: header,
                reference: reference.clone(),
            }
            .into());
        }
        Some(_) => {}
        None => *reference_header = Some(header),
    }

    for result in reader.records() {
        let row = result.with_context(|| format!("reading CSV row in {}", path.display()))?;
        match record_from_csv_row(&row) {
            Some(rec) => records.push(rec),
            None => *dropped += 1,
        }
    }
    Ok(())
}

/// Parse one CSV row into a record; `None` drops the row (missing field
/// or unparseable number).
fn record_from_csv_row(row: &csv::StringRecord) -> Option<TradeRecord> {
    Some(TradeRecord {
        country: label_field(row.get(0))?,
        country_code: label_field(row.get(1))?,
        partner_name: label_field(row.get(2))?,
        partner_code: label_field(row.get(3))?,
        year: parse_year(row.get(4)?)?,
        export_usd: parse_number(row.get(5)?)?,
        import_usd: parse_number(row.get(6)?)?,
        trade_balance_usd: parse_number(row.get(7)?)?,
    })
}

fn label_field(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Years arrive as `2020` or, from spreadsheet exports, `2020.0`.
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let f = s.trim().parse::<f64>().ok()?;
    if f.is_finite() {
        Some(f)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same positional 8-column layout. Column
/// names are ignored like the CSV path; nulls in any cell drop the row.
fn load_parquet(path: &Path, records: &mut Vec<TradeRecord>, dropped: &mut usize) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?;
    let reader = builder
        .build()
        .with_context(|| format!("building parquet reader for {}", path.display()))?;

    for batch_result in reader {
        let batch = batch_result
            .with_context(|| format!("reading parquet record batch in {}", path.display()))?;
        let n_cols = batch.num_columns();
        if n_cols != CANONICAL_COLUMNS.len() {
            return Err(LoadError::ColumnCount {
                path: path.to_path_buf(),
                expected: CANONICAL_COLUMNS.len(),
                found: n_cols,
            }
            .into());
        }

        for row in 0..batch.num_rows() {
            let rec = (|| {
                Some(TradeRecord {
                    country: string_at(batch.column(0), row)?,
                    country_code: string_at(batch.column(1), row)?,
                    partner_name: string_at(batch.column(2), row)?,
                    partner_code: string_at(batch.column(3), row)?,
                    year: f64_at(batch.column(4), row)? as i32,
                    export_usd: f64_at(batch.column(5), row)?,
                    import_usd: f64_at(batch.column(6), row)?,
                    trade_balance_usd: f64_at(batch.column(7), row)?,
                })
            })();
            match rec {
                Some(rec) => records.push(rec),
                None => *dropped += 1,
            }
        }
    }
    Ok(())
}

// -- Arrow helpers --

/// Read a non-empty string cell, accepting Utf8 and LargeUtf8 columns.
fn string_at(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let s = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).trim().to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).trim().to_string()),
        _ => None,
    }?;
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Read a numeric cell, accepting the integer and float widths Pandas and
/// Polars commonly write.
fn f64_at(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let v = match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        _ => None,
    }?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "Reporter Name,Reporter Code,Partner Name,Partner Code,\
Year,Export (US$),Import (US$),Trade Balance (US$)";

    /// Fresh per-test scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tradescope-loader-{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_csv(dir: &Path, file: &str, header: &str, rows: &[&str]) {
        let mut body = String::from(header);
        for row in rows {
            body.push('\n');
            body.push_str(row);
        }
        body.push('\n');
        fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn concatenates_files_in_name_order() {
        let dir = scratch("concat");
        write_csv(
            &dir,
            "b_thailand.csv",
            HEADER,
            &["Thailand,THA,Japan,JPN,2020,5.0,3.0,2.0"],
        );
        write_csv(
            &dir,
            "a_malaysia.csv",
            HEADER,
            &["Malaysia,MYS,China,CHN,2020,10.0,4.0,6.0"],
        );

        let ds = load_dir(&dir).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, "Malaysia");
        assert_eq!(ds.records[1].country, "Thailand");
    }

    #[test]
    fn drops_rows_with_missing_or_malformed_fields() {
        let dir = scratch("dropna");
        write_csv(
            &dir,
            "data.csv",
            HEADER,
            &[
                "Malaysia,MYS,China,CHN,2020,10.0,4.0,6.0",
                "Malaysia,MYS,,CHN,2020,10.0,4.0,6.0",
                "Malaysia,MYS,Japan,JPN,not-a-year,10.0,4.0,6.0",
                "Malaysia,MYS,Japan,JPN,2021,oops,4.0,6.0",
            ],
        );

        let ds = load_dir(&dir).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].partner_name, "China");
    }

    #[test]
    fn coerces_float_formatted_years() {
        let dir = scratch("year");
        write_csv(
            &dir,
            "data.csv",
            HEADER,
            &["Malaysia,MYS,China,CHN,2020.0,10.0,4.0,6.0"],
        );

        let ds = load_dir(&dir).unwrap();
        assert_eq!(ds.records[0].year, 2020);
    }

    #[test]
    fn empty_directory_is_fatal() {
        let dir = scratch("empty");
        let err = load_dir(&dir).unwrap_err();
        assert!(err.downcast_ref::<LoadError>().is_some());
        assert!(err.to_string().contains("no .csv or .parquet files"));
    }

    #[test]
    fn header_mismatch_across_files_is_fatal() {
        let dir = scratch("mismatch");
        write_csv(
            &dir,
            "a.csv",
            HEADER,
            &["Malaysia,MYS,China,CHN,2020,10.0,4.0,6.0"],
        );
        write_csv(
            &dir,
            "b.csv",
            "country,code,partner,pcode,year,exp,imp,bal",
            &["Thailand,THA,Japan,JPN,2020,5.0,3.0,2.0"],
        );

        let err = load_dir(&dir).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn wrong_column_count_is_fatal() {
        let dir = scratch("columns");
        write_csv(&dir, "a.csv", "country,year,export", &["Malaysia,2020,10.0"]);

        let err = load_dir(&dir).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::ColumnCount { found: 3, .. })
        ));
    }

    #[test]
    fn reads_flat_parquet_files() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = scratch("parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("country", DataType::Utf8, false),
            Field::new("country_code", DataType::Utf8, false),
            Field::new("partner_name", DataType::Utf8, false),
            Field::new("partner_code", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("export_USD", DataType::Float64, false),
            Field::new("import_USD", DataType::Float64, false),
            Field::new("trade_balance_USD", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Singapore"])),
                Arc::new(StringArray::from(vec!["SGP"])),
                Arc::new(StringArray::from(vec!["India"])),
                Arc::new(StringArray::from(vec!["IND"])),
                Arc::new(Int64Array::from(vec![2019])),
                Arc::new(Float64Array::from(vec![7.5])),
                Arc::new(Float64Array::from(vec![2.5])),
                Arc::new(Float64Array::from(vec![5.0])),
            ],
        )
        .unwrap();

        let file = fs::File::create(dir.join("sg.parquet")).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_dir(&dir).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.country, "Singapore");
        assert_eq!(rec.year, 2019);
        assert_eq!(rec.trade_value(), 10.0);
    }
}
