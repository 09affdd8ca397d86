use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use csv::{ReaderBuilder, Trim};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    columns, IncompleteRows, IngestOptions, IngestReport, Ingested, Property, RawRow,
    SourceFormat,
};
use super::normalize::{is_missing, normalize_row, raw_ratio};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures that abort a load.  Bad cells and bad rows never end up here.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("reading CSV header: {0}")]
    CsvHeader(#[source] csv::Error),
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level JSON array of objects")]
    JsonShape,
    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("decoding parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Pick the source format from a file extension.
pub fn detect_format(path: &Path) -> Result<SourceFormat, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => Ok(SourceFormat::Csv),
        "json" => Ok(SourceFormat::Json),
        "parquet" | "pq" => Ok(SourceFormat::Parquet),
        other => Err(IngestError::UnsupportedExtension(other.to_string())),
    }
}

/// Load listings from a file, dispatching on its extension.
pub fn ingest_file(path: &Path, options: &IngestOptions) -> Result<Ingested> {
    let format = detect_format(path)?;
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let mut report = IngestReport::new(format, *options);
    let (columns, rows) = match format {
        SourceFormat::Csv => read_csv_rows(file, &mut report)?,
        SourceFormat::Json => read_json_rows(file)?,
        SourceFormat::Parquet => read_parquet_rows(file)?,
    };

    let ingested = finish(&columns, rows, options, report);
    log::debug!("ingest report for {}: {:?}", path.display(), ingested.report);
    Ok(ingested)
}

/// Load listings from an in-memory CSV or JSON source.
pub fn ingest_reader<R: Read>(
    reader: R,
    format: SourceFormat,
    options: &IngestOptions,
) -> Result<Ingested> {
    let mut report = IngestReport::new(format, *options);
    let (columns, rows) = match format {
        SourceFormat::Csv => read_csv_rows(reader, &mut report)?,
        SourceFormat::Json => read_json_rows(reader)?,
        SourceFormat::Parquet => {
            anyhow::bail!("parquet sources must be read from a file")
        }
    };

    Ok(finish(&columns, rows, options, report))
}

fn finish(
    columns: &[String],
    rows: Vec<RawRow>,
    options: &IngestOptions,
    mut report: IngestReport,
) -> Ingested {
    report.rows_read = rows.len();
    report.missing_columns = missing_columns(columns);
    let listings = prepare_rows(rows, options, &mut report);
    Ingested { listings, report }
}

// ---------------------------------------------------------------------------
// Raw rows → listings
// ---------------------------------------------------------------------------

/// Apply the first-row and incomplete-row policies, sort by raw
/// price/sqft ratio, then normalize.
pub fn prepare_rows(
    mut rows: Vec<RawRow>,
    options: &IngestOptions,
    report: &mut IngestReport,
) -> Vec<Property> {
    if options.drop_first_row && !rows.is_empty() {
        rows.remove(0);
        report.first_row_dropped = true;
    }

    let incomplete = |row: &RawRow| {
        columns::REQUIRED
            .iter()
            .any(|col| is_missing(row, col))
    };
    report.incomplete_rows = rows.iter().filter(|r| incomplete(*r)).count();
    if options.incomplete_rows == IncompleteRows::Exclude {
        rows.retain(|r| !incomplete(r));
    }

    let rows = sort_by_ratio(rows);
    let listings: Vec<Property> = rows.iter().map(normalize_row).collect();
    report.listings = listings.len();
    listings
}

/// Required columns absent from a source's column names.  A source with no
/// columns at all (empty file, empty JSON array) reports nothing.
pub fn missing_columns(present: &[String]) -> Vec<String> {
    if present.is_empty() {
        return Vec::new();
    }
    columns::REQUIRED
        .iter()
        .filter(|col| !present.iter().any(|p| p == *col))
        .map(|col| col.to_string())
        .collect()
}

/// Stable ascending sort on [`raw_ratio`].  NaN ratios go last.
pub fn sort_by_ratio(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut keyed: Vec<(f64, RawRow)> = rows.into_iter().map(|r| (raw_ratio(&r), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| compare_ratio(*a, *b));
    keyed.into_iter().map(|(_, r)| r).collect()
}

fn compare_ratio(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Column names and rows of a source.
type RawTable = (Vec<String>, Vec<RawRow>);

/// Header row followed by data rows.  Ragged rows are accepted; records
/// the parser rejects are counted and skipped.  Cells are trimmed, header
/// names are kept verbatim.
fn read_csv_rows<R: Read>(reader: R, report: &mut IngestReport) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(IngestError::CsvHeader)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping CSV row {row_no}: {e}");
                report.malformed_rows += 1;
                continue;
            }
        };

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON:
///
/// ```json
/// [
///   { "PRICE": 450000, "SQUARE FEET": "1500", "ZIP OR POSTAL CODE": "98103" },
///   ...
/// ]
/// ```
///
/// Values are stringified so they flow through the same normalizer as CSV
/// cells; `null` is an absent cell.  The columns are every key seen in any
/// record, `null`-valued ones included.
fn read_json_rows<R: Read>(reader: R) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_reader(reader).map_err(IngestError::Json)?;
    let records = root.as_array().ok_or(IngestError::JsonShape)?;

    let mut keys = BTreeSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let obj = rec.as_object().ok_or(IngestError::JsonShape)?;
        keys.extend(obj.keys().cloned());
        let row: RawRow = obj
            .iter()
            .filter_map(|(key, val)| json_cell(val).map(|v| (key.clone(), v)))
            .collect();
        rows.push(row);
    }
    Ok((keys.into_iter().collect(), rows))
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Every column is rendered to its display string; nulls become absent
/// cells.  Works with files written by Pandas, Polars, or the bundled
/// sample generator.
fn read_parquet_rows(file: File) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(IngestError::Parquet)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(IngestError::Parquet)?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(IngestError::Arrow)?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let mut raw = RawRow::new();
            for (idx, field) in schema.fields().iter().enumerate() {
                let col = batch.column(idx);
                if col.is_null(row) {
                    continue;
                }
                let value =
                    array_value_to_string(col.as_ref(), row).map_err(IngestError::Arrow)?;
                raw.insert(field.name().clone(), value);
            }
            rows.push(raw);
        }
    }
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SALE TYPE,PRICE,BEDS,BATHS,ZIP OR POSTAL CODE,SQUARE FEET,LOT SIZE,$/SQUARE FEET,DAYS ON MARKET,YEAR BUILT";

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out.push('\n');
        out
    }

    fn ingest(text: &str, options: IngestOptions) -> Ingested {
        ingest_reader(text.as_bytes(), SourceFormat::Csv, &options).unwrap()
    }

    /// Five rows, the fourth without square footage.
    fn five_rows() -> String {
        csv(&[
            "MLS Listing,400000,3,2,98103,1000,4000,400,10,1990",
            "MLS Listing,300000,2,1,98103,1500,3000,200,5,",
            "MLS Listing,900000,4,3,98105,3000,6000,300,,2005",
            "MLS Listing,500000,3,2,98105,,5000,,7,1950",
            "MLS Listing,250000,1,1,98107,1000,,250,30,1978",
        ])
    }

    #[test]
    fn default_keeps_first_row_and_excludes_incomplete() {
        let out = ingest(&five_rows(), IngestOptions::default());
        assert_eq!(out.report.rows_read, 5);
        assert_eq!(out.listings.len(), 4);
        assert_eq!(out.report.incomplete_rows, 1);
        assert!(!out.report.first_row_dropped);
        assert!(out.listings.iter().all(|p| p.square_feet > 0.0));
    }

    #[test]
    fn legacy_drops_first_row_and_keeps_incomplete() {
        let out = ingest(&five_rows(), IngestOptions::legacy());
        assert_eq!(out.listings.len(), 5 - 1);
        assert!(out.report.first_row_dropped);
        assert_eq!(out.report.incomplete_rows, 1);

        let blank = out
            .listings
            .iter()
            .find(|p| p.price == 500_000.0)
            .unwrap();
        assert_eq!(blank.square_feet, 0.0);
        assert_eq!(blank.price_per_square_foot, 0.0);
        // An empty square footage gives an infinite ratio, sorted after the
        // finite ones.
        assert_eq!(out.listings.last().unwrap().price, 500_000.0);
    }

    #[test]
    fn rows_are_sorted_by_price_per_square_foot() {
        let out = ingest(&five_rows(), IngestOptions::default());
        let prices: Vec<f64> = out.listings.iter().map(|p| p.price).collect();
        // ratios: 400, 200, 300, 250
        assert_eq!(prices, vec![300_000.0, 250_000.0, 900_000.0, 400_000.0]);
    }

    #[test]
    fn ratio_sort_is_stable_and_puts_nan_last() {
        let text = csv(&[
            "a,200,1,1,11111,100,,,,",
            "b,abc,2,1,22222,100,,,,",
            "c,400,3,1,33333,200,,,,",
            "d,100,4,1,44444,100,,,,",
        ]);
        let out = ingest(&text, IngestOptions { drop_first_row: false, incomplete_rows: IncompleteRows::Keep });
        let zips: Vec<&str> = out.listings.iter().map(|p| p.zip_code.as_str()).collect();
        assert_eq!(zips, vec!["44444", "11111", "33333", "22222"]);
    }

    #[test]
    fn required_fields_are_always_finite() {
        let text = csv(&[
            "x,NaN,two,inf,,abc,-,?,soon,later",
            "x,1e999,3,2,98103,1200,,,,",
        ]);
        let opts = IngestOptions { drop_first_row: false, incomplete_rows: IncompleteRows::Keep };
        let out = ingest(&text, opts);
        assert_eq!(out.listings.len(), 2);
        for p in &out.listings {
            for v in [p.price, p.baths, p.square_feet, p.lot_size, p.price_per_square_foot] {
                assert!(v.is_finite(), "{p:?}");
            }
        }
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let text = format!("{HEADER}\nMLS Listing,350000,2\nMLS Listing,410000,3,2,98103,1400,1,290,1,2000,extra\n");
        let opts = IngestOptions { drop_first_row: false, incomplete_rows: IncompleteRows::Keep };
        let out = ingest(&text, opts);
        assert_eq!(out.listings.len(), 2);
        assert_eq!(out.report.malformed_rows, 0);
        let short = out.listings.iter().find(|p| p.price == 350_000.0).unwrap();
        assert_eq!(short.beds, 2);
        assert_eq!(short.square_feet, 0.0);
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let text = "BEDS,BATHS\n3,2\n";
        let out = ingest(text, IngestOptions::default());
        assert_eq!(out.report.missing_columns, vec!["PRICE", "SQUARE FEET"]);
        assert!(out.listings.is_empty());
    }

    #[test]
    fn header_names_must_match_exactly() {
        for text in [
            "PRICE ,  SQUARE FEET,BEDS\n300000,1500,3\n",
            "price,square feet\n300000,1500\n",
        ] {
            let out = ingest(text, IngestOptions::default());
            assert_eq!(out.report.missing_columns, vec!["PRICE", "SQUARE FEET"], "{text:?}");
            assert!(out.listings.is_empty(), "{text:?}");
        }
    }

    #[test]
    fn cells_are_trimmed() {
        let out = ingest("PRICE,SQUARE FEET,BEDS\n 300000 ,1500  , 3\n", IngestOptions::default());
        assert_eq!(out.listings.len(), 1);
        assert_eq!(out.listings[0].price, 300_000.0);
        assert_eq!(out.listings[0].beds, 3);
    }

    #[test]
    fn short_rows_do_not_hide_header_columns() {
        let out = ingest("BEDS,PRICE,SQUARE FEET\n3\n2\n", IngestOptions::default());
        assert!(out.report.missing_columns.is_empty());
        assert_eq!(out.report.incomplete_rows, 2);
        assert!(out.listings.is_empty());
    }

    #[test]
    fn json_columns_come_from_record_keys() {
        let text = r#"[{"PRICE": null, "SQUARE FEET": 900}, {"BEDS": 2}]"#;
        let out = ingest_reader(text.as_bytes(), SourceFormat::Json, &IngestOptions::default()).unwrap();
        assert!(out.report.missing_columns.is_empty());

        let out = ingest_reader(&b"[{\"BEDS\": 2}]"[..], SourceFormat::Json, &IngestOptions::default())
            .unwrap();
        assert_eq!(out.report.missing_columns, vec!["PRICE", "SQUARE FEET"]);

        let out = ingest_reader(&b"[]"[..], SourceFormat::Json, &IngestOptions::default()).unwrap();
        assert!(out.report.missing_columns.is_empty());
    }

    #[test]
    fn parquet_columns_come_from_the_schema() {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, Float64Array};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![Field::new("PRICE", DataType::Float64, true)]));
        let price: ArrayRef = Arc::new(Float64Array::from(vec![None, Some(250_000.0)]));
        let batch = RecordBatch::try_new(schema.clone(), vec![price]).unwrap();

        let path = std::env::temp_dir().join(format!("rusty-estate-loader-{}.parquet", std::process::id()));
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let out = ingest_file(&path, &IngestOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(out.report.format, SourceFormat::Parquet);
        assert_eq!(out.report.rows_read, 2);
        assert_eq!(out.report.missing_columns, vec!["SQUARE FEET"]);
        assert!(out.listings.is_empty());
    }

    #[test]
    fn header_only_file_is_empty_not_an_error() {
        let out = ingest(&csv(&[]), IngestOptions::legacy());
        assert!(out.listings.is_empty());
        assert!(!out.report.first_row_dropped);
    }

    #[test]
    fn json_records_flow_through_the_same_pipeline() {
        let text = r#"[
            {"PRICE": 600000, "SQUARE FEET": "2000", "BEDS": 4, "ZIP OR POSTAL CODE": "98115", "YEAR BUILT": null},
            {"PRICE": "200000", "SQUARE FEET": 1000, "BEDS": "2"}
        ]"#;
        let out = ingest_reader(text.as_bytes(), SourceFormat::Json, &IngestOptions::default()).unwrap();
        assert_eq!(out.listings.len(), 2);
        assert_eq!(out.listings[0].price, 200_000.0);
        assert_eq!(out.listings[1].zip_code, "98115");
        assert_eq!(out.listings[1].year_built, None);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = ingest_reader(&b"{\"PRICE\": 1}"[..], SourceFormat::Json, &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<IngestError>(), Some(IngestError::JsonShape)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = ingest_file(Path::new("listings.xlsx"), &IngestOptions::default()).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn ingest_file_reads_csv_from_disk() {
        let path = std::env::temp_dir().join(format!("rusty-estate-loader-{}.csv", std::process::id()));
        std::fs::write(&path, five_rows()).unwrap();
        let out = ingest_file(&path, &IngestOptions::default()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(out.report.format, SourceFormat::Csv);
        assert_eq!(out.listings.len(), 4);
    }
}
