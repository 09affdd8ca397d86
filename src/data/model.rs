use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names of the listing export
// ---------------------------------------------------------------------------

/// Header names as they appear in the listing export.  Matched exactly.
pub mod columns {
    pub const PRICE: &str = "PRICE";
    pub const BEDS: &str = "BEDS";
    pub const BATHS: &str = "BATHS";
    pub const ZIP_CODE: &str = "ZIP OR POSTAL CODE";
    pub const SQUARE_FEET: &str = "SQUARE FEET";
    pub const LOT_SIZE: &str = "LOT SIZE";
    pub const PRICE_PER_SQUARE_FOOT: &str = "$/SQUARE FEET";
    pub const DAYS_ON_MARKET: &str = "DAYS ON MARKET";
    pub const YEAR_BUILT: &str = "YEAR BUILT";

    /// Columns without which a row cannot be placed on the plot.
    pub const REQUIRED: [&str; 2] = [PRICE, SQUARE_FEET];
}

// ---------------------------------------------------------------------------
// RawRow – one loosely-typed source row
// ---------------------------------------------------------------------------

/// Header name → cell text.  Cells missing from a short row are absent.
pub type RawRow = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Property – one normalized listing
// ---------------------------------------------------------------------------

/// A single listing after normalization.
///
/// Required numeric fields are always finite; missing or unparsable source
/// cells become `0`.  Serde names follow the export headers so a written
/// file can be read back by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "PRICE")]
    pub price: f64,
    #[serde(rename = "BEDS")]
    pub beds: i64,
    #[serde(rename = "BATHS")]
    pub baths: f64,
    #[serde(rename = "ZIP OR POSTAL CODE")]
    pub zip_code: String,
    #[serde(rename = "SQUARE FEET")]
    pub square_feet: f64,
    #[serde(rename = "LOT SIZE")]
    pub lot_size: f64,
    #[serde(rename = "$/SQUARE FEET")]
    pub price_per_square_foot: f64,
    #[serde(rename = "DAYS ON MARKET")]
    pub days_on_market: Option<i64>,
    #[serde(rename = "YEAR BUILT")]
    pub year_built: Option<i64>,
}

// ---------------------------------------------------------------------------
// Ingest configuration
// ---------------------------------------------------------------------------

/// What to do with rows whose `PRICE` or `SQUARE FEET` cell is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncompleteRows {
    /// Leave them out of the collection.
    #[default]
    Exclude,
    /// Keep them; the missing fields normalize to `0`.
    Keep,
}

/// Knobs applied between parsing and normalization.  The default keeps
/// the first row and excludes incomplete rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestOptions {
    /// Discard the first data row (exports put an MLS disclaimer there).
    pub drop_first_row: bool,
    pub incomplete_rows: IncompleteRows,
}

impl IngestOptions {
    /// Behaviour of the original calculator: always drop the first data
    /// row and keep incomplete rows.
    pub fn legacy() -> Self {
        Self {
            drop_first_row: true,
            incomplete_rows: IncompleteRows::Keep,
        }
    }
}

// ---------------------------------------------------------------------------
// IngestReport – what happened during a load
// ---------------------------------------------------------------------------

/// Source file flavour, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "CSV"),
            SourceFormat::Json => write!(f, "JSON"),
            SourceFormat::Parquet => write!(f, "Parquet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub format: SourceFormat,
    pub options: IngestOptions,
    /// Data rows successfully read from the source (header excluded).
    pub rows_read: usize,
    /// Records the parser could not decode.
    pub malformed_rows: usize,
    pub first_row_dropped: bool,
    /// Rows missing `PRICE` or `SQUARE FEET` (after the first-row drop).
    pub incomplete_rows: usize,
    pub missing_columns: Vec<String>,
    pub listings: usize,
}

impl IngestReport {
    pub fn new(format: SourceFormat, options: IngestOptions) -> Self {
        Self {
            format,
            options,
            rows_read: 0,
            malformed_rows: 0,
            first_row_dropped: false,
            incomplete_rows: 0,
            missing_columns: Vec::new(),
            listings: 0,
        }
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        format!(
            "{} listings from {} {} rows",
            self.listings, self.rows_read, self.format
        )
    }

    /// Conditions worth showing to the user.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.missing_columns.is_empty() {
            out.push(format!(
                "missing column(s): {}",
                self.missing_columns.join(", ")
            ));
        }
        if self.malformed_rows > 0 {
            out.push(format!("{} malformed row(s) skipped", self.malformed_rows));
        }
        if self.first_row_dropped {
            out.push("first data row dropped".to_string());
        }
        if self.incomplete_rows > 0 {
            let what = match self.options.incomplete_rows {
                IncompleteRows::Exclude => "excluded",
                IncompleteRows::Keep => "kept with zero values",
            };
            out.push(format!(
                "{} row(s) missing price or square feet {what}",
                self.incomplete_rows
            ));
        }
        out
    }
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub listings: Vec<Property>,
    pub report: IngestReport,
}
