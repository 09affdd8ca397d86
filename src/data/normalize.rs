use super::model::{columns, Property, RawRow};

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a decimal cell, falling back to `default` when the cell is
/// missing, blank, unparsable or not finite.
pub fn parse_number(value: Option<&str>, default: f64) -> f64 {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Parse an integer cell.  A finite decimal is truncated toward zero, so
/// `"2.0"` and `"2.5"` both give `2`.
pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    try_parse_int(value).unwrap_or(default)
}

/// Like [`parse_int`] but yields `None` instead of a default.
pub fn parse_optional_int(value: Option<&str>) -> Option<i64> {
    try_parse_int(value)
}

fn try_parse_int(value: Option<&str>) -> Option<i64> {
    let s = value.map(str::trim).filter(|s| !s.is_empty())?;
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
}

/// Whether a cell counts as missing: absent from the row or blank.
pub fn is_missing(row: &RawRow, column: &str) -> bool {
    row.get(column).map_or(true, |v| v.trim().is_empty())
}

/// Raw `PRICE / SQUARE FEET` ratio used to order rows before
/// normalization.
///
/// Cells are coerced loosely: an absent cell is NaN, a blank cell is `0`,
/// anything else is its parsed value or NaN.  Zero square footage yields an
/// infinite ratio.
pub fn raw_ratio(row: &RawRow) -> f64 {
    let coerce = |column: &str| match row.get(column) {
        None => f64::NAN,
        Some(v) if v.trim().is_empty() => 0.0,
        Some(v) => v.trim().parse::<f64>().unwrap_or(f64::NAN),
    };
    coerce(columns::PRICE) / coerce(columns::SQUARE_FEET)
}

// ---------------------------------------------------------------------------
// Row → Property
// ---------------------------------------------------------------------------

/// Map one raw row into a [`Property`].  Never fails.
pub fn normalize_row(row: &RawRow) -> Property {
    let cell = |column: &str| row.get(column).map(String::as_str);

    Property {
        price: parse_number(cell(columns::PRICE), 0.0),
        beds: parse_int(cell(columns::BEDS), 0),
        baths: parse_number(cell(columns::BATHS), 0.0),
        zip_code: cell(columns::ZIP_CODE).unwrap_or_default().to_string(),
        square_feet: parse_number(cell(columns::SQUARE_FEET), 0.0),
        lot_size: parse_number(cell(columns::LOT_SIZE), 0.0),
        price_per_square_foot: parse_number(cell(columns::PRICE_PER_SQUARE_FOOT), 0.0),
        days_on_market: parse_optional_int(cell(columns::DAYS_ON_MARKET)),
        year_built: parse_optional_int(cell(columns::YEAR_BUILT)),
    }
}
