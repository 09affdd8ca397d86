use super::model::Property;

// ---------------------------------------------------------------------------
// Summary statistics over a listing collection
// ---------------------------------------------------------------------------

/// Display-ready summary; every value has two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub average_price: String,
    pub median_price: String,
    pub average_price_per_sq_ft: String,
}

impl Default for Statistics {
    fn default() -> Self {
        calculate_statistics(&[])
    }
}

/// Compute average price, median price and average $/sqft.
///
/// The median is the element at `count / 2` of the ascending prices, so an
/// even-sized collection reports the upper of its two middle values.  An
/// empty collection yields `"0.00"` everywhere.
pub fn calculate_statistics(listings: &[Property]) -> Statistics {
    let count = listings.len();
    if count == 0 {
        return Statistics {
            count,
            average_price: money(0.0),
            median_price: money(0.0),
            average_price_per_sq_ft: money(0.0),
        };
    }

    let mut prices: Vec<f64> = listings.iter().map(|p| p.price).collect();
    let total: f64 = prices.iter().sum();
    let ppsf_total: f64 = listings.iter().map(|p| p.price_per_square_foot).sum();

    prices.sort_by(f64::total_cmp);
    let median = prices[count / 2];

    Statistics {
        count,
        average_price: money(total / count as f64),
        median_price: money(median),
        average_price_per_sq_ft: money(ppsf_total / count as f64),
    }
}

fn money(v: f64) -> String {
    // -0.0 would print as "-0.00"
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:.2}")
}
