use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const DISCLAIMER: &str =
    "In accordance with local MLS rules, some MLS listings are not included in the download";

const HEADERS: [&str; 12] = [
    "SALE TYPE",
    "PROPERTY TYPE",
    "CITY",
    "PRICE",
    "BEDS",
    "BATHS",
    "ZIP OR POSTAL CODE",
    "SQUARE FEET",
    "LOT SIZE",
    "$/SQUARE FEET",
    "DAYS ON MARKET",
    "YEAR BUILT",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One synthetic listing.  `None` cells are written empty.
struct Listing {
    property_type: &'static str,
    city: &'static str,
    zip: &'static str,
    price: Option<f64>,
    beds: i64,
    baths: f64,
    square_feet: Option<f64>,
    lot_size: Option<f64>,
    days_on_market: Option<i64>,
    year_built: Option<i64>,
}

impl Listing {
    fn with_missing_price(mut self, missing: bool) -> Self {
        if missing {
            self.price = None;
        }
        self
    }

    fn price_per_square_foot(&self) -> Option<f64> {
        match (self.price, self.square_feet) {
            (Some(p), Some(s)) if s > 0.0 => Some((p / s).round()),
            _ => None,
        }
    }

    fn csv_record(&self) -> Vec<String> {
        let num = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_default();
        let int = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        vec![
            "MLS Listing".to_string(),
            self.property_type.to_string(),
            self.city.to_string(),
            num(self.price),
            self.beds.to_string(),
            self.baths.to_string(),
            self.zip.to_string(),
            num(self.square_feet),
            num(self.lot_size),
            num(self.price_per_square_foot()),
            int(self.days_on_market),
            int(self.year_built),
        ]
    }
}

fn generate_listings(rng: &mut SimpleRng, n: usize) -> Vec<Listing> {
    // (city, zip, base $/sqft)
    let areas = [
        ("Seattle", "98103", 520.0),
        ("Seattle", "98105", 610.0),
        ("Seattle", "98118", 430.0),
        ("Shoreline", "98133", 390.0),
        ("Renton", "98056", 340.0),
    ];
    let types = ["Single Family Residential", "Townhouse", "Condo/Co-op"];

    (0..n)
        .map(|i| {
            let &(city, zip, base_ppsf) = rng.pick(&areas);
            let property_type = *rng.pick(&types);
            let beds = 1 + (rng.next_u64() % 5) as i64;
            let sqft = (450.0 + beds as f64 * 420.0 + rng.range(-250.0, 350.0)).round();
            let ppsf = base_ppsf * rng.range(0.8, 1.25);
            let price = (sqft * ppsf / 1000.0).round() * 1000.0;

            Listing {
                property_type,
                city,
                zip,
                price: Some(price),
                beds,
                baths: ((1.0 + (beds as f64 - 1.0) * 0.5 + rng.range(0.0, 1.0)) * 2.0).round() / 2.0,
                // every 13th listing lacks square footage, every 29th a price
                square_feet: (i % 13 != 7).then_some(sqft),
                lot_size: (property_type != "Condo/Co-op").then(|| rng.range(1500.0, 9000.0).round()),
                days_on_market: (i % 5 != 0).then(|| (rng.next_u64() % 120) as i64),
                year_built: (i % 11 != 3).then(|| 1900 + (rng.next_u64() % 124) as i64),
            }
            .with_missing_price(i % 29 == 11)
        })
        .collect()
}

fn write_csv(path: &str, listings: &[Listing]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(HEADERS)?;

    // listing exports carry a disclaimer as their first data row
    let mut disclaimer = vec![String::new(); HEADERS.len()];
    disclaimer[0] = DISCLAIMER.to_string();
    wtr.write_record(&disclaimer)?;

    for listing in listings {
        wtr.write_record(listing.csv_record())?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(path: &str, listings: &[Listing]) -> anyhow::Result<()> {
    let strings = |f: fn(&Listing) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(listings.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&Listing) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(listings.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Listing) -> Option<i64>| -> ArrayRef {
        Arc::new(Int64Array::from(listings.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("PROPERTY TYPE", DataType::Utf8, false),
        Field::new("CITY", DataType::Utf8, false),
        Field::new("ZIP OR POSTAL CODE", DataType::Utf8, false),
        Field::new("PRICE", DataType::Float64, true),
        Field::new("BEDS", DataType::Int64, true),
        Field::new("BATHS", DataType::Float64, true),
        Field::new("SQUARE FEET", DataType::Float64, true),
        Field::new("LOT SIZE", DataType::Float64, true),
        Field::new("$/SQUARE FEET", DataType::Float64, true),
        Field::new("DAYS ON MARKET", DataType::Int64, true),
        Field::new("YEAR BUILT", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|l| l.property_type),
            strings(|l| l.city),
            strings(|l| l.zip),
            floats(|l| l.price),
            ints(|l| Some(l.beds)),
            floats(|l| Some(l.baths)),
            floats(|l| l.square_feet),
            floats(|l| l.lot_size),
            floats(Listing::price_per_square_foot),
            ints(|l| l.days_on_market),
            ints(|l| l.year_built),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let listings = generate_listings(&mut rng, 120);

    let csv_path = "sample_listings.csv";
    write_csv(csv_path, &listings)?;
    println!("Wrote {} listings (plus disclaimer row) to {csv_path}", listings.len());

    let parquet_path = "sample_listings.parquet";
    write_parquet(parquet_path, &listings)?;
    println!("Wrote {} listings to {parquet_path}", listings.len());

    Ok(())
}
