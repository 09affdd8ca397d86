//! Data layer: core types, loading, filtering and statistics.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → raw rows, drop/exclude, sort by $/sqft
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  RawRow → Property (numeric coercion, defaults)
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  bedrooms / ZIP predicates → fresh Vec<Property>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats    │  average / median price, average $/sqft
//!   └──────────┘
//! ```
//!
//! `worker` runs the loader off the UI thread; `export` writes a filtered
//! collection back to CSV.

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod stats;
pub mod worker;
