/// Data layer: listing table, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ListingTable (schema checked, numbers coerced)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ListingTable  │  Vec<Listing>, known-field index, category values
///   └──────────────┘
///        │  FilterCriteria
///        ▼
///   ┌──────────┐      ┌───────────┐
///   │  filter   │ ───▶ │ aggregate  │  counts, summaries, group-bys
///   └──────────┘      └───────────┘
///        │                  │
///        ▼                  ▼
///   ┌──────────────────────────┐
///   │ ResultView (rows + aggs)  │ ───▶ export (CSV of the same rows)
///   └──────────────────────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
