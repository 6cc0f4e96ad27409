/// Data layer: core types, loading, location names and day selection.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → GreenhouseTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ GreenhouseTable │  Vec<Reading>, distinct locations, date range
///   └────────────────┘
///        │                      │
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │ location  │ display  │  filter   │  (date, raw location) → sorted readings
///   └──────────┘  ↔ raw    └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod location;
pub mod model;
