/// Dataset store: core types, loading, and the immutable table.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file, normalise headers → Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Record>, distinct values per column
///   └──────────┘
///        │
///        ▼
///   query::{filter, project, aggregate}
/// ```

pub mod loader;
pub mod model;
pub mod table;
