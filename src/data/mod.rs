/// Data layer: table types, loading, writing and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MetadataTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ MetadataTable  │  Vec<Record>, column index
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  eligibility column + FilterMode → row positions
///   └──────────┘
///        │   (split::Splitter labels the positions)
///        ▼
///   ┌──────────┐
///   │  writer   │  MetadataTable → .csv / .json / .parquet
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
