/// Data layer: core types, loading, cleaning and reshaping.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Series (date ascending)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  2.5 / 97.5 percentile bounds → CleanedSeries
///   └──────────┘
///        │                         │
///        ▼                         ▼
///   ┌───────────┐            ┌───────────┐
///   │ aggregate  │ monthly    │ aggregate  │ annotate → flat view
///   └───────────┘ means      └───────────┘ (box plots)
///        │
///        ▼
///   ┌──────────┐
///   │  pivot    │  year × month matrix
///   └──────────┘
/// ```
///
/// `pipeline` threads one dataset through every stage.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod pivot;
pub mod stats;
