/// Data layer: core types, loading, filtering, aggregation, prediction.
///
/// Architecture:
/// ```text
///  listings.csv                price_model.json
///        │                           │
///        ▼                           ▼
///   ┌──────────┐               ┌──────────┐
///   │  loader   │              │  predict  │  artifact → RegressionModel
///   └──────────┘               └──────────┘
///        │                           ▲
///        ▼                           │ InferenceRecord (from the form)
///   ┌────────────────┐               │
///   │ ListingDataset  │──────────────┘
///   └────────────────┘
///        │
///        ├──► filter     apply predicate conjunction → filtered indices
///        │
///        └──► aggregate  group by a categorical column → per-group stats
/// ```
///
/// Everything here is pure given its inputs; the dataset and model are
/// loaded once and never mutated afterwards.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod predict;
