/// Data layer: cell model, dataset store, transformations, statistics, file IO.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table { headers, rows }
///   └──────────┘
///        │ set_data
///        ▼
///   ┌──────────────┐   record    ┌─────────┐
///   │ DatasetStore  │ ─────────► │ history  │  undo / redo snapshots
///   └──────────────┘            └─────────┘
///     │    ▲    │ notify
///     │    │    ▼
///     │    │  ┌────────┐
///     │    │  │ notify  │  listeners (UI panels)
///     │    │  └────────┘
///     │  ┌───────────┐
///     │  │ transform  │  filter / sort / aggregate
///     │  └───────────┘
///     ▼
///   ┌────────┐   ┌────────┐
///   │  stats  │   │ export  │
///   └────────┘   └────────┘
/// ```

pub mod export;
pub mod history;
pub mod loader;
pub mod model;
pub mod notify;
pub mod stats;
pub mod store;
pub mod transform;
