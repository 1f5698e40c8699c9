/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv (dialog or drag-and-drop)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + check schema → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region / income group / year → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by key, mean per indicator
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  render(dataset, selection) → DashboardView
///   └──────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
