//! Sales Intelligence - sales CSV ingestion, cleaning and KPI analytics.
//!
//! The core is [`data::SalesLoader`]: a delimiter-sniffing, defensively
//! cleaning CSV loader that guarantees a typed, date-sorted table to every
//! downstream consumer. [`data::TableCache`] memoizes load-and-derive by
//! path and modification time, [`data::FilterState`] provides read-only
//! views and [`stats::KpiCalculator`] aggregates them for display.

pub mod data;
pub mod stats;
