//! Stats module - KPI aggregation over the cleaned sales table

mod calculator;

pub use calculator::{DimensionStats, KpiCalculator, KpiSummary, MonthlyPoint};
