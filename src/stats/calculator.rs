//! KPI Calculator Module
//! Aggregates the cleaned sales table into dashboard metrics.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::schema::{
    CUSTOMER_COLUMN, DATE_COLUMN, PRODUCT_COLUMN, PROFIT_COLUMN, SALES_AMOUNT_COLUMN,
};

/// Headline metrics for a (possibly filtered) sales table.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub rows: usize,
    pub total_sales: f64,
    pub total_profit: f64,
    pub margin_pct: f64,
    pub avg_order_value: f64,
    pub active_customers: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Sales/profit aggregate for one value of a dimension column.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionStats {
    pub name: String,
    pub sales: f64,
    pub profit: f64,
    pub margin_pct: f64,
    pub rows: usize,
}

/// One year-month bucket of the trend rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub sales: f64,
    pub profit: f64,
}

/// Computes dashboard aggregates; per-group breakdowns run in parallel.
///
/// Every operation tolerates a partial schema the same way the loader
/// does: a missing column yields zeros or an empty result, never a panic.
pub struct KpiCalculator;

impl KpiCalculator {
    /// Headline KPI strip: totals, margin, average order value, distinct
    /// customers and the covered date span.
    pub fn summarize(df: &DataFrame) -> KpiSummary {
        let total_sales = Self::column_sum(df, SALES_AMOUNT_COLUMN);
        let total_profit = Self::column_sum(df, PROFIT_COLUMN);
        let (first_date, last_date) = Self::date_bounds(df);

        KpiSummary {
            rows: df.height(),
            total_sales,
            total_profit,
            margin_pct: Self::margin_pct(total_sales, total_profit),
            avg_order_value: Self::column_mean(df, SALES_AMOUNT_COLUMN),
            active_customers: Self::distinct_count(df, CUSTOMER_COLUMN),
            first_date,
            last_date,
        }
    }

    /// Sales/profit per distinct value of `column`, descending by sales.
    /// Groups are aggregated in parallel.
    pub fn breakdown_by(df: &DataFrame, column: &str) -> Vec<DimensionStats> {
        let groups = Self::unique_groups(df, column);

        let mut stats: Vec<DimensionStats> = groups
            .par_iter()
            .filter_map(|group| Self::group_stats(df, column, group).ok())
            .collect();

        stats.sort_by(|a, b| {
            b.sales
                .partial_cmp(&a.sales)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats
    }

    /// The `n` most profitable products, descending by profit.
    pub fn top_products_by_profit(df: &DataFrame, n: usize) -> Vec<DimensionStats> {
        let mut stats = Self::breakdown_by(df, PRODUCT_COLUMN);
        stats.sort_by(|a, b| {
            b.profit
                .partial_cmp(&a.profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats.truncate(n);
        stats
    }

    /// Chronological year-month rollup of sales and profit.
    pub fn monthly_trend(df: &DataFrame) -> Vec<MonthlyPoint> {
        let Some(dates) = Self::date_values(df) else {
            return Vec::new();
        };
        let sales = Self::float_values(df, SALES_AMOUNT_COLUMN);
        let profit = Self::float_values(df, PROFIT_COLUMN);

        let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
        for ((date, sale), gain) in dates.iter().zip(&sales).zip(&profit) {
            if let Some(date) = date {
                let bucket = buckets.entry((date.year(), date.month())).or_insert((0.0, 0.0));
                bucket.0 += sale.unwrap_or(0.0);
                bucket.1 += gain.unwrap_or(0.0);
            }
        }

        buckets
            .into_iter()
            .map(|((year, month), (sales, profit))| MonthlyPoint {
                year,
                month,
                sales,
                profit,
            })
            .collect()
    }

    /// Aggregate a single group of a dimension column.
    fn group_stats(df: &DataFrame, column: &str, group: &str) -> PolarsResult<DimensionStats> {
        let grouped = df
            .clone()
            .lazy()
            .filter(col(column).eq(lit(group)))
            .collect()?;

        let sales = Self::column_sum(&grouped, SALES_AMOUNT_COLUMN);
        let profit = Self::column_sum(&grouped, PROFIT_COLUMN);

        Ok(DimensionStats {
            name: group.to_string(),
            sales,
            profit,
            margin_pct: Self::margin_pct(sales, profit),
            rows: grouped.height(),
        })
    }

    /// Sorted distinct non-null values of a column.
    fn unique_groups(df: &DataFrame, column: &str) -> Vec<String> {
        df.column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                let mut groups: Vec<String> = series
                    .iter()
                    .filter_map(|v| {
                        if v.is_null() {
                            None
                        } else {
                            Some(v.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect();
                groups.sort();
                groups
            })
            .unwrap_or_default()
    }

    fn column_sum(df: &DataFrame, name: &str) -> f64 {
        df.column(name)
            .ok()
            .and_then(|col| col.f64().ok())
            .and_then(|ca| ca.sum())
            .unwrap_or(0.0)
    }

    fn column_mean(df: &DataFrame, name: &str) -> f64 {
        df.column(name)
            .ok()
            .and_then(|col| col.f64().ok())
            .and_then(|ca| ca.mean())
            .unwrap_or(0.0)
    }

    fn distinct_count(df: &DataFrame, name: &str) -> usize {
        df.column(name)
            .ok()
            .and_then(|col| {
                let series = col.as_materialized_series();
                let nulls = usize::from(series.null_count() > 0);
                series.n_unique().ok().map(|n| n - nulls)
            })
            .unwrap_or(0)
    }

    fn date_bounds(df: &DataFrame) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let Some(dates) = Self::date_values(df) else {
            return (None, None);
        };
        let mut first = None;
        let mut last = None;
        for date in dates.into_iter().flatten() {
            if first.map_or(true, |f| date < f) {
                first = Some(date);
            }
            if last.map_or(true, |l| date > l) {
                last = Some(date);
            }
        }
        (first, last)
    }

    /// Date column as chrono values; `None` when the column is absent or
    /// not date-typed.
    fn date_values(df: &DataFrame) -> Option<Vec<Option<NaiveDate>>> {
        let column = df.column(DATE_COLUMN).ok()?;
        let dates = column.as_materialized_series().date().ok()?;
        Some(dates.as_date_iter().collect())
    }

    fn float_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .ok()
            .and_then(|col| col.f64().ok())
            .map(|ca| ca.into_iter().collect())
            .unwrap_or_else(|| vec![None; df.height()])
    }

    fn margin_pct(sales: f64, profit: f64) -> f64 {
        if sales != 0.0 {
            profit / sales * 100.0
        } else {
            0.0
        }
    }
}
