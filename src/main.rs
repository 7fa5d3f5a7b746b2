//! Sales Intelligence - KPI report over a cleaned sales CSV.
//!
//! Headless stand-in for the dashboard shell: loads a sales file through
//! the table cache and prints the KPI report as text or JSON.

use anyhow::Result;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tracing::error;

use sales_intelligence::data::schema::{COUNTRY_COLUMN, SEGMENT_COLUMN};
use sales_intelligence::data::TableCache;
use sales_intelligence::stats::{DimensionStats, KpiCalculator, KpiSummary, MonthlyPoint};

const DEFAULT_DATA_PATH: &str = "data/sales_data.csv";
const TOP_PRODUCTS: usize = 5;

#[derive(Serialize)]
struct Report {
    source: String,
    summary: KpiSummary,
    by_country: Vec<DimensionStats>,
    by_segment: Vec<DimensionStats>,
    top_products: Vec<DimensionStats>,
    monthly: Vec<MonthlyPoint>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut as_json = false;
    let mut path: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => as_json = true,
            other => path = Some(PathBuf::from(other)),
        }
    }
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let mut cache = TableCache::new();
    let table = match cache.get_or_load(&path) {
        Ok(table) => table,
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to load sales data");
            std::process::exit(1);
        }
    };

    let report = Report {
        source: path.display().to_string(),
        summary: KpiCalculator::summarize(&table),
        by_country: KpiCalculator::breakdown_by(&table, COUNTRY_COLUMN),
        by_segment: KpiCalculator::breakdown_by(&table, SEGMENT_COLUMN),
        top_products: KpiCalculator::top_products_by_profit(&table, TOP_PRODUCTS),
        monthly: KpiCalculator::monthly_trend(&table),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    let s = &report.summary;

    println!("Sales report: {}", report.source);
    match (s.first_date, s.last_date) {
        (Some(first), Some(last)) => {
            println!("  {} rows covering {} .. {}", s.rows, first, last)
        }
        _ => println!("  {} rows", s.rows),
    }
    println!("  Total revenue     ${:.2}", s.total_sales);
    println!(
        "  Net profit        ${:.2} ({:.1}% margin)",
        s.total_profit, s.margin_pct
    );
    println!("  Avg order value   ${:.2}", s.avg_order_value);
    println!("  Active customers  {}", s.active_customers);

    print_breakdown("By country", &report.by_country);
    print_breakdown("By segment", &report.by_segment);
    print_breakdown("Top products by profit", &report.top_products);

    if !report.monthly.is_empty() {
        println!("\nMonthly trend:");
        for point in &report.monthly {
            println!(
                "  {}-{:02}  sales ${:.2}  profit ${:.2}",
                point.year, point.month, point.sales, point.profit
            );
        }
    }
}

fn print_breakdown(title: &str, stats: &[DimensionStats]) {
    if stats.is_empty() {
        return;
    }
    println!("\n{title}:");
    for entry in stats {
        println!(
            "  {:<24} sales ${:<12.2} profit ${:<12.2} margin {:.1}%",
            entry.name, entry.sales, entry.profit, entry.margin_pct
        );
    }
}
