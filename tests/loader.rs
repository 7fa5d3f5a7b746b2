//! Integration tests for the sales CSV loader and table cache.

use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

use sales_intelligence::data::schema::MARGIN_COLUMN;
use sales_intelligence::data::{LoaderError, SalesLoader, TableCache};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn text_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn float_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

fn date_values(df: &DataFrame) -> Vec<NaiveDate> {
    df.column("Date")
        .unwrap()
        .as_materialized_series()
        .date()
        .unwrap()
        .as_date_iter()
        .flatten()
        .collect()
}

#[test]
fn end_to_end_scenario() {
    let file = write_csv(
        "Date;Country;Sales\n\
         01.01.2026;USA ;$100,50\n\
         invaliddate;France;200\n\
         02.01.2026; USA;$50",
    );

    let df = SalesLoader::load(file.path()).unwrap();

    // The invalid-date row is dropped, everything else survives cleaned.
    assert_eq!(df.height(), 2);
    assert_eq!(
        text_values(&df, "Country"),
        vec![Some("USA".to_string()), Some("USA".to_string())]
    );
    assert_eq!(float_values(&df, "Sales"), vec![Some(100.5), Some(50.0)]);
    assert_eq!(date_values(&df), vec![date(2026, 1, 1), date(2026, 1, 2)]);
}

#[test]
fn delimiter_invariance() {
    let rows = [
        ["Date", "Country", "Sales"],
        ["01.01.2026", "USA", "100.5"],
        ["02.01.2026", "France", "200"],
    ];

    let frames: Vec<DataFrame> = [",", ";", "\t"]
        .iter()
        .map(|&delim| {
            let content = rows
                .iter()
                .map(|row| row.join(delim))
                .collect::<Vec<_>>()
                .join("\n");
            let file = write_csv(&content);
            SalesLoader::load(file.path()).unwrap()
        })
        .collect();

    assert!(frames[0].equals(&frames[1]));
    assert!(frames[0].equals(&frames[2]));
}

#[test]
fn load_is_idempotent() {
    let file = write_csv(
        "Date,Country,Sales\n\
         02.01.2026,France,200\n\
         01.01.2026,USA,100.5",
    );

    let first = SalesLoader::load(file.path()).unwrap();
    let second = SalesLoader::load(file.path()).unwrap();
    assert!(first.equals(&second));
}

#[test]
fn whitespace_collapses_to_one_group() {
    let file = write_csv(
        "Date,Country,Sales\n\
         01.01.2026,  USA ,100\n\
         02.01.2026,USA,200",
    );

    let df = SalesLoader::load(file.path()).unwrap();
    let countries = text_values(&df, "Country");
    assert!(countries.iter().all(|c| c.as_deref() == Some("USA")));
}

#[test]
fn numeric_normalization_variants() {
    let file = write_csv(
        "Date;Country;Sales\n\
         01.01.2026;USA;$1,234.56\n\
         02.01.2026;USA;1 234,56\n\
         03.01.2026;USA;abc",
    );

    let df = SalesLoader::load(file.path()).unwrap();

    // The unparsable cell becomes missing but the row is retained.
    assert_eq!(df.height(), 3);
    assert_eq!(
        float_values(&df, "Sales"),
        vec![Some(1234.56), Some(1234.56), None]
    );
}

#[test]
fn dates_parse_day_first() {
    let file = write_csv("Date,Sales\n03.04.2026,100");
    let df = SalesLoader::load(file.path()).unwrap();
    assert_eq!(date_values(&df), vec![date(2026, 4, 3)]);
}

#[test]
fn rows_sort_ascending_and_ties_keep_input_order() {
    let file = write_csv(
        "Date,Country,Sales\n\
         02.01.2026,Brazil,3\n\
         01.01.2026,USA,1\n\
         01.01.2026,France,2",
    );

    let df = SalesLoader::load(file.path()).unwrap();

    assert_eq!(
        date_values(&df),
        vec![date(2026, 1, 1), date(2026, 1, 1), date(2026, 1, 2)]
    );
    // Stable sort: USA appeared before France in the input.
    assert_eq!(
        text_values(&df, "Country"),
        vec![
            Some("USA".to_string()),
            Some("France".to_string()),
            Some("Brazil".to_string())
        ]
    );
}

#[test]
fn headers_are_trimmed() {
    let file = write_csv(" Date , Sales \n01.01.2026,100");
    let df = SalesLoader::load(file.path()).unwrap();

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["Date".to_string(), "Sales".to_string()]);
}

#[test]
fn missing_file_is_a_typed_failure() {
    let result = SalesLoader::load(std::path::Path::new("/nonexistent/sales.csv"));
    assert!(matches!(result, Err(LoaderError::NotFound(_))));
}

#[test]
fn missing_date_column_fails_loudly() {
    let file = write_csv("Country,Sales\nUSA,100");
    let result = SalesLoader::load(file.path());
    assert!(matches!(result, Err(LoaderError::MissingDateColumn)));
}

#[test]
fn all_dates_invalid_yields_empty_failure() {
    let file = write_csv("Date,Sales\nnope,100\nalso nope,200");
    let result = SalesLoader::load(file.path());
    assert!(matches!(result, Err(LoaderError::Empty)));
}

#[test]
fn partial_schema_is_tolerated() {
    let file = write_csv("Date,Custom_Metric\n01.01.2026,whatever");
    let df = SalesLoader::load(file.path()).unwrap();

    assert_eq!(df.height(), 1);
    // Undeclared columns pass through untouched.
    assert_eq!(
        text_values(&df, "Custom_Metric"),
        vec![Some("whatever".to_string())]
    );
}

#[test]
fn margin_is_derived_from_profit_and_sales() {
    let file = write_csv(
        "Date,Sales,Profit\n\
         01.01.2026,100,25\n\
         02.01.2026,200,30",
    );

    let df = SalesLoader::load(file.path()).unwrap();
    let df = SalesLoader::derive_margin(&df).unwrap();

    assert_eq!(
        float_values(&df, MARGIN_COLUMN),
        vec![Some(25.0), Some(15.0)]
    );
}

#[test]
fn margin_derivation_skips_partial_schema() {
    let file = write_csv("Date,Sales\n01.01.2026,100");
    let df = SalesLoader::load(file.path()).unwrap();
    let df = SalesLoader::derive_margin(&df).unwrap();
    assert!(df.column(MARGIN_COLUMN).is_err());
}

#[test]
fn cache_serves_identical_table() {
    let file = write_csv("Date,Sales,Profit\n01.01.2026,100,25");
    let mut cache = TableCache::new();

    let first = cache.get_or_load(file.path()).unwrap();
    let second = cache.get_or_load(file.path()).unwrap();

    assert!(first.equals(&second));
    assert_eq!(cache.len(), 1);
    // The cached table already carries the derived margin.
    assert_eq!(float_values(&first, MARGIN_COLUMN), vec![Some(25.0)]);
}

#[test]
fn cache_reloads_when_file_changes() {
    let file = write_csv("Date,Sales\n01.01.2026,100");
    let mut cache = TableCache::new();

    let before = cache.get_or_load(file.path()).unwrap();
    assert_eq!(before.height(), 1);

    // Coarse mtime granularity on some filesystems.
    std::thread::sleep(std::time::Duration::from_millis(1100));
    std::fs::write(
        file.path(),
        "Date,Sales\n01.01.2026,100\n02.01.2026,200",
    )
    .unwrap();

    let after = cache.get_or_load(file.path()).unwrap();
    assert_eq!(after.height(), 2);
}

#[test]
fn cache_propagates_load_failures() {
    let mut cache = TableCache::new();
    let result = cache.get_or_load(std::path::Path::new("/nonexistent/sales.csv"));
    assert!(matches!(result, Err(LoaderError::NotFound(_))));
    assert!(cache.is_empty());
}
