//! Sales Data Loader Module
//! Delimiter-sniffing CSV ingestion with defensive cleaning using Polars.

use polars::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::clean;
use super::schema::{
    ColumnKind, DATE_COLUMN, MARGIN_COLUMN, PROFIT_COLUMN, SALES_AMOUNT_COLUMN, SALES_COLUMNS,
};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Sales data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read sales data: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse sales data: {0}")]
    Parse(#[from] PolarsError),
    #[error("Source file has no 'Date' column")]
    MissingDateColumn,
    #[error("No row has a parsable 'Date' value")]
    Empty,
}

/// Candidate field delimiters, most common first.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Bytes sampled from the head of the file for delimiter detection.
const SNIFF_SAMPLE_BYTES: usize = 4096;

/// Lines examined when scoring delimiter candidates.
const SNIFF_SAMPLE_LINES: usize = 10;

/// Loads a delimited sales file into a clean, typed, date-sorted DataFrame.
///
/// Pure with respect to the filesystem: the same unmodified file always
/// yields the same table, so callers are free to memoize by path.
pub struct SalesLoader;

impl SalesLoader {
    /// Load and clean a sales file.
    ///
    /// The delimiter is inferred from the file head, every column is read
    /// as text and cleaned according to the declared schema, rows without
    /// a parsable date are dropped and the result is stably sorted by date.
    pub fn load(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let delimiter = Self::sniff_delimiter(path)?;
        debug!(
            delimiter = %char::from(delimiter),
            path = %path.display(),
            "detected field delimiter"
        );

        let path_str = path.to_string_lossy();
        let mut df = LazyCsvReader::new(path_str.as_ref())
            .with_separator(delimiter)
            // Infer nothing: every column comes in as text and the
            // cleaning rules decide the real types.
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::trim_headers(&mut df)?;

        if df.column(DATE_COLUMN).is_err() {
            return Err(LoaderError::MissingDateColumn);
        }

        for rule in SALES_COLUMNS {
            // Partial schemas are tolerated: absent columns are skipped.
            if df.column(rule.name).is_err() {
                continue;
            }

            let cleaned = match rule.kind {
                ColumnKind::Text => Self::trim_text_column(&df, rule.name)?,
                ColumnKind::Numeric => Self::normalize_numeric_column(&df, rule.name)?,
                ColumnKind::Date => Self::parse_date_column(&df, rule.name)?,
            };
            df.with_column(cleaned)?;
        }

        let total_rows = df.height();
        let df = df
            .lazy()
            .filter(col(DATE_COLUMN).is_not_null())
            .collect()?;

        let dropped = total_rows - df.height();
        if dropped > 0 {
            warn!(dropped, "dropped rows without a parsable date");
        }
        if df.height() == 0 {
            return Err(LoaderError::Empty);
        }

        let df = df.sort(
            [DATE_COLUMN],
            SortMultipleOptions::default().with_maintain_order(true),
        )?;

        debug!(rows = df.height(), "sales table loaded");
        Ok(df)
    }

    /// Attach the derived margin column (`Profit / Sales * 100`).
    /// Leaves the frame unchanged when either source column is absent.
    pub fn derive_margin(df: &DataFrame) -> PolarsResult<DataFrame> {
        if df.column(PROFIT_COLUMN).is_err() || df.column(SALES_AMOUNT_COLUMN).is_err() {
            return Ok(df.clone());
        }

        df.clone()
            .lazy()
            .with_column(
                (col(PROFIT_COLUMN) / col(SALES_AMOUNT_COLUMN) * lit(100.0))
                    .alias(MARGIN_COLUMN),
            )
            .collect()
    }

    /// Detect the field delimiter from a text sample.
    ///
    /// Each candidate is scored by how consistently it splits the leading
    /// lines: high mean count per line, low spread. A file with a single
    /// column scores zero everywhere and falls back to comma.
    pub fn detect_delimiter(sample: &str) -> u8 {
        let lines: Vec<&str> = sample.lines().take(SNIFF_SAMPLE_LINES).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &DELIMITER_CANDIDATES {
            let counts: Vec<usize> = lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            if counts.is_empty() {
                continue;
            }

            let mean = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
            let variance = counts
                .iter()
                .map(|&c| (c as f32 - mean).powi(2))
                .sum::<f32>()
                / counts.len() as f32;

            let score = mean / (1.0 + variance.sqrt());
            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }

    /// Read a sample from the file head and sniff the delimiter.
    fn sniff_delimiter(path: &Path) -> Result<u8, LoaderError> {
        let mut file = File::open(path)?;
        let mut buffer = vec![0u8; SNIFF_SAMPLE_BYTES];
        let read = file.read(&mut buffer)?;
        buffer.truncate(read);

        let sample = String::from_utf8_lossy(&buffer);
        Ok(Self::detect_delimiter(&sample))
    }

    /// Strip leading/trailing whitespace from every column name.
    fn trim_headers(df: &mut DataFrame) -> PolarsResult<()> {
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(trimmed)
    }

    /// Coerce a column to text and strip surrounding whitespace per value.
    fn trim_text_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
        let coerced = df.column(name)?.cast(&DataType::String)?;
        let values: Vec<Option<String>> = coerced
            .str()?
            .into_iter()
            .map(|value| value.map(|s| s.trim().to_string()))
            .collect();
        Ok(Column::new(name.into(), values))
    }

    /// Clean locale-ambiguous numeric text into Float64; cells that still
    /// fail to parse become null rather than failing the load.
    fn normalize_numeric_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
        let coerced = df.column(name)?.cast(&DataType::String)?;
        let values: Vec<Option<f64>> = coerced
            .str()?
            .into_iter()
            .map(|value| value.and_then(clean::parse_number))
            .collect();
        Ok(Column::new(name.into(), values))
    }

    /// Parse a text column into calendar dates with day-first semantics.
    fn parse_date_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
        let coerced = df.column(name)?.cast(&DataType::String)?;
        let values: Vec<Option<chrono::NaiveDate>> = coerced
            .str()?
            .into_iter()
            .map(|value| value.and_then(clean::parse_date))
            .collect();
        Ok(Column::new(name.into(), values))
    }
}
