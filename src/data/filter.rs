//! Read-only view filters over the cleaned sales table.
//! Date-range and membership filters, composed lazily.

use chrono::NaiveDate;
use polars::prelude::*;

use super::schema::{COUNTRY_COLUMN, DATE_COLUMN, SEGMENT_COLUMN};

/// Optional filters applied to a loaded table for display.
///
/// `None` means "no constraint"; an empty membership list is a real
/// constraint that excludes every row. An empty result is a valid table,
/// distinct from a load failure.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub countries: Option<Vec<String>>,
    pub segments: Option<Vec<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with_countries<I: IntoIterator<Item = String>>(mut self, countries: I) -> Self {
        self.countries = Some(countries.into_iter().collect());
        self
    }

    pub fn with_segments<I: IntoIterator<Item = String>>(mut self, segments: I) -> Self {
        self.segments = Some(segments.into_iter().collect());
        self
    }

    /// Apply the configured filters and collect the view.
    ///
    /// Filters naming a column the table does not have are skipped, the
    /// same partial-schema tolerance the loader applies.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let mut frame = df.clone().lazy();

        if let Some((start, end)) = self.date_range {
            if df.column(DATE_COLUMN).is_ok() {
                frame = frame.filter(
                    col(DATE_COLUMN)
                        .gt_eq(lit(start))
                        .and(col(DATE_COLUMN).lt_eq(lit(end))),
                );
            }
        }

        if let Some(countries) = &self.countries {
            if df.column(COUNTRY_COLUMN).is_ok() {
                frame = frame.filter(Self::membership(COUNTRY_COLUMN, countries));
            }
        }

        if let Some(segments) = &self.segments {
            if df.column(SEGMENT_COLUMN).is_ok() {
                frame = frame.filter(Self::membership(SEGMENT_COLUMN, segments));
            }
        }

        frame.collect()
    }

    /// True when no filter is configured.
    pub fn is_unconstrained(&self) -> bool {
        self.date_range.is_none() && self.countries.is_none() && self.segments.is_none()
    }

    fn membership(column: &str, values: &[String]) -> Expr {
        col(column).is_in(lit(Series::new(column.into(), values.to_vec())))
    }
}
