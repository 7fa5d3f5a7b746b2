//! Declared column schema for the sales table.
//! Every expected column is optional except `Date`; a cleaning rule is
//! applied only when the column is actually present in the source file.

/// How a column is cleaned when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Coerced to text, leading/trailing whitespace stripped.
    Text,
    /// Whitespace/currency stripped, decimal comma normalized, parsed as f64.
    Numeric,
    /// Parsed day-first into a calendar date.
    Date,
}

/// One expected column and its cleaning rule.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// The single column a row cannot live without; rows with an unparsable
/// date are dropped and a file without this column fails the load.
pub const DATE_COLUMN: &str = "Date";

pub const COUNTRY_COLUMN: &str = "Country";
pub const SEGMENT_COLUMN: &str = "Segment";
pub const PRODUCT_COLUMN: &str = "Product_Name";
pub const CUSTOMER_COLUMN: &str = "Customer_ID";
pub const UNITS_COLUMN: &str = "Units Sold";
pub const SALES_AMOUNT_COLUMN: &str = "Sales";
pub const PROFIT_COLUMN: &str = "Profit";

/// Derived margin column attached after a successful load.
pub const MARGIN_COLUMN: &str = "Margin_Perc";

/// Expected sales columns. Extra columns in a source file pass through
/// untouched; missing ones are skipped silently.
pub const SALES_COLUMNS: &[ColumnRule] = &[
    ColumnRule { name: DATE_COLUMN, kind: ColumnKind::Date },
    ColumnRule { name: COUNTRY_COLUMN, kind: ColumnKind::Text },
    ColumnRule { name: SEGMENT_COLUMN, kind: ColumnKind::Text },
    ColumnRule { name: PRODUCT_COLUMN, kind: ColumnKind::Text },
    ColumnRule { name: CUSTOMER_COLUMN, kind: ColumnKind::Text },
    ColumnRule { name: UNITS_COLUMN, kind: ColumnKind::Numeric },
    ColumnRule { name: SALES_AMOUNT_COLUMN, kind: ColumnKind::Numeric },
    ColumnRule { name: PROFIT_COLUMN, kind: ColumnKind::Numeric },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_column_is_declared_as_date() {
        let rule = SALES_COLUMNS
            .iter()
            .find(|r| r.name == DATE_COLUMN)
            .unwrap();
        assert_eq!(rule.kind, ColumnKind::Date);
    }

    #[test]
    fn schema_has_no_duplicate_names() {
        let mut names: Vec<&str> = SALES_COLUMNS.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SALES_COLUMNS.len());
    }
}
