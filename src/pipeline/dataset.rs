//! Dataset diagnostics on the raw ledger table

use polars::prelude::*;
use serde::Serialize;

use super::error::{RfmError, RfmResult};

/// Shape and null statistics of the loaded ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    /// Null count per column, most nulls first
    pub null_counts: Vec<(String, usize)>,
    /// Share of rows without a customer id, in percent
    pub anonymous_pct: f64,
    pub estimated_mb: f64,
}

/// Count nulls per column, sorted by count descending (name ascending on ties).
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Profile the raw table. `customer_column` must exist.
pub fn profile_dataset(df: &DataFrame, customer_column: &str) -> RfmResult<DatasetProfile> {
    let (rows, columns) = df.shape();
    let anonymous = df
        .column(customer_column)
        .map_err(|_| RfmError::MissingColumn {
            column: customer_column.to_string(),
            available: df.get_column_names().iter().map(|s| s.to_string()).collect(),
        })?
        .null_count();

    Ok(DatasetProfile {
        rows,
        columns,
        null_counts: null_counts(df),
        anonymous_pct: if rows > 0 { anonymous as f64 / rows as f64 * 100.0 } else { 0.0 },
        estimated_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dataset() {
        let df = df! {
            "CustomerID" => [Some(1i64), None, None, Some(4)],
            "Description" => [Some("a"), Some("b"), None, Some("d")],
            "Quantity" => [1i64, 2, 3, 4],
        }
        .unwrap();

        let profile = profile_dataset(&df, "CustomerID").unwrap();
        assert_eq!(profile.rows, 4);
        assert_eq!(profile.columns, 3);
        assert!((profile.anonymous_pct - 50.0).abs() < 1e-9);
        assert_eq!(profile.null_counts[0], ("CustomerID".to_string(), 2));
        assert_eq!(profile.null_counts[1], ("Description".to_string(), 1));
        assert_eq!(profile.null_counts[2], ("Quantity".to_string(), 0));
    }

    #[test]
    fn test_missing_customer_column() {
        let df = df! { "Quantity" => [1i64] }.unwrap();
        assert!(profile_dataset(&df, "CustomerID").is_err());
    }

    #[test]
    fn test_empty_table() {
        let df = df! { "CustomerID" => Vec::<i64>::new() }.unwrap();
        let profile = profile_dataset(&df, "CustomerID").unwrap();
        assert_eq!(profile.rows, 0);
        assert_eq!(profile.anonymous_pct, 0.0);
    }
}
