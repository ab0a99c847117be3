//! Ledger loading for CSV, Parquet and XLSX files
//!
//! Files are read into a polars `DataFrame` first, then converted row by row
//! into typed [`Transaction`]s. CSV and XLSX are read as text so prices parse
//! straight into exact decimals; Parquet columns keep their stored types.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use polars::prelude::*;
use rust_decimal::Decimal;

use super::error::{RfmError, RfmResult};
use super::transaction::Transaction;

/// Timestamp layouts tried in order when no explicit format is given.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Names of the ledger columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerColumns {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub customer_id: String,
    pub country: String,
    pub invoice_date: String,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            invoice_no: "InvoiceNo".to_string(),
            stock_code: "StockCode".to_string(),
            description: "Description".to_string(),
            quantity: "Quantity".to_string(),
            unit_price: "UnitPrice".to_string(),
            customer_id: "CustomerID".to_string(),
            country: "Country".to_string(),
            invoice_date: "InvoiceDate".to_string(),
        }
    }
}

impl LedgerColumns {
    pub fn all(&self) -> [&str; 8] {
        [
            &self.invoice_no,
            &self.stock_code,
            &self.description,
            &self.quantity,
            &self.unit_price,
            &self.customer_id,
            &self.country,
            &self.invoice_date,
        ]
    }
}

/// Load a ledger file into a DataFrame, choosing the reader by extension.
///
/// `sheet` selects the worksheet for XLSX files (first sheet by default).
pub fn load_ledger(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load CSV file: {}", path.display())),
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display())),
        "xlsx" | "xlsm" => load_xlsx(path, sheet),
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet, xlsx",
            extension
        ),
    }
}

/// Read one worksheet into an all-text DataFrame. The first row is the header.
fn load_xlsx(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Workbook {} has no worksheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow::anyhow!("Worksheet '{}' has no header row", sheet_name))?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(cell_text));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, column)| Column::new(name.as_str().into(), column))
        .collect();

    DataFrame::new(columns).with_context(|| format!("Worksheet '{}' has invalid headers", sheet_name))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
    }
}

/// Convert a ledger DataFrame into typed transactions.
///
/// Every required column must exist. Description and customer id may be
/// empty; any other empty or unparseable cell is an error naming its row.
pub fn extract_transactions(
    df: &DataFrame,
    columns: &LedgerColumns,
    timestamp_format: Option<&str>,
) -> RfmResult<Vec<Transaction>> {
    let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for name in columns.all() {
        if !available.iter().any(|c| c == name) {
            return Err(RfmError::MissingColumn {
                column: name.to_string(),
                available,
            });
        }
    }

    let invoice_no = text_values(df, &columns.invoice_no)?;
    let stock_code = text_values(df, &columns.stock_code)?;
    let description = text_values(df, &columns.description)?;
    let quantity = integer_values(df, &columns.quantity)?;
    let unit_price = decimal_values(df, &columns.unit_price)?;
    let customer_id = integer_values(df, &columns.customer_id)?;
    let country = text_values(df, &columns.country)?;
    let invoice_date = timestamp_values(df, &columns.invoice_date, timestamp_format)?;

    let mut transactions = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        transactions.push(Transaction {
            invoice_no: required_text(&invoice_no[row], &columns.invoice_no, row)?,
            stock_code: required_text(&stock_code[row], &columns.stock_code, row)?,
            description: description[row].clone().filter(|s| !s.is_empty()),
            quantity: required(&quantity[row], &columns.quantity, row)?,
            unit_price: required(&unit_price[row], &columns.unit_price, row)?,
            customer_id: customer_id[row],
            country: required_text(&country[row], &columns.country, row)?,
            invoice_date: required(&invoice_date[row], &columns.invoice_date, row)?,
        });
    }

    Ok(transactions)
}

fn required_text(value: &Option<String>, column: &str, row: usize) -> RfmResult<String> {
    match value.as_deref() {
        None | Some("") => Err(RfmError::missing(column, row)),
        Some(s) => Ok(s.to_string()),
    }
}

fn required<T: Clone>(value: &Option<T>, column: &str, row: usize) -> RfmResult<T> {
    value.clone().ok_or_else(|| RfmError::missing(column, row))
}

fn text_values(df: &DataFrame, name: &str) -> RfmResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

fn is_text(df: &DataFrame, name: &str) -> RfmResult<bool> {
    Ok(matches!(df.column(name)?.dtype(), DataType::String))
}

/// Whole numbers; text cells like "17850.0" are accepted.
fn integer_values(df: &DataFrame, name: &str) -> RfmResult<Vec<Option<i64>>> {
    if is_text(df, name)? {
        return text_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v.as_deref() {
                None | Some("") => Ok(None),
                Some(s) => parse_integral(s).map(Some).map_err(|e| RfmError::malformed(name, row, e)),
            })
            .collect();
    }

    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            None => Ok(None),
            Some(f) => integral_from_f64(f).map(Some).map_err(|e| RfmError::malformed(name, row, e)),
        })
        .collect()
}

fn decimal_values(df: &DataFrame, name: &str) -> RfmResult<Vec<Option<Decimal>>> {
    if is_text(df, name)? {
        return text_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v.as_deref() {
                None | Some("") => Ok(None),
                Some(s) => parse_decimal(s).map(Some).map_err(|e| RfmError::malformed(name, row, e)),
            })
            .collect();
    }

    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            None => Ok(None),
            Some(f) => parse_decimal(&f.to_string())
                .map(Some)
                .map_err(|e| RfmError::malformed(name, row, e)),
        })
        .collect()
}

fn timestamp_values(
    df: &DataFrame,
    name: &str,
    format: Option<&str>,
) -> RfmResult<Vec<Option<NaiveDateTime>>> {
    let column = df.column(name)?;
    let column = match column.dtype() {
        DataType::Date => column.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        _ => column.clone(),
    };

    if let DataType::Datetime(unit, zone) = column.dtype() {
        let unit = *unit;
        let zone = match zone {
            Some(z) => Some(LocalZone::parse(z.as_str()).ok_or_else(|| RfmError::UnknownTimeZone {
                column: name.to_string(),
                zone: z.to_string(),
            })?),
            None => None,
        };
        let raw = column.cast(&DataType::Int64)?;
        return raw
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                None => Ok(None),
                Some(v) => epoch_to_naive(v, unit, zone.as_ref())
                    .map(Some)
                    .ok_or_else(|| RfmError::malformed(name, row, "timestamp out of range")),
            })
            .collect();
    }

    text_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s, format)
                .map(Some)
                .map_err(|e| RfmError::malformed(name, row, e)),
        })
        .collect()
}

/// Time zone attached to a datetime column.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    /// IANA names ("Europe/London") or fixed offsets ("+01:00").
    fn parse(zone: &str) -> Option<Self> {
        zone.parse::<Tz>()
            .ok()
            .map(LocalZone::Named)
            .or_else(|| zone.parse::<FixedOffset>().ok().map(LocalZone::Fixed))
    }

    fn wall_time(self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocalZone::Named(tz) => instant.with_timezone(&tz).naive_local(),
            LocalZone::Fixed(offset) => instant.with_timezone(&offset).naive_local(),
        }
    }
}

/// Epoch value to the wall time recorded in the ledger. Zoned columns store
/// UTC instants, so they are shifted back to their own local time.
fn epoch_to_naive(value: i64, unit: TimeUnit, zone: Option<&LocalZone>) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    dt.map(|d| match zone {
        Some(zone) => zone.wall_time(d),
        None => d.naive_utc(),
    })
}

/// Parse a naive timestamp with an explicit format, or the known layouts.
pub fn parse_timestamp(text: &str, format: Option<&str>) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    if let Some(fmt) = format {
        return NaiveDateTime::parse_from_str(text, fmt)
            .map_err(|e| format!("'{}' does not match format '{}': {}", text, fmt, e));
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("'{}' is not a recognised timestamp", text))
}

/// Parse a decimal, accepting scientific notation.
pub fn parse_decimal(text: &str) -> Result<Decimal, String> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("'{}' is not a valid decimal", text))
}

/// Parse an integer, accepting a zero fractional part ("17850.0").
pub fn parse_integral(text: &str) -> Result<i64, String> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Ok(v);
    }
    let f: f64 = text
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", text))?;
    integral_from_f64(f)
}

fn integral_from_f64(f: f64) -> Result<i64, String> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(format!("{} is not a whole number", f))
    }
}
