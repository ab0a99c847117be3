//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::pipeline::{ClipBounds, LedgerColumns, RfmResult, SegmentConfig};

/// rfmseg - Score customers by Recency, Frequency and Monetary value
#[derive(Parser, Debug)]
#[command(name = "rfmseg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input ledger path (CSV, Parquet, or XLSX)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output path for the scored customer table (CSV or Parquet, determined by extension).
    /// Defaults to input directory with '_rfm' suffix (e.g., ledger.csv → ledger_rfm.csv).
    /// XLSX input defaults to CSV output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worksheet to read from XLSX input (first sheet by default)
    #[arg(long)]
    pub sheet: Option<String>,

    /// chrono format string for invoice timestamps (e.g. "%d/%m/%Y %H:%M").
    /// When omitted, common ISO and US layouts are tried in order.
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Invoice identifier column
    #[arg(long, default_value = "InvoiceNo")]
    pub invoice_column: String,

    /// Customer identifier column
    #[arg(long, default_value = "CustomerID")]
    pub customer_column: String,

    /// Invoice timestamp column
    #[arg(long, default_value = "InvoiceDate")]
    pub date_column: String,

    /// Upper clip bound (days) applied to Recency before computing bin edges
    #[arg(long, value_parser = validate_finite)]
    pub recency_clip_upper: Option<f64>,

    /// Upper clip bound applied to Frequency before computing bin edges
    #[arg(long, value_parser = validate_finite)]
    pub frequency_clip_upper: Option<f64>,

    /// Lower clip bound applied to Monetary before computing bin edges
    #[arg(long, value_parser = validate_finite)]
    pub monetary_clip_lower: Option<f64>,

    /// Upper clip bound applied to Monetary before computing bin edges
    #[arg(long, value_parser = validate_finite)]
    pub monetary_clip_upper: Option<f64>,

    /// Disable the fixed Frequency edges (0,1,2,4,10,∞) used when quantile edges collide.
    /// Colliding quantile bins are merged instead.
    #[arg(long, default_value = "false")]
    pub no_frequency_fallback: bool,

    /// Also package the scored table and analysis JSON into a zip archive
    #[arg(long, default_value = "false")]
    pub bundle: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl Cli {
    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let extension = match self.input_extension().as_str() {
                "parquet" => "parquet",
                _ => "csv",
            };
            self.sibling(&format!("_rfm.{}", extension))
        })
    }

    /// Path of the JSON analysis export, next to the input.
    pub fn analysis_path(&self) -> PathBuf {
        self.sibling("_rfm_analysis.json")
    }

    /// Path of the zip bundle, next to the input.
    pub fn bundle_path(&self) -> PathBuf {
        self.sibling("_rfm_report.zip")
    }

    /// Ledger column names, with overrides applied.
    pub fn ledger_columns(&self) -> LedgerColumns {
        LedgerColumns {
            invoice_no: self.invoice_column.clone(),
            customer_id: self.customer_column.clone(),
            invoice_date: self.date_column.clone(),
            ..Default::default()
        }
    }

    /// Segmenter parameters from the clip and fallback flags.
    pub fn segment_config(&self) -> RfmResult<SegmentConfig> {
        Ok(SegmentConfig {
            recency_clip: ClipBounds::from_optional(None, self.recency_clip_upper)?,
            frequency_clip: ClipBounds::from_optional(None, self.frequency_clip_upper)?,
            monetary_clip: ClipBounds::from_optional(self.monetary_clip_lower, self.monetary_clip_upper)?,
            frequency_fallback: !self.no_frequency_fallback,
        })
    }

    fn input_extension(&self) -> String {
        self.input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let parent = self.input.parent().unwrap_or_else(|| Path::new("."));
        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("ledger");
        parent.join(format!("{}{}", stem, suffix))
    }
}

/// Validator for clip bound parameters
fn validate_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("clip bound must be finite, got {}", value))
    }
}
