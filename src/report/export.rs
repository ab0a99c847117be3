//! Export of scored customers and analysis metadata

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use polars::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pipeline::{
    CategoryCount, CleaningStats, DatasetProfile, MeasureBins, RfmAnalysis, ScoredCustomer,
    SegmentConfig,
};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// rfmseg version
    pub rfmseg_version: String,
    /// Input file path
    pub input_file: String,
    /// Segmenter parameters
    pub segment_config: SegmentConfig,
}

/// Complete analysis export, without per-customer rows
#[derive(Serialize)]
pub struct RfmAnalysisExport<'a> {
    pub metadata: ExportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<&'a DatasetProfile>,
    pub cleaning: &'a CleaningStats,
    pub reference_date: Option<NaiveDateTime>,
    pub customers_scored: usize,
    pub anonymous_lines: usize,
    pub anonymous_revenue: Decimal,
    pub total_revenue: Decimal,
    pub bins: &'a MeasureBins,
    pub distribution: &'a [CategoryCount],
}

impl<'a> RfmAnalysisExport<'a> {
    pub fn new(
        analysis: &'a RfmAnalysis,
        dataset: Option<&'a DatasetProfile>,
        input_file: &str,
        config: &SegmentConfig,
    ) -> Self {
        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                rfmseg_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.to_string(),
                segment_config: config.clone(),
            },
            dataset,
            cleaning: &analysis.cleaning,
            reference_date: analysis.reference_date,
            customers_scored: analysis.customers.len(),
            anonymous_lines: analysis.anonymous_lines,
            anonymous_revenue: analysis.anonymous_revenue,
            total_revenue: analysis.total_revenue,
            bins: &analysis.bins,
            distribution: &analysis.distribution,
        }
    }
}

/// Write the analysis export as pretty JSON
pub fn export_analysis_json(export: &RfmAnalysisExport<'_>, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export).context("Failed to serialize analysis")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis file: {}", output_path.display()))?;
    Ok(())
}

/// One row per customer: measures, scores, RFM score and category.
pub fn scored_dataframe(customers: &[ScoredCustomer]) -> PolarsResult<DataFrame> {
    let customer_id: Vec<i64> = customers.iter().map(|c| c.profile.customer_id).collect();
    let recency: Vec<i64> = customers.iter().map(|c| c.profile.recency).collect();
    let frequency: Vec<i64> = customers.iter().map(|c| c.profile.frequency as i64).collect();
    let monetary: Vec<f64> = customers
        .iter()
        .map(|c| c.profile.monetary.round_dp(2).to_f64().unwrap_or(f64::NAN))
        .collect();
    let r_score: Vec<u32> = customers.iter().map(|c| c.r_score.value() as u32).collect();
    let f_score: Vec<u32> = customers.iter().map(|c| c.f_score.value() as u32).collect();
    let m_score: Vec<u32> = customers.iter().map(|c| c.m_score.value() as u32).collect();
    let rfm_score: Vec<u32> = customers.iter().map(|c| c.rfm_score.value() as u32).collect();
    let category: Vec<&str> = customers.iter().map(|c| c.category.label()).collect();

    DataFrame::new(vec![
        Column::new("customer_id".into(), customer_id),
        Column::new("recency".into(), recency),
        Column::new("frequency".into(), frequency),
        Column::new("monetary".into(), monetary),
        Column::new("r_score".into(), r_score),
        Column::new("f_score".into(), f_score),
        Column::new("m_score".into(), m_score),
        Column::new("rfm_score".into(), rfm_score),
        Column::new("category".into(), category),
    ])
}

/// Save the scored customer table (CSV or Parquet based on extension)
pub fn save_scored_customers(customers: &[ScoredCustomer], path: &Path) -> Result<()> {
    let mut df = scored_dataframe(customers).context("Failed to build scored customer table")?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Package the scored table and analysis JSON into a zip archive
pub fn package_reports(table_path: &Path, analysis_path: &Path, zip_path: &Path) -> Result<()> {
    use ::zip::write::SimpleFileOptions;
    use ::zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(::zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in [table_path, analysis_path] {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", path.display()))?;

        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .read_to_end(&mut content)?;

        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;
        zip.write_all(&content)?;
    }

    zip.finish().context("Failed to finalize zip file")?;
    Ok(())
}
