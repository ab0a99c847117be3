//! rfmseg: RFM Customer Segmentation CLI Tool
//!
//! Loads a transaction ledger, cleans it, aggregates Recency, Frequency
//! and Monetary measures per customer, scores them into quintiles and
//! writes the categorized customer table.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use rfmseg::cli::{confirm_overwrite, Cli};
use rfmseg::pipeline::{extract_transactions, load_ledger, profile_dataset, run_rfm_pipeline};
use rfmseg::report::{
    display_binning, display_category_distribution, display_dataset_profile,
    export_analysis_json, package_reports, save_scored_customers, RfmAnalysisExport, RfmSummary,
};
use rfmseg::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli
        .segment_config()
        .context("Invalid clip configuration")?;
    let output_path = cli.output_path();
    let analysis_path = cli.analysis_path();
    let bundle_path = cli.bundle_path();

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    if !cli.no_confirm {
        let mut targets = vec![output_path.as_path(), analysis_path.as_path()];
        if cli.bundle {
            targets.push(bundle_path.as_path());
        }
        if !confirm_overwrite(&targets)? {
            println!("Cancelled by user.");
            return Ok(());
        }
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &output_path, &config);

    // Step 1: Load ledger
    print_step_header(1, "Load Ledger");

    let step_start = Instant::now();
    let spinner = create_spinner("Reading ledger...");
    let df = load_ledger(&cli.input, cli.sheet.as_deref())?;
    finish_with_success(&spinner, "Ledger loaded");

    let columns = cli.ledger_columns();
    let dataset = profile_dataset(&df, &columns.customer_id)
        .with_context(|| format!("Failed to profile {}", cli.input.display()))?;
    display_dataset_profile(&dataset);

    let mut summary = RfmSummary::new(dataset.rows);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Parse rows into typed transactions
    print_step_header(2, "Parse Transactions");

    let step_start = Instant::now();
    let spinner = create_spinner("Parsing ledger rows...");
    let transactions = extract_transactions(&df, &columns, cli.timestamp_format.as_deref())
        .with_context(|| format!("Failed to parse ledger rows from {}", cli.input.display()))?;
    drop(df);
    finish_with_success(
        &spinner,
        &format!("Parsed {} transaction line(s)", transactions.len()),
    );
    let parse_elapsed = step_start.elapsed();
    summary.set_clean_time(parse_elapsed);
    print_step_time(parse_elapsed);

    // Step 3: Clean, enrich, aggregate and score
    print_step_header(3, "Segment Customers");

    let step_start = Instant::now();
    let spinner = create_spinner("Scoring customers...");
    let analysis = run_rfm_pipeline(&transactions, &config).context("Segmentation failed")?;
    if analysis.customers.is_empty() {
        finish_with_warning(&spinner, "No identified customers to score");
    } else {
        finish_with_success(&spinner, "Segmentation complete");
    }

    let stats = &analysis.cleaning;
    if stats.missing_description > 0 {
        print_count("line(s) without a description", stats.missing_description, Some("(dropped)"));
    }
    if stats.cancellations > 0 {
        print_count("cancellation line(s)", stats.cancellations, Some("(dropped)"));
    }
    if stats.negative_quantity > 0 {
        print_count("line(s) with negative quantity", stats.negative_quantity, Some("(observed)"));
    }
    if analysis.anonymous_lines > 0 {
        print_warning(&format!(
            "{} clean line(s) have no customer id and are excluded from scoring",
            analysis.anonymous_lines
        ));
    }
    if let Some(reference) = analysis.reference_date {
        print_info(&format!(
            "Reference date: {}",
            style(reference.format("%Y-%m-%d %H:%M:%S")).cyan()
        ));
    }

    summary.record(&analysis);
    display_binning(&analysis);
    display_category_distribution(&analysis);

    let segment_elapsed = step_start.elapsed();
    summary.set_segment_time(segment_elapsed);
    print_step_time(segment_elapsed);

    // Step 4: Save outputs
    print_step_header(4, "Save Results");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing scored customers...");
    save_scored_customers(&analysis.customers, &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    let input_display = cli.input.display().to_string();
    let export = RfmAnalysisExport::new(&analysis, Some(&dataset), &input_display, &config);
    export_analysis_json(&export, &analysis_path)?;
    print_success(&format!("Analysis written to {}", analysis_path.display()));

    if cli.bundle {
        package_reports(&output_path, &analysis_path, &bundle_path)?;
        print_success(&format!("Bundled reports into {}", bundle_path.display()));
    }

    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);
    print_step_time(save_elapsed);

    summary.display(&analysis);
    print_completion();

    Ok(())
}
