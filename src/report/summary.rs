//! Segmentation summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{BinEdges, BinningStrategy, CustomerCategory, DatasetProfile, RfmAnalysis};

/// Timings and headline counts of one run
#[derive(Debug, Default)]
pub struct RfmSummary {
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub customers: usize,
    pub load_time: Duration,
    pub clean_time: Duration,
    pub segment_time: Duration,
    pub save_time: Duration,
}

impl RfmSummary {
    pub fn new(raw_rows: usize) -> Self {
        Self {
            raw_rows,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_clean_time(&mut self, elapsed: Duration) {
        self.clean_time = elapsed;
    }

    pub fn set_segment_time(&mut self, elapsed: Duration) {
        self.segment_time = elapsed;
    }

    pub fn set_save_time(&mut self, elapsed: Duration) {
        self.save_time = elapsed;
    }

    pub fn record(&mut self, analysis: &RfmAnalysis) {
        self.clean_rows = analysis.cleaning.clean_rows;
        self.customers = analysis.customers.len();
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.clean_time + self.segment_time + self.save_time
    }

    pub fn display(&self, analysis: &RfmAnalysis) {
        print_section("📋", "SEGMENTATION SUMMARY");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let stats = &analysis.cleaning;
        table.add_row(vec![Cell::new("📁 Raw Rows"), Cell::new(self.raw_rows)]);
        table.add_row(vec![
            Cell::new("🗑️  Missing Description"),
            count_cell(stats.missing_description),
        ]);
        table.add_row(vec![
            Cell::new("↩️  Negative Quantity"),
            count_cell(stats.negative_quantity),
        ]);
        table.add_row(vec![Cell::new("❌ Cancellations"), count_cell(stats.cancellations)]);
        table.add_row(vec![
            Cell::new("✅ Clean Rows"),
            Cell::new(self.clean_rows).fg(Color::Green).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("👤 Anonymous Lines"),
            Cell::new(analysis.anonymous_lines).fg(Color::Yellow),
        ]);
        table.add_row(vec![
            Cell::new("🧾 Customers Scored"),
            Cell::new(self.customers).fg(Color::Cyan).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💰 Total Revenue"),
            Cell::new(format!("{:.2}", analysis.total_revenue)),
        ]);
        if let Some(reference) = analysis.reference_date {
            table.add_row(vec![
                Cell::new("📅 Reference Date"),
                Cell::new(reference.format("%Y-%m-%d %H:%M")),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Total Time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        print_indented(&table);
    }
}

/// Print the per-category distribution with mean measures.
pub fn display_category_distribution(analysis: &RfmAnalysis) {
    print_section("🏷️ ", "CUSTOMER CATEGORIES");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Customers").add_attribute(Attribute::Bold),
        Cell::new("Share").add_attribute(Attribute::Bold),
        Cell::new("Avg Recency").add_attribute(Attribute::Bold),
        Cell::new("Avg Frequency").add_attribute(Attribute::Bold),
        Cell::new("Avg Monetary").add_attribute(Attribute::Bold),
    ]);

    for entry in &analysis.distribution {
        table.add_row(vec![
            Cell::new(entry.category).fg(category_color(entry.category)),
            Cell::new(entry.customers).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", entry.share_pct)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}", entry.mean_recency)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", entry.mean_frequency)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", entry.mean_monetary)).set_alignment(CellAlignment::Right),
        ]);
    }

    print_indented(&table);
}

/// Print the binning strategy and edges used for each measure.
pub fn display_binning(analysis: &RfmAnalysis) {
    print_section("📐", "BIN EDGES");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Measure").add_attribute(Attribute::Bold),
        Cell::new("Strategy").add_attribute(Attribute::Bold),
        Cell::new("Bins").add_attribute(Attribute::Bold),
        Cell::new("Edges").add_attribute(Attribute::Bold),
    ]);

    for (name, bins) in [
        ("Recency", &analysis.bins.recency),
        ("Frequency", &analysis.bins.frequency),
        ("Monetary", &analysis.bins.monetary),
    ] {
        let strategy = Cell::new(bins.strategy).fg(match bins.strategy {
            BinningStrategy::EqualFrequency => Color::White,
            BinningStrategy::FixedEdges => Color::Yellow,
        });
        table.add_row(vec![
            Cell::new(name),
            strategy,
            Cell::new(bins.effective_bins()),
            Cell::new(format_edges(bins)),
        ]);
    }

    print_indented(&table);
}

/// Print the raw table's shape and its most-null columns.
pub fn display_dataset_profile(profile: &DatasetProfile) {
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", profile.rows);
    println!("      Columns: {}", profile.columns);
    println!("      Estimated memory: {:.2} MB", profile.estimated_mb);
    println!(
        "      Rows without customer id: {}",
        style(format!("{:.2}%", profile.anonymous_pct)).yellow()
    );
    for (name, nulls) in profile.null_counts.iter().filter(|(_, n)| *n > 0) {
        println!("      {} {}: {} null", style("•").dim(), name, nulls);
    }
}

fn format_edges(bins: &BinEdges) -> String {
    bins.edges
        .iter()
        .map(|e| {
            if e.is_infinite() {
                "∞".to_string()
            } else if e.fract() == 0.0 {
                format!("{:.0}", e)
            } else {
                format!("{:.2}", e)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn category_color(category: CustomerCategory) -> Color {
    match category {
        CustomerCategory::Champions => Color::Green,
        CustomerCategory::LoyalCustomers => Color::Cyan,
        CustomerCategory::PotentialLoyalists => Color::Blue,
        CustomerCategory::AtRisk => Color::Yellow,
        CustomerCategory::NeedAttention => Color::Red,
    }
}

fn count_cell(count: usize) -> Cell {
    Cell::new(count).fg(if count == 0 { Color::White } else { Color::Red })
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
