//! Terminal styling utilities for a modern, visually appealing TUI

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::{ClipBounds, SegmentConfig};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("🕐 ", "");
pub static REPEAT: Emoji<'_, '_> = Emoji("🔁 ", "");
pub static MONEY: Emoji<'_, '_> = Emoji("💰 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ____  _____ __  __
    |  _ \|  ___|  \/  |___  ___  __ _
    | |_) | |_  | |\/| / __|/ _ \/ _` |
    |  _ <|  _| | |  | \__ \  __/ (_| |
    |_| \_\_|   |_|  |_|___/\___|\__, |
                                 |___/
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Recency · Frequency · Monetary customer segmentation").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(input: &Path, output: &Path, config: &SegmentConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Input:  {:<39}│", FOLDER, truncate_path(input, 38));
    println!("    │  {} Output: {:<39}│", SAVE, truncate_path(output, 38));
    println!("    ├{}┤", line);
    println!(
        "    │  {} Recency clip:   {:<31}│",
        CLOCK,
        style(describe_clip(config.recency_clip)).yellow()
    );
    println!(
        "    │  {} Frequency clip: {:<31}│",
        REPEAT,
        style(describe_clip(config.frequency_clip)).yellow()
    );
    println!(
        "    │  {} Monetary clip:  {:<31}│",
        MONEY,
        style(describe_clip(config.monetary_clip)).yellow()
    );
    println!(
        "    │  {} Freq. fallback: {:<31}│",
        REPEAT,
        style(if config.frequency_fallback { "fixed edges" } else { "merge bins" }).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "    {}",
        style(format!("completed in {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("RFM segmentation complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn describe_clip(clip: Option<ClipBounds>) -> String {
    match clip {
        None => "none".to_string(),
        Some(c) => {
            let lower = if c.lower.is_finite() { format!("{}", c.lower) } else { "-∞".to_string() };
            let upper = if c.upper.is_finite() { format!("{}", c.upper) } else { "∞".to_string() };
            format!("[{}, {}]", lower, upper)
        }
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
