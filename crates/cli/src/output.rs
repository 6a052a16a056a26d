//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
#[allow(dead_code)]
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format cores, switching to millicores below one core
pub fn format_cores(cores: f64) -> String {
    if cores != 0.0 && cores.abs() < 1.0 {
        format!("{:.0}m", cores * 1000.0)
    } else {
        format!("{:.2}", cores)
    }
}

/// Format GiB, switching to MiB below one GiB
pub fn format_gib(gib: f64) -> String {
    if gib != 0.0 && gib.abs() < 1.0 {
        format!("{:.0}Mi", gib * 1024.0)
    } else {
        format!("{:.2}Gi", gib)
    }
}

/// Format an hourly price
pub fn format_price(price: f64) -> String {
    format!("${:.4}", price)
}
