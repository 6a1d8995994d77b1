//! Output formatters for divergir
//!
//! Text output is one `<key>: <value>` line per metric, in report
//! order, with the key emphasized on a terminal; JSON output is the
//! same mapping serialized for tooling and CI.

use crate::error::Result;
use crate::report::MetricReport;
use colored::Colorize;
use std::io::{self, Write};

/// Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// `<key>: <value>` lines for the terminal
    #[default]
    Text,
    /// JSON mapping for tooling and CI
    Json,
}

/// Format a report as `<key>: <value>` lines
#[must_use]
pub fn format_text(report: &MetricReport) -> String {
    let mut output = String::new();
    for (name, value) in report.entries() {
        output.push_str(&format!("{}: {}\n", name.bold(), value));
    }
    output
}

/// Format a report as a pretty-printed JSON object
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn format_json(report: &MetricReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Write a report to stdout in the requested format
///
/// # Errors
///
/// Returns an error if serialization or the stdout write fails.
pub fn write_report(report: &MetricReport, format: OutputFormat) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match format {
        OutputFormat::Text => {
            write!(stdout, "{}", format_text(report))?;
        }
        OutputFormat::Json => {
            let json = format_json(report)?;
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MetricValue;

    fn sample_report() -> MetricReport {
        let mut report = MetricReport::new();
        report.push("Number of Divergent Warps", MetricValue::Count(6));
        report.push(
            "Divergent Warps",
            MetricValue::Indices(vec![4, 5, 6, 7, 12, 13]),
        );
        report
    }

    #[test]
    fn test_format_text_one_line_per_metric() {
        colored::control::set_override(false);
        let text = format_text(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Number of Divergent Warps: 6");
        assert_eq!(lines[1], "Divergent Warps: [4, 5, 6, 7, 12, 13]");
    }

    #[test]
    fn test_format_text_preserves_report_order() {
        colored::control::set_override(false);
        let mut report = MetricReport::new();
        report.push("second", MetricValue::Count(2));
        report.push("first", MetricValue::Count(1));
        let text = format_text(&report);
        assert!(text.find("second").unwrap() < text.find("first").unwrap());
    }

    #[test]
    fn test_format_json_roundtrips() {
        let json = format_json(&sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["Number of Divergent Warps"], 6);
        assert_eq!(parsed["Divergent Warps"][0], 4);
    }

    #[test]
    fn test_format_json_ratio_value() {
        let mut report = MetricReport::new();
        report.push(
            "Average Data Reuse for internal node",
            MetricValue::Ratio(48.0 / 18.0),
        );
        let json = format_json(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let reuse = parsed["Average Data Reuse for internal node"]
            .as_f64()
            .unwrap();
        assert!((reuse - 48.0 / 18.0).abs() < 1e-12);
    }
}
