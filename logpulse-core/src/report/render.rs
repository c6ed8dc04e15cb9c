use crate::conf::ReportFormat;
use crate::pipeline::{HealthSummary, RunReport};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

pub fn format_failed_rate(summary: &HealthSummary) -> String {
    match summary.failed_rate() {
        Some(rate) => format!("{rate:.2}%"),
        None => "n/a".to_string(),
    }
}

pub fn render_text(report: &RunReport, color: bool) -> String {
    let summary = &report.summary;
    let counts = &report.counts;
    let mut out = String::new();

    let rate = format_failed_rate(summary);
    let rate = if color && summary.failed_requests > 0 {
        rate.red().to_string()
    } else if color {
        rate.green().to_string()
    } else {
        rate
    };

    out.push_str(&format!(
        "Log Health Summary\n\
         ==================\n\
         Failed requests: {} ({}/{})\n\
         Warnings: {}\n\
         Errors: {}\n\n",
        rate,
        summary.failed_requests,
        summary.total_requests,
        summary.warnings,
        summary.errors
    ));

    out.push_str(&format!(
        "Lines: read={} decoded={} kept={} | dropped failures: {}\n",
        counts.lines_read,
        counts.records_decoded,
        counts.records_kept,
        report.recoverable_failures
    ));

    out
}

#[derive(Serialize)]
struct RunReportJson<'a> {
    #[serde(flatten)]
    summary: &'a HealthSummary,
    /// `null` when no request was observed.
    failed_rate_pct: Option<f64>,
    counts: &'a crate::pipeline::PipelineCounts,
    recoverable_failures: u64,
}

pub fn render_json(report: &RunReport) -> Result<String, serde_json::Error> {
    let json = RunReportJson {
        summary: &report.summary,
        failed_rate_pct: report
            .summary
            .failed_rate()
            .map(|rate| (rate * 100.0).round() / 100.0),
        counts: &report.counts,
        recoverable_failures: report.recoverable_failures,
    };

    serde_json::to_string_pretty(&json)
}

/// Write the report to stdout in the requested format.
pub fn print_report(report: &RunReport, format: ReportFormat) -> anyhow::Result<()> {
    let rendered = match format {
        ReportFormat::Text => render_text(report, io::stdout().is_terminal()),
        ReportFormat::Json => render_json(report)?,
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;

    Ok(())
}
