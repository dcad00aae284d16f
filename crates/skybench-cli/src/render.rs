//! Human-readable rendering of run reports and comparisons.

use std::time::Duration;

use clap::ValueEnum;
use comfy_table::Table;

use skybench_core::{Comparison, QueryStatus, RunReport};

/// Output format for the `run` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Timing tier of a successful query. Purely presentational; tiers are
/// never part of the outcome taxonomy.
fn tier(elapsed: Duration) -> &'static str {
    if elapsed < Duration::from_secs(1) {
        "fast"
    } else if elapsed < Duration::from_secs(10) {
        "ok"
    } else {
        "slow"
    }
}

/// Format a duration as `XmY.YYs`.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let minutes = (total / 60.0).floor() as u64;
    let seconds = total - (minutes as f64) * 60.0;
    format!("{}m {:.2}s", minutes, seconds)
}

/// Per-query outcome table for one run.
pub fn outcome_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Query", "Status", "Time", "Tier", "Rows"]);

    for outcome in &report.outcomes {
        let (time, tier_cell) = match outcome.status {
            QueryStatus::Success => (
                format_duration(outcome.elapsed),
                tier(outcome.elapsed).to_string(),
            ),
            QueryStatus::Error | QueryStatus::Timeout => {
                (format_duration(outcome.elapsed), String::new())
            }
            QueryStatus::Unsupported | QueryStatus::Aborted => ("-".to_string(), String::new()),
        };
        let rows = outcome
            .rows
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            outcome.query_id.to_string(),
            outcome.label.clone(),
            outcome.status.to_string(),
            time,
            tier_cell,
            rows,
        ]);
    }

    table
}

/// Multi-line summary of one run.
pub fn summary(report: &RunReport) -> String {
    let summary = &report.summary;
    let attempted = summary.total - summary.unsupported;

    let mut lines = vec![
        format!("backend: {} (database {})", report.backend, report.database),
        format!("successful queries: {}/{}", summary.succeeded, attempted),
        format!("success rate: {:.1}%", summary.success_rate * 100.0),
        format!(
            "total successful time: {}",
            format_duration(summary.total_successful_time)
        ),
    ];
    if summary.unsupported > 0 {
        lines.push(format!("unsupported queries: {}", summary.unsupported));
    }
    if !summary.failed.is_empty() {
        let ids: Vec<String> = summary.failed.iter().map(|id| id.to_string()).collect();
        lines.push(format!("failed queries: {}", ids.join(", ")));
    }
    if summary.aborted > 0 {
        lines.push(format!("aborted queries: {}", summary.aborted));
    }
    if let Some(fatal) = &report.fatal_error {
        lines.push(format!("run aborted: {}", fatal));
    }
    lines.join("\n")
}

/// Cross-backend comparison table, one column per report.
pub fn comparison_table(comparison: &Comparison) -> Table {
    let mut table = Table::new();
    let mut header = vec!["#".to_string(), "Query".to_string()];
    header.extend(comparison.backends.iter().cloned());
    table.set_header(header);

    for row in &comparison.rows {
        let mut cells = vec![row.query_id.to_string(), row.label.clone()];
        for cell in &row.cells {
            let text = match cell {
                Some(cell) if cell.status == QueryStatus::Success => {
                    format_duration(cell.elapsed)
                }
                Some(cell) => cell.status.to_string(),
                None => "-".to_string(),
            };
            cells.push(text);
        }
        table.add_row(cells);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybench_core::outcome::QueryOutcome;
    use skybench_core::report::{ReportBuilder, RunSummary};
    use skybench_core::{BackendKind, TargetConfig};

    fn outcome(id: u32, status: QueryStatus, millis: u64) -> QueryOutcome {
        QueryOutcome {
            query_id: id,
            label: format!("query {}", id),
            status,
            elapsed: Duration::from_millis(millis),
            error: None,
            rows: Some(10),
            sample: None,
        }
    }

    fn sample_report() -> RunReport {
        let target = TargetConfig::new(BackendKind::Doris);
        let mut builder = ReportBuilder::new(&target);
        builder.record(outcome(1, QueryStatus::Success, 500));
        builder.record(outcome(2, QueryStatus::Timeout, 60_000));
        builder.record(outcome(3, QueryStatus::Unsupported, 0));
        builder.finish(None)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1_230)), "0m 1.23s");
        assert_eq!(format_duration(Duration::from_secs(95)), "1m 35.00s");
    }

    #[test]
    fn test_tier_buckets() {
        assert_eq!(tier(Duration::from_millis(200)), "fast");
        assert_eq!(tier(Duration::from_secs(5)), "ok");
        assert_eq!(tier(Duration::from_secs(30)), "slow");
    }

    #[test]
    fn test_outcome_table_contains_statuses() {
        let rendered = outcome_table(&sample_report()).to_string();
        assert!(rendered.contains("success"));
        assert!(rendered.contains("timeout"));
        assert!(rendered.contains("unsupported"));
        assert!(rendered.contains("query 1"));
    }

    #[test]
    fn test_summary_reports_rate_and_failures() {
        let report = sample_report();
        let text = summary(&report);
        assert!(text.contains("backend: doris"));
        assert!(text.contains("successful queries: 1/2"));
        assert!(text.contains("success rate: 50.0%"));
        assert!(text.contains("failed queries: 2"));
        assert!(text.contains("unsupported queries: 1"));
    }

    #[test]
    fn test_summary_shape_matches_aggregation() {
        let report = sample_report();
        let recomputed = RunSummary::from_outcomes(&report.outcomes);
        assert_eq!(recomputed.succeeded, report.summary.succeeded);
        assert_eq!(recomputed.failed, report.summary.failed);
    }

    #[test]
    fn test_comparison_table_renders_per_backend_columns() {
        let a = sample_report();
        let target = TargetConfig::new(BackendKind::ClickHouse);
        let mut builder = ReportBuilder::new(&target);
        builder.record(outcome(1, QueryStatus::Success, 120));
        let b = builder.finish(None);

        let comparison = Comparison::of(&[a, b]);
        let rendered = comparison_table(&comparison).to_string();
        assert!(rendered.contains("doris"));
        assert!(rendered.contains("clickhouse"));
        assert!(rendered.contains("timeout"));
    }
}
