//! Run reports, summary statistics and cross-backend comparison.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::{duration_secs, QueryOutcome, QueryStatus};
use crate::target::TargetConfig;

/// Aggregate statistics over one run.
///
/// `Unsupported` queries are excluded from both the numerator and the
/// denominator of the success rate: they do not count against a backend
/// that was never asked to run them. Errored, timed-out and aborted
/// queries count in the denominator only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total catalog entries in the run.
    pub total: usize,

    /// Queries that completed successfully.
    pub succeeded: usize,

    /// Ids of queries that errored or timed out.
    pub failed: Vec<u32>,

    /// Queries with no variant for this backend.
    pub unsupported: usize,

    /// Queries the run never reached.
    pub aborted: usize,

    /// Succeeded over attempted (total minus unsupported), in `0.0..=1.0`.
    /// 1.0 when nothing was attempted.
    pub success_rate: f64,

    /// Wall-clock time summed over successful queries only.
    #[serde(with = "duration_secs")]
    pub total_successful_time: Duration,
}

impl RunSummary {
    /// Fold a sequence of outcomes into summary statistics.
    pub fn from_outcomes(outcomes: &[QueryOutcome]) -> Self {
        let mut succeeded = 0;
        let mut failed = Vec::new();
        let mut unsupported = 0;
        let mut aborted = 0;
        let mut total_successful_time = Duration::ZERO;

        for outcome in outcomes {
            match outcome.status {
                QueryStatus::Success => {
                    succeeded += 1;
                    total_successful_time += outcome.elapsed;
                }
                QueryStatus::Error | QueryStatus::Timeout => failed.push(outcome.query_id),
                QueryStatus::Unsupported => unsupported += 1,
                QueryStatus::Aborted => aborted += 1,
            }
        }

        let attempted = outcomes.len() - unsupported;
        let success_rate = if attempted == 0 {
            1.0
        } else {
            succeeded as f64 / attempted as f64
        };

        Self {
            total: outcomes.len(),
            succeeded,
            failed,
            unsupported,
            aborted,
            success_rate,
            total_successful_time,
        }
    }
}

/// The frozen result of executing the catalog once against one backend.
///
/// Holds exactly one outcome per catalog query, in catalog order, plus the
/// fatal error that cut the run short, if any. Serializable so automated
/// regression comparisons across runs are possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Backend kind name.
    pub backend: String,

    /// Database the queries ran against.
    pub database: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Per-query outcomes, in catalog order.
    pub outcomes: Vec<QueryOutcome>,

    /// The connection-level error that aborted the run, if one occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,

    /// Aggregate statistics.
    pub summary: RunSummary,
}

/// Incrementally collects outcomes during a run; frozen into a
/// [`RunReport`] when the catalog is exhausted.
pub struct ReportBuilder {
    backend: String,
    database: String,
    started_at: DateTime<Utc>,
    outcomes: Vec<QueryOutcome>,
}

impl ReportBuilder {
    /// Start a report for one target.
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            backend: target.kind.to_string(),
            database: target.database.clone(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    /// Append the next outcome, in catalog order.
    pub fn record(&mut self, outcome: QueryOutcome) {
        self.outcomes.push(outcome);
    }

    /// Freeze the report, computing summary statistics.
    pub fn finish(self, fatal_error: Option<String>) -> RunReport {
        let summary = RunSummary::from_outcomes(&self.outcomes);
        RunReport {
            backend: self.backend,
            database: self.database,
            started_at: self.started_at,
            outcomes: self.outcomes,
            fatal_error,
            summary,
        }
    }
}

/// One backend's cell in a comparison row.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonCell {
    /// Status of the query on this backend.
    pub status: QueryStatus,
    /// Elapsed time on this backend.
    pub elapsed: Duration,
}

/// One query's row across all compared backends. A `None` cell means that
/// backend's report does not contain the query at all.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    /// Catalog id.
    pub query_id: u32,
    /// Catalog label.
    pub label: String,
    /// One cell per compared backend, in [`Comparison::backends`] order.
    pub cells: Vec<Option<ComparisonCell>>,
}

/// A cross-backend comparison keyed by query id.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Backend names, in input order.
    pub backends: Vec<String>,
    /// One row per query id present in any report, ascending.
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Join multiple run reports by query id.
    pub fn of(reports: &[RunReport]) -> Self {
        let backends: Vec<String> = reports.iter().map(|r| r.backend.clone()).collect();

        let mut labels: BTreeMap<u32, String> = BTreeMap::new();
        for report in reports {
            for outcome in &report.outcomes {
                labels
                    .entry(outcome.query_id)
                    .or_insert_with(|| outcome.label.clone());
            }
        }

        let rows = labels
            .into_iter()
            .map(|(query_id, label)| {
                let cells = reports
                    .iter()
                    .map(|report| {
                        report
                            .outcomes
                            .iter()
                            .find(|o| o.query_id == query_id)
                            .map(|o| ComparisonCell {
                                status: o.status,
                                elapsed: o.elapsed,
                            })
                    })
                    .collect();
                ComparisonRow {
                    query_id,
                    label,
                    cells,
                }
            })
            .collect();

        Self { backends, rows }
    }
}
