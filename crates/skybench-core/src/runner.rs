//! The run coordinator: drives the catalog through a connection adapter.

use std::time::{Duration, Instant};

use crate::catalog::QueryCatalog;
use crate::error::ExecError;
use crate::outcome::QueryOutcome;
use crate::report::{ReportBuilder, RunReport};
use crate::target::TargetConfig;

/// Default per-query time budget.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(600);

/// Minimal result descriptor returned by an adapter on success. Enough for
/// spot verification; full result sets are drained but not retained.
#[derive(Debug, Clone, Default)]
pub struct ExecSuccess {
    /// Row or document count of the final result set.
    pub row_count: u64,
    /// Rendered first row of the final result set, if any.
    pub sample: Option<String>,
}

/// The single capability a backend must provide: execute one query body
/// within a time budget.
///
/// Implementations enforce the budget themselves (they own the cleanup a
/// cancelled query requires: protocol-level cancellation where available,
/// otherwise discarding the connection and reopening it before the next
/// query) and must return [`ExecError::Timeout`] when it is exceeded.
/// Queries are read-only; an adapter never mutates remote state.
#[allow(async_fn_in_trait)]
pub trait QueryExecutor {
    /// Execute `text` against the backend, returning the elapsed result
    /// descriptor or a classified error.
    async fn execute(&mut self, text: &str, timeout: Duration) -> Result<ExecSuccess, ExecError>;
}

/// Sequentially executes the full catalog against one backend target.
///
/// Queries run in strict catalog order, single-shot (a benchmarked latency
/// must reflect one un-retried execution), each under a fixed time budget. Per-query failures never abort the run; a fatal
/// connection error records the remaining queries as `Aborted`.
pub struct RunCoordinator<'a> {
    catalog: &'a QueryCatalog,
    target: &'a TargetConfig,
    query_timeout: Duration,
}

impl<'a> RunCoordinator<'a> {
    /// Create a coordinator with the default per-query timeout.
    pub fn new(catalog: &'a QueryCatalog, target: &'a TargetConfig) -> Self {
        Self {
            catalog,
            target,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Set the per-query time budget.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Run the catalog to completion and return the frozen report.
    ///
    /// Always produces exactly one outcome per catalog query, in catalog
    /// order. The connection adapter is owned exclusively by this call for
    /// the duration of the run.
    pub async fn run<E: QueryExecutor>(&self, executor: &mut E) -> RunReport {
        let mut builder = ReportBuilder::new(self.target);
        let mut fatal: Option<String> = None;

        for query in self.catalog.iter() {
            if fatal.is_some() {
                builder.record(QueryOutcome::aborted(query));
                continue;
            }

            let Some(text) = query.text_for(self.target.kind) else {
                tracing::warn!(
                    query = query.id,
                    backend = %self.target.kind,
                    "no query variant for this backend"
                );
                builder.record(QueryOutcome::unsupported(query));
                continue;
            };

            tracing::info!(query = query.id, label = %query.label, "executing");
            let start = Instant::now();
            let outcome = match executor.execute(text, self.query_timeout).await {
                Ok(result) => {
                    let elapsed = start.elapsed();
                    tracing::info!(
                        query = query.id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        rows = result.row_count,
                        "query succeeded"
                    );
                    QueryOutcome::success(query, elapsed, result)
                }
                Err(ExecError::Timeout(budget)) => {
                    let elapsed = start.elapsed();
                    tracing::warn!(
                        query = query.id,
                        budget_secs = budget.as_secs(),
                        "query timed out"
                    );
                    QueryOutcome::timeout(query, elapsed)
                }
                Err(ExecError::Query(detail)) => {
                    let elapsed = start.elapsed();
                    tracing::warn!(query = query.id, error = %detail, "query failed");
                    QueryOutcome::error(query, elapsed, detail)
                }
                Err(ExecError::Fatal(detail)) => {
                    let elapsed = start.elapsed();
                    tracing::error!(
                        query = query.id,
                        error = %detail,
                        "connection lost, aborting remaining queries"
                    );
                    fatal = Some(detail.clone());
                    QueryOutcome::error(query, elapsed, detail)
                }
            };
            builder.record(outcome);
        }

        builder.finish(fatal)
    }
}
