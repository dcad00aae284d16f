//! Harness error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that terminate the process: misconfiguration, a broken catalog,
/// or a backend that never became ready. Per-query failures are not errors
/// at this level; they are recorded as [`crate::outcome::QueryOutcome`]s.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error while loading the catalog or writing a report.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed manifest or report JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog is missing, empty, or internally inconsistent.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The readiness gate exhausted its retry budget.
    #[error("backend not ready after {attempts} attempts (last status: {last})")]
    Readiness {
        /// Number of poll attempts made before giving up.
        attempts: u32,
        /// The last status the probe observed.
        last: String,
    },
}

/// Errors surfaced by a connection adapter for a single query execution.
///
/// The distinction drives the run coordinator: `Query` and `Timeout` are
/// recorded and the run continues; `Fatal` aborts the remaining queries.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The engine is unreachable or the connection is unusable. Fatal for
    /// the whole run.
    #[error("connection error: {0}")]
    Fatal(String),

    /// The engine rejected or failed the query. Recorded, run continues.
    #[error("query error: {0}")]
    Query(String),

    /// The query exceeded its time budget. Recorded, run continues.
    #[error("query exceeded the {0:?} budget")]
    Timeout(Duration),
}
