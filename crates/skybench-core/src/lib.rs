//! skybench core
//!
//! This crate holds the engine-agnostic half of the benchmark harness:
//!
//! - **Catalog**: the fixed, ordered set of benchmark queries with
//!   per-dialect text bodies
//! - **Targets**: the supported backend engines and their connection
//!   configuration
//! - **Runner**: the coordinator that drives the catalog through a
//!   connection adapter, one query at a time
//! - **Report**: per-query outcomes, run summaries and cross-backend
//!   comparison
//! - **Readiness**: the bounded poll loop used before a load or run phase
//!
//! Concrete connection adapters (MySQL wire protocol, MongoDB driver) live
//! in `skybench-backends`.

pub mod catalog;
pub mod error;
pub mod outcome;
pub mod readiness;
pub mod report;
pub mod runner;
pub mod target;

pub use catalog::{BenchmarkQuery, QueryCatalog, QueryShape};
pub use error::{Error, ExecError};
pub use outcome::{QueryOutcome, QueryStatus};
pub use readiness::{ProbeStatus, ReadinessGate};
pub use report::{Comparison, RunReport, RunSummary};
pub use runner::{ExecSuccess, QueryExecutor, RunCoordinator};
pub use target::{BackendKind, QueryFamily, TargetConfig};
