//! Per-query outcomes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::BenchmarkQuery;
use crate::runner::ExecSuccess;

/// Final classification of one query execution.
///
/// Timing tiers ("fast"/"slow") are a presentation concern layered on top
/// of `Success` by the renderer; they are never an outcome kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// The query completed within its budget.
    Success,
    /// The engine rejected or failed the query.
    Error,
    /// The query exceeded its time budget.
    Timeout,
    /// The backend has no text variant for this query.
    Unsupported,
    /// The run terminated before reaching this query.
    Aborted,
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
            QueryStatus::Timeout => "timeout",
            QueryStatus::Unsupported => "unsupported",
            QueryStatus::Aborted => "aborted",
        };
        f.write_str(text)
    }
}

/// The recorded result of one query execution against one backend.
/// Created once, immutable, appended to the run's ordered sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Catalog id of the query.
    pub query_id: u32,

    /// Catalog label of the query.
    pub label: String,

    /// Final status.
    pub status: QueryStatus,

    /// Wall-clock time, measured from just before issuing the query.
    /// Zero for `Unsupported` and `Aborted`.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,

    /// Error detail for `Error` outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Row (or document) count of the final result set, for spot
    /// verification. Full result sets are not retained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,

    /// Rendered first row of the final result set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

impl QueryOutcome {
    /// A completed query.
    pub fn success(query: &BenchmarkQuery, elapsed: Duration, result: ExecSuccess) -> Self {
        Self {
            query_id: query.id,
            label: query.label.clone(),
            status: QueryStatus::Success,
            elapsed,
            error: None,
            rows: Some(result.row_count),
            sample: result.sample,
        }
    }

    /// A query the engine rejected or failed.
    pub fn error(query: &BenchmarkQuery, elapsed: Duration, detail: String) -> Self {
        Self {
            query_id: query.id,
            label: query.label.clone(),
            status: QueryStatus::Error,
            elapsed,
            error: Some(detail),
            rows: None,
            sample: None,
        }
    }

    /// A query that exceeded its budget.
    pub fn timeout(query: &BenchmarkQuery, elapsed: Duration) -> Self {
        Self {
            query_id: query.id,
            label: query.label.clone(),
            status: QueryStatus::Timeout,
            elapsed,
            error: None,
            rows: None,
            sample: None,
        }
    }

    /// A query with no text variant for the target backend.
    pub fn unsupported(query: &BenchmarkQuery) -> Self {
        Self {
            query_id: query.id,
            label: query.label.clone(),
            status: QueryStatus::Unsupported,
            elapsed: Duration::ZERO,
            error: None,
            rows: None,
            sample: None,
        }
    }

    /// A query the run never reached.
    pub fn aborted(query: &BenchmarkQuery) -> Self {
        Self {
            query_id: query.id,
            label: query.label.clone(),
            status: QueryStatus::Aborted,
            elapsed: Duration::ZERO,
            error: None,
            rows: None,
            sample: None,
        }
    }
}

/// Serialize a `Duration` as fractional seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&QueryStatus::Unsupported).unwrap();
        assert_eq!(json, r#""unsupported""#);
        let back: QueryStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, QueryStatus::Unsupported);
    }

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "duration_secs")]
        elapsed: Duration,
    }

    #[test]
    fn test_duration_as_seconds() {
        let json = serde_json::to_string(&Wrapper {
            elapsed: Duration::from_millis(1500),
        })
        .unwrap();
        assert_eq!(json, r#"{"elapsed":1.5}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.elapsed, Duration::from_millis(1500));

        assert!(serde_json::from_str::<Wrapper>(r#"{"elapsed":-1.0}"#).is_err());
    }
}
