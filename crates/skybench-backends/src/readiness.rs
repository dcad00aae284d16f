//! Per-engine readiness probes.
//!
//! Each probe makes one attempt with a fresh connection and reports what
//! it saw; the bounded retry loop lives in
//! [`skybench_core::readiness::ReadinessGate`].

use std::time::Duration;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};

use skybench_core::readiness::ProbeStatus;
use skybench_core::target::{BackendKind, TargetConfig};

use crate::mongo;
use crate::mysql;

/// Budget for a single MongoDB server-selection attempt.
const MONGO_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Probe a target once.
///
/// Doris and StarRocks frontends accept connections before their storage
/// nodes do, so those kinds are ready only once `SHOW BACKENDS` reports at
/// least one alive node. The other SQL engines are ready when `SELECT 1`
/// succeeds; MongoDB when it answers `ping`.
pub async fn probe(target: &TargetConfig) -> ProbeStatus {
    match target.kind {
        BackendKind::Doris | BackendKind::StarRocks => probe_storage_nodes(target).await,
        BackendKind::MongoDb => probe_mongo(target).await,
        _ => probe_select_one(target).await,
    }
}

async fn probe_select_one(target: &TargetConfig) -> ProbeStatus {
    match select_one(target).await {
        Ok(()) => ProbeStatus::Ready,
        Err(err) => ProbeStatus::NotReady(err.to_string()),
    }
}

async fn select_one(target: &TargetConfig) -> Result<(), mysql_async::Error> {
    let mut conn = Conn::new(mysql::build_opts(target)).await?;
    let _: Vec<Row> = conn.query("SELECT 1").await?;
    conn.disconnect().await?;
    Ok(())
}

async fn probe_storage_nodes(target: &TargetConfig) -> ProbeStatus {
    match count_alive_backends(target).await {
        Ok((alive, total)) if alive > 0 => {
            tracing::debug!(alive, total, "storage nodes alive");
            ProbeStatus::Ready
        }
        Ok((_, total)) => ProbeStatus::NotReady(format!("0 of {} storage nodes alive", total)),
        Err(err) => ProbeStatus::NotReady(format!("frontend unreachable: {}", err)),
    }
}

async fn count_alive_backends(target: &TargetConfig) -> Result<(usize, usize), mysql_async::Error> {
    let mut conn = Conn::new(mysql::build_opts(target)).await?;
    let rows: Vec<Row> = conn.query("SHOW BACKENDS").await?;
    let alive = rows
        .iter()
        .filter(|row| {
            matches!(
                row.get_opt::<String, _>("Alive"),
                Some(Ok(v)) if v.eq_ignore_ascii_case("true")
            )
        })
        .count();
    let total = rows.len();
    conn.disconnect().await?;
    Ok((alive, total))
}

async fn probe_mongo(target: &TargetConfig) -> ProbeStatus {
    match mongo::ping(target, MONGO_PROBE_TIMEOUT).await {
        Ok(()) => ProbeStatus::Ready,
        Err(err) => ProbeStatus::NotReady(err.to_string()),
    }
}
