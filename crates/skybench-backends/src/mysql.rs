//! MySQL wire protocol adapter.
//!
//! ClickHouse (via its MySQL compatibility port), Doris, StarRocks, TiDB
//! and MariaDB ColumnStore all speak this protocol, so a single adapter
//! covers every relational engine under test.

use std::time::Duration;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, Row};

use skybench_core::error::ExecError;
use skybench_core::runner::{ExecSuccess, QueryExecutor};
use skybench_core::target::TargetConfig;

/// Adapter for MySQL-protocol engines.
///
/// Owns at most one wire connection. The protocol has no portable
/// mid-query cancellation across the engines under test, so a timed-out
/// query leaves the connection with an in-flight result; the adapter
/// discards it and reopens a fresh connection before the next query.
pub struct MySqlExecutor {
    opts: Opts,
    conn: Option<Conn>,
}

impl MySqlExecutor {
    /// Connect to a MySQL-protocol target. Failure is fatal for the run.
    pub async fn connect(target: &TargetConfig) -> Result<Self, ExecError> {
        let opts = build_opts(target);
        let conn = Conn::new(opts.clone())
            .await
            .map_err(|e| ExecError::Fatal(format!("failed to connect: {}", e)))?;
        tracing::debug!(host = %target.host, port = target.port, "mysql connection established");
        Ok(Self {
            opts,
            conn: Some(conn),
        })
    }

    async fn conn(&mut self) -> Result<&mut Conn, ExecError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                tracing::debug!("reopening mysql connection");
                Conn::new(self.opts.clone())
                    .await
                    .map_err(|e| ExecError::Fatal(format!("reconnect failed: {}", e)))?
            }
        };
        Ok(self.conn.insert(conn))
    }
}

impl QueryExecutor for MySqlExecutor {
    async fn execute(&mut self, text: &str, timeout: Duration) -> Result<ExecSuccess, ExecError> {
        let conn = self.conn().await?;
        match tokio::time::timeout(timeout, run_script(conn, text)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                let err = classify(err);
                if matches!(err, ExecError::Fatal(_)) {
                    self.conn = None;
                }
                Err(err)
            }
            Err(_) => {
                // The connection still carries the abandoned query.
                self.conn = None;
                Err(ExecError::Timeout(timeout))
            }
        }
    }
}

pub(crate) fn build_opts(target: &TargetConfig) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(target.host.clone())
        .tcp_port(target.port)
        .user(Some(target.user.clone()))
        .pass(Some(target.password.clone()))
        .db_name(Some(target.database.clone()))
        .prefer_socket(false)
        .into()
}

/// Execute every `;`-separated statement in a query body, draining all
/// result sets. The row count and sample come from the last statement
/// that produced rows.
async fn run_script(conn: &mut Conn, script: &str) -> Result<ExecSuccess, mysql_async::Error> {
    let mut result = ExecSuccess::default();
    for statement in split_statements(script) {
        let rows: Vec<Row> = conn.query(statement).await?;
        if !rows.is_empty() {
            result.row_count = rows.len() as u64;
            result.sample = Some(render_row(&rows[0]));
        }
    }
    Ok(result)
}

/// Split a query body into individual statements, dropping blanks.
pub(crate) fn split_statements(script: &str) -> impl Iterator<Item = &str> {
    script.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Map a driver error onto the harness taxonomy: errors the server
/// reported for the statement are per-query failures; everything else
/// (handshake, auth, IO, protocol) means the connection is unusable.
fn classify(err: mysql_async::Error) -> ExecError {
    match err {
        mysql_async::Error::Server(ref server) => ExecError::Query(format!(
            "server error {} ({}): {}",
            server.code, server.state, server.message
        )),
        other => ExecError::Fatal(other.to_string()),
    }
}

/// Render one row as `column=value` pairs for the outcome sample.
fn render_row(row: &Row) -> String {
    row.columns_ref()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = row
                .as_ref(i)
                .map(|v| v.as_sql(true))
                .unwrap_or_else(|| "NULL".to_string());
            format!("{}={}", column.name_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements() {
        let script = "USE bts;\nSELECT COUNT(*) FROM flights;\n";
        let statements: Vec<&str> = split_statements(script).collect();
        assert_eq!(statements, vec!["USE bts", "SELECT COUNT(*) FROM flights"]);
    }

    #[test]
    fn test_split_statements_drops_blanks() {
        let statements: Vec<&str> = split_statements(" ;; SELECT 1 ; ").collect();
        assert_eq!(statements, vec!["SELECT 1"]);
    }

    #[test]
    fn test_server_error_is_per_query() {
        let err = mysql_async::Error::Server(mysql_async::ServerError {
            code: 1064,
            message: "You have an error in your SQL syntax".to_string(),
            state: "42000".to_string(),
        });
        match classify(err) {
            ExecError::Query(detail) => {
                assert!(detail.contains("1064"));
                assert!(detail.contains("SQL syntax"));
            }
            other => panic!("expected a query error, got {:?}", other),
        }
    }
}
