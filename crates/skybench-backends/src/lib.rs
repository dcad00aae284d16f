//! Connection adapters for the supported backend engines.
//!
//! Every relational engine under test (ClickHouse, Doris, StarRocks, TiDB,
//! MariaDB ColumnStore) is reached over the MySQL wire protocol through
//! one adapter; MongoDB is reached through its own driver. Both implement
//! the [`QueryExecutor`] capability from `skybench-core`, and [`Adapter`]
//! selects between them once at run start from the target's kind tag.

use std::time::Duration;

use skybench_core::error::ExecError;
use skybench_core::runner::{ExecSuccess, QueryExecutor};
use skybench_core::target::{QueryFamily, TargetConfig};

pub mod mongo;
pub mod mysql;
pub mod readiness;

pub use mongo::MongoExecutor;
pub use mysql::MySqlExecutor;

/// The connection adapter for one backend target, resolved from the kind
/// tag when the run starts.
pub enum Adapter {
    /// MySQL wire protocol (all relational engines under test).
    MySql(MySqlExecutor),
    /// MongoDB driver.
    Mongo(MongoExecutor),
}

impl Adapter {
    /// Connect to the target with the adapter its kind requires.
    ///
    /// A failure here is always fatal: the run cannot start against an
    /// unreachable engine.
    pub async fn connect(target: &TargetConfig) -> Result<Self, ExecError> {
        match target.kind.family() {
            QueryFamily::Sql => Ok(Adapter::MySql(MySqlExecutor::connect(target).await?)),
            QueryFamily::Document => Ok(Adapter::Mongo(MongoExecutor::connect(target).await?)),
        }
    }
}

impl QueryExecutor for Adapter {
    async fn execute(&mut self, text: &str, timeout: Duration) -> Result<ExecSuccess, ExecError> {
        match self {
            Adapter::MySql(executor) => executor.execute(text, timeout).await,
            Adapter::Mongo(executor) => executor.execute(text, timeout).await,
        }
    }
}
