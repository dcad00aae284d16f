//! Backend targets and connection configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default host for all backends.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default benchmark database name.
pub const DEFAULT_DATABASE: &str = "bts";

/// The query language family a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFamily {
    /// Relational engines reached over the MySQL wire protocol.
    Sql,
    /// Document stores driven by an aggregation pipeline.
    Document,
}

/// The supported backend engines.
///
/// The kind tag selects which query text variant to run and how to
/// interpret driver-specific error shapes. It is resolved once at run
/// start; all later dispatch goes through the adapter built for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// ClickHouse, via its MySQL compatibility port.
    #[value(name = "clickhouse")]
    ClickHouse,
    /// Apache Doris.
    #[value(name = "doris")]
    Doris,
    /// StarRocks.
    #[value(name = "starrocks")]
    StarRocks,
    /// TiDB.
    #[value(name = "tidb")]
    TiDb,
    /// MariaDB ColumnStore.
    #[value(name = "columnstore")]
    ColumnStore,
    /// MongoDB.
    #[value(name = "mongodb")]
    MongoDb,
}

impl BackendKind {
    /// All supported kinds, in display order.
    pub const ALL: [BackendKind; 6] = [
        BackendKind::ClickHouse,
        BackendKind::Doris,
        BackendKind::StarRocks,
        BackendKind::TiDb,
        BackendKind::ColumnStore,
        BackendKind::MongoDb,
    ];

    /// Canonical lowercase name, also the catalog override directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            BackendKind::ClickHouse => "clickhouse",
            BackendKind::Doris => "doris",
            BackendKind::StarRocks => "starrocks",
            BackendKind::TiDb => "tidb",
            BackendKind::ColumnStore => "columnstore",
            BackendKind::MongoDb => "mongodb",
        }
    }

    /// Which query language family this kind belongs to.
    pub fn family(&self) -> QueryFamily {
        match self {
            BackendKind::MongoDb => QueryFamily::Document,
            _ => QueryFamily::Sql,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Connection parameters for one backend instance under test.
///
/// Built from per-kind defaults plus explicit overrides at run start;
/// read-only thereafter. Core logic never reads process environment state.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Which engine this target is.
    pub kind: BackendKind,

    /// Hostname or IP address.
    pub host: String,

    /// Port of the engine's query interface.
    pub port: u16,

    /// Username. Empty means unauthenticated where the engine allows it.
    pub user: String,

    /// Password.
    pub password: String,

    /// Database holding the benchmark dataset.
    pub database: String,
}

impl TargetConfig {
    /// Create a target with the stock connection defaults for `kind`.
    pub fn new(kind: BackendKind) -> Self {
        let (port, user, password) = match kind {
            BackendKind::ClickHouse => (9004, "default", ""),
            BackendKind::Doris => (9030, "root", ""),
            BackendKind::StarRocks => (9030, "root", ""),
            BackendKind::TiDb => (4000, "root", ""),
            BackendKind::ColumnStore => (3306, "admin", "C0lumnStore!"),
            BackendKind::MongoDb => (27017, "", ""),
        };

        Self {
            kind,
            host: DEFAULT_HOST.to_string(),
            port,
            user: user.to_string(),
            password: password.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        let doris = TargetConfig::new(BackendKind::Doris);
        assert_eq!(doris.host, DEFAULT_HOST);
        assert_eq!(doris.port, 9030);
        assert_eq!(doris.user, "root");
        assert_eq!(doris.database, DEFAULT_DATABASE);

        let clickhouse = TargetConfig::new(BackendKind::ClickHouse);
        assert_eq!(clickhouse.port, 9004);
        assert_eq!(clickhouse.user, "default");

        let columnstore = TargetConfig::new(BackendKind::ColumnStore);
        assert_eq!(columnstore.port, 3306);
        assert_eq!(columnstore.password, "C0lumnStore!");
    }

    #[test]
    fn test_target_builder() {
        let target = TargetConfig::new(BackendKind::TiDb)
            .with_host("10.0.0.5")
            .with_port(4001)
            .with_user("bench")
            .with_password("secret")
            .with_database("bts_small");

        assert_eq!(target.host, "10.0.0.5");
        assert_eq!(target.port, 4001);
        assert_eq!(target.user, "bench");
        assert_eq!(target.password, "secret");
        assert_eq!(target.database, "bts_small");
    }

    #[test]
    fn test_family_split() {
        for kind in BackendKind::ALL {
            let family = kind.family();
            match kind {
                BackendKind::MongoDb => assert_eq!(family, QueryFamily::Document),
                _ => assert_eq!(family, QueryFamily::Sql),
            }
        }
    }

    #[test]
    fn test_display_matches_dir_name() {
        assert_eq!(BackendKind::ClickHouse.to_string(), "clickhouse");
        assert_eq!(BackendKind::ColumnStore.to_string(), "columnstore");
    }
}
