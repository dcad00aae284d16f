//! The benchmark query catalog.
//!
//! A catalog directory holds a `manifest.json` listing the queries (stable
//! integer id, label, shape hint) and one subdirectory per dialect with the
//! query bodies, keyed by id:
//!
//! ```text
//! queries/
//!   manifest.json
//!   sql/1.sql            shared body for all MySQL-protocol engines
//!   clickhouse/17.sql    per-engine override
//!   mongodb/1.json       aggregation pipeline for the document backend
//! ```
//!
//! Resolution for a SQL-family target is the engine's own directory first,
//! then the shared `sql/` directory; the document family only looks in
//! `mongodb/`. A query with no variant for a target is reported as
//! `Unsupported` at run time, never as a load error.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::target::{BackendKind, QueryFamily};

/// Manifest filename inside the catalog directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Shared dialect directory for all SQL-family backends.
pub const SHARED_SQL_DIR: &str = "sql";

/// Dialect directory for the document backend.
pub const MONGO_DIR: &str = "mongodb";

/// Expected result shape of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryShape {
    /// Produces a row set.
    #[default]
    Rows,
    /// Produces a single aggregate row.
    Scalar,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: u32,
    label: String,
    #[serde(default)]
    shape: QueryShape,
}

/// One benchmark query: stable id, label, shape hint and the per-dialect
/// text bodies. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct BenchmarkQuery {
    /// Stable integer id, unique within the catalog.
    pub id: u32,
    /// Human-readable label.
    pub label: String,
    /// Expected result shape.
    pub shape: QueryShape,
    texts: BTreeMap<String, String>,
}

impl BenchmarkQuery {
    /// Resolve the query body for a backend kind, or `None` when the
    /// backend has no variant registered.
    pub fn text_for(&self, kind: BackendKind) -> Option<&str> {
        let text = match kind.family() {
            QueryFamily::Document => self.texts.get(MONGO_DIR),
            QueryFamily::Sql => self
                .texts
                .get(kind.dir_name())
                .or_else(|| self.texts.get(SHARED_SQL_DIR)),
        };
        text.map(String::as_str)
    }

    /// Dialect directories this query has a body for.
    pub fn dialects(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }
}

/// The ordered, immutable set of benchmark queries.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    queries: Vec<BenchmarkQuery>,
}

impl QueryCatalog {
    /// Load a catalog from a directory.
    ///
    /// Fails if the manifest is missing, empty, or contains duplicate ids,
    /// if a query body file is empty, or if a manifest entry has no body in
    /// any dialect directory.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(Error::Catalog(format!(
                "manifest not found at {}",
                manifest_path.display()
            )));
        }

        let mut entries: Vec<ManifestEntry> =
            serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
        if entries.is_empty() {
            return Err(Error::Catalog(format!(
                "manifest {} lists no queries",
                manifest_path.display()
            )));
        }

        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(Error::Catalog(format!("duplicate query id {}", entry.id)));
            }
        }
        entries.sort_by_key(|e| e.id);

        // Dialect directories are discovered, not configured: any
        // subdirectory of the catalog root is one.
        let mut dialect_dirs = Vec::new();
        for dir_entry in fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            if dir_entry.file_type()?.is_dir() {
                dialect_dirs.push(dir_entry.file_name().to_string_lossy().into_owned());
            }
        }
        dialect_dirs.sort();

        let mut queries = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut texts = BTreeMap::new();
            for dialect in &dialect_dirs {
                let extension = if dialect == MONGO_DIR { "json" } else { "sql" };
                let path = dir.join(dialect).join(format!("{}.{}", entry.id, extension));
                if !path.is_file() {
                    continue;
                }
                let text = fs::read_to_string(&path)?;
                if text.trim().is_empty() {
                    return Err(Error::Catalog(format!(
                        "empty query body at {}",
                        path.display()
                    )));
                }
                texts.insert(dialect.clone(), text);
            }
            if texts.is_empty() {
                return Err(Error::Catalog(format!(
                    "query {} has no text variant under {}",
                    entry.id,
                    dir.display()
                )));
            }
            queries.push(BenchmarkQuery {
                id: entry.id,
                label: entry.label,
                shape: entry.shape,
                texts,
            });
        }

        Ok(Self { queries })
    }

    /// Restrict the catalog to an explicit id selection, preserving
    /// catalog order. Requesting an id the catalog does not define is a
    /// fatal configuration error.
    pub fn subset(&self, ids: &[u32]) -> Result<Self, Error> {
        let requested: BTreeSet<u32> = ids.iter().copied().collect();
        for id in &requested {
            if !self.queries.iter().any(|q| q.id == *id) {
                return Err(Error::Catalog(format!(
                    "requested query id {} is not in the catalog",
                    id
                )));
            }
        }
        let queries = self
            .queries
            .iter()
            .filter(|q| requested.contains(&q.id))
            .cloned()
            .collect();
        Ok(Self { queries })
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterate queries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkQuery> {
        self.queries.iter()
    }

    /// Look up a query by id.
    pub fn get(&self, id: u32) -> Option<&BenchmarkQuery> {
        self.queries.iter().find(|q| q.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_catalog(dir: &Path, manifest: &str, files: &[(&str, &str)]) {
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        for (rel, body) in files {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
    }

    #[test]
    fn test_load_orders_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 3, "label": "c"}, {"id": 1, "label": "a"}, {"id": 2, "label": "b"}]"#,
            &[
                ("sql/1.sql", "SELECT 1"),
                ("sql/2.sql", "SELECT 2"),
                ("sql/3.sql", "SELECT 3"),
            ],
        );

        let catalog = QueryCatalog::load(dir.path()).unwrap();
        let ids: Vec<u32> = catalog.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.get(2).unwrap().label, "b");
    }

    #[test]
    fn test_override_beats_shared_sql() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}]"#,
            &[
                ("sql/1.sql", "SELECT 'generic'"),
                ("clickhouse/1.sql", "SELECT 'clickhouse'"),
            ],
        );

        let catalog = QueryCatalog::load(dir.path()).unwrap();
        let query = catalog.get(1).unwrap();
        assert_eq!(
            query.text_for(BackendKind::ClickHouse),
            Some("SELECT 'clickhouse'")
        );
        assert_eq!(query.text_for(BackendKind::TiDb), Some("SELECT 'generic'"));
        assert_eq!(query.text_for(BackendKind::MongoDb), None);
    }

    #[test]
    fn test_mongo_variant_resolution() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}]"#,
            &[
                ("sql/1.sql", "SELECT COUNT(*) FROM flights"),
                ("mongodb/1.json", r#"{"collection": "flights", "pipeline": []}"#),
            ],
        );

        let catalog = QueryCatalog::load(dir.path()).unwrap();
        let query = catalog.get(1).unwrap();
        assert!(query.text_for(BackendKind::MongoDb).unwrap().contains("flights"));
        assert_eq!(query.dialects().count(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}, {"id": 1, "label": "b"}]"#,
            &[("sql/1.sql", "SELECT 1")],
        );

        let err = QueryCatalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn test_missing_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}, {"id": 2, "label": "b"}]"#,
            &[("sql/1.sql", "SELECT 1")],
        );

        let err = QueryCatalog::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("query 2"));
    }

    #[test]
    fn test_empty_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}]"#,
            &[("sql/1.sql", "   \n")],
        );

        let err = QueryCatalog::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("empty query body"));
    }

    #[test]
    fn test_subset_preserves_order_and_rejects_unknown() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "a"}, {"id": 2, "label": "b"}, {"id": 3, "label": "c"}]"#,
            &[
                ("sql/1.sql", "SELECT 1"),
                ("sql/2.sql", "SELECT 2"),
                ("sql/3.sql", "SELECT 3"),
            ],
        );

        let catalog = QueryCatalog::load(dir.path()).unwrap();
        let subset = catalog.subset(&[3, 1]).unwrap();
        let ids: Vec<u32> = subset.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert!(catalog.subset(&[7]).is_err());
    }

    #[test]
    fn test_shape_hint() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            r#"[{"id": 1, "label": "total", "shape": "scalar"}, {"id": 2, "label": "rows"}]"#,
            &[("sql/1.sql", "SELECT COUNT(*) FROM flights"), ("sql/2.sql", "SELECT 1")],
        );

        let catalog = QueryCatalog::load(dir.path()).unwrap();
        assert_eq!(catalog.get(1).unwrap().shape, QueryShape::Scalar);
        assert_eq!(catalog.get(2).unwrap().shape, QueryShape::Rows);
    }
}
