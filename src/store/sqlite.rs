//! SQLite fact store

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::cancel::CancelToken;
use super::error::StoreError;
use super::pool::{ManageConnection, Pool};
use super::FactStore;
use crate::emitter::SqlQuery;
use crate::model::StoreConfig;
use crate::plan::Param;
use crate::result::Value;

/// Virtual machine steps between cancellation checks
const PROGRESS_STEPS: i32 = 1_000;

/// Opens read-only connections to one database file
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout: Duration::from_secs(5) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManageConnection for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).map(|_| ())
    }

    /// A connection left inside a transaction is not reusable
    fn has_broken(&self, conn: &mut Connection) -> bool {
        !conn.is_autocommit()
    }
}

/// Failures a new connection may not hit
fn is_stale(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::CannotOpen | ErrorCode::SystemIoFailure | ErrorCode::NotADatabase)
    )
}

fn classify(err: rusqlite::Error, token: &CancelToken) -> StoreError {
    if token.is_cancelled() || err.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
        StoreError::Cancelled
    } else if is_stale(&err) {
        StoreError::Stale(Box::new(err))
    } else {
        StoreError::Query(Box::new(err))
    }
}

fn bind(param: &Param) -> SqlValue {
    match param {
        Param::Int(i) => SqlValue::Integer(*i),
        Param::Float(f) => SqlValue::Real(*f),
        Param::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn read(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn run_query(conn: &Connection, query: &SqlQuery, token: &CancelToken) -> Result<Vec<Vec<Value>>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(&query.sql)?;
    let column_count = stmt.column_count();
    let params: Vec<SqlValue> = query.params.iter().map(bind).collect();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(read(row.get_ref(i)?));
        }
        out.push(values);
        if token.is_cancelled() {
            return Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
                None,
            ));
        }
    }
    Ok(out)
}

/// Fact store backed by a pool of SQLite connections
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteManager>,
}

impl SqliteStore {
    /// Build the pool; connections are opened on first use
    pub fn open(config: &StoreConfig) -> Self {
        Self::with_pool(Pool::new(
            SqliteManager::new(&config.path),
            config.pool_size,
            config.checkout_timeout(),
        ))
    }

    pub fn with_pool(pool: Pool<SqliteManager>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<SqliteManager> {
        &self.pool
    }
}

impl FactStore for SqliteStore {
    fn execute(&self, query: &SqlQuery, token: &CancelToken) -> Result<Vec<Vec<Value>>, StoreError> {
        if token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        debug!(sql = %query.sql, params = query.params.len(), "executing");
        self.pool.run(|conn| {
            let watcher = token.clone();
            conn.progress_handler(PROGRESS_STEPS, Some(move || watcher.is_cancelled()));
            let result = run_query(conn, query, token);
            conn.progress_handler(0, None::<fn() -> bool>);
            result.map_err(|e| classify(e, token))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FactStore;

    fn seeded() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE t (k TEXT, v REAL);
             INSERT INTO t VALUES ('a', 1.5), ('b', 2.0), (NULL, 3.0);",
        )
        .unwrap();
        let store = SqliteStore::open(&StoreConfig::new(&path));
        (dir, store)
    }

    #[test]
    fn test_binds_params_and_reads_values() {
        let (_dir, store) = seeded();
        let query = SqlQuery {
            sql: "SELECT k, v FROM t WHERE v >= ?1 ORDER BY v".to_string(),
            params: vec![Param::Float(2.0)],
        };
        let rows = store.execute(&query, &CancelToken::new()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Text("b".into()), Value::Float(2.0)],
                vec![Value::Null, Value::Float(3.0)],
            ]
        );
    }

    #[test]
    fn test_cancelled_token_never_runs() {
        let (_dir, store) = seeded();
        let token = CancelToken::new();
        token.cancel();
        let query = SqlQuery { sql: "SELECT 1".to_string(), params: vec![] };
        assert!(matches!(store.execute(&query, &token), Err(StoreError::Cancelled)));
    }

    #[test]
    fn test_long_query_is_interrupted() {
        let (_dir, store) = seeded();
        let query = SqlQuery {
            sql: "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n) SELECT COUNT(*) FROM n".to_string(),
            params: vec![],
        };
        let token = CancelToken::with_timeout(Duration::from_millis(50));
        assert!(matches!(store.execute(&query, &token), Err(StoreError::Cancelled)));
        let rows = store
            .execute(&SqlQuery { sql: "SELECT COUNT(*) FROM t".into(), params: vec![] }, &CancelToken::new())
            .unwrap();
        assert_eq!(rows, vec![vec![Value::Int(3)]]);
    }

    #[test]
    fn test_syntax_error_is_query_error() {
        let (_dir, store) = seeded();
        let query = SqlQuery { sql: "SELEC nothing".to_string(), params: vec![] };
        assert!(matches!(store.execute(&query, &CancelToken::new()), Err(StoreError::Query(_))));
    }

    #[test]
    fn test_missing_file_fails_to_connect() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&StoreConfig::new(dir.path().join("absent.db")));
        let query = SqlQuery { sql: "SELECT 1".to_string(), params: vec![] };
        assert!(matches!(store.execute(&query, &CancelToken::new()), Err(StoreError::Connect(_))));
    }
}
