//! Shared test utilities for integration tests

#![allow(dead_code)]

use factslice::{
    parser, CancelToken, Engine, EngineConfig, FactModel, FactStore, SqlQuery, SqliteStore, StoreConfig,
    StoreError, Value,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> EngineConfig {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

pub fn clinic_model() -> FactModel {
    load_fixture("clinic.yaml").model
}

// =============================================================================
// Fact rows
// =============================================================================

/// One billed procedure
#[derive(Debug, Clone)]
pub struct Visit {
    pub date: String,
    pub year: i64,
    pub month: i64,
    pub professional: Option<String>,
    pub specialty: Option<String>,
    pub payment_method: Option<String>,
    pub procedure: Option<String>,
    pub segment: Option<String>,
    pub value: f64,
    pub item: String,
    pub id: String,
}

impl Visit {
    /// A row dated `date` (YYYY-MM-DD) for visit `id`
    pub fn new(date: &str, id: &str, value: f64) -> Self {
        let year = date[0..4].parse().unwrap();
        let month = date[5..7].parse().unwrap();
        Self {
            date: date.to_string(),
            year,
            month,
            professional: Some("Dr A".to_string()),
            specialty: Some("General".to_string()),
            payment_method: Some("Card".to_string()),
            procedure: Some("Consultation".to_string()),
            segment: Some("Private".to_string()),
            value,
            item: format!("{}-1", id),
            id: id.to_string(),
        }
    }

    pub fn professional(mut self, name: Option<&str>) -> Self {
        self.professional = name.map(str::to_string);
        self
    }

    pub fn payment(mut self, method: Option<&str>) -> Self {
        self.payment_method = method.map(str::to_string);
        self
    }

    pub fn procedure(mut self, name: Option<&str>) -> Self {
        self.procedure = name.map(str::to_string);
        self
    }

    pub fn segment(mut self, segment: Option<&str>) -> Self {
        self.segment = segment.map(str::to_string);
        self
    }

    pub fn item(mut self, item: &str) -> Self {
        self.item = item.to_string();
        self
    }
}

/// The three-row scenario: (2023, 100, #1), (2023, 50, #2), (2024, 80, #3)
pub fn scenario_rows() -> Vec<Visit> {
    vec![
        Visit::new("2023-03-10", "#1", 100.0),
        Visit::new("2023-07-02", "#2", 50.0),
        Visit::new("2024-01-15", "#3", 80.0),
    ]
}

/// Create the fact table at `path` and insert `rows`
pub fn seed(path: &Path, rows: &[Visit]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE visits (
            visit_date TEXT,
            visit_year INTEGER,
            visit_month INTEGER,
            professional TEXT,
            specialty TEXT,
            payment_method TEXT,
            procedure_name TEXT,
            segment TEXT,
            amount REAL,
            item TEXT,
            visit_code TEXT
        );",
    )
    .unwrap();
    for r in rows {
        conn.execute(
            "INSERT INTO visits VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                r.date,
                r.year,
                r.month,
                r.professional,
                r.specialty,
                r.payment_method,
                r.procedure,
                r.segment,
                r.value,
                r.item,
                r.id
            ],
        )
        .unwrap();
    }
}

// =============================================================================
// Engines
// =============================================================================

/// A seeded database and an engine over it; the directory lives as long as this
pub struct Fixture {
    pub dir: TempDir,
    pub engine: Engine,
    pub store: Arc<CountingStore>,
}

impl Fixture {
    pub fn store_calls(&self) -> usize {
        self.store.calls()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("clinic.db")
    }

    /// Run one write statement against the seeded database
    pub fn execute(&self, sql: &str, params: impl rusqlite::Params) {
        let conn = Connection::open(self.db_path()).unwrap();
        conn.execute(sql, params).unwrap();
    }
}

pub fn engine_with_rows(rows: &[Visit]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");
    seed(&path, rows);
    let mut config = load_fixture("clinic.yaml");
    config.store = StoreConfig::new(&path);
    let store = Arc::new(CountingStore::new(SqliteStore::open(&config.store)));
    let engine = Engine::new(config.model, store.clone()).unwrap();
    Fixture { dir, engine, store }
}

/// Wraps a store and counts round trips
pub struct CountingStore {
    inner: Box<dyn FactStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: impl FactStore + 'static) -> Self {
        Self { inner: Box::new(inner), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FactStore for CountingStore {
    fn execute(&self, query: &SqlQuery, token: &CancelToken) -> Result<Vec<Vec<Value>>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(query, token)
    }
}

/// Collect one column of a table as owned values
pub fn column(table: &factslice::ResultTable, name: &str) -> Vec<Value> {
    table
        .column(name)
        .unwrap_or_else(|| panic!("missing column {}", name))
        .into_iter()
        .cloned()
        .collect()
}
