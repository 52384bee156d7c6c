//! In-process SQLite source.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};

use super::{DataSource, SourceError};
use crate::sql::Dialect;
use crate::table::{ResultTable, Value};

/// Minimal schema the Yelp reports read from, using the default table names.
pub const YELP_SCHEMA_DDL: &str = "
CREATE TABLE businesses (
    business_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT,
    categories TEXT
);

CREATE TABLE reviews (
    user_id TEXT NOT NULL,
    business_id TEXT NOT NULL REFERENCES businesses(business_id),
    review_date TEXT,
    review_stars INTEGER,
    sentiments TEXT
);
";

/// A SQLite database queried in-process.
pub struct SqliteSource {
    conn: Connection,
    label: String,
}

impl SqliteSource {
    /// Open an existing database file read-only.
    ///
    /// `:memory:` opens an empty in-memory database instead.
    pub fn open(path: &str) -> Result<Self, SourceError> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| SourceError::Connection(format!("{}: {}", path, e)))?;
        Ok(Self {
            conn,
            label: format!("sqlite:{}", path),
        })
    }

    /// Open a writable in-memory database.
    pub fn open_in_memory() -> Result<Self, SourceError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SourceError::Connection(e.to_string()))?;
        Ok(Self {
            conn,
            label: "sqlite::memory:".to_string(),
        })
    }

    /// Run setup statements (DDL, seed rows). Not part of the read path.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SourceError> {
        self.conn.execute_batch(sql).map_err(classify)
    }
}

impl DataSource for SqliteSource {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&self, sql: &str) -> Result<ResultTable, SourceError> {
        let mut stmt = self.conn.prepare(sql).map_err(classify)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = names.len();

        let mut rows = stmt.query([]).map_err(classify)?;
        let mut data = Vec::new();
        while let Some(row) = rows.next().map_err(classify)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(to_value(row.get_ref(i).map_err(classify)?));
            }
            data.push(values);
        }

        Ok(ResultTable::from_rows(names, data)?)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Text(format!("<{} bytes>", bytes.len())),
    }
}

/// Split SQLite failures into "could not reach the data" and "bad statement".
fn classify(err: rusqlite::Error) -> SourceError {
    match err.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked,
        ) => SourceError::Connection(err.to_string()),
        _ => SourceError::Query(err.to_string()),
    }
}
