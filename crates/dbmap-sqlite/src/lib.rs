//! SQLite driver for dbmap, backed by `rusqlite`.
//!
//! Statements are prepared through the connection's statement cache. Query
//! results are buffered as raw engine values before the connection lock is
//! released, so the returned cursor owns its rows outright; conversion into
//! dbmap values happens per row as the cursor advances.
use dbmap_core::{
    driver::{Driver, DriverError, DriverStatement, ExecOutcome, RowCursor},
    value::Value,
};
use rusqlite::{
    Connection, params_from_iter,
    types::{Value as SqlValue, ValueRef},
};
use std::{
    collections::VecDeque,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, trace};

///
/// SqliteDriver
///
/// One shared connection. Calls are serialized through a mutex.
///

#[derive(Clone)]
pub struct SqliteDriver {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDriver {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(driver_error)?;
        debug!(path = %path.display(), "opened sqlite database");

        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory().map_err(driver_error)?;
        debug!("opened in-memory sqlite database");

        Ok(Self::from_connection(conn))
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run one or more `;`-separated statements without parameters,
    /// e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DriverError> {
        lock(&self.conn).execute_batch(sql).map_err(driver_error)
    }
}

impl Driver for SqliteDriver {
    fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, DriverError> {
        // compile once up front so syntax errors surface at prepare time
        lock(&self.conn).prepare_cached(sql).map_err(driver_error)?;
        trace!(sql, "prepared sqlite statement");

        Ok(Box::new(SqliteStatement {
            conn: Arc::clone(&self.conn),
            sql: sql.to_string(),
        }))
    }
}

///
/// SqliteStatement
///

struct SqliteStatement {
    conn: Arc<Mutex<Connection>>,
    sql: String,
}

impl DriverStatement for SqliteStatement {
    fn execute(&self, values: &[Value]) -> Result<ExecOutcome, DriverError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare_cached(&self.sql).map_err(driver_error)?;
        let changed = stmt
            .execute(params_from_iter(values.iter().map(to_sql)))
            .map_err(driver_error)?;

        Ok(ExecOutcome::new(
            u64::try_from(changed).ok(),
            Some(conn.last_insert_rowid()),
        ))
    }

    fn query(&self, values: &[Value]) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare_cached(&self.sql).map_err(driver_error)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(values.iter().map(to_sql)))
            .map_err(driver_error)?;
        let mut buffered = VecDeque::new();
        while let Some(row) = rows.next().map_err(driver_error)? {
            let row = (0..columns.len())
                .map(|i| row.get::<_, SqlValue>(i))
                .collect::<Result<Vec<_>, _>>()
                .map_err(driver_error)?;
            buffered.push_back(row);
        }

        Ok(Box::new(MaterializedRows {
            columns,
            rows: buffered,
        }))
    }
}

///
/// MaterializedRows
///
/// Raw engine values, converted one row at a time as the cursor advances.
/// A row that is never fetched can never fail the query.
///

struct MaterializedRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<SqlValue>>,
}

impl RowCursor for MaterializedRows {
    fn columns(&self) -> Result<Vec<String>, DriverError> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(None);
        };

        row.iter()
            .map(|value| from_sql(ValueRef::from(value)))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Result<Value, DriverError> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::Int(v)),
        ValueRef::Real(v) => Ok(Value::Float(v)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::Text(text.to_string()))
            .map_err(|err| DriverError::new(format!("invalid utf-8 in text column: {err}"))),
        ValueRef::Blob(_) => Err(DriverError::unsupported("blob column")),
    }
}

fn driver_error(err: rusqlite::Error) -> DriverError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(i64::from(failure.extended_code)),
        _ => None,
    };
    let driver = DriverError::new(err.to_string());

    match code {
        Some(code) => driver.with_code(code),
        None => driver,
    }
}
