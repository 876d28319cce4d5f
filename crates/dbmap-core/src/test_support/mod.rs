pub(crate) mod records;

use crate::{
    driver::{Driver, DriverError, DriverStatement, ExecOutcome, RowCursor},
    value::Value,
};
use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::Level;

/// Run `f` with a thread-local subscriber and return what it logged at
/// `WARN` and above, without ANSI colouring.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::WARN)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap_or_else(PoisonError::into_inner).clone();

    (out, String::from_utf8_lossy(&bytes).into_owned())
}

///
/// LogBuffer
///

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

///
/// MockDriver
///
/// Scripted in-memory driver for core tests.
/// Records every prepared statement and every execution, and serves queued
/// result sets to queries in FIFO order. Clones share state, so a test can
/// keep one clone for inspection after handing the other to a `Db`.
///

#[derive(Clone, Default)]
pub(crate) struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

///
/// MockState
///

#[derive(Default)]
pub(crate) struct MockState {
    pub(crate) prepared: Vec<String>,
    pub(crate) executions: Vec<Execution>,
    pub(crate) results: VecDeque<ResultSet>,
    pub(crate) fail_prepare_on: Option<String>,
    pub(crate) fail_execute: Option<DriverError>,
    pub(crate) rows_affected: Option<u64>,
    pub(crate) last_insert_id: Option<i64>,
    pub(crate) rows_fetched: usize,
    pub(crate) cursors_opened: usize,
    pub(crate) cursors_closed: usize,
}

///
/// Execution
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Execution {
    pub(crate) sql: String,
    pub(crate) values: Vec<Value>,
    pub(crate) query: bool,
}

///
/// ResultSet
///

#[derive(Clone, Debug, Default)]
pub(crate) struct ResultSet {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub(crate) fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows,
        }
    }
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn queue(&self, columns: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        self.state().results.push_back(ResultSet::new(columns, rows));
        self
    }

    pub(crate) fn reply(&self, rows_affected: Option<u64>, last_insert_id: Option<i64>) -> &Self {
        let mut state = self.state();
        state.rows_affected = rows_affected;
        state.last_insert_id = last_insert_id;
        drop(state);

        self
    }

    pub(crate) fn fail_prepare_on(&self, fragment: &str) {
        self.state().fail_prepare_on = Some(fragment.to_string());
    }

    pub(crate) fn fail_execute(&self, err: DriverError) {
        self.state().fail_execute = Some(err);
    }

    pub(crate) fn prepared(&self) -> Vec<String> {
        self.state().prepared.clone()
    }

    pub(crate) fn executions(&self) -> Vec<Execution> {
        self.state().executions.clone()
    }

    pub(crate) fn last_execution(&self) -> Option<Execution> {
        self.state().executions.last().cloned()
    }
}

impl Driver for MockDriver {
    fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, DriverError> {
        let mut state = self.state();
        if let Some(fragment) = &state.fail_prepare_on
            && sql.contains(fragment.as_str())
        {
            return Err(DriverError::new(format!("syntax error near '{fragment}'")));
        }
        state.prepared.push(sql.to_string());

        Ok(Box::new(MockStatement {
            sql: sql.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

///
/// MockStatement
///

struct MockStatement {
    sql: String,
    state: Arc<Mutex<MockState>>,
}

impl MockStatement {
    fn record(&self, values: &[Value], query: bool) -> Result<MutexGuard<'_, MockState>, DriverError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = state.fail_execute.clone() {
            return Err(err);
        }
        state.executions.push(Execution {
            sql: self.sql.clone(),
            values: values.to_vec(),
            query,
        });

        Ok(state)
    }
}

impl DriverStatement for MockStatement {
    fn execute(&self, values: &[Value]) -> Result<ExecOutcome, DriverError> {
        let state = self.record(values, false)?;

        Ok(ExecOutcome::new(state.rows_affected, state.last_insert_id))
    }

    fn query(&self, values: &[Value]) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        let mut state = self.record(values, true)?;
        let result = state.results.pop_front().unwrap_or_default();
        state.cursors_opened += 1;

        Ok(Box::new(MockCursor {
            columns: result.columns,
            rows: result.rows.into(),
            state: Arc::clone(&self.state),
        }))
    }
}

///
/// MockCursor
///

struct MockCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    state: Arc<Mutex<MockState>>,
}

impl RowCursor for MockCursor {
    fn columns(&self) -> Result<Vec<String>, DriverError> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        let row = self.rows.pop_front();
        if row.is_some() {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .rows_fetched += 1;
        }

        Ok(row)
    }
}

impl Drop for MockCursor {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cursors_closed += 1;
    }
}
