//! Boundary to the underlying SQL client.
//!
//! dbmap never talks to an engine directly. A driver prepares statements,
//! executes them with positional values and hands back row cursors; cursors
//! release their engine-side resources when dropped.
use crate::value::Value;
use thiserror::Error as ThisError;

///
/// DriverError
///
/// Failure reported by the underlying client, carried verbatim.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
    /// Engine-specific error code, when the client exposes one.
    pub code: Option<i64>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn unsupported(what: &str) -> Self {
        Self::new(format!("{what} is not supported by this driver"))
    }
}

///
/// ExecOutcome
///
/// Execution metadata. Either figure may be unknown to the driver.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecOutcome {
    rows_affected: Option<u64>,
    last_insert_id: Option<i64>,
}

impl ExecOutcome {
    #[must_use]
    pub const fn new(rows_affected: Option<u64>, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }

    #[must_use]
    pub const fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }

    pub fn last_insert_id(&self) -> Result<i64, DriverError> {
        self.last_insert_id
            .ok_or_else(|| DriverError::unsupported("last insert id"))
    }
}

///
/// Driver
///

pub trait Driver: Send + Sync {
    fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, DriverError>;
}

///
/// DriverStatement
///
/// A prepared, engine-side statement. Dropping it releases the handle.
///

pub trait DriverStatement: Send + Sync {
    fn execute(&self, values: &[Value]) -> Result<ExecOutcome, DriverError>;

    fn query(&self, values: &[Value]) -> Result<Box<dyn RowCursor + '_>, DriverError>;
}

///
/// RowCursor
///
/// Forward-only result cursor. Dropping it closes the cursor.
///

pub trait RowCursor {
    fn columns(&self) -> Result<Vec<String>, DriverError>;

    /// Advance to the next row; `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError>;
}
