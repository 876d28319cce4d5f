//! Named-parameter statement compiler.
//!
//! Templates use `:name` placeholders. A placeholder runs from the marker up
//! to the next comma, whitespace or closing parenthesis. Every occurrence is
//! rewritten in place to the dialect's next native token and its name is
//! appended to the parameter list, so the list and the positional tokens
//! always line up; repeated names get one slot per occurrence.
mod params;


pub use params::Params;

use crate::{
    db::Db,
    dialect::{Dialect, Placeholders},
    driver::{Driver, DriverStatement},
    error::{CompileError, Error},
    traits::Destination,
};
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

const PARAM_MARKER: char = ':';

/// Rewrite named placeholders into native tokens.
///
/// Returns the rewritten SQL and the parameter names in placeholder order.
pub fn rewrite(
    template: &str,
    placeholders: &mut Placeholders,
) -> Result<(String, Vec<String>), CompileError> {
    let mut sql = String::with_capacity(template.len());
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(PARAM_MARKER) {
        sql.push_str(&rest[..start]);

        let after = &rest[start + PARAM_MARKER.len_utf8()..];
        let len = after
            .find(|c: char| c == ',' || c == ')' || c.is_whitespace())
            .unwrap_or(after.len());
        let name = &after[..len];
        if name.is_empty() {
            return Err(CompileError::EmptyParameter {
                token: PARAM_MARKER.to_string(),
            });
        }

        sql.push_str(&placeholders.next_token());
        names.push(name.to_string());
        rest = &after[len..];
    }
    sql.push_str(rest);

    Ok((sql, names))
}

///
/// CompiledSql
///
/// Rewritten SQL, its ordered parameter names and the driver handle.
/// Dropping it closes the driver-side statement.
///

pub struct CompiledSql {
    sql: String,
    params: Vec<String>,
    handle: Box<dyn DriverStatement>,
}

impl CompiledSql {
    pub(crate) fn compile(
        driver: &dyn Driver,
        dialect: &Dialect,
        template: &str,
        log_statements: bool,
    ) -> Result<Self, Error> {
        let (sql, params) = rewrite(template, &mut dialect.placeholders())?;
        let handle = driver.prepare(&sql).map_err(CompileError::Prepare)?;

        if log_statements {
            debug!(dialect = dialect.name, sql = %sql, params = ?params, "compiled statement");
        } else {
            trace!(dialect = dialect.name, sql = %sql, params = ?params, "compiled statement");
        }

        Ok(Self {
            sql,
            params,
            handle,
        })
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub(crate) fn handle(&self) -> &dyn DriverStatement {
        self.handle.as_ref()
    }
}

impl fmt::Debug for CompiledSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSql")
            .field("sql", &self.sql)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

///
/// Statement
///
/// A compiled statement bound to the `Db` that prepared it. The borrow
/// keeps registry mutation out while statements are alive.
///

#[derive(Clone)]
pub struct Statement<'db> {
    db: &'db Db,
    compiled: Arc<CompiledSql>,
}

impl<'db> Statement<'db> {
    pub(crate) const fn new(db: &'db Db, compiled: Arc<CompiledSql>) -> Self {
        Self { db, compiled }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        self.compiled.sql()
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        self.compiled.params()
    }

    /// Execute without result rows; returns affected rows when known.
    pub fn exec(&self, params: impl Into<Params>) -> Result<Option<u64>, Error> {
        let outcome = self.db.run_execute(&self.compiled, &params.into())?;

        Ok(outcome.rows_affected())
    }

    /// Run the query and map rows into `dest`; returns the mapped row count.
    pub fn query<D>(&self, dest: &mut D, params: impl Into<Params>) -> Result<usize, Error>
    where
        D: Destination + ?Sized,
    {
        self.db.run_query(&self.compiled, dest, &params.into())
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Statement").field(&self.compiled).finish()
    }
}
