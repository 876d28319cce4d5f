pub mod registry;
pub mod table;


use crate::{
    config::DbConfig,
    dialect::Dialect,
    driver::{Driver, ExecOutcome},
    error::{Error, LookupError, ShapeError},
    executor,
    model::{field::FieldModel, table::TableModel},
    statement::{CompiledSql, Params, Statement},
    traits::{Destination, Record, RecordFields, RecordType},
    value::{Value, ValueError},
};
use chrono::Utc;
use registry::TableRegistry;
use std::{collections::HashMap, sync::Arc};
use table::Table;
use tracing::{debug, warn};

///
/// Db
///
/// Entry point: owns the driver, the dialect and the table registry.
///
/// Registration takes `&mut self`, so it cannot overlap with live
/// statements or queries borrowed from the same handle.
///

pub struct Db {
    driver: Arc<dyn Driver>,
    dialect: Dialect,
    tables: TableRegistry,
    log_statements: bool,
}

impl Db {
    pub fn new(driver: impl Driver + 'static, dialect: Dialect) -> Self {
        Self {
            driver: Arc::new(driver),
            dialect,
            tables: TableRegistry::new(),
            log_statements: false,
        }
    }

    pub fn with_config(driver: impl Driver + 'static, config: &DbConfig) -> Self {
        Self::new(driver, config.dialect()).log_statements(config.log_statements)
    }

    #[must_use]
    pub const fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    #[must_use]
    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    #[must_use]
    pub const fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Map `R` onto `table_name` and precompile its standard statements.
    /// On failure the registry is left untouched.
    pub fn register<R: Record>(&mut self, table_name: &str) -> Result<(), Error> {
        let record = RecordType::of::<R>();
        self.tables.ensure_vacant(record)?;

        let model = TableModel::of::<R>(table_name)?;
        let table = Table::compile(model, self.driver(), &self.dialect, self.log_statements)?;
        debug!(
            record = record.name,
            table = table_name,
            columns = table.model().field_count(),
            "registered table"
        );
        self.tables.insert(table)?;

        Ok(())
    }

    /// Drop the table assigned to `R`. Returns whether one existed.
    pub fn unregister<R: Record>(&mut self) -> bool {
        let removed = self.tables.remove(RecordType::of::<R>());
        if let Some(table) = &removed {
            debug!(table = table.model().name(), "unregistered table");
        }

        removed.is_some()
    }

    #[must_use]
    pub fn is_registered<R: Record>(&self) -> bool {
        self.tables.contains(RecordType::of::<R>())
    }

    pub fn table<R: Record>(&self) -> Result<&Table, Error> {
        Ok(self.tables.get(RecordType::of::<R>())?)
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    /// Compile a template with `:name` placeholders.
    pub fn prepare(&self, template: &str) -> Result<Statement<'_>, Error> {
        let compiled = CompiledSql::compile(
            self.driver(),
            &self.dialect,
            template,
            self.log_statements,
        )?;

        Ok(Statement::new(self, Arc::new(compiled)))
    }

    /// Compile `SELECT * FROM <table> WHERE <column> = :<column>` for `R`.
    pub fn prepare_select<R: Record>(&self, column: &str) -> Result<Statement<'_>, Error> {
        let table = self.table::<R>()?;
        table.check_column(column)?;

        self.prepare(&table.model().select_by_template(column))
    }

    // ---------------------------------------------------------------------
    // Standard writes
    // ---------------------------------------------------------------------

    /// Insert `record`, then write back the generated identifier and the
    /// creation/modification timestamps.
    ///
    /// When the engine cannot report a generated identifier the insert still
    /// succeeds and the identifier field is left as it was.
    pub fn insert<R: Record>(&self, record: &mut R) -> Result<(), Error> {
        let now = Utc::now().timestamp();
        let table = self.table::<R>()?;
        let model = table.model();

        let mut values = collect_values(model, &*record)?;
        for field in [model.created_field(), model.modified_field()]
            .into_iter()
            .flatten()
        {
            values.insert(field.column.clone(), Value::Int(now));
        }
        let params = Params::Named(values);

        let id = if let Some(custom) = self.dialect.custom_insert {
            custom(self, table, &params)?
        } else {
            let outcome = executor::execute(table.insert(), &params)?;
            match outcome.last_insert_id() {
                Ok(id) => Some(id),
                Err(err) => {
                    debug!(table = model.name(), error = %err, "driver reported no insert id");
                    None
                }
            }
        };

        match id {
            Some(id) => write_back(&mut *record, model.id_field(), &Value::Int(id))?,
            None => warn!(table = model.name(), "generated id unavailable, id field left unset"),
        }
        for field in [model.created_field(), model.modified_field()]
            .into_iter()
            .flatten()
        {
            write_back(&mut *record, field, &Value::Int(now))?;
        }

        Ok(())
    }

    /// Update the row identified by `record`'s id field. The modification
    /// timestamp is refreshed both in the row and in `record`.
    pub fn update<R: Record>(&self, record: &mut R) -> Result<Option<u64>, Error> {
        let now = Utc::now().timestamp();
        let table = self.table::<R>()?;
        let model = table.model();

        let mut values = collect_values(model, &*record)?;
        if let Some(field) = model.modified_field() {
            values.insert(field.column.clone(), Value::Int(now));
        }

        let outcome = executor::execute(table.update(), &Params::Named(values))?;
        if let Some(field) = model.modified_field() {
            write_back(&mut *record, field, &Value::Int(now))?;
        }

        Ok(outcome.rows_affected())
    }

    /// Delete the row identified by `record`'s id field.
    pub fn delete<R: Record>(&self, record: &R) -> Result<Option<u64>, Error> {
        let table = self.table::<R>()?;
        let values = collect_values(table.model(), record)?;
        let outcome = executor::execute(table.delete(), &Params::Named(values))?;

        Ok(outcome.rows_affected())
    }

    // ---------------------------------------------------------------------
    // Standard reads
    // ---------------------------------------------------------------------

    /// Query `dest` by one column, reusing the table's cached statement.
    pub fn select_by<D>(
        &self,
        dest: &mut D,
        column: &str,
        value: impl Into<Params>,
    ) -> Result<usize, Error>
    where
        D: Destination + ?Sized,
    {
        let table = self.table_for(dest)?;
        let stmt = table.select_by(column, self.driver(), &self.dialect, self.log_statements)?;

        self.run_query(&stmt, dest, &value.into())
    }

    pub fn select_by_id<D>(&self, dest: &mut D, id: i64) -> Result<usize, Error>
    where
        D: Destination + ?Sized,
    {
        let column = self.table_for(dest)?.model().id_field().column.clone();

        self.select_by(dest, &column, id)
    }

    /// Load every row of `R`'s table.
    pub fn select_all<R: Record>(&self, dest: &mut Vec<R>) -> Result<usize, Error> {
        let template = self.table::<R>()?.model().select_all_template();

        self.prepare(&template)?.query(dest, ())
    }

    // ---------------------------------------------------------------------
    // Execution plumbing
    // ---------------------------------------------------------------------

    pub(crate) fn run_execute(
        &self,
        stmt: &CompiledSql,
        params: &Params,
    ) -> Result<ExecOutcome, Error> {
        executor::execute(stmt, params)
    }

    pub(crate) fn run_query<D>(
        &self,
        stmt: &CompiledSql,
        dest: &mut D,
        params: &Params,
    ) -> Result<usize, Error>
    where
        D: Destination + ?Sized,
    {
        executor::query(&self.tables, stmt, dest, params)
    }

    fn table_for<D>(&self, dest: &mut D) -> Result<&Table, Error>
    where
        D: Destination + ?Sized,
    {
        let record = match dest.record_type() {
            Some(record) => record,
            None => {
                let shape = dest.target().label();
                return Err(LookupError::NotRecordDestination { shape }.into());
            }
        };

        Ok(self.tables.get(record)?)
    }
}

// Every mapped column's current value, keyed by column name.
fn collect_values(
    model: &TableModel,
    record: &dyn RecordFields,
) -> Result<HashMap<String, Value>, ShapeError> {
    model
        .fields()
        .map(|field| {
            record
                .get_field(&field.path)
                .map(|value| (field.column.clone(), value))
                .ok_or_else(|| ShapeError::Convert {
                    column: field.column.clone(),
                    source: ValueError::NoSuchPath {
                        path: field.path.to_vec(),
                    },
                })
        })
        .collect()
}

fn write_back(
    record: &mut dyn RecordFields,
    field: &FieldModel,
    value: &Value,
) -> Result<(), ShapeError> {
    record
        .set_field(&field.path, value)
        .map_err(|source| ShapeError::Convert {
            column: field.column.clone(),
            source,
        })
}
