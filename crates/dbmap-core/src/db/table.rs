use crate::{
    dialect::Dialect,
    driver::Driver,
    error::{Error, LookupError},
    model::table::TableModel,
    statement::CompiledSql,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

///
/// Table
///
/// A table model plus its precompiled standard statements.
/// The select-by-column cache is the only part that changes after
/// construction: entries are added on first use and never evicted.
///

#[derive(Debug)]
pub struct Table {
    model: TableModel,
    insert: CompiledSql,
    update: CompiledSql,
    delete: CompiledSql,
    select_by: Mutex<HashMap<String, Arc<CompiledSql>>>,
}

impl Table {
    /// Compile the insert, update and delete statements for `model`.
    pub(crate) fn compile(
        model: TableModel,
        driver: &dyn Driver,
        dialect: &Dialect,
        log_statements: bool,
    ) -> Result<Self, Error> {
        let suffix = dialect.insert_suffix_for(&model);
        let insert = CompiledSql::compile(
            driver,
            dialect,
            &model.insert_template(suffix.as_deref()),
            log_statements,
        )?;
        let update =
            CompiledSql::compile(driver, dialect, &model.update_template(), log_statements)?;
        let delete =
            CompiledSql::compile(driver, dialect, &model.delete_template(), log_statements)?;

        Ok(Self {
            model,
            insert,
            update,
            delete,
            select_by: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub const fn model(&self) -> &TableModel {
        &self.model
    }

    #[must_use]
    pub const fn insert(&self) -> &CompiledSql {
        &self.insert
    }

    #[must_use]
    pub const fn update(&self) -> &CompiledSql {
        &self.update
    }

    #[must_use]
    pub const fn delete(&self) -> &CompiledSql {
        &self.delete
    }

    /// Number of cached select-by-column statements.
    #[must_use]
    pub fn cached_selects(&self) -> usize {
        self.select_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Cached `SELECT * ... WHERE column = :column`, compiled on first use.
    pub(crate) fn select_by(
        &self,
        column: &str,
        driver: &dyn Driver,
        dialect: &Dialect,
        log_statements: bool,
    ) -> Result<Arc<CompiledSql>, Error> {
        self.check_column(column)?;

        let mut cache = self
            .select_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(stmt) = cache.get(column) {
            return Ok(Arc::clone(stmt));
        }

        let stmt = Arc::new(CompiledSql::compile(
            driver,
            dialect,
            &self.model.select_by_template(column),
            log_statements,
        )?);
        cache.insert(column.to_string(), Arc::clone(&stmt));

        Ok(stmt)
    }

    pub(crate) fn check_column(&self, column: &str) -> Result<(), LookupError> {
        if self.model.field(column).is_some() {
            Ok(())
        } else {
            Err(LookupError::UnknownColumn {
                record: self.model.record().name,
                table: self.model.name().to_string(),
                column: column.to_string(),
            })
        }
    }
}
