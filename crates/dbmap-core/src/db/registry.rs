use crate::{
    db::table::Table,
    error::{DeclarationError, LookupError},
    traits::RecordType,
};
use std::{any::TypeId, collections::HashMap};

///
/// TableRegistry
///
/// Record type → table. Grows only through explicit registration; nothing is
/// evicted implicitly.
///

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<TypeId, Table>,
}

impl TableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn contains(&self, record: RecordType) -> bool {
        self.tables.contains_key(&record.id)
    }

    /// Fail if `record` already has a table.
    pub fn ensure_vacant(&self, record: RecordType) -> Result<(), DeclarationError> {
        match self.tables.get(&record.id) {
            Some(table) => Err(DeclarationError::AlreadyRegistered {
                record: record.name,
                table: table.model().name().to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn insert(&mut self, table: Table) -> Result<(), DeclarationError> {
        let record = table.model().record();
        self.ensure_vacant(record)?;
        self.tables.insert(record.id, table);

        Ok(())
    }

    pub fn remove(&mut self, record: RecordType) -> Option<Table> {
        self.tables.remove(&record.id)
    }

    pub fn get(&self, record: RecordType) -> Result<&Table, LookupError> {
        self.tables
            .get(&record.id)
            .ok_or(LookupError::NotRegistered {
                record: record.name,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}
