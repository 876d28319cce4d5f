use crate::{
    error::DeclarationError,
    model::field::{FieldDef, FieldModel, FieldRole},
    traits::{Record, RecordType},
};
use std::collections::BTreeMap;

///
/// TableModel
///
/// Column metadata for one registered record type.
///
/// Column enumeration order is the map order; callers must treat it as
/// arbitrary but stable for one instance.
///

#[derive(Clone, Debug)]
pub struct TableModel {
    record: RecordType,
    name: String,
    fields: BTreeMap<String, FieldModel>,
    id_field: FieldModel,
    created_field: Option<FieldModel>,
    modified_field: Option<FieldModel>,
    auto_count: usize,
}

impl TableModel {
    /// Build the model for `R` mapped onto table `name`.
    pub fn of<R: Record>(name: &str) -> Result<Self, DeclarationError> {
        Self::from_defs(RecordType::of::<R>(), name, R::field_defs())
    }

    pub fn from_defs(
        record: RecordType,
        name: &str,
        defs: &[FieldDef],
    ) -> Result<Self, DeclarationError> {
        if name.is_empty() {
            return Err(DeclarationError::EmptyTableName);
        }

        let mut fields = BTreeMap::new();
        let mut roles: [Option<FieldModel>; 3] = [None, None, None];
        let mut auto_count = 0;

        for def in defs {
            for field in FieldModel::describe(record.name, def)? {
                if fields.contains_key(&field.column) {
                    return Err(DeclarationError::DuplicateColumn {
                        record: record.name,
                        column: field.column,
                    });
                }

                if field.auto {
                    auto_count += 1;
                }

                for (slot, role) in roles
                    .iter_mut()
                    .zip([FieldRole::Id, FieldRole::Created, FieldRole::Modified])
                {
                    if !field.has_role(role) {
                        continue;
                    }
                    if slot.is_some() {
                        return Err(DeclarationError::DuplicateRole {
                            record: record.name,
                            role,
                        });
                    }
                    *slot = Some(field.clone());
                }

                fields.insert(field.column.clone(), field);
            }
        }

        if fields.is_empty() {
            return Err(DeclarationError::NoColumns {
                record: record.name,
            });
        }

        let [id_field, created_field, modified_field] = roles;
        let id_field = id_field.ok_or(DeclarationError::MissingId {
            record: record.name,
        })?;

        Ok(Self {
            record,
            name: name.to_string(),
            fields,
            id_field,
            created_field,
            modified_field,
            auto_count,
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn record(&self) -> RecordType {
        self.record
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field(&self, column: &str) -> Option<&FieldModel> {
        self.fields.get(column)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.fields.values()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn auto_count(&self) -> usize {
        self.auto_count
    }

    #[must_use]
    pub const fn id_field(&self) -> &FieldModel {
        &self.id_field
    }

    #[must_use]
    pub const fn created_field(&self) -> Option<&FieldModel> {
        self.created_field.as_ref()
    }

    #[must_use]
    pub const fn modified_field(&self) -> Option<&FieldModel> {
        self.modified_field.as_ref()
    }

    // ---------------------------------------------------------------------
    // Standard statement templates (named placeholders)
    // ---------------------------------------------------------------------

    /// `INSERT INTO t(cols) VALUES(:cols) [suffix]`, skipping auto fields.
    #[must_use]
    pub fn insert_template(&self, suffix: Option<&str>) -> String {
        let columns: Vec<&str> = self
            .fields()
            .filter(|f| !f.auto)
            .map(|f| f.column.as_str())
            .collect();
        let holders: Vec<String> = columns.iter().map(|c| named_placeholder(c)).collect();

        let mut sql = format!(
            "INSERT INTO {}({}) VALUES({})",
            self.name,
            columns.join(", "),
            holders.join(", ")
        );
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            sql.push(' ');
            sql.push_str(suffix);
        }

        sql
    }

    /// `UPDATE t SET col = :col, ... WHERE id = :id`, skipping id, auto and
    /// created fields.
    #[must_use]
    pub fn update_template(&self) -> String {
        let assignments: Vec<String> = self
            .fields()
            .filter(|f| !(f.id || f.auto || f.created))
            .map(|f| format!("{} = {}", f.column, named_placeholder(&f.column)))
            .collect();

        format!(
            "UPDATE {} SET {} WHERE {} = {}",
            self.name,
            assignments.join(", "),
            self.id_field.column,
            named_placeholder(&self.id_field.column)
        )
    }

    #[must_use]
    pub fn delete_template(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = {}",
            self.name,
            self.id_field.column,
            named_placeholder(&self.id_field.column)
        )
    }

    #[must_use]
    pub fn select_by_template(&self, column: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {column} = {}",
            self.name,
            named_placeholder(column)
        )
    }

    #[must_use]
    pub fn select_all_template(&self) -> String {
        format!("SELECT * FROM {}", self.name)
    }
}

fn named_placeholder(column: &str) -> String {
    format!(":{column}")
}
