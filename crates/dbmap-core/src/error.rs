use crate::{driver::DriverError, model::field::FieldRole, value::ValueError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error returned by every public operation.
/// Each variant wraps the category-specific detail; the rendered message
/// always carries the `dbmap:` prefix.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("dbmap: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("dbmap: {0}")]
    Lookup(#[from] LookupError),

    #[error("dbmap: {0}")]
    Compile(#[from] CompileError),

    #[error("dbmap: {0}")]
    Bind(#[from] BindError),

    #[error("dbmap: {0}")]
    Execution(#[from] DriverError),

    #[error("dbmap: {0}")]
    Shape(#[from] ShapeError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Declaration(_) => ErrorClass::Declaration,
            Self::Lookup(_) => ErrorClass::Lookup,
            Self::Compile(_) => ErrorClass::Compilation,
            Self::Bind(_) => ErrorClass::Binding,
            Self::Execution(_) => ErrorClass::Execution,
            Self::Shape(_) => ErrorClass::Shape,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// ErrorClass
/// Error taxonomy used for classification in logs and tests.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Declaration,
    Lookup,
    Compilation,
    Binding,
    Execution,
    Shape,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Declaration => "declaration",
            Self::Lookup => "lookup",
            Self::Compilation => "compilation",
            Self::Binding => "binding",
            Self::Execution => "execution",
            Self::Shape => "shape",
        };
        write!(f, "{label}")
    }
}

///
/// DeclarationError
///
/// Malformed record-to-table mapping. Raised at registration only.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum DeclarationError {
    #[error("table name cannot be an empty string")]
    EmptyTableName,

    #[error("type '{record}' already has assigned table name '{table}'")]
    AlreadyRegistered { record: &'static str, table: String },

    #[error("field '{field}' of record type '{record}' has unsupported type '{type_name}'")]
    UnsupportedFieldType {
        record: &'static str,
        field: &'static str,
        type_name: &'static str,
    },

    #[error(
        "embedded field '{field}' of record type '{record}' has type '{type_name}', only records can be embedded"
    )]
    EmbeddedNotRecord {
        record: &'static str,
        field: &'static str,
        type_name: &'static str,
    },

    #[error("unknown option '{option}' for field '{field}' in record type '{record}'")]
    UnknownOption {
        record: &'static str,
        field: &'static str,
        option: String,
    },

    #[error("field '{field}' of record type '{record}' has option '{role}' but is not an integer")]
    RoleNotInteger {
        record: &'static str,
        field: &'static str,
        role: FieldRole,
    },

    #[error(
        "attempt to define several fields with the same column name '{column}' in record type '{record}'"
    )]
    DuplicateColumn { record: &'static str, column: String },

    #[error("attempt to define several fields with '{role}' option in record type '{record}'")]
    DuplicateRole {
        record: &'static str,
        role: FieldRole,
    },

    #[error("record type '{record}' has no mapped fields")]
    NoColumns { record: &'static str },

    #[error("record type '{record}' has no field with option 'id'")]
    MissingId { record: &'static str },
}

///
/// LookupError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum LookupError {
    #[error("type '{record}' has no assigned table")]
    NotRegistered { record: &'static str },

    #[error("{shape} destination has no record type to look a table up by")]
    NotRecordDestination { shape: &'static str },

    #[error("record type '{record}' has no field assigned to column '{column}' of table '{table}'")]
    UnknownColumn {
        record: &'static str,
        table: String,
        column: String,
    },
}

///
/// CompileError
///

#[derive(Debug, ThisError)]
pub enum CompileError {
    #[error("wrong parameter placeholder: '{token}'")]
    EmptyParameter { token: String },

    #[error("prepare failed: {0}")]
    Prepare(#[source] DriverError),
}

///
/// BindError
///
/// Raised before any statement execution, so no partial side effects occur.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("values for all {expected} parameters are missing")]
    MissingValues { expected: usize },

    #[error("value for parameter '{name}' is missing")]
    MissingNamed { name: String },

    #[error("single value supplied but statement declares {expected} parameters")]
    Arity { expected: usize },

    #[error("unsupported parameter value type '{kind}'")]
    UnsupportedValue { kind: &'static str },
}

///
/// ShapeError
///

#[derive(Debug, ThisError)]
pub enum ShapeError {
    #[error("column '{column}' has no field in table '{table}'")]
    UnmappedColumn { table: String, column: String },

    #[error("scalar destination expects exactly one column, found {found}")]
    ScalarColumns { found: usize },

    #[error("cannot scan column '{column}': {source}")]
    Convert {
        column: String,
        #[source]
        source: ValueError,
    },
}
