
use crate::{
    db::{Db, table::Table},
    error::Error,
    model::table::TableModel,
    statement::Params,
};
use serde::Deserialize;
use std::fmt;

///
/// InsertSuffixFn
/// Text appended to the standard insert statement.
///

pub type InsertSuffixFn = fn(&TableModel) -> String;

///
/// CustomInsertFn
///
/// Replaces the generic execute + last-insert-id path. Returns the generated
/// identifier, or `None` when the engine produced none.
///

pub type CustomInsertFn = fn(&Db, &Table, &Params) -> Result<Option<i64>, Error>;

///
/// PlaceholderStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaceholderStyle {
    /// The same token for every parameter, e.g. `?`.
    Fixed(&'static str),
    /// A prefix followed by the 1-based position, e.g. `$1`, `$2`.
    Numbered(&'static str),
}

impl PlaceholderStyle {
    /// Fresh generator, one per statement.
    #[must_use]
    pub const fn sequence(self) -> Placeholders {
        Placeholders {
            style: self,
            issued: 0,
        }
    }
}

///
/// Placeholders
///
/// Unbounded generator of placeholder tokens for one statement.
///

#[derive(Clone, Debug)]
pub struct Placeholders {
    style: PlaceholderStyle,
    issued: usize,
}

impl Placeholders {
    /// Number of tokens handed out so far.
    #[must_use]
    pub const fn issued(&self) -> usize {
        self.issued
    }

    pub fn next_token(&mut self) -> String {
        self.issued += 1;

        match self.style {
            PlaceholderStyle::Fixed(token) => token.to_string(),
            PlaceholderStyle::Numbered(prefix) => format!("{prefix}{}", self.issued),
        }
    }
}

impl Iterator for Placeholders {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

///
/// Dialect
///
/// Engine-specific behaviour as an explicit capability set.
/// `placeholder` is required; the insert strategies are optional and fall
/// back to execute + driver-reported last insert id.
///

#[derive(Clone, Copy)]
pub struct Dialect {
    pub name: &'static str,
    pub placeholder: PlaceholderStyle,
    pub insert_suffix: Option<InsertSuffixFn>,
    pub custom_insert: Option<CustomInsertFn>,
}

impl Dialect {
    #[must_use]
    pub const fn postgres() -> Self {
        Self {
            name: "postgres",
            placeholder: PlaceholderStyle::Numbered("$"),
            insert_suffix: Some(returning_id),
            custom_insert: Some(insert_returning_id),
        }
    }

    #[must_use]
    pub const fn mysql() -> Self {
        Self {
            name: "mysql",
            placeholder: PlaceholderStyle::Fixed("?"),
            insert_suffix: None,
            custom_insert: None,
        }
    }

    #[must_use]
    pub const fn sqlite() -> Self {
        Self {
            name: "sqlite",
            placeholder: PlaceholderStyle::Fixed("?"),
            insert_suffix: None,
            custom_insert: None,
        }
    }

    #[must_use]
    pub const fn placeholders(&self) -> Placeholders {
        self.placeholder.sequence()
    }

    #[must_use]
    pub fn insert_suffix_for(&self, table: &TableModel) -> Option<String> {
        self.insert_suffix.map(|suffix| suffix(table))
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("placeholder", &self.placeholder)
            .field("insert_suffix", &self.insert_suffix.is_some())
            .field("custom_insert", &self.custom_insert.is_some())
            .finish()
    }
}

///
/// DialectKind
/// Config-facing dialect selector.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Postgres,
    Mysql,
    #[default]
    Sqlite,
}

impl DialectKind {
    #[must_use]
    pub const fn dialect(self) -> Dialect {
        match self {
            Self::Postgres => Dialect::postgres(),
            Self::Mysql => Dialect::mysql(),
            Self::Sqlite => Dialect::sqlite(),
        }
    }
}

// ---------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------

fn returning_id(table: &TableModel) -> String {
    format!("RETURNING {}", table.id_field().column)
}

// the identifier comes back as a one-column result row
fn insert_returning_id(db: &Db, table: &Table, params: &Params) -> Result<Option<i64>, Error> {
    let mut id = 0i64;
    let mapped = db.run_query(table.insert(), &mut id, params)?;

    Ok((mapped > 0).then_some(id))
}
