//! dbmap maps plain Rust structs onto relational tables.
//!
//! Records are declared with `#[derive(Record)]`, registered once against a
//! [`db::Db`] handle, and then inserted, updated, deleted and queried through
//! precompiled statements. Ad-hoc SQL uses `:name` placeholders that are
//! rewritten to the dialect's native tokens.
//!
//! ```ignore
//! #[derive(Default, Record)]
//! struct User {
//!     #[db(opt = "id,auto")]
//!     id: i64,
//!     name: String,
//! }
//!
//! let mut db = Db::new(driver, Dialect::sqlite());
//! db.register::<User>("users")?;
//! db.insert(&mut user)?;
//! ```

// re-exports
pub use dbmap_core::{config, db, dialect, driver, error, model, params, statement, traits, value};
pub use dbmap_derive::Record;

pub use dbmap_core::error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::Record;
    pub use dbmap_core::prelude::*;
    pub use dbmap_core::params;
}
