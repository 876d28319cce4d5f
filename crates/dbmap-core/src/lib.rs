//! Core runtime for dbmap: record traits, table models, dialects, the
//! named-parameter statement compiler and the row-mapping executor.
#![warn(unreachable_pub)]

extern crate self as dbmap;

mod macros;

// public exports are one module level down
pub mod config;
pub mod db;
pub mod dialect;
pub mod driver;
pub mod error;
mod executor;
pub mod model;
pub mod statement;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary needed to declare records and run statements.
///

pub mod prelude {
    pub use crate::{
        db::Db,
        dialect::Dialect,
        error::Error,
        statement::{Params, Statement},
        traits::{Destination, Record, RecordFields},
        value::Value,
    };
}
