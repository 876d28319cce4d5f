//! Runtime data model definitions.
//!
//! `field` turns the static layout emitted by `#[derive(Record)]` into column
//! bindings; `table` aggregates them into the per-type table model and renders
//! the standard statement templates.
//!
//! In general:
//! - the derive defines *what is declared*
//! - `model` defines *what is mapped*
pub mod field;
pub mod table;
