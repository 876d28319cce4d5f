//! Parameter binding, execution and row materialization.
//!
//! Destinations are classified before anything is bound or executed; the
//! cursor is scoped to one call and is dropped on every exit path.
#[cfg(test)]
mod tests;

use crate::{
    db::registry::TableRegistry,
    driver::{ExecOutcome, RowCursor},
    error::{Error, ShapeError},
    model::{field::FieldPath, table::TableModel},
    statement::{CompiledSql, Params},
    traits::{Destination, RecordFields, RecordSink, ScalarSlot, Target},
    value::Value,
};
use tracing::debug;

/// Bind and execute a statement that returns no rows.
pub(crate) fn execute(stmt: &CompiledSql, params: &Params) -> Result<ExecOutcome, Error> {
    let values = params.bind(stmt.params())?;
    let outcome = stmt.handle().execute(&values)?;

    Ok(outcome)
}

/// Bind, run and map rows into `dest`. Returns the number of mapped rows.
pub(crate) fn query<D>(
    tables: &TableRegistry,
    stmt: &CompiledSql,
    dest: &mut D,
    params: &Params,
) -> Result<usize, Error>
where
    D: Destination + ?Sized,
{
    let target = dest.target();
    let shape = target.label();

    // record-like destinations need their table before anything runs
    let table = match &target {
        Target::Scalar(_) => None,
        Target::Record { record_type, .. } => Some(tables.get(*record_type)?),
        Target::Collection(sink) => Some(tables.get(sink.record_type())?),
    };

    let values = params.bind(stmt.params())?;
    let mut rows = stmt.handle().query(&values)?;
    let columns = rows.columns()?;

    let mapped = match (target, table) {
        (Target::Scalar(slot), _) => scan_scalar(rows.as_mut(), &columns, slot)?,
        (Target::Record { record, .. }, Some(table)) => {
            let paths = resolve_paths(table.model(), &columns)?;
            scan_record(rows.as_mut(), &columns, &paths, record)?
        }
        (Target::Collection(sink), Some(table)) => {
            let paths = resolve_paths(table.model(), &columns)?;
            scan_collection(rows.as_mut(), &columns, &paths, sink)?
        }
        (Target::Record { .. } | Target::Collection(_), None) => 0,
    };

    debug!(sql = stmt.sql(), shape, mapped, "query materialized");

    Ok(mapped)
}

// Map each result column to the storage path of its field.
fn resolve_paths<'t>(
    table: &'t TableModel,
    columns: &[String],
) -> Result<Vec<&'t FieldPath>, ShapeError> {
    columns
        .iter()
        .map(|column| {
            table
                .field(column)
                .map(|field| &field.path)
                .ok_or_else(|| ShapeError::UnmappedColumn {
                    table: table.name().to_string(),
                    column: column.clone(),
                })
        })
        .collect()
}

fn scan_scalar(
    rows: &mut dyn RowCursor,
    columns: &[String],
    slot: &mut dyn ScalarSlot,
) -> Result<usize, Error> {
    if columns.len() != 1 {
        return Err(ShapeError::ScalarColumns {
            found: columns.len(),
        }
        .into());
    }

    let Some(row) = rows.next_row()? else {
        return Ok(0);
    };
    let value = row.first().unwrap_or(&Value::Null);
    slot.assign(value).map_err(|source| ShapeError::Convert {
        column: columns[0].clone(),
        source,
    })?;

    Ok(1)
}

// Only the first row is read; the rest of the cursor is left unvisited.
fn scan_record(
    rows: &mut dyn RowCursor,
    columns: &[String],
    paths: &[&FieldPath],
    record: &mut dyn RecordFields,
) -> Result<usize, Error> {
    let Some(row) = rows.next_row()? else {
        return Ok(0);
    };
    map_row(columns, paths, &row, record)?;

    Ok(1)
}

// A failure part way through leaves the collection empty.
fn scan_collection(
    rows: &mut dyn RowCursor,
    columns: &[String],
    paths: &[&FieldPath],
    sink: &mut dyn RecordSink,
) -> Result<usize, Error> {
    sink.clear();

    let mut mapped = 0;
    let result = loop {
        let row = match rows.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => break Ok(mapped),
            Err(err) => break Err(Error::from(err)),
        };
        if let Err(err) = map_row(columns, paths, &row, sink.push_default()) {
            break Err(err.into());
        }
        mapped += 1;
    };

    if result.is_err() {
        sink.clear();
    }

    result
}

fn map_row(
    columns: &[String],
    paths: &[&FieldPath],
    row: &[Value],
    record: &mut dyn RecordFields,
) -> Result<(), ShapeError> {
    for ((column, path), value) in columns.iter().zip(paths).zip(row) {
        record
            .set_field(path, value)
            .map_err(|source| ShapeError::Convert {
                column: column.clone(),
                source,
            })?;
    }

    Ok(())
}
