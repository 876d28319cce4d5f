use proc_macro::TokenStream;

mod record;

/// Derive `Record`, `RecordFields` and `Destination` for a struct with named
/// fields.
///
/// Field attributes:
/// - `#[db(column = "name")]` overrides the column name
/// - `#[db(opt = "id,auto")]` carries mapping options, checked at registration
/// - `#[db(embed)]` flattens another record's columns into this one
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
