use dbmap_derive::Record;
use std::marker::PhantomData;

///
/// User
/// Auto id plus both timestamps, and one renamed column.
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct User {
    #[db(opt = "id, auto")]
    pub(crate) id: i64,
    pub(crate) name: String,
    #[db(column = "e_mail")]
    pub(crate) email: String,
    pub(crate) active: bool,
    #[db(opt = "created")]
    pub(crate) created: i64,
    #[db(opt = "modified")]
    pub(crate) modified: i64,
}

///
/// Address
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct Address {
    pub(crate) street: String,
    #[db(column = "zip_code")]
    pub(crate) zip: i32,
}

///
/// Customer
/// Embeds `Address`; carries a skipped field and a marker field.
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct Customer {
    #[db(opt = "id")]
    pub(crate) id: i64,
    pub(crate) name: String,
    #[db(embed)]
    pub(crate) address: Address,
    #[db(opt = "skip")]
    pub(crate) cache: Vec<u8>,
    pub(crate) marker: PhantomData<u8>,
    pub(crate) score: f64,
}

///
/// Note
/// Auto id and no timestamp columns.
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct Note {
    #[db(opt = "id,auto")]
    pub(crate) id: i64,
    pub(crate) body: String,
}
