
use crate::{
    model::field::{FieldDef, ScalarKind},
    value::{Value, ValueError},
};
use std::any::TypeId;

/// ============================================================================
/// FIELD VALUES
/// ============================================================================

///
/// ScalarField
///
/// A Rust type that maps onto one column. Only these types are eligible as
/// leaf fields of a record.
///

pub trait ScalarField: Sized {
    const KIND: ScalarKind;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

// impl_scalar_int
macro_rules! impl_scalar_int {
    ( $( $type:ty => $kind:ident ),* $(,)? ) => {
        $(
            impl ScalarField for $type {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn to_value(&self) -> Value {
                    Value::Int((*self).into())
                }

                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(v) => (*v).try_into().map_err(|_| ValueError::OutOfRange {
                            value: v.to_string(),
                            target: stringify!($type),
                        }),
                        other => Err(ValueError::mismatch(stringify!($type), other)),
                    }
                }
            }
        )*
    };
}

impl_scalar_int!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
);

impl ScalarField for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    // engines without a boolean type report 0/1 integers
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Int(v) => Err(ValueError::OutOfRange {
                value: v.to_string(),
                target: "bool",
            }),
            other => Err(ValueError::mismatch("bool", other)),
        }
    }
}

impl ScalarField for f64 {
    const KIND: ScalarKind = ScalarKind::Float64;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as Self),
            other => Err(ValueError::mismatch("f64", other)),
        }
    }
}

impl ScalarField for f32 {
    const KIND: ScalarKind = ScalarKind::Float32;

    fn to_value(&self) -> Value {
        Value::Float((*self).into())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(*v as Self),
            Value::Int(v) => Ok(*v as Self),
            other => Err(ValueError::mismatch("f32", other)),
        }
    }
}

impl ScalarField for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(ValueError::mismatch("String", other)),
        }
    }
}

/// ============================================================================
/// RECORDS
/// ============================================================================

///
/// RecordFields
///
/// Path-based access to the leaf fields of a record instance.
/// A path is the index chain produced at registration; embedded records
/// consume the first index and forward the rest.
///

pub trait RecordFields {
    fn get_field(&self, path: &[usize]) -> Option<Value>;

    fn set_field(&mut self, path: &[usize], value: &Value) -> Result<(), ValueError>;
}

///
/// Record
///
/// A structural record whose layout is known statically, usually through
/// `#[derive(Record)]`.
///

pub trait Record: RecordFields + Default + 'static {
    /// Declared fields in declaration order.
    fn field_defs() -> &'static [FieldDef];

    #[must_use]
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

///
/// RecordType
/// Identity of a record type, used as the registry key.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordType {
    pub id: TypeId,
    pub name: &'static str,
}

impl RecordType {
    #[must_use]
    pub fn of<R: Record>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: R::type_name(),
        }
    }
}

/// ============================================================================
/// QUERY DESTINATIONS
/// ============================================================================

///
/// ScalarSlot
///

pub trait ScalarSlot {
    fn assign(&mut self, value: &Value) -> Result<(), ValueError>;
}

///
/// RecordSink
///
/// A growable collection of records. Every result row gets a fresh default
/// instance appended before its columns are mapped.
///

pub trait RecordSink {
    fn record_type(&self) -> RecordType;

    fn clear(&mut self);

    fn push_default(&mut self) -> &mut dyn RecordFields;
}

impl<R: Record> RecordSink for Vec<R> {
    fn record_type(&self) -> RecordType {
        RecordType::of::<R>()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> &mut dyn RecordFields {
        let index = self.len();
        self.push(R::default());

        &mut self[index]
    }
}

///
/// Target
///
/// Runtime shape of a query destination.
///

pub enum Target<'a> {
    Scalar(&'a mut dyn ScalarSlot),
    Record {
        record_type: RecordType,
        record: &'a mut dyn RecordFields,
    },
    Collection(&'a mut dyn RecordSink),
}

impl<'a> Target<'a> {
    pub fn record<R: Record>(record: &'a mut R) -> Self {
        Self::Record {
            record_type: RecordType::of::<R>(),
            record,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Record { .. } => "record",
            Self::Collection(_) => "collection",
        }
    }
}

///
/// Destination
///
/// Anything a query can write into: a supported scalar, a `Value`, a derived
/// record (first row only), or a `Vec` of records (every row).
///

pub trait Destination {
    fn target(&mut self) -> Target<'_>;

    /// Record type backing this destination, if it is record-like.
    fn record_type(&self) -> Option<RecordType> {
        None
    }
}

// impl_scalar_destination
macro_rules! impl_scalar_destination {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl ScalarSlot for $type {
                fn assign(&mut self, value: &Value) -> Result<(), ValueError> {
                    *self = <$type as ScalarField>::from_value(value)?;

                    Ok(())
                }
            }

            impl Destination for $type {
                fn target(&mut self) -> Target<'_> {
                    Target::Scalar(self)
                }
            }
        )*
    };
}

impl_scalar_destination!(bool, i8, i16, i32, i64, f32, f64, String);

impl ScalarSlot for Value {
    fn assign(&mut self, value: &Value) -> Result<(), ValueError> {
        *self = value.clone();

        Ok(())
    }
}

impl Destination for Value {
    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl<R: Record> Destination for Vec<R> {
    fn target(&mut self) -> Target<'_> {
        Target::Collection(self)
    }

    fn record_type(&self) -> Option<RecordType> {
        Some(RecordType::of::<R>())
    }
}
