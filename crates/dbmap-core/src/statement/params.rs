use crate::{error::BindError, value::Value};
use std::collections::HashMap;

///
/// Params
///
/// Parameter values supplied to one execution.
///
/// None   → valid only for statements without parameters
/// Named  → looked up by exact parameter name
/// Single → a bare value for statements with exactly one parameter slot
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    Named(HashMap<String, Value>),
    Single(Value),
}

impl Params {
    /// Empty named map, to be filled with [`Params::with`].
    #[must_use]
    pub fn named() -> Self {
        Self::Named(HashMap::new())
    }

    /// Add a named value, turning any other shape into a named map.
    #[must_use]
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self {
            Self::Named(map) => map,
            Self::None | Self::Single(_) => HashMap::new(),
        };
        map.insert(name.into(), value.into());

        Self::Named(map)
    }

    /// Resolve values in declared parameter order.
    pub fn bind(&self, names: &[String]) -> Result<Vec<Value>, BindError> {
        match self {
            Self::None => {
                if names.is_empty() {
                    Ok(Vec::new())
                } else {
                    Err(BindError::MissingValues {
                        expected: names.len(),
                    })
                }
            }
            Self::Named(map) => names
                .iter()
                .map(|name| {
                    map.get(name)
                        .cloned()
                        .ok_or_else(|| BindError::MissingNamed { name: name.clone() })
                })
                .collect(),
            Self::Single(value) => {
                if value.is_null() {
                    return Err(BindError::UnsupportedValue {
                        kind: value.kind_name(),
                    });
                }
                if names.len() != 1 {
                    return Err(BindError::Arity {
                        expected: names.len(),
                    });
                }

                Ok(vec![value.clone()])
            }
        }
    }
}

impl From<()> for Params {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl From<HashMap<String, Value>> for Params {
    fn from(map: HashMap<String, Value>) -> Self {
        Self::Named(map)
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

// impl_params_single
macro_rules! impl_params_single {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl From<$type> for Params {
                fn from(value: $type) -> Self {
                    Self::Single(Value::from(value))
                }
            }
        )*
    };
}

impl_params_single!(bool, i8, i16, i32, i64, f32, f64, String, &str);
