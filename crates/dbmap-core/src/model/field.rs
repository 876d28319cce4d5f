use crate::error::DeclarationError;
use derive_more::{Deref, Display};

///
/// FieldDef
///
/// Static declaration of one struct field, as emitted by `#[derive(Record)]`.
/// Annotations are carried verbatim and interpreted at registration.
///

#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    /// Declared Rust field name.
    pub name: &'static str,
    /// Position of the field in its struct.
    pub index: usize,
    pub kind: FieldKind,
    /// `#[db(column = "...")]`; the field name is used when absent or empty.
    pub column: Option<&'static str>,
    /// `#[db(opt = "...")]`, comma-separated.
    pub options: Option<&'static str>,
    /// Marker fields (`PhantomData`) cannot hold a column value.
    pub addressable: bool,
}

///
/// FieldKind
///

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Embedded {
        type_name: &'static str,
        /// `None` when the declared type is not a structural record.
        layout: Option<fn() -> &'static [FieldDef]>,
    },
    Unsupported(&'static str),
}

///
/// ScalarKind
///
/// Storage kinds eligible for mapping.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ScalarKind {
    #[display("text")]
    Text,
    #[display("bool")]
    Bool,
    #[display("i8")]
    Int8,
    #[display("i16")]
    Int16,
    #[display("i32")]
    Int32,
    #[display("i64")]
    Int64,
    #[display("f32")]
    Float32,
    #[display("f64")]
    Float64,
}

impl ScalarKind {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }
}

///
/// FieldRole
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum FieldRole {
    #[display("id")]
    Id,
    #[display("created")]
    Created,
    #[display("modified")]
    Modified,
}

///
/// FieldOptions
///
/// Parsed form of the option annotation. Spaces are ignored.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FieldOptions {
    pub auto: bool,
    pub id: bool,
    pub created: bool,
    pub modified: bool,
    pub skip: bool,
}

impl FieldOptions {
    /// Parse a raw option string; returns the offending token on failure.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut opts = Self::default();
        if raw.is_empty() {
            return Ok(opts);
        }

        let compact = raw.replace(' ', "");
        for token in compact.split(',') {
            match token {
                "auto" => opts.auto = true,
                "id" => opts.id = true,
                "created" => opts.created = true,
                "modified" => opts.modified = true,
                "skip" => opts.skip = true,
                other => return Err(other.to_string()),
            }
        }

        Ok(opts)
    }

    const fn roles(self) -> [(FieldRole, bool); 3] {
        [
            (FieldRole::Id, self.id),
            (FieldRole::Created, self.created),
            (FieldRole::Modified, self.modified),
        ]
    }
}

///
/// FieldPath
///
/// Ordered index chain from the record root to a leaf field.
///

#[derive(Clone, Debug, Deref, Eq, Hash, PartialEq)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    #[must_use]
    pub fn leaf(index: usize) -> Self {
        Self(vec![index])
    }

    /// Prefix the path with the index of the embedding field.
    fn nest_under(&mut self, index: usize) {
        self.0.insert(0, index);
    }
}

impl From<Vec<usize>> for FieldPath {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

///
/// FieldModel
///
/// Column binding for one mapped leaf field. Immutable once built.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    pub name: &'static str,
    pub path: FieldPath,
    pub column: String,
    pub kind: ScalarKind,
    pub auto: bool,
    pub id: bool,
    pub created: bool,
    pub modified: bool,
}

impl FieldModel {
    /// Build the column bindings contributed by one declared field.
    ///
    /// Scalars yield one binding, embedded records yield one binding per
    /// mapped leaf (paths prefixed with the embedding index), and skipped or
    /// non-addressable fields yield none.
    pub fn describe(record: &'static str, def: &FieldDef) -> Result<Vec<Self>, DeclarationError> {
        if !def.addressable {
            return Ok(Vec::new());
        }

        let opts = FieldOptions::parse(def.options.unwrap_or_default()).map_err(|option| {
            DeclarationError::UnknownOption {
                record,
                field: def.name,
                option,
            }
        })?;
        if opts.skip {
            return Ok(Vec::new());
        }

        match def.kind {
            FieldKind::Scalar(kind) => Self::scalar(record, def, kind, opts).map(|f| vec![f]),
            FieldKind::Embedded { type_name, layout } => {
                let layout = layout.ok_or(DeclarationError::EmbeddedNotRecord {
                    record,
                    field: def.name,
                    type_name,
                })?;

                let mut fields = Vec::new();
                for sub in layout() {
                    for mut field in Self::describe(record, sub)? {
                        field.path.nest_under(def.index);
                        fields.push(field);
                    }
                }

                Ok(fields)
            }
            FieldKind::Unsupported(type_name) => Err(DeclarationError::UnsupportedFieldType {
                record,
                field: def.name,
                type_name,
            }),
        }
    }

    fn scalar(
        record: &'static str,
        def: &FieldDef,
        kind: ScalarKind,
        opts: FieldOptions,
    ) -> Result<Self, DeclarationError> {
        // role fields are written back from integer timestamps and generated ids
        if !kind.is_integer()
            && let Some((role, _)) = opts.roles().into_iter().find(|(_, set)| *set)
        {
            return Err(DeclarationError::RoleNotInteger {
                record,
                field: def.name,
                role,
            });
        }

        let column = def
            .column
            .filter(|c| !c.is_empty())
            .unwrap_or(def.name)
            .to_string();

        Ok(Self {
            name: def.name,
            path: FieldPath::leaf(def.index),
            column,
            kind,
            auto: opts.auto,
            id: opts.id,
            created: opts.created,
            modified: opts.modified,
        })
    }

    #[must_use]
    pub const fn has_role(&self, role: FieldRole) -> bool {
        match role {
            FieldRole::Id => self.id,
            FieldRole::Created => self.created,
            FieldRole::Modified => self.modified,
        }
    }
}
