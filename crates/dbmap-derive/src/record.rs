use darling::{FromDeriveInput, FromField, ast::Data};
use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};
use syn::{DeriveInput, Error, Ident, Type};

///
/// RecordInput
///

#[derive(FromDeriveInput)]
#[darling(attributes(db), supports(struct_named))]
struct RecordInput {
    ident: Ident,
    generics: syn::Generics,
    data: Data<(), RecordField>,
}

///
/// RecordField
///

#[derive(FromField)]
#[darling(attributes(db))]
struct RecordField {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    column: Option<String>,

    #[darling(default)]
    opt: Option<String>,

    #[darling(default)]
    embed: bool,
}

///
/// Shape
/// How a declared field participates in path access.
///

enum Shape {
    Scalar(TokenStream),
    Marker,
    Embedded { record: bool },
    Unsupported,
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };
    let input = match RecordInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };

    if !input.generics.params.is_empty() {
        return Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        )
        .to_compile_error();
    }

    let Data::Struct(fields) = &input.data else {
        return Error::new_spanned(&input.ident, "Record can only be derived for structs")
            .to_compile_error();
    };

    let ident = &input.ident;
    let record_name = ident.to_string();

    let mut defs = Vec::new();
    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_name = field_ident.to_string();
        let index_lit = Literal::usize_unsuffixed(index);
        let type_name = type_string(&field.ty);
        let ty = &field.ty;

        let shape = classify(field);
        let kind = match &shape {
            Shape::Scalar(kind) => quote!(::dbmap::model::field::FieldKind::Scalar(#kind)),
            Shape::Embedded { record: true } => quote! {
                ::dbmap::model::field::FieldKind::Embedded {
                    type_name: #type_name,
                    layout: Some(
                        <#ty as ::dbmap::traits::Record>::field_defs
                            as fn() -> &'static [::dbmap::model::field::FieldDef],
                    ),
                }
            },
            Shape::Embedded { record: false } => quote! {
                ::dbmap::model::field::FieldKind::Embedded {
                    type_name: #type_name,
                    layout: None,
                }
            },
            Shape::Marker | Shape::Unsupported => {
                quote!(::dbmap::model::field::FieldKind::Unsupported(#type_name))
            }
        };
        let column = option_tokens(field.column.as_deref());
        let options = option_tokens(field.opt.as_deref());
        let addressable = !matches!(shape, Shape::Marker);

        defs.push(quote! {
            ::dbmap::model::field::FieldDef {
                name: #field_name,
                index: #index_lit,
                kind: #kind,
                column: #column,
                options: #options,
                addressable: #addressable,
            }
        });

        match shape {
            Shape::Scalar(_) => {
                get_arms.push(quote! {
                    [#index_lit] => Some(::dbmap::traits::ScalarField::to_value(&self.#field_ident)),
                });
                set_arms.push(quote! {
                    [#index_lit] => {
                        self.#field_ident = ::dbmap::traits::ScalarField::from_value(value)?;
                        Ok(())
                    }
                });
            }
            Shape::Embedded { record: true } => {
                get_arms.push(quote! {
                    [#index_lit, rest @ ..] if !rest.is_empty() => {
                        ::dbmap::traits::RecordFields::get_field(&self.#field_ident, rest)
                    }
                });
                set_arms.push(quote! {
                    [#index_lit, rest @ ..] if !rest.is_empty() => {
                        ::dbmap::traits::RecordFields::set_field(&mut self.#field_ident, rest, value)
                    }
                });
            }
            Shape::Embedded { record: false } | Shape::Marker | Shape::Unsupported => {}
        }
    }

    quote! {
        impl ::dbmap::traits::Record for #ident {
            fn field_defs() -> &'static [::dbmap::model::field::FieldDef] {
                const FIELDS: &[::dbmap::model::field::FieldDef] = &[#(#defs),*];

                FIELDS
            }

            fn type_name() -> &'static str {
                #record_name
            }
        }

        impl ::dbmap::traits::RecordFields for #ident {
            fn get_field(&self, path: &[usize]) -> Option<::dbmap::value::Value> {
                match path {
                    #(#get_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                path: &[usize],
                value: &::dbmap::value::Value,
            ) -> Result<(), ::dbmap::value::ValueError> {
                match path {
                    #(#set_arms)*
                    _ => Err(::dbmap::value::ValueError::NoSuchPath { path: path.to_vec() }),
                }
            }
        }

        impl ::dbmap::traits::Destination for #ident {
            fn target(&mut self) -> ::dbmap::traits::Target<'_> {
                ::dbmap::traits::Target::record(self)
            }

            fn record_type(&self) -> Option<::dbmap::traits::RecordType> {
                Some(::dbmap::traits::RecordType::of::<Self>())
            }
        }
    }
}

fn classify(field: &RecordField) -> Shape {
    let last = last_segment(&field.ty);

    if field.embed {
        // anything that is obviously not a struct can never carry a layout
        let record = match &field.ty {
            Type::Path(_) => !last.as_deref().is_some_and(|name| {
                scalar_kind(name).is_some() || matches!(name, "Option" | "Vec" | "PhantomData")
            }),
            _ => false,
        };

        return Shape::Embedded { record };
    }

    match last.as_deref() {
        Some("PhantomData") => Shape::Marker,
        Some(name) => scalar_kind(name).map_or(Shape::Unsupported, Shape::Scalar),
        None => Shape::Unsupported,
    }
}

fn scalar_kind(name: &str) -> Option<TokenStream> {
    let kind = match name {
        "String" => quote!(Text),
        "bool" => quote!(Bool),
        "i8" => quote!(Int8),
        "i16" => quote!(Int16),
        "i32" => quote!(Int32),
        "i64" => quote!(Int64),
        "f32" => quote!(Float32),
        "f64" => quote!(Float64),
        _ => return None,
    };

    Some(quote!(::dbmap::model::field::ScalarKind::#kind))
}

fn last_segment(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };

    path.path
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
}

fn type_string(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

fn option_tokens(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote!(Some(#value)),
        None => quote!(None),
    }
}
