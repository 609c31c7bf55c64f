use crate::{field::ModelField, helper::cell_ident};
use darling::Error as DarlingError;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, FieldsNamed, ItemStruct};

/// Expand `#[model]` on a struct.
pub fn expand(attr: TokenStream, item: TokenStream) -> Result<TokenStream, DarlingError> {
    // Phase 1: parse and reject what a table type cannot be.
    if !attr.is_empty() {
        return Err(DarlingError::custom("#[model] takes no arguments").with_span(&attr));
    }
    let mut input: ItemStruct = syn::parse2(item)?;

    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(
            DarlingError::custom("#[model] does not support generic structs")
                .with_span(&input.generics),
        );
    }

    // Phase 2: move #[field] members into the schema.
    let fields = match &mut input.fields {
        Fields::Named(named) => take_fields(named)?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(DarlingError::custom(
                "#[model] requires a struct with named fields or a unit struct",
            )
            .with_span(&input.ident));
        }
    };

    if matches!(&input.fields, Fields::Named(named) if named.named.is_empty()) {
        input.fields = Fields::Unit;
        input.semi_token = Some(Default::default());
    }

    // Phase 3: emit the struct, the Model impl and the declaration ctor.
    let ident = &input.ident;
    let name = ident.to_string();
    let cell = cell_ident(ident);
    let descriptors = fields.iter().map(ModelField::descriptor_tokens);

    Ok(quote! {
        #input

        impl ::tablekit::Model for #ident {
            const PATH: &'static str = concat!(module_path!(), "::", #name);
            const NAME: &'static str = #name;

            fn fields() -> ::std::vec::Vec<(&'static str, ::tablekit::core::model::FieldDescriptor)> {
                ::std::vec![#(#descriptors),*]
            }

            fn cell() -> &'static ::tablekit::core::db::ModelCell {
                static #cell: ::tablekit::core::db::ModelCell = ::tablekit::core::db::ModelCell::new();

                &#cell
            }
        }

        impl #ident {
            /// Lock this type's table handle, opening it on first use.
            pub fn objects() -> ::std::result::Result<::tablekit::Objects, ::tablekit::Error> {
                <Self as ::tablekit::Model>::objects()
            }
        }

        #[::tablekit::__reexports::ctor::ctor(unsafe, anonymous, crate_path = ::tablekit::__reexports::ctor)]
        fn __ctor() {
            ::tablekit::core::registry::declare::<#ident>();
        }
    })
}

// Remove #[field] members in declaration order, keeping everything else.
fn take_fields(named: &mut FieldsNamed) -> Result<Vec<ModelField>, DarlingError> {
    let mut errors = DarlingError::accumulator();
    let mut fields = Vec::new();
    let mut kept = syn::punctuated::Punctuated::new();

    for field in std::mem::take(&mut named.named) {
        match errors.handle(ModelField::from_field(&field)) {
            Some(Some(model_field)) => fields.push(model_field),
            Some(None) => kept.push(field),
            None => {}
        }
    }
    named.named = kept;

    errors.finish()?;

    Ok(fields)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(attr: TokenStream, item: TokenStream) -> Result<String, DarlingError> {
        expand(attr, item).map(|ts| ts.to_string())
    }

    #[test]
    fn field_members_are_removed_and_others_kept() {
        let out = expand_str(
            quote!(),
            quote! {
                pub struct User {
                    #[field(sql = "INTEGER PRIMARY KEY AUTOINCREMENT")]
                    id: i64,
                    #[field(sql = "VARCHAR(30)", default = "")]
                    first_name: String,
                    pub note: &'static str,
                }
            },
        )
        .unwrap();

        assert!(out.contains("pub note"));
        assert!(!out.contains("first_name : String"));
        assert!(out.contains("\"first_name\""));
        assert!(out.contains("with_default"));
        assert!(out.contains("__TABLEKIT_USER_CELL"));
    }

    #[test]
    fn fully_declared_struct_becomes_unit() {
        let out = expand_str(
            quote!(),
            quote! {
                pub struct User {
                    #[field]
                    age: i64,
                }
            },
        )
        .unwrap();

        assert!(out.starts_with("pub struct User ;"));
    }

    #[test]
    fn unit_struct_is_accepted() {
        assert!(expand_str(quote!(), quote!(struct Marker;)).is_ok());
    }

    #[test]
    fn tuple_struct_is_rejected() {
        assert!(expand_str(quote!(), quote!(struct User(i64);)).is_err());
    }

    #[test]
    fn generics_are_rejected() {
        assert!(expand_str(quote!(), quote!(struct User<T> { t: T })).is_err());
    }

    #[test]
    fn arguments_are_rejected() {
        assert!(expand_str(quote!(table = "x"), quote!(struct User;)).is_err());
    }

    #[test]
    fn every_bad_member_is_reported() {
        let err = expand(
            quote!(),
            quote! {
                struct User {
                    #[field]
                    a: std::time::Instant,
                    #[field(default = f())]
                    b: i32,
                }
            },
        )
        .unwrap_err();

        assert_eq!(err.len(), 2);
    }
}
