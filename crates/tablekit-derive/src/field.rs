use crate::helper::{generic_arg, last_segment};
use convert_case::{Case, Casing};
use darling::{Error as DarlingError, FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Field, Ident, Lit, LitStr, Meta, Type, UnOp};

///
/// FieldArgs
/// `#[field(sql = "...", default = <literal>)]`
///

#[derive(Debug, Default, FromMeta)]
struct FieldArgs {
    #[darling(default)]
    sql: Option<LitStr>,

    #[darling(default)]
    default: Option<DefaultLit>,
}

impl FieldArgs {
    fn from_attr(attr: &Attribute) -> Result<Self, DarlingError> {
        match &attr.meta {
            Meta::Path(_) => Ok(Self::default()),
            Meta::List(list) => {
                let items = NestedMeta::parse_meta_list(list.tokens.clone())?;
                Self::from_list(&items)
            }
            Meta::NameValue(_) => {
                Err(DarlingError::custom("expected #[field] or #[field(...)]").with_span(attr))
            }
        }
    }
}

///
/// DefaultLit
/// Kept as written; the expression is bound as a parameter at insert time.
///

#[derive(Debug)]
struct DefaultLit(Expr);

impl FromMeta for DefaultLit {
    fn from_expr(expr: &Expr) -> Result<Self, DarlingError> {
        validate_default(expr)?;

        Ok(Self(expr.clone()))
    }
}

///
/// ModelField
/// One declared column, pulled out of the struct.
///

#[derive(Debug)]
pub struct ModelField {
    pub ident: Ident,
    pub sql: String,
    pub default: Option<Expr>,
}

impl ModelField {
    /// Returns `Ok(None)` for members without `#[field]`.
    pub fn from_field(field: &Field) -> Result<Option<Self>, DarlingError> {
        let mut attrs = field.attrs.iter().filter(|a| is_field_attr(a));
        let Some(attr) = attrs.next() else {
            return Ok(None);
        };
        if let Some(extra) = attrs.next() {
            return Err(DarlingError::custom("duplicate #[field] attribute").with_span(extra));
        }

        let Some(ident) = field.ident.clone() else {
            return Err(DarlingError::custom("#[field] requires a named member").with_span(field));
        };
        let args = FieldArgs::from_attr(attr)?;

        let ident_str = ident.to_string();
        if ident_str != ident_str.to_case(Case::Snake) {
            return Err(DarlingError::custom(format!(
                "field ident '{ident_str}' must be snake_case"
            ))
            .with_span(&ident));
        }

        let sql = match &args.sql {
            Some(lit) => lit.value(),
            None => infer_sql_type(&field.ty)
                .ok_or_else(|| {
                    DarlingError::custom(format!(
                        "cannot infer an SQL type for `{ident_str}`; add #[field(sql = \"...\")]"
                    ))
                    .with_span(&ident)
                })?
                .to_string(),
        };

        Ok(Some(Self {
            ident,
            sql,
            default: args.default.map(|d| d.0),
        }))
    }

    /// `("name", FieldDescriptor::new("TYPE")[.with_default(..)])`
    pub fn descriptor_tokens(&self) -> TokenStream {
        let name = self.ident.to_string();
        let sql = &self.sql;
        let default = self
            .default
            .as_ref()
            .map(|d| quote!(.with_default(#d)));

        quote! {
            (#name, ::tablekit::core::model::FieldDescriptor::new(#sql) #default)
        }
    }
}

pub fn is_field_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("field")
}

fn validate_default(expr: &Expr) -> Result<(), DarlingError> {
    let ok = match expr {
        Expr::Lit(ExprLit { lit, .. }) => matches!(
            lit,
            Lit::Str(_) | Lit::Int(_) | Lit::Float(_) | Lit::Bool(_)
        ),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => matches!(
            expr.as_ref(),
            Expr::Lit(ExprLit {
                lit: Lit::Int(_) | Lit::Float(_),
                ..
            })
        ),
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(DarlingError::custom(
            "default must be a string, integer, float or bool literal",
        )
        .with_span(expr))
    }
}

/// SQLite affinity for the Rust types that have an obvious one.
pub fn infer_sql_type(ty: &Type) -> Option<&'static str> {
    if let Type::Reference(reference) = ty {
        return match reference.elem.as_ref() {
            Type::Path(path) if path.path.is_ident("str") => Some("TEXT"),
            _ => None,
        };
    }

    let segment = last_segment(ty)?;
    match segment.ident.to_string().as_str() {
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "bool" => Some("INTEGER"),
        "f32" | "f64" => Some("REAL"),
        "String" => Some("TEXT"),
        "Vec" => match generic_arg(segment) {
            Some(inner) if last_segment(inner).is_some_and(|s| s.ident == "u8") => Some("BLOB"),
            _ => None,
        },
        "Option" => generic_arg(segment).and_then(infer_sql_type),
        _ => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(field: Field) -> Result<Option<ModelField>, DarlingError> {
        ModelField::from_field(&field)
    }

    #[test]
    fn members_without_attribute_are_skipped() {
        let field: Field = parse_quote!(pub cache: Vec<String>);

        assert!(parse(field).unwrap().is_none());
    }

    #[test]
    fn explicit_sql_and_default() {
        let field: Field = parse_quote! {
            #[field(sql = "VARCHAR(30)", default = "")]
            first_name: String
        };

        let parsed = parse(field).unwrap().unwrap();
        assert_eq!(parsed.ident, "first_name");
        assert_eq!(parsed.sql, "VARCHAR(30)");
        assert!(parsed.default.is_some());
    }

    #[test]
    fn bare_attribute_infers_sql() {
        let field: Field = parse_quote! {
            #[field]
            age: Option<i64>
        };

        assert_eq!(parse(field).unwrap().unwrap().sql, "INTEGER");
    }

    #[test]
    fn inference_table() {
        let cases: [(Type, Option<&str>); 8] = [
            (parse_quote!(u8), Some("INTEGER")),
            (parse_quote!(bool), Some("INTEGER")),
            (parse_quote!(f32), Some("REAL")),
            (parse_quote!(String), Some("TEXT")),
            (parse_quote!(&'static str), Some("TEXT")),
            (parse_quote!(Vec<u8>), Some("BLOB")),
            (parse_quote!(Option<std::string::String>), Some("TEXT")),
            (parse_quote!(u64), None),
        ];

        for (ty, expected) in cases {
            assert_eq!(infer_sql_type(&ty), expected);
        }
    }

    #[test]
    fn unmappable_type_without_sql_is_rejected() {
        let field: Field = parse_quote! {
            #[field]
            created: std::time::SystemTime
        };

        assert!(parse(field).is_err());
    }

    #[test]
    fn non_literal_default_is_rejected() {
        let field: Field = parse_quote! {
            #[field(default = make_default())]
            age: i32
        };

        assert!(parse(field).is_err());
    }

    #[test]
    fn negative_default_is_accepted() {
        let field: Field = parse_quote! {
            #[field(default = -1)]
            age: i32
        };

        assert!(parse(field).is_ok());
    }

    #[test]
    fn non_snake_case_ident_is_rejected() {
        let field: Field = parse_quote! {
            #[field]
            firstName: String
        };

        assert!(parse(field).is_err());
    }
}
