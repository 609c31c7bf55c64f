use convert_case::{Case, Casing};
use proc_macro2::Span;
use syn::{GenericArgument, Ident, PathArguments, PathSegment, Type};

// Type helpers

/// Last path segment of a plain path type (`std::string::String` → `String`).
pub fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

/// The single type argument of a segment like `Option<T>` or `Vec<T>`.
pub fn generic_arg(segment: &PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };

    match args.args.first()? {
        GenericArgument::Type(ty) if args.args.len() == 1 => Some(ty),
        _ => None,
    }
}

// Ident helpers

/// `UserProfile` → `__TABLEKIT_USER_PROFILE_CELL`
pub fn cell_ident(ident: &Ident) -> Ident {
    let upper = ident.to_string().to_case(Case::UpperSnake);

    Ident::new(&format!("__TABLEKIT_{upper}_CELL"), Span::call_site())
}
