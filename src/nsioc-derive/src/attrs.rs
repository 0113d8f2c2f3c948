use syn::parse::Parse;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{parenthesized, Attribute, Error as SynError, LitStr, Result as SynResult, Type};

const ATTRIBUTE: &str = "ioc";

/// Collects the types listed in `#[ioc(provides(...))]` on the struct.
pub fn parse_struct_attributes(attrs: &[Attribute]) -> SynResult<Vec<Type>> {
    let mut provided = Vec::new();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("provides") {
                return Err(meta.error("expects `#[ioc(provides(dyn Trait, ...))]`"));
            }

            let content;
            parenthesized!(content in meta.input);
            let types: Punctuated<Type, Comma> = content.parse_terminated(Type::parse, Comma)?;
            for ty in types {
                if !matches!(ty, Type::TraitObject(_)) {
                    return Err(SynError::new(
                        ty.span(),
                        "`provides(...)` expects trait objects such as `dyn Trait`",
                    ));
                }
                provided.push(ty);
            }
            Ok(())
        })?;
    }

    Ok(provided)
}

/// Returns the tag of a field, or `None` if the field has no `#[ioc(...)]`
/// attribute.
pub fn parse_field_attributes(attrs: &[Attribute]) -> SynResult<Option<LitStr>> {
    let mut res = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        let tag = attr.parse_args::<LitStr>().map_err(|err| {
            SynError::new(
                err.span(),
                "expects a tag string like `#[ioc(\"autowire=true;name=service\")]`",
            )
        })?;

        if res.is_some() {
            return Err(SynError::new(
                attr.path().span(),
                "only one `#[ioc(...)]` attribute is allowed on a field",
            ));
        }
        res = Some(tag);
    }

    Ok(res)
}
