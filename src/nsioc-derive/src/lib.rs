mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::{DeriveInput, Result as SynResult};

/// Derives `nsioc::autowire::Autowire`.
///
/// Fields annotated with `#[ioc("key=value;...")]` become inject points.
/// They must be of type `Autowired<T>`. The struct-level attribute
/// `#[ioc(provides(dyn Trait, ...))]` lets the object be injected into
/// `Autowired<dyn Trait>` fields.
#[proc_macro_derive(Autowire, attributes(ioc))]
pub fn derive_autowire(item: TokenStream) -> TokenStream {
    match derive_autowire_impl(item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn derive_autowire_impl(item: TokenStream) -> SynResult<TokenStream2> {
    let input = syn::parse::<DeriveInput>(item)?;
    let provided = attrs::parse_struct_attributes(&input.attrs)?;
    let expanded = impls::expand_implementation(input, provided)?;
    Ok(expanded)
}
