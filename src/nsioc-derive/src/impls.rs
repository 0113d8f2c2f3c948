use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    parse_quote, Data, DataStruct, DeriveInput, Error as SynError, Fields, Index, LitStr, Member,
    Result as SynResult, Type,
};

use crate::attrs;

#[derive(Debug)]
struct InjectFieldData {
    member: Member,
    field_name: LitStr,
    tag: LitStr,
}

pub fn expand_implementation(input: DeriveInput, provided: Vec<Type>) -> SynResult<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(SynError::new(
            input.ident.span(),
            "`#[derive(Autowire)]` only supports structs",
        ));
    };

    let fields = parse_inject_fields(data)?;
    let self_type = &input.ident;

    let mut generics = input.generics.clone();
    generics
        .make_where_clause()
        .predicates
        .push(parse_quote! { Self: std::marker::Send + std::marker::Sync + 'static });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let inject_points = fields
        .iter()
        .map(|field| {
            let InjectFieldData {
                member,
                field_name,
                tag,
            } = field;
            quote! { nsioc::autowire::InjectPoint::new(#field_name, #tag, &self.#member), }
        })
        .collect::<TokenStream2>();

    let upcast_arms = provided
        .iter()
        .map(|ty| {
            quote! {
                if target == std::any::TypeId::of::<#ty>() {
                    return Some(std::boxed::Box::new(self as std::sync::Arc<#ty>));
                }
            }
        })
        .collect::<TokenStream2>();

    Ok(quote! {
        impl #impl_generics nsioc::autowire::Autowire for #self_type #ty_generics #where_clause {
            fn inject_points(&self) -> std::vec::Vec<nsioc::autowire::InjectPoint<'_>> {
                std::vec![#inject_points]
            }

            fn upcast(
                self: std::sync::Arc<Self>,
                target: std::any::TypeId,
            ) -> std::option::Option<
                std::boxed::Box<dyn std::any::Any + std::marker::Send + std::marker::Sync>
            > {
                if target == std::any::TypeId::of::<Self>() {
                    return Some(std::boxed::Box::new(self));
                }
                #upcast_arms
                None
            }
        }
    })
}

fn parse_inject_fields(data: &DataStruct) -> SynResult<Vec<InjectFieldData>> {
    let fields = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        Fields::Unnamed(fields) => fields.unnamed.iter().collect(),
        Fields::Unit => Vec::new(),
    };

    let mut res = Vec::new();
    for (i, field) in fields.into_iter().enumerate() {
        let Some(tag) = attrs::parse_field_attributes(&field.attrs)? else {
            continue;
        };

        let (member, field_name) = match &field.ident {
            Some(ident) => (
                Member::Named(ident.clone()),
                LitStr::new(&ident.unraw().to_string(), ident.span()),
            ),
            None => (
                Member::Unnamed(Index::from(i)),
                LitStr::new(&i.to_string(), field.span()),
            ),
        };
        res.push(InjectFieldData {
            member,
            field_name,
            tag,
        });
    }
    Ok(res)
}
