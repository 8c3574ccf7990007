use proc_macro2::TokenStream;

use super::*;
use crate::utils::{Mode, add_bounds, parse_mode};

/// Derive `Compare` for a struct or enum.
pub fn expand(input: &syn::DeriveInput) -> Result<TokenStream> {
    let (identical, shallow, deep) = match &input.data {
        syn::Data::Struct(data) => create_struct(&data.fields)?,
        syn::Data::Enum(data) => create_enum(data)?,
        syn::Data::Union(_) => bail!(input.ident, "unions cannot be compared"),
    };

    let name = &input.ident;
    let generics = add_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        #[allow(unreachable_patterns, unused_variables)]
        impl #impl_generics ::rememo::Compare for #name #ty_generics #where_clause {
            #[inline]
            fn identical(&self, other: &Self) -> bool {
                #identical
            }

            fn shallow_eq(&self, other: &Self) -> bool {
                #shallow
            }

            fn deep_eq(&self, other: &Self, walk: &mut ::rememo::Walk) -> bool {
                #deep
            }
        }
    })
}

/// A field that takes part in comparisons.
struct Field {
    member: syn::Member,
    mode: Mode,
}

/// Collect the fields with their comparison modes.
fn prepare_fields(fields: &syn::Fields) -> Result<Vec<Field>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let member = match &field.ident {
                Some(ident) => syn::Member::Named(ident.clone()),
                None => syn::Member::Unnamed(syn::Index::from(i)),
            };
            Ok(Field { member, mode: parse_mode(&field.attrs)? })
        })
        .collect()
}

/// Produce the shallow check for one pair of fields.
fn create_shallow(field: &Field, a: &TokenStream, b: &TokenStream) -> Option<TokenStream> {
    match field.mode {
        Mode::Normal => Some(quote! { ::rememo::Compare::identical(#a, #b) }),
        Mode::Deep => Some(quote! { ::rememo::deep_equals(#a, #b) }),
        Mode::Skip => None,
    }
}

/// Produce the deep check for one pair of fields.
fn create_deep(field: &Field, a: &TokenStream, b: &TokenStream) -> Option<TokenStream> {
    match field.mode {
        Mode::Skip => None,
        _ => Some(quote! { ::rememo::deep_equals_with(#a, #b, walk) }),
    }
}

/// Produce the three method bodies for a struct.
fn create_struct(fields: &syn::Fields) -> Result<(TokenStream, TokenStream, TokenStream)> {
    let fields = prepare_fields(fields)?;
    if fields.is_empty() {
        return Ok((quote! { true }, quote! { true }, quote! { true }));
    }

    let accesses: Vec<_> = fields
        .iter()
        .map(|field| {
            let member = &field.member;
            (quote! { &self.#member }, quote! { &other.#member })
        })
        .collect();

    let shallow = fields
        .iter()
        .zip(&accesses)
        .filter_map(|(field, (a, b))| create_shallow(field, a, b));

    let deep = fields
        .iter()
        .zip(&accesses)
        .filter_map(|(field, (a, b))| create_deep(field, a, b));

    Ok((
        quote! { ::core::ptr::eq(self, other) },
        quote! { true #(&& #shallow)* },
        quote! { walk.nest(|walk| true #(&& #deep)*) },
    ))
}

/// Produce the three method bodies for an enum.
fn create_enum(data: &syn::DataEnum) -> Result<(TokenStream, TokenStream, TokenStream)> {
    let mut units = vec![];
    let mut shallow_arms = vec![];
    let mut deep_arms = vec![];

    for variant in &data.variants {
        let name = &variant.ident;
        if variant.fields.is_empty() {
            let arm = quote! { (Self::#name, Self::#name) => true };
            units.push(arm.clone());
            shallow_arms.push(arm.clone());
            deep_arms.push(arm);
            continue;
        }

        let fields = prepare_fields(&variant.fields)?;
        let a: Vec<_> = (0..fields.len()).map(|i| format_ident!("__a{}", i)).collect();
        let b: Vec<_> = (0..fields.len()).map(|i| format_ident!("__b{}", i)).collect();
        let pat_a = create_pattern(name, &variant.fields, &fields, &a);
        let pat_b = create_pattern(name, &variant.fields, &fields, &b);

        let pairs: Vec<_> = a
            .iter()
            .zip(&b)
            .map(|(a, b)| (quote! { #a }, quote! { #b }))
            .collect();

        let shallow = fields
            .iter()
            .zip(&pairs)
            .filter_map(|(field, (a, b))| create_shallow(field, a, b));

        let deep = fields
            .iter()
            .zip(&pairs)
            .filter_map(|(field, (a, b))| create_deep(field, a, b));

        shallow_arms.push(quote! { (#pat_a, #pat_b) => true #(&& #shallow)* });
        deep_arms.push(quote! { (#pat_a, #pat_b) => true #(&& #deep)* });
    }

    Ok((
        quote! {
            ::core::ptr::eq(self, other) || match (self, other) {
                #(#units,)*
                _ => false,
            }
        },
        quote! {
            match (self, other) {
                #(#shallow_arms,)*
                _ => false,
            }
        },
        quote! {
            walk.nest(|walk| match (self, other) {
                #(#deep_arms,)*
                _ => false,
            })
        },
    ))
}

/// Produce a pattern binding the compared fields of a variant.
fn create_pattern(
    name: &syn::Ident,
    shape: &syn::Fields,
    fields: &[Field],
    bindings: &[syn::Ident],
) -> TokenStream {
    let bound = fields.iter().zip(bindings).map(|(field, binding)| match field.mode {
        Mode::Skip => quote! { _ },
        _ => quote! { #binding },
    });

    match shape {
        syn::Fields::Named(_) => {
            let members = fields.iter().map(|field| &field.member);
            quote! { Self::#name { #(#members: #bound),* } }
        }
        syn::Fields::Unnamed(_) => quote! { Self::#name(#(#bound),*) },
        syn::Fields::Unit => quote! { Self::#name },
    }
}
