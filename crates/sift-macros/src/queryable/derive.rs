//! Implementation of the `#[derive(Queryable)]` macro.
//!
//! Generates `Queryable::field_map()` from field annotations, plus one
//! field-identifier constant per exposed field.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    ext::IdentExt, parse_quote, spanned::Spanned, Data, DeriveInput, Error, Fields, Result,
};

use super::attrs::{parse_container_attrs, parse_field_attrs, SiftType};

/// Main implementation of the Queryable derive macro.
pub fn queryable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Queryable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Queryable can only be derived for structs",
            ))
        }
    };

    let mut registrations: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut seen = HashSet::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        // Unannotated fields are not exposed
        let Some(sift_type) = attrs.sift_type else {
            continue;
        };

        let plain_name = field_name.unraw().to_string();
        let field_id = attrs
            .rename
            .unwrap_or_else(|| container.rename_all.apply(&plain_name));
        if !seen.insert(field_id.clone()) {
            return Err(Error::new(
                field_name.span(),
                format!("duplicate field identifier '{field_id}'"),
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&plain_name));
        field_constants.push(quote! {
            /// Field identifier constant for building requests.
            pub const #const_name: &'static str = #field_id;
        });

        let registration = match sift_type {
            SiftType::Text => quote! {
                .text(#field_id, |record: &Self| ::sift::TextField::text_value(&record.#field_name))
            },
            SiftType::Integer => quote! {
                .integer(#field_id, |record: &Self| ::sift::IntegerField::integer_value(&record.#field_name))
            },
            SiftType::Float => quote! {
                .float(#field_id, |record: &Self| ::sift::FloatField::float_value(&record.#field_name))
            },
            SiftType::Bool => quote! {
                .boolean(#field_id, |record: &Self| ::sift::BoolField::bool_value(&record.#field_name))
            },
            SiftType::Timestamp => quote! {
                .timestamp(#field_id, |record: &Self| ::sift::TimestampField::timestamp_value(&record.#field_name))
            },
            SiftType::Uuid => quote! {
                .uuid(#field_id, |record: &Self| ::sift::UuidField::uuid_value(&record.#field_name))
            },
        };
        registrations.push(registration);
    }

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(Error::new(
            lifetime.span(),
            "Queryable records must be 'static, remove the lifetime parameter",
        ));
    }

    // Queryable: 'static, so every type parameter must be too
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::sift::Queryable for #struct_name #ty_generics #where_clause {
            fn field_map() -> ::sift::FieldMap<Self> {
                ::sift::FieldMap::<Self>::builder()
                    #(#registrations)*
                    .build()
            }
        }
    };

    Ok(expanded)
}

/// Convert a snake_case or camelCase name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
