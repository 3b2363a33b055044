//! Derive macro for bean-factory
//!
//! `#[derive(Bean)]` generates the accessor table a factory needs to build
//! a type from a description: a zero-argument constructor backed by
//! `Default`, and one setter per named field.
//!
//! ```rust,ignore
//! use bean_factory::{Bean, BeanDescription, BeanFactory, ConfigValue};
//! use std::sync::Arc;
//!
//! #[derive(Default, Bean)]
//! struct AccountDao;
//!
//! #[derive(Default, Bean)]
//! #[bean(name = "PetStoreService")]
//! struct PetStore {
//!     account_dao: Option<Arc<AccountDao>>,
//!     #[property(name = "maxItems")]
//!     max_items: u32,
//!     #[property(skip)]
//!     hits: std::sync::atomic::AtomicU64,
//! }
//!
//! let factory = BeanFactory::new();
//! factory.register_type::<AccountDao>();
//! factory.register_type::<PetStore>();
//! factory.register_description(BeanDescription::new("accountDao", "AccountDao"));
//! factory.register_description(
//!     BeanDescription::new("petStore", "PetStoreService")
//!         .with_property("account_dao", ConfigValue::reference("accountDao"))
//!         .with_property("maxItems", "25"),
//! );
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive `bean_factory::BeanType`.
///
/// # Attributes
///
/// - `#[bean(name = "...")]` on the struct - type name descriptions use
///   (defaults to the struct's identifier)
/// - `#[property(name = "...")]` on a field - property name (defaults to
///   the field's identifier)
/// - `#[property(skip)]` on a field - no setter; the field keeps its
///   `Default` value
///
/// Every other field's type must implement `bean_factory::FromValue`.
#[proc_macro_derive(Bean, attributes(bean, property))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = match bean_name(&input.attrs)? {
        Some(lit) => lit.value(),
        None => name.to_string(),
    };

    // Unit structs have no members; tuple structs have no names to bind.
    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Bean can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Bean can only be derived for structs",
            ));
        }
    };

    let mut setters = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = property_attr(&field.attrs)?;
        if attr.skip {
            continue;
        }

        let property = attr.name.map(|lit| lit.value()).unwrap_or_else(|| ident.to_string());
        let ty = &field.ty;
        setters.push(quote! {
            .property(#property, |bean: &mut Self, value: #ty| bean.#ident = value)
        });
    }

    Ok(quote! {
        impl #impl_generics ::bean_factory::BeanType for #name #ty_generics #where_clause {
            fn bean_class() -> ::bean_factory::BeanClass {
                ::bean_factory::BeanClass::builder::<Self>(#type_name)
                    .constructor(<Self as ::std::default::Default>::default)
                    #(#setters)*
                    .build()
            }
        }
    })
}

/// `#[bean(name = "...")]`
fn bean_name(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("bean")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
    }
    Ok(name)
}

#[derive(Default)]
struct PropertyAttr {
    name: Option<LitStr>,
    skip: bool,
}

/// `#[property(skip)]` / `#[property(name = "...")]`
fn property_attr(attrs: &[Attribute]) -> syn::Result<PropertyAttr> {
    let mut parsed = PropertyAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("property")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                parsed.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                parsed.name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `name = \"...\"`"))
            }
        })?;
    }
    if parsed.skip && parsed.name.is_some() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "a skipped field cannot be renamed",
        ));
    }
    Ok(parsed)
}
