//! Procedural macros for act-dispatch

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level input for #[derive(ActionSet)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action_set), supports(struct_named, struct_tuple))]
struct ActionSetOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<(), ActionSetField>,
}

/// Field-level attributes
#[derive(Debug, FromField)]
#[darling(attributes(action_set))]
struct ActionSetField {
    ident: Option<syn::Ident>,

    /// Clone the field unchanged instead of wiring it
    #[darling(default)]
    skip: bool,
}

/// Which `ActionSet` method a generated body calls
#[derive(Clone, Copy)]
enum Wire {
    Assign,
    Bind,
}

fn field_value(field: &ActionSetField, access: &TokenStream2, wire: Wire) -> TokenStream2 {
    if field.skip {
        return quote! { ::core::clone::Clone::clone(&self.#access) };
    }
    match wire {
        Wire::Assign => quote! { act_dispatch::ActionSet::assign_all(&self.#access, target) },
        Wire::Bind => quote! { act_dispatch::ActionSet::bind_all(&self.#access, target) },
    }
}

fn construct(fields: &darling::ast::Fields<ActionSetField>, wire: Wire) -> TokenStream2 {
    match fields.style {
        darling::ast::Style::Tuple => {
            let values = fields.iter().enumerate().map(|(i, field)| {
                let index = syn::Index::from(i);
                field_value(field, &quote! { #index }, wire)
            });
            quote! { Self(#(#values),*) }
        }
        _ => {
            let values = fields.iter().map(|field| {
                let ident = &field.ident;
                let value = field_value(field, &quote! { #ident }, wire);
                quote! { #ident: #value }
            });
            quote! { Self { #(#values),* } }
        }
    }
}

/// Derive macro for the ActionSet trait
///
/// Every field must itself implement `ActionSet` (an `ActionCreator`, a
/// `Vec` or map of them, another derived set) unless marked
/// `#[action_set(skip)]`, in which case it is cloned as is.
///
/// # Example
/// ```ignore
/// #[derive(ActionSet, Clone)]
/// struct TodoActions {
///     add: ActionCreator<String>,
///     toggle: ActionCreator<u32>,
///     #[action_set(skip)]
///     label: String,
/// }
///
/// let actions = actions.bind_all(&Target::from(&store));
/// actions.add.call("milk".into());
/// ```
#[proc_macro_derive(ActionSet, attributes(action_set))]
pub fn derive_action_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionSetOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let fields = match &opts.data {
        darling::ast::Data::Struct(fields) => fields,
        _ => {
            return syn::Error::new_spanned(&input, "ActionSet can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let assign_body = construct(fields, Wire::Assign);
    let bind_body = construct(fields, Wire::Bind);

    let expanded = quote! {
        impl #impl_generics act_dispatch::ActionSet for #name #ty_generics #where_clause {
            fn assign_all(&self, target: &act_dispatch::Target) -> Self {
                #assign_body
            }

            fn bind_all(&self, target: &act_dispatch::Target) -> Self {
                #bind_body
            }
        }
    };

    TokenStream::from(expanded)
}
