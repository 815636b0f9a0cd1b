//! Procedural macros for Strata. Not intended to be used directly; pulled
//! in through the `strata` crate's re-export.

mod decode_method;
mod decode_options;
mod decode_results;
mod emit;

use decode_method::decode_statement;
use decode_options::decode_options;
use decode_results::decode_results;
use emit::{DecodedMethod, emit_method, strip_helper_attrs};
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemTrait, TraitItem, parse_macro_input};

/// Turns a plain trait into a mapper: a set of SQL-backed methods MyBatis
/// would express as a `<mapper>` XML file or an annotated Java interface.
///
/// ```ignore
/// #[strata_macros::mapper]
/// pub trait UserMapper {
///     #[select(id = "findById", sql = "SELECT * FROM users WHERE id = #{id}")]
///     async fn find_by_id(&self, id: i64) -> strata_core::Result<Option<User>>;
/// }
/// ```
///
/// Expands to the trait with its helper attributes stripped, a blanket
/// `impl<C: RawExecutor> UserMapper for ::strata::session::Session<C>` that
/// dispatches each method through the session's generic statement
/// executor, and an `AnnotatedMapper` impl the registry uses to discover
/// the statements at startup without parsing any XML.
#[proc_macro_attribute]
pub fn mapper(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        panic!("#[mapper] takes no arguments");
    }
    let mut item_trait = parse_macro_input!(item as ItemTrait);
    let trait_name = &item_trait.ident;

    let decoded: Vec<DecodedMethod> = item_trait
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) => Some(method.clone()),
            _ => None,
        })
        .map(|method| {
            let statement = decode_statement(&method);
            let options = decode_options(&method);
            let results = decode_results(&method);
            DecodedMethod {
                method,
                statement,
                options,
                results,
            }
        })
        .collect();

    for item in item_trait.items.iter_mut() {
        if let TraitItem::Fn(method) = item {
            strip_helper_attrs(method);
        }
    }

    let (session_methods, statement_entries): (Vec<_>, Vec<_>) =
        decoded.iter().map(|method| emit_method(method, trait_name)).unzip();

    let expanded = quote! {
        #item_trait

        impl<__StrataConnection: ::strata_core::RawExecutor> #trait_name for ::strata::session::Session<__StrataConnection> {
            #(#session_methods)*
        }

        impl ::strata::mapper::AnnotatedMapper for dyn #trait_name {
            fn statements() -> Vec<::strata::mapper::AnnotatedStatement> {
                vec![#(#statement_entries),*]
            }

            fn namespace() -> &'static str {
                concat!(module_path!(), "::", stringify!(#trait_name))
            }
        }
    };

    expanded.into()
}
