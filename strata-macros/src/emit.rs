use crate::decode_method::{Statement, StatementKind};
use crate::decode_options::Options;
use crate::decode_results::ResultBinding;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Pat, ReturnType, TraitItemFn, Type};

pub(crate) struct DecodedMethod {
    pub method: TraitItemFn,
    pub statement: Statement,
    pub options: Options,
    pub results: ResultBinding,
}

/// Strips the helper attributes (`#[select]`, `#[options]`, ...) a method
/// carried, leaving a plain trait method signature behind.
pub(crate) fn strip_helper_attrs(method: &mut TraitItemFn) {
    const HELPER_ATTRS: [&str; 7] = [
        "select",
        "insert",
        "update",
        "delete",
        "options",
        "results",
        "result_map",
    ];
    method
        .attrs
        .retain(|attr| !HELPER_ATTRS.iter().any(|name| attr.meta.path().is_ident(name)));
}

/// The success type `T` out of a `Result<T, _>`/`strata_core::Result<T>`
/// return type, or `()` if the method returns bare `Result<()>` or isn't
/// a `Result` at all (treated as an error by the caller before this runs).
fn result_ok_type(ret: &ReturnType) -> Type {
    let ReturnType::Type(_, ty) = ret else {
        return syn::parse_quote!(());
    };
    if let Type::Path(path) = ty.as_ref() {
        if let Some(last) = path.path.segments.last() {
            if last.ident == "Result" {
                if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return inner.clone();
                    }
                }
            }
        }
    }
    (**ty).clone()
}

/// How a `#[select]` method's declared success type picks its rows
/// apart: `Option<T>`/`Vec<T>` name which `Session` method to call and
/// for what row type; anything else is read as exactly one row of that
/// type, erroring rather than silently defaulting if the statement
/// returns zero or more than one.
enum SelectShape {
    One(Type),
    Option(Type),
    List(Type),
}

fn select_shape(ok_ty: &Type) -> SelectShape {
    if let Type::Path(path) = ok_ty {
        if let Some(last) = path.path.segments.last() {
            if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    if last.ident == "Option" {
                        return SelectShape::Option(inner.clone());
                    }
                    if last.ident == "Vec" {
                        return SelectShape::List(inner.clone());
                    }
                }
            }
        }
    }
    SelectShape::One(ok_ty.clone())
}

fn param_bindings(method: &TraitItemFn) -> TokenStream {
    let inserts = method.sig.inputs.iter().filter_map(|arg| match arg {
        FnArg::Receiver(_) => None,
        FnArg::Typed(pat_type) => {
            let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
                return None;
            };
            let name = pat_ident.ident.to_string();
            let ident = &pat_ident.ident;
            Some(quote! {
                __params.insert(#name, ::strata_core::AsValue::as_value(#ident));
            })
        }
    });
    quote! {
        let mut __params = ::strata::mapper::ParamMap::new();
        #(#inserts)*
    }
}

/// Builds the body delegating one annotated method to the session's
/// generic runtime dispatch, and the matching `AnnotatedStatement` entry
/// describing it for the registry.
///
/// `trait_name` lets the call sites address their statement by its full
/// `module_path!()::TraitName.id` namespace rather than the bare id:
/// `Session::select_one` and friends look a statement up by exact
/// registry key with no namespace of their own to fall back on, so the
/// id baked in here must already match what [`AnnotatedMapper::namespace`]
/// registers the statement under.
pub(crate) fn emit_method(decoded: &DecodedMethod, trait_name: &syn::Ident) -> (TokenStream, TokenStream) {
    let DecodedMethod {
        method,
        statement,
        options,
        results,
    } = decoded;
    let sig = &method.sig;
    let name = &sig.ident;
    let id = &statement.id;
    let qualified_id = quote! { concat!(module_path!(), "::", stringify!(#trait_name), ".", #id) };
    let sql = &statement.sql;
    let bindings = param_bindings(method);
    let ok_ty = result_ok_type(&sig.output);

    let body = match statement.kind {
        StatementKind::Select => {
            let select_call = match select_shape(&ok_ty) {
                SelectShape::One(row_ty) => quote! { self.select_one::<#row_ty>(#qualified_id, ::strata::session::AssembledParameter::Map(__params)).await },
                SelectShape::Option(row_ty) => quote! { self.select_option::<#row_ty>(#qualified_id, ::strata::session::AssembledParameter::Map(__params)).await },
                SelectShape::List(row_ty) => quote! { self.select_list::<#row_ty>(#qualified_id, ::strata::session::AssembledParameter::Map(__params)).await },
            };
            quote! {
                #bindings
                #select_call
            }
        }
        StatementKind::Insert => quote! {
            #bindings
            self.insert(#qualified_id, &mut ::strata::session::AssembledParameter::Map(__params)).await.map(|r| r.into())
        },
        StatementKind::Update => quote! {
            #bindings
            self.update(#qualified_id, &mut ::strata::session::AssembledParameter::Map(__params)).await.map(|r| r.into())
        },
        StatementKind::Delete => quote! {
            #bindings
            self.delete(#qualified_id, &mut ::strata::session::AssembledParameter::Map(__params)).await.map(|r| r.into())
        },
    };

    let session_impl_method = quote! {
        #sig {
            #body
        }
    };

    let kind_variant = format_ident!("{}", statement.kind.variant_ident());
    let use_cache = match options.use_cache {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    };
    let flush_cache = match options.flush_cache {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    };
    let timeout = match options.timeout {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    };
    let fetch_size = match options.fetch_size {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    };
    let result_binding = match results {
        ResultBinding::Inline(mappings) => {
            let entries = mappings.iter().map(|m| {
                let column = &m.column;
                let property = &m.property;
                quote! {
                    ::strata::mapper::ResultMapping { column: #column.to_string(), property: #property.to_string() }
                }
            });
            quote! { ::strata::mapper::ResultBinding::Inline(vec![#(#entries),*]) }
        }
        ResultBinding::Named(name) => {
            quote! { ::strata::mapper::ResultBinding::Named(#name.to_string()) }
        }
        ResultBinding::Automatic => quote! { ::strata::mapper::ResultBinding::Automatic },
    };

    let statement_entry = quote! {
        ::strata::mapper::AnnotatedStatement {
            id: #id.to_string(),
            kind: ::strata::mapper::StatementKind::#kind_variant,
            sql: #sql.to_string(),
            use_cache: #use_cache,
            flush_cache: #flush_cache,
            timeout: #timeout,
            fetch_size: #fetch_size,
            result_binding: #result_binding,
        }
    };

    (session_impl_method, statement_entry)
}
