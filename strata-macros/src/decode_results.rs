use syn::{Expr, ExprLit, Lit, Meta, TraitItemFn};

/// One `column = "...", property = "..."` pair inside `#[results(...)]`.
pub(crate) struct ResultMapping {
    pub column: String,
    pub property: String,
}

/// How an annotated method's result set should be projected onto its
/// return type: either inline column/property pairs, a reference to a
/// named `<resultMap>` defined elsewhere, or neither (fall back to
/// automatic column-to-property mapping by name).
pub(crate) enum ResultBinding {
    Inline(Vec<ResultMapping>),
    Named(String),
    Automatic,
}

pub(crate) fn decode_results(method: &TraitItemFn) -> ResultBinding {
    let inline = method
        .attrs
        .iter()
        .find(|a| a.meta.path().is_ident("results"));
    let named = method
        .attrs
        .iter()
        .find(|a| a.meta.path().is_ident("result_map"));

    match (inline, named) {
        (Some(_), Some(_)) => panic!(
            "Method `{}` cannot carry both `#[results]` and `#[result_map]`",
            method.sig.ident
        ),
        (Some(attr), None) => ResultBinding::Inline(decode_inline(attr, method)),
        (None, Some(attr)) => ResultBinding::Named(decode_named(attr, method)),
        (None, None) => ResultBinding::Automatic,
    }
}

fn decode_inline(attr: &syn::Attribute, method: &TraitItemFn) -> Vec<ResultMapping> {
    let Meta::List(list) = &attr.meta else {
        panic!(
            "`results` on `{}` must look like #[results(column = \"...\", property = \"...\")]",
            method.sig.ident
        );
    };
    // Each result entry is its own nested `result(column = "...", property = "...")` group,
    // so that a single method can declare more than one column/property pair.
    let groups = list
        .parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )
        .unwrap_or_else(|e| panic!("Error parsing `results` on `{}`: {e}", method.sig.ident));

    groups
        .iter()
        .map(|meta| {
            let Meta::List(pair_list) = meta else {
                panic!(
                    "Each entry in `results` on `{}` must be `result(column = \"...\", property = \"...\")`",
                    method.sig.ident
                );
            };
            let pairs = pair_list
                .parse_args_with(
                    syn::punctuated::Punctuated::<syn::MetaNameValue, syn::Token![,]>::parse_terminated,
                )
                .unwrap_or_else(|e| panic!("Error parsing a `result` entry on `{}`: {e}", method.sig.ident));
            let mut column = None;
            let mut property = None;
            for pair in pairs {
                let key = pair
                    .path
                    .get_ident()
                    .unwrap_or_else(|| panic!("Unexpected key in `result` entry"))
                    .to_string();
                let value = expect_str(&pair.value, &key);
                match key.as_str() {
                    "column" => column = Some(value),
                    "property" => property = Some(value),
                    other => panic!("Unknown key `{other}` in `result`, expected `column` or `property`"),
                }
            }
            ResultMapping {
                column: column.unwrap_or_else(|| panic!("`result` entry on `{}` is missing `column`", method.sig.ident)),
                property: property.unwrap_or_else(|| panic!("`result` entry on `{}` is missing `property`", method.sig.ident)),
            }
        })
        .collect()
}

fn decode_named(attr: &syn::Attribute, method: &TraitItemFn) -> String {
    match &attr.meta {
        Meta::NameValue(nv) => expect_str(&nv.value, "result_map"),
        Meta::List(list) => {
            let lit: syn::LitStr = list
                .parse_args()
                .unwrap_or_else(|e| panic!("Error parsing `result_map` on `{}`: {e}", method.sig.ident));
            lit.value()
        }
        Meta::Path(_) => panic!(
            "`result_map` on `{}` needs a target, e.g. #[result_map = \"userResult\"]",
            method.sig.ident
        ),
    }
}

fn expect_str(expr: &Expr, key: &str) -> String {
    if let Expr::Lit(ExprLit {
        lit: Lit::Str(s), ..
    }) = expr
    {
        return s.value();
    }
    panic!("Expected a string literal for `{key}`");
}
