use syn::{Expr, ExprLit, Lit, Meta, TraitItemFn};

/// Parsed `#[options(...)]` attribute: the statement-level knobs MyBatis
/// exposes on `<select>`/`<insert>`/... elements, lifted onto an annotated
/// mapper method.
#[derive(Default, Clone)]
pub(crate) struct Options {
    pub use_cache: Option<bool>,
    pub flush_cache: Option<bool>,
    pub timeout: Option<u64>,
    pub fetch_size: Option<u64>,
}

pub(crate) fn decode_options(method: &TraitItemFn) -> Options {
    let mut options = Options::default();
    for attr in &method.attrs {
        if !attr.meta.path().is_ident("options") {
            continue;
        }
        let Meta::List(list) = &attr.meta else {
            panic!(
                "Error while parsing `options` on `{}`, use it like \
                 #[options(use_cache = true, timeout = 30)]",
                method.sig.ident
            );
        };
        let parsed = list
            .parse_args_with(
                syn::punctuated::Punctuated::<syn::MetaNameValue, syn::Token![,]>::parse_terminated,
            )
            .unwrap_or_else(|e| {
                panic!(
                    "Error while parsing `options` on `{}`: {e}",
                    method.sig.ident
                )
            });
        for pair in parsed {
            let name = pair
                .path
                .get_ident()
                .unwrap_or_else(|| panic!("Unexpected option key on `{}`", method.sig.ident))
                .to_string();
            match name.as_str() {
                "use_cache" => options.use_cache = Some(expect_bool(&pair.value, &name)),
                "flush_cache" => options.flush_cache = Some(expect_bool(&pair.value, &name)),
                "timeout" => options.timeout = Some(expect_int(&pair.value, &name)),
                "fetch_size" => options.fetch_size = Some(expect_int(&pair.value, &name)),
                other => panic!(
                    "Unknown option `{other}` on `{}`, expected one of: \
                     use_cache, flush_cache, timeout, fetch_size",
                    method.sig.ident
                ),
            }
        }
    }
    options
}

fn expect_bool(expr: &Expr, key: &str) -> bool {
    if let Expr::Lit(ExprLit {
        lit: Lit::Bool(b), ..
    }) = expr
    {
        return b.value;
    }
    panic!("Expected a boolean literal for `{key}`");
}

fn expect_int(expr: &Expr, key: &str) -> u64 {
    if let Expr::Lit(ExprLit {
        lit: Lit::Int(i), ..
    }) = expr
    {
        return i
            .base10_parse()
            .unwrap_or_else(|_| panic!("`{key}` must be an unsigned integer"));
    }
    panic!("Expected an integer literal for `{key}`");
}
