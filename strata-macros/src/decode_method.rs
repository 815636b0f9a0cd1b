use convert_case::{Case, Casing};
use syn::{Attribute, Expr, ExprLit, Lit, Meta, TraitItemFn};

/// Which MyBatis statement element an annotated method stands in for.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub(crate) fn variant_ident(self) -> &'static str {
        match self {
            StatementKind::Select => "Select",
            StatementKind::Insert => "Insert",
            StatementKind::Update => "Update",
            StatementKind::Delete => "Delete",
        }
    }
}

/// What a `#[select(...)]`/`#[insert(...)]`/`#[update(...)]`/`#[delete(...)]`
/// attribute contributed for one trait method.
pub(crate) struct Statement {
    pub kind: StatementKind,
    pub id: String,
    pub sql: String,
}

const STATEMENT_ATTRS: [(&str, StatementKind); 4] = [
    ("select", StatementKind::Select),
    ("insert", StatementKind::Insert),
    ("update", StatementKind::Update),
    ("delete", StatementKind::Delete),
];

/// Locates the single statement attribute on a method and extracts its
/// `id`/`sql`. `id` defaults to the method name converted to camelCase,
/// matching the convention MyBatis mapper XML ids tend to follow.
pub(crate) fn decode_statement(method: &TraitItemFn) -> Statement {
    let found: Vec<_> = STATEMENT_ATTRS
        .iter()
        .filter(|(name, _)| has_attr(&method.attrs, name))
        .collect();
    let (attr_name, kind) = match found.as_slice() {
        [one] => *one,
        [] => panic!(
            "Method `{}` inside a `#[mapper]` trait needs one of \
             #[select]/#[insert]/#[update]/#[delete]",
            method.sig.ident
        ),
        _ => panic!(
            "Method `{}` carries more than one statement attribute",
            method.sig.ident
        ),
    };
    let attr = find_attr(&method.attrs, attr_name).unwrap();
    let mut id = method.sig.ident.to_string().to_case(Case::Camel);
    let mut sql = None;
    match &attr.meta {
        Meta::Path(_) => {}
        Meta::List(list) => {
            let parsed = list
                .parse_args_with(
                    syn::punctuated::Punctuated::<syn::MetaNameValue, syn::Token![,]>::parse_terminated,
                )
                .unwrap_or_else(|e| {
                    panic!(
                        "Error while parsing `{attr_name}` on `{}`: {e}",
                        method.sig.ident
                    )
                });
            for pair in parsed {
                let key = pair
                    .path
                    .get_ident()
                    .unwrap_or_else(|| panic!("Unexpected key in `{attr_name}`"))
                    .to_string();
                let value = expect_str(&pair.value, &key);
                match key.as_str() {
                    "id" => id = value,
                    "sql" => sql = Some(value),
                    other => panic!(
                        "Unknown key `{other}` in `{attr_name}` on `{}`, expected `id` or `sql`",
                        method.sig.ident
                    ),
                }
            }
        }
        Meta::NameValue(nv) => sql = Some(expect_str(&nv.value, attr_name)),
    }
    let sql = sql.unwrap_or_else(|| {
        panic!(
            "`{attr_name}` on `{}` needs a `sql = \"...\"` body, or a `#[result_map]`-only \
             method must still provide its SQL through an external resource",
            method.sig.ident
        )
    });
    Statement { kind, id, sql }
}

fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|a| a.meta.path().is_ident(name))
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.meta.path().is_ident(name))
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
