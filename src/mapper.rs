//! Types shared with `strata-macros`' expansion of `#[mapper]`. A mapper
//! trait's `AnnotatedMapper::statements()` is how the registry discovers
//! annotation-declared statements without parsing any XML.
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{MapperError, Reflectable, Result, Value};

/// One named parameter: either a scalar/collection `Value` the annotation
/// macro produced via [`strata_core::AsValue`], or a full object a caller
/// passed by name and that a `#{param.nested}` path may need to descend
/// into. The single-unnamed-parameter call path never goes through here at
/// all — it hands its object straight to the evaluator as the root
/// `Reflectable`, so this distinction only matters for multi-parameter and
/// `@Param`-annotated calls.
#[derive(Clone)]
pub enum ParamValue {
    Scalar(Value),
    Object(Arc<dyn Reflectable + Send + Sync>),
}

/// Named parameters collected from an annotated method's arguments, or
/// built by the session facade from a caller-supplied Rust value for the
/// XML mapper path. Mirrors the named-parameter rules of the session
/// facade: single unnamed arguments still end up keyed, by name, in here.
#[derive(Clone, Default)]
pub struct ParamMap {
    values: HashMap<String, ParamValue>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(name.into(), ParamValue::Scalar(value));
        self
    }

    pub fn insert_object(&mut self, name: impl Into<String>, object: Arc<dyn Reflectable + Send + Sync>) -> &mut Self {
        self.values.insert(name.into(), ParamValue::Object(object));
        self
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name)? {
            ParamValue::Scalar(value) => Some(value.clone()),
            ParamValue::Object(_) => None,
        }
    }

    pub fn iter_scalars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().filter_map(|(k, v)| match v {
            ParamValue::Scalar(value) => Some((k.as_str(), value)),
            ParamValue::Object(_) => None,
        })
    }
}

impl Reflectable for ParamMap {
    fn get_property(&self, name: &str) -> Result<Value> {
        match self.values.get(name) {
            Some(ParamValue::Scalar(value)) => Ok(value.clone()),
            Some(ParamValue::Object(_)) => Err(MapperError::Reflection {
                path: name.to_string(),
                target_type: "ParamMap",
                reason: "is a bound object, not a scalar property".into(),
            }
            .into()),
            None => Err(MapperError::Binding(format!("no parameter named `{name}`")).into()),
        }
    }

    fn get_index(&self, index: usize) -> Result<Value> {
        Err(MapperError::Reflection {
            path: format!("[{index}]"),
            target_type: "ParamMap",
            reason: "has no indexable elements".into(),
        }
        .into())
    }

    fn get_nested(&self, name: &str) -> Result<&dyn Reflectable> {
        match self.values.get(name) {
            Some(ParamValue::Object(object)) => Ok(object.as_ref()),
            Some(ParamValue::Scalar(_)) => Err(MapperError::Reflection {
                path: name.to_string(),
                target_type: "ParamMap",
                reason: "is a scalar parameter, not a nested object".into(),
            }
            .into()),
            None => Err(MapperError::Binding(format!("no parameter named `{name}`")).into()),
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        self.values.insert(name.to_string(), ParamValue::Scalar(value));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

pub struct ResultMapping {
    pub column: String,
    pub property: String,
}

pub enum ResultBinding {
    Inline(Vec<ResultMapping>),
    Named(String),
    Automatic,
}

/// One statement contributed by a `#[mapper]` trait method.
pub struct AnnotatedStatement {
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    pub use_cache: Option<bool>,
    pub flush_cache: Option<bool>,
    pub timeout: Option<u64>,
    pub fetch_size: Option<u64>,
    pub result_binding: ResultBinding,
}

/// Implemented, via `#[mapper]`'s expansion, for `dyn Trait` of every
/// annotated mapper trait. `Configuration::add_mapper` calls this to pull
/// the trait's statements into the registry at startup.
pub trait AnnotatedMapper {
    fn statements() -> Vec<AnnotatedStatement>;

    /// The trait's fully qualified Rust path (`module_path!() + "::" +
    /// trait name`), baked in at the `#[mapper]` expansion site. Doubles
    /// as the MyBatis-style namespace every statement this trait
    /// contributes is registered under, matching the exact string each
    /// generated session method already carries as its statement id
    /// prefix — there is no separate caller-chosen namespace to keep in
    /// sync with it.
    fn namespace() -> &'static str;
}
