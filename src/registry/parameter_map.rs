/// Legacy `<parameterMap>`: an explicit, named list of parameter
/// bindings referenced from a statement's `parameterMap` attribute,
/// mostly superseded by inline `#{...}` expressions but still valid.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    pub id: String,
    pub namespace: String,
    pub mappings: Vec<crate::placeholder::ParameterMapping>,
}

impl ParameterMap {
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.namespace, self.id)
    }
}
