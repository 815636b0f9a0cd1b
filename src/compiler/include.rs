//! §4.D.1 Include expansion: a separate pass over the `XmlNode` tree,
//! run before `SqlNode` compilation, that clones referenced `<sql>`
//! fragments in place of `<include refid="...">` elements.

use crate::compiler::xml::XmlNode;
use crate::expr::EvalContext;
use crate::placeholder::interpolate_variables;
use std::collections::HashMap;
use strata_core::{MapperError, Result, Value};

/// The SQL-fragment registry `<include refid>` resolves against: raw
/// `<sql id="...">` bodies, keyed by fully-qualified id (`namespace.id`).
pub trait FragmentSource {
    fn fragment(&self, qualified_id: &str) -> Option<XmlNode>;
}

/// Expands every `<include>` in `node`, recursively. `namespace`
/// qualifies an unqualified `refid`. `variables` carries the inherited
/// `${}` frame; each `<include>`'s own `<property>` children layer a new,
/// include-local frame on top before recursing into the fragment.
pub fn expand_includes(
    node: &XmlNode,
    namespace: &str,
    fragments: &dyn FragmentSource,
    variables: &HashMap<String, Value>,
) -> Result<XmlNode> {
    match node {
        XmlNode::Text(text) => {
            if variables.is_empty() {
                Ok(XmlNode::Text(text.clone()))
            } else {
                let ctx = EvalContext {
                    bindings: variables,
                    parameter: None,
                };
                Ok(XmlNode::Text(interpolate_variables(text, &ctx)?))
            }
        }
        XmlNode::Element {
            tag,
            attrs,
            children,
        } if tag == "include" => {
            let refid = attrs
                .iter()
                .find(|(k, _)| k == "refid")
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| MapperError::Parse("<include> is missing refid".into()))?;
            let qualified = if refid.contains('.') {
                refid.to_string()
            } else {
                format!("{namespace}.{refid}")
            };
            let Some(fragment) = fragments.fragment(&qualified) else {
                return Err(MapperError::incomplete(
                    &qualified,
                    "referenced <sql> fragment not yet registered",
                )
                .into());
            };

            let mut local_variables = variables.clone();
            for child in children {
                if let XmlNode::Element {
                    tag, attrs: pattrs, ..
                } = child
                {
                    if tag == "property" {
                        let name = pattrs
                            .iter()
                            .find(|(k, _)| k == "name")
                            .map(|(_, v)| v.as_str())
                            .ok_or_else(|| MapperError::Parse("<property> is missing name".into()))?;
                        let raw_value = pattrs
                            .iter()
                            .find(|(k, _)| k == "value")
                            .map(|(_, v)| v.as_str())
                            .ok_or_else(|| MapperError::Parse("<property> is missing value".into()))?;
                        let ctx = EvalContext {
                            bindings: &local_variables,
                            parameter: None,
                        };
                        let value = interpolate_variables(raw_value, &ctx)?;
                        local_variables.insert(name.to_string(), Value::Varchar(Some(value)));
                    }
                }
            }

            expand_includes(&fragment, namespace, fragments, &local_variables)
        }
        XmlNode::Element {
            tag,
            attrs,
            children,
        } => {
            let expanded = children
                .iter()
                .map(|child| expand_includes(child, namespace, fragments, variables))
                .collect::<Result<Vec<_>>>()?;
            Ok(XmlNode::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: expanded,
            })
        }
    }
}
