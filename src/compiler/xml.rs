//! A minimal generic XML tree, used as the intermediate representation
//! between quick-xml's event stream and the `SqlNode` compiler. Kept
//! deliberately small: attributes as a name/value list, children as
//! `Text`/`Element`, nothing else. `<include>` expansion (§4.D.1) works
//! over this tree before the `SqlNode` compiler ever sees it.

use quick_xml::Reader;
use quick_xml::events::Event;
use strata_core::{MapperError, Result};

#[derive(Debug, Clone)]
pub enum XmlNode {
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<XmlNode>,
    },
}

impl XmlNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            XmlNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            XmlNode::Text(_) => None,
        }
    }
}

/// Parses a fragment like `<select id="...">...</select>` into a root
/// element plus its children. The wrapping tag name/attrs become the
/// returned node; callers compile only its `children`.
pub fn parse_fragment(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = false;
    let mut stack: Vec<(String, Vec<(String, String)>, Vec<XmlNode>)> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| MapperError::Parse(format!("malformed XML: {e}")))?
        {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = read_attrs(&e)?;
                stack.push((tag, attrs, Vec::new()));
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = read_attrs(&e)?;
                let node = XmlNode::Element {
                    tag,
                    attrs,
                    children: Vec::new(),
                };
                push_child(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let (tag, attrs, children) = stack
                    .pop()
                    .ok_or_else(|| MapperError::Parse("unbalanced XML closing tag".into()))?;
                let node = XmlNode::Element {
                    tag,
                    attrs,
                    children,
                };
                if stack.is_empty() {
                    root = Some(node);
                } else {
                    push_child(&mut stack, &mut root, node);
                }
            }
            Event::Text(e) | Event::CData(e) => {
                let text = e
                    .decode()
                    .map_err(|e| MapperError::Parse(format!("malformed XML text: {e}")))?
                    .into_owned();
                push_child(&mut stack, &mut root, XmlNode::Text(text));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| MapperError::Parse("empty XML fragment".into()).into())
}

fn push_child(
    stack: &mut [(String, Vec<(String, String)>, Vec<XmlNode>)],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) {
    if let Some((_, _, children)) = stack.last_mut() {
        children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    }
}

fn read_attrs(e: &quick_xml::events::BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MapperError::Parse(format!("malformed XML attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| MapperError::Parse(format!("malformed XML attribute value: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}
