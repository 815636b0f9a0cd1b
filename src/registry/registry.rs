//! §4.G Mapper Registry & Statement Resolver: two-phase build over four
//! retry queues (`cache-refs`, `result-maps`, `statements`, `methods`),
//! draining repeatedly until a pass makes no progress; what's left after
//! that fails visibly.

use super::cache_ref::CacheRef;
use super::mapped_statement::MappedStatement;
use super::parameter_map::ParameterMap;
use super::result_map::{Discriminator, ResultMap, ResultMapping};
use crate::compiler::include::FragmentSource;
use crate::compiler::xml::XmlNode;
use crate::compiler::{self, SqlSource};
use crate::mapper::{AnnotatedMapper, AnnotatedStatement, ResultBinding, StatementKind};
use std::collections::HashMap;
use strata_core::{MapperError, Result};

/// One not-yet-compiled `<select|insert|update|delete>` element, kept
/// around until its `<include>`s and result-map references can resolve.
struct PendingStatement {
    namespace: String,
    id: String,
    kind: StatementKind,
    body: XmlNode,
    result_map_id: Option<String>,
    use_cache: bool,
    flush_cache: bool,
    timeout: Option<u64>,
    fetch_size: Option<u64>,
}

struct PendingResultMap {
    namespace: String,
    id: String,
    extends: Option<String>,
    mappings: Vec<ResultMapping>,
    constructor_mappings: Vec<ResultMapping>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<bool>,
}

#[derive(Default)]
pub struct Registry {
    pub statements: HashMap<String, MappedStatement>,
    pub result_maps: HashMap<String, ResultMap>,
    pub parameter_maps: HashMap<String, ParameterMap>,
    pub fragments: HashMap<String, XmlNode>,
    pub cache_regions: HashMap<String, String>,

    pending_cache_refs: Vec<CacheRef>,
    pending_result_maps: Vec<PendingResultMap>,
    pending_statements: Vec<PendingStatement>,
}

impl FragmentSource for Registry {
    fn fragment(&self, qualified_id: &str) -> Option<XmlNode> {
        self.fragments.get(qualified_id).cloned()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_fragment(&mut self, namespace: &str, id: &str, body: XmlNode) {
        self.fragments
            .insert(format!("{namespace}.{id}"), body);
    }

    pub fn queue_cache_ref(&mut self, namespace: &str, target_namespace: &str) {
        self.pending_cache_refs.push(CacheRef {
            namespace: namespace.to_string(),
            target_namespace: target_namespace.to_string(),
        });
    }

    pub fn queue_result_map(
        &mut self,
        namespace: &str,
        id: &str,
        extends: Option<String>,
        mappings: Vec<ResultMapping>,
        constructor_mappings: Vec<ResultMapping>,
        discriminator: Option<Discriminator>,
        auto_mapping: Option<bool>,
    ) {
        self.pending_result_maps.push(PendingResultMap {
            namespace: namespace.to_string(),
            id: id.to_string(),
            extends,
            mappings,
            constructor_mappings,
            discriminator,
            auto_mapping,
        });
    }

    pub fn queue_xml_statement(
        &mut self,
        namespace: &str,
        id: &str,
        kind: StatementKind,
        body: XmlNode,
        result_map_id: Option<String>,
        use_cache: bool,
        flush_cache: bool,
        timeout: Option<u64>,
        fetch_size: Option<u64>,
    ) {
        self.pending_statements.push(PendingStatement {
            namespace: namespace.to_string(),
            id: id.to_string(),
            kind,
            body,
            result_map_id,
            use_cache,
            flush_cache,
            timeout,
            fetch_size,
        });
    }

    /// Ingests every statement an annotated `#[mapper]` trait declares.
    /// Annotation-declared SQL never forward-references a fragment that
    /// isn't registered yet in practice, so these resolve immediately.
    pub fn register_annotated_mapper<M: AnnotatedMapper + ?Sized>(
        &mut self,
        namespace: &str,
    ) -> Result<()> {
        for statement in M::statements() {
            self.insert_annotated(namespace, statement)?;
        }
        Ok(())
    }

    fn insert_annotated(&mut self, namespace: &str, statement: AnnotatedStatement) -> Result<()> {
        let AnnotatedStatement {
            id,
            kind,
            sql,
            use_cache,
            flush_cache,
            timeout,
            fetch_size,
            result_binding,
        } = statement;
        let sql_source = compiler::compile_annotation_statement(&sql, namespace, &*self)?;
        let result_map_id = match result_binding {
            ResultBinding::Named(name) => Some(name),
            ResultBinding::Inline(mappings) => {
                let synthetic_id = format!("{id}-inline");
                self.result_maps.insert(
                    format!("{namespace}.{synthetic_id}"),
                    ResultMap {
                        id: synthetic_id.clone(),
                        namespace: namespace.to_string(),
                        mappings: mappings
                            .into_iter()
                            .map(|m| ResultMapping {
                                column: Some(m.column),
                                property: m.property,
                                ..Default::default()
                            })
                            .collect(),
                        ..Default::default()
                    },
                );
                Some(synthetic_id)
            }
            ResultBinding::Automatic => None,
        };
        self.statements.insert(
            format!("{namespace}.{id}"),
            MappedStatement {
                id,
                namespace: namespace.to_string(),
                kind,
                sql_source,
                result_map_id,
                use_cache: use_cache.unwrap_or(matches!(kind, StatementKind::Select)),
                flush_cache: flush_cache.unwrap_or(!matches!(kind, StatementKind::Select)),
                timeout,
                fetch_size,
                key_generator: crate::key_gen::KeyGenerator::NoKey,
            },
        );
        Ok(())
    }

    /// Drains the four queues repeatedly until a pass makes no progress.
    /// Anything left over fails visibly as a `ParseError` (escalated
    /// from the `IncompleteElement` it was queued under).
    pub fn finish_build(&mut self) -> Result<()> {
        loop {
            let mut progressed = false;
            progressed |= self.drain_cache_refs()?;
            progressed |= self.drain_result_maps()?;
            progressed |= self.drain_statements()?;
            if !progressed {
                break;
            }
        }
        if let Some(unresolved) = self.pending_cache_refs.first() {
            return Err(MapperError::incomplete(
                &unresolved.target_namespace,
                "cache-ref target namespace never registered a cache region",
            )
            .into());
        }
        if let Some(unresolved) = self.pending_result_maps.first() {
            return Err(MapperError::incomplete(
                &format!("{}.{}", unresolved.namespace, unresolved.id),
                "result map `extends` parent never resolved",
            )
            .into());
        }
        if let Some(unresolved) = self.pending_statements.first() {
            return Err(MapperError::incomplete(
                &format!("{}.{}", unresolved.namespace, unresolved.id),
                "statement could not be compiled (missing <include> target)",
            )
            .into());
        }
        Ok(())
    }

    fn drain_cache_refs(&mut self) -> Result<bool> {
        let mut progressed = false;
        let mut remaining = Vec::new();
        for cache_ref in std::mem::take(&mut self.pending_cache_refs) {
            if let Some(region) = self.cache_regions.get(&cache_ref.target_namespace).cloned() {
                self.cache_regions.insert(cache_ref.namespace, region);
                progressed = true;
            } else {
                remaining.push(cache_ref);
            }
        }
        self.pending_cache_refs = remaining;
        Ok(progressed)
    }

    fn drain_result_maps(&mut self) -> Result<bool> {
        let mut progressed = false;
        let mut remaining = Vec::new();
        for pending in std::mem::take(&mut self.pending_result_maps) {
            let resolved = match &pending.extends {
                None => true,
                Some(parent_id) => {
                    let qualified = qualify(parent_id, &pending.namespace);
                    self.result_maps.contains_key(&qualified)
                }
            };
            if !resolved {
                remaining.push(pending);
                continue;
            }
            let mut result_map = ResultMap {
                id: pending.id.clone(),
                namespace: pending.namespace.clone(),
                extends: pending.extends.clone(),
                mappings: pending.mappings,
                constructor_mappings: pending.constructor_mappings,
                discriminator: pending.discriminator,
                auto_mapping: pending.auto_mapping,
            };
            if let Some(parent_id) = &pending.extends {
                let qualified = qualify(parent_id, &pending.namespace);
                let parent = self.result_maps.get(&qualified).unwrap().clone();
                result_map = result_map.merged_with_parent(&parent);
            }
            self.expand_discriminator(&mut result_map);
            self.result_maps
                .insert(result_map.qualified_id(), result_map);
            progressed = true;
        }
        self.pending_result_maps = remaining;
        Ok(progressed)
    }

    /// Compiles each discriminator case into a synthetic result-map
    /// `{parent}-{value}` whose mapping list is the enclosing map's
    /// mappings plus the case's own (here: the case simply points at an
    /// already-declared map, so the synthetic map unions its mappings
    /// with the parent's).
    fn expand_discriminator(&mut self, result_map: &mut ResultMap) {
        let Some(discriminator) = result_map.discriminator.clone() else {
            return;
        };
        for (value, case_map_id) in &discriminator.cases {
            let qualified_case = qualify(case_map_id, &result_map.namespace);
            let Some(case_map) = self.result_maps.get(&qualified_case).cloned() else {
                continue;
            };
            let synthetic_id = format!("{}-{}", result_map.id, value);
            let mut merged_mappings = result_map.mappings.clone();
            merged_mappings.extend(case_map.mappings.clone());
            self.result_maps.insert(
                format!("{}.{}", result_map.namespace, synthetic_id),
                ResultMap {
                    id: synthetic_id,
                    namespace: result_map.namespace.clone(),
                    mappings: merged_mappings,
                    constructor_mappings: result_map.constructor_mappings.clone(),
                    ..Default::default()
                },
            );
        }
    }

    fn drain_statements(&mut self) -> Result<bool> {
        let mut progressed = false;
        let mut remaining = Vec::new();
        for pending in std::mem::take(&mut self.pending_statements) {
            let children = match &pending.body {
                XmlNode::Element { children, .. } => children.clone(),
                XmlNode::Text(_) => vec![pending.body.clone()],
            };
            let expanded = children
                .iter()
                .map(|c| {
                    crate::compiler::include::expand_includes(
                        c,
                        &pending.namespace,
                        &*self,
                        &Default::default(),
                    )
                })
                .collect::<Result<Vec<_>>>();
            let expanded = match expanded {
                Ok(v) => v,
                Err(_) => {
                    remaining.push(pending);
                    continue;
                }
            };
            let sql_source = match compile_expanded(&expanded) {
                Ok(source) => source,
                Err(_) => {
                    remaining.push(pending);
                    continue;
                }
            };
            self.statements.insert(
                format!("{}.{}", pending.namespace, pending.id),
                MappedStatement {
                    id: pending.id,
                    namespace: pending.namespace,
                    kind: pending.kind,
                    sql_source,
                    result_map_id: pending.result_map_id,
                    use_cache: pending.use_cache,
                    flush_cache: pending.flush_cache,
                    timeout: pending.timeout,
                    fetch_size: pending.fetch_size,
                    key_generator: crate::key_gen::KeyGenerator::NoKey,
                },
            );
            progressed = true;
        }
        self.pending_statements = remaining;
        Ok(progressed)
    }

    /// Statement resolution for interface inheritance: given
    /// `iface.method`, look up directly; on miss, recurse into the
    /// declared super-interface namespaces.
    pub fn resolve_statement<'a>(
        &'a self,
        namespace: &str,
        id: &str,
        super_namespaces: &[&str],
    ) -> Option<&'a MappedStatement> {
        if let Some(found) = self.statements.get(&format!("{namespace}.{id}")) {
            return Some(found);
        }
        super_namespaces
            .iter()
            .find_map(|parent| self.statements.get(&format!("{parent}.{id}")))
    }
}

fn qualify(id: &str, namespace: &str) -> String {
    if id.contains('.') {
        id.to_string()
    } else {
        format!("{namespace}.{id}")
    }
}

fn compile_expanded(children: &[XmlNode]) -> Result<SqlSource> {
    // Re-enters the ordinary compiler over an already include-expanded
    // body by wrapping it back into a synthetic root, since the public
    // `compile_xml_statement` entry point expects raw XML text.
    let wrapped = XmlNode::Element {
        tag: "statement".to_string(),
        attrs: Vec::new(),
        children: children.to_vec(),
    };
    compiler::compile_expanded_node(&wrapped)
}
