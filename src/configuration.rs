//! Engine-wide settings plus the registration surface a caller builds a
//! [`Registry`] through before opening sessions: mappers, cache regions
//! and `<cache-ref>`, and custom type handlers.

use crate::cache::{CacheRegion, CacheSettings};
use crate::executor::local_cache::LocalCacheScope;
use crate::mapper::AnnotatedMapper;
use crate::registry::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{MapperError, Result, TypeHandlerRegistry};

/// Settings mirroring MyBatis' `<settings>` block, restricted to the
/// ones this engine actually has a behavior for.
#[derive(Debug, Clone)]
pub struct Settings {
    pub local_cache_scope: LocalCacheScope,
    pub map_underscore_to_camel_case: bool,
    pub auto_mapping_behavior: crate::result::AutoMappingBehavior,
    pub default_statement_timeout: Option<u64>,
    pub default_fetch_size: Option<u64>,
    pub shrink_whitespaces_in_sql: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local_cache_scope: LocalCacheScope::Session,
            map_underscore_to_camel_case: false,
            auto_mapping_behavior: crate::result::AutoMappingBehavior::Partial,
            default_statement_timeout: None,
            default_fetch_size: None,
            shrink_whitespaces_in_sql: false,
        }
    }
}

/// Owns everything built once at startup and shared, read-only, across
/// every session: the statement/result-map registry, cache regions, the
/// plugin chain, and type handlers. Mirrors MyBatis' `Configuration`
/// minus the bits this engine has no runtime story for (object
/// factory/wrapper factory, reflector factory caching).
pub struct Configuration {
    pub settings: Settings,
    registry: Arc<Registry>,
    pub type_handlers: TypeHandlerRegistry,
    pub plugins: crate::plugin::PluginChain,
    cache_settings: HashMap<String, CacheSettings>,
    cache_regions: HashMap<String, Arc<CacheRegion>>,
    pub environment_id: String,
}

impl Configuration {
    pub fn new(environment_id: impl Into<String>) -> Self {
        Self {
            settings: Settings::default(),
            registry: Arc::new(Registry::new()),
            type_handlers: TypeHandlerRegistry::new(),
            plugins: crate::plugin::PluginChain::new(),
            cache_settings: HashMap::new(),
            cache_regions: HashMap::new(),
            environment_id: environment_id.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Every mutator below runs before the first session opens, while
    /// this `Configuration` still holds the registry's only `Arc`
    /// reference, so `get_mut` never fails.
    fn registry_mut(&mut self) -> &mut Registry {
        Arc::get_mut(&mut self.registry).expect("registry is still being built; no session has been opened yet")
    }

    /// Ingests every statement declared on an annotated `#[mapper]`
    /// trait under its own fully qualified name, the same namespace the
    /// trait's generated session methods already address their
    /// statements by.
    pub fn add_mapper<M: AnnotatedMapper + ?Sized>(&mut self) -> Result<()> {
        self.registry_mut().register_annotated_mapper::<M>(M::namespace())
    }

    pub fn declare_cache(&mut self, namespace: &str, settings: CacheSettings) {
        self.cache_settings.insert(namespace.to_string(), settings);
        self.registry_mut().cache_regions.insert(namespace.to_string(), namespace.to_string());
    }

    pub fn declare_cache_ref(&mut self, namespace: &str, target_namespace: &str) {
        self.registry_mut().queue_cache_ref(namespace, target_namespace);
    }

    /// Builds the (lazily instantiated) cache region backing
    /// `namespace`, following `<cache-ref>` redirection first.
    pub fn cache_region(&mut self, namespace: &str) -> Option<Arc<CacheRegion>> {
        let region_namespace = self.registry.cache_regions.get(namespace)?.clone();
        if let Some(existing) = self.cache_regions.get(&region_namespace) {
            return Some(existing.clone());
        }
        let settings = self.cache_settings.get(&region_namespace).cloned().unwrap_or_default();
        let region = Arc::new(CacheRegion::new(&region_namespace, settings));
        self.cache_regions.insert(region_namespace, region.clone());
        Some(region)
    }

    /// Opens a session against `connection`, carrying this
    /// configuration's registry and settings. Cheap: the registry is
    /// shared via `Arc`, not cloned.
    pub fn build_session<C: strata_core::RawExecutor>(&self, connection: C) -> crate::session::Session<C> {
        crate::session::Session::new(
            connection,
            self.registry.clone(),
            self.environment_id.clone(),
            self.settings.local_cache_scope,
            self.settings.auto_mapping_behavior,
            self.settings.map_underscore_to_camel_case,
        )
    }

    /// Finalizes the registry (draining `<include>`/`<cache-ref>`/result-map
    /// forward references) and validates every declared cache namespace
    /// resolved to a real region.
    pub fn finish_build(&mut self) -> Result<()> {
        self.registry_mut().finish_build()?;
        for namespace in self.registry.cache_regions.values().cloned().collect::<Vec<_>>() {
            if !self.cache_settings.contains_key(&namespace) {
                return Err(MapperError::incomplete(&namespace, "cache-ref target namespace never declared a cache").into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_and_resolves_a_cache_region() {
        let mut configuration = Configuration::new("test-env");
        configuration.declare_cache("ns", CacheSettings::default());
        let region = configuration.cache_region("ns").unwrap();
        assert_eq!(region.len(), 0);
    }

    #[test]
    fn cache_ref_shares_the_target_regions_instance() {
        let mut configuration = Configuration::new("test-env");
        configuration.declare_cache("owner", CacheSettings::default());
        configuration.declare_cache_ref("borrower", "owner");
        configuration.finish_build().unwrap();
        let owner_region = configuration.cache_region("owner").unwrap();
        owner_region.put(crate::cache::CacheKeyBuilder::new("s", "SELECT 1", "e").build(), strata_core::Value::Int32(Some(1)));
        let borrower_region = configuration.cache_region("borrower").unwrap();
        assert_eq!(borrower_region.len(), 1);
    }
}
