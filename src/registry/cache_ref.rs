/// `<cache-ref namespace="other"/>`: installs a pointer to an
/// already-built cache region into the current namespace, so reads and
/// writes from either namespace aim at the same physical decorator
/// chain.
#[derive(Debug, Clone)]
pub struct CacheRef {
    pub namespace: String,
    pub target_namespace: String,
}
