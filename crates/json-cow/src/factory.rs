//! Proxy flavors: factory, surface cache, and duplication statistics.
//!
//! A `ProxyFactory` owns one proxy "flavor": the per-kind forwarding-surface
//! cache and the duplication counter shared by every proxy it wraps. Callers
//! that define several unrelated flavors get isolated caches that cannot
//! collide on kind keys.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::forward::ForwardingSurface;
use crate::kind::ValueKind;
use crate::proxy::{CopyMode, CowProxy, TargetRef};
use crate::shared::SharedValue;

/// Kind-keyed cache of forwarding surfaces, built once per kind.
#[derive(Debug, Default)]
pub struct TypeCache {
    surfaces: RefCell<HashMap<ValueKind, Rc<ForwardingSurface>>>,
    built: Cell<usize>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, kind: ValueKind) -> Rc<ForwardingSurface> {
        if let Some(surface) = self.surfaces.borrow().get(&kind) {
            return Rc::clone(surface);
        }
        let surface = Rc::new(ForwardingSurface::build(kind));
        self.built.set(self.built.get() + 1);
        self.surfaces
            .borrow_mut()
            .insert(kind, Rc::clone(&surface));
        surface
    }

    /// How many surfaces this cache has built so far.
    pub fn surfaces_built(&self) -> usize {
        self.built.get()
    }
}

/// Counters shared by every proxy of one flavor.
#[derive(Debug, Default)]
pub struct ProxyStats {
    duplications: Cell<u64>,
}

impl ProxyStats {
    /// Deep duplications performed so far (root folds and forced child
    /// copies both count).
    pub fn duplications(&self) -> u64 {
        self.duplications.get()
    }

    pub(crate) fn record_duplication(&self) {
        self.duplications.set(self.duplications.get() + 1);
    }
}

/// Cache and stats handles threaded through one proxy tree.
#[derive(Debug, Clone)]
pub(crate) struct Flavor {
    pub(crate) cache: Rc<TypeCache>,
    pub(crate) stats: Rc<ProxyStats>,
}

/// Constructs proxies of one flavor.
#[derive(Debug)]
pub struct ProxyFactory {
    flavor: Flavor,
}

impl ProxyFactory {
    pub fn new() -> Self {
        Self {
            flavor: Flavor {
                cache: Rc::new(TypeCache::new()),
                stats: Rc::new(ProxyStats::default()),
            },
        }
    }

    /// Wraps a shared document in a root proxy of this flavor.
    pub fn wrap(&self, doc: SharedValue, mode: CopyMode) -> CowProxy {
        CowProxy::from_parts(TargetRef::root(doc), mode, false, self.flavor.clone())
    }

    pub fn stats(&self) -> &ProxyStats {
        &self.flavor.stats
    }

    pub fn cache(&self) -> &TypeCache {
        &self.flavor.cache
    }
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_builds_each_kind_once() {
        let cache = TypeCache::new();
        let a = cache.surface(ValueKind::Number);
        let b = cache.surface(ValueKind::Number);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.surfaces_built(), 1);
        cache.surface(ValueKind::String);
        assert_eq!(cache.surfaces_built(), 2);
    }

    #[test]
    fn factories_do_not_share_caches() {
        let a = ProxyFactory::new();
        let b = ProxyFactory::new();
        let doc = SharedValue::new(json!({"n": 1}));
        a.wrap(doc.clone(), CopyMode::Full)
            .length()
            .expect("object length");
        assert_eq!(a.cache().surfaces_built(), 1);
        assert_eq!(b.cache().surfaces_built(), 0);
    }
}
