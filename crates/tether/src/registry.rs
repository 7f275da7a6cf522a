//! Per-context identity tables.
//!
//! Both tables hold back-references only. A native proxy lives as long as the
//! engine keeps it; an engine proxy lives as long as native code holds it.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use boa_engine::JsObject;
use boa_gc::GcRefCell;

use crate::engine_proxy::ProxyInner;
use crate::native_proxy::ProxyState;

/// Native object → live native proxy.
pub(crate) struct NativeSlot {
    pub(crate) addr: usize,
    pub(crate) state: Weak<ProxyState>,
    /// Engine `WeakRef` to the proxy object.
    pub(crate) weak_ref: JsObject,
}

#[derive(Default)]
pub(crate) struct NativeRegistry {
    next_id: u64,
    slots: HashMap<u64, NativeSlot>,
    by_addr: HashMap<usize, u64>,
}

impl NativeRegistry {
    pub(crate) fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// `WeakRef` of the live proxy for the native object at `addr`, if any.
    pub(crate) fn weak_ref_for(&self, addr: usize) -> Option<JsObject> {
        let id = self.by_addr.get(&addr)?;
        let slot = self.slots.get(id)?;
        slot.state.upgrade()?;
        Some(slot.weak_ref.clone())
    }

    pub(crate) fn state(&self, id: u64) -> Option<Rc<ProxyState>> {
        self.slots.get(&id)?.state.upgrade()
    }

    pub(crate) fn insert(&mut self, id: u64, slot: NativeSlot) {
        if let Some(previous) = self.by_addr.insert(slot.addr, id) {
            self.slots.remove(&previous);
        }
        self.slots.insert(id, slot);
    }

    pub(crate) fn remove(&mut self, id: u64) {
        if let Some(slot) = self.slots.remove(&id) {
            if self.by_addr.get(&slot.addr) == Some(&id) {
                self.by_addr.remove(&slot.addr);
            }
        }
    }

    /// Drop slots whose proxy has been collected.
    pub(crate) fn prune(&mut self) -> usize {
        let dead: Vec<u64> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.state.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect();
        for id in &dead {
            self.remove(*id);
        }
        dead.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.state.strong_count() > 0)
            .count()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.by_addr.clear();
    }
}

/// Address of an engine object, used as its identity key.
pub(crate) fn object_addr(object: &JsObject) -> usize {
    let cell: &GcRefCell<_> = object.as_ref();
    std::ptr::from_ref(cell).cast::<()>() as usize
}

/// Engine object → live engine proxy.
///
/// A live entry's proxy holds its object, so the address cannot be reused
/// while the entry can still upgrade.
#[derive(Default)]
pub(crate) struct EngineRegistry {
    entries: HashMap<usize, Weak<ProxyInner>>,
}

impl EngineRegistry {
    pub(crate) fn find(&self, object: &JsObject) -> Option<Rc<ProxyInner>> {
        self.entries
            .get(&object_addr(object))
            .and_then(Weak::upgrade)
            .filter(|inner| JsObject::equals(&inner.object, object))
    }

    pub(crate) fn insert(&mut self, inner: &Rc<ProxyInner>) {
        self.entries
            .insert(object_addr(&inner.object), Rc::downgrade(inner));
    }

    /// Drop the entry for `addr` once its proxy is gone.
    pub(crate) fn remove_dead(&mut self, addr: usize) {
        if self
            .entries
            .get(&addr)
            .is_some_and(|entry| entry.strong_count() == 0)
        {
            self.entries.remove(&addr);
        }
    }

    pub(crate) fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.strong_count() > 0);
        before - self.entries.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_engine::Context as Engine;

    #[test]
    fn test_engine_registry_tracks_live_proxies() {
        let engine = Engine::default();
        let object = JsObject::with_object_proto(engine.intrinsics());
        let other = JsObject::with_object_proto(engine.intrinsics());
        let mut registry = EngineRegistry::default();

        let inner = Rc::new(ProxyInner::new(object.clone(), Weak::new()));
        registry.insert(&inner);
        assert_eq!(registry.live(), 1);

        let found = registry.find(&object).unwrap();
        assert!(Rc::ptr_eq(&found, &inner));
        assert!(registry.find(&other).is_none());

        drop(found);
        drop(inner);
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.prune(), 1);
        assert!(registry.find(&object).is_none());
    }

    #[test]
    fn test_engine_registry_keys_by_object() {
        let engine = Engine::default();
        let objects: Vec<JsObject> = (0..64)
            .map(|_| JsObject::with_object_proto(engine.intrinsics()))
            .collect();
        let mut registry = EngineRegistry::default();
        let inners: Vec<Rc<ProxyInner>> = objects
            .iter()
            .map(|object| {
                let inner = Rc::new(ProxyInner::new(object.clone(), Weak::new()));
                registry.insert(&inner);
                inner
            })
            .collect();
        assert_eq!(registry.live(), 64);
        for (object, inner) in objects.iter().zip(&inners) {
            assert!(Rc::ptr_eq(&registry.find(object).unwrap(), inner));
        }

        let addr = object_addr(&objects[0]);
        registry.remove_dead(addr);
        assert!(registry.find(&objects[0]).is_some());
        drop(inners);
        registry.remove_dead(addr);
        assert_eq!(registry.prune(), 63);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_native_registry_ids_are_unique() {
        let mut registry = NativeRegistry::default();
        let first = registry.allocate_id();
        let second = registry.allocate_id();
        assert_ne!(first, second);
        assert_eq!(registry.live(), 0);
        assert!(registry.state(first).is_none());
        assert!(registry.weak_ref_for(0x1000).is_none());
    }

    #[test]
    fn test_native_registry_prunes_dead_slots() {
        let engine = Engine::default();
        let mut registry = NativeRegistry::default();
        let id = registry.allocate_id();
        registry.insert(
            id,
            NativeSlot {
                addr: 0x1000,
                state: Weak::new(),
                weak_ref: JsObject::with_object_proto(engine.intrinsics()),
            },
        );
        assert!(registry.weak_ref_for(0x1000).is_none());
        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.live(), 0);
    }
}
