//! Engine ownership and re-entrant access.
//!
//! The engine is borrowed mutably for the whole of an outer call. When the
//! engine calls back into native code, the callback lends its own engine
//! reference through [`EngineCell::lend`] so that nested bridge operations on
//! the same thread reuse it instead of borrowing again.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use boa_engine::{Context as Engine, JsObject, JsString, JsValue};
use scopeguard::defer;

use crate::error::{BridgeError, BridgeResult};

pub(crate) struct EngineCell {
    engine: RefCell<Option<Engine>>,
    active: Cell<Option<NonNull<Engine>>>,
}

impl EngineCell {
    pub(crate) fn new(engine: Engine) -> Self {
        Self {
            engine: RefCell::new(Some(engine)),
            active: Cell::new(None),
        }
    }

    /// Run `f` against the engine, reusing a lent reference when nested.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut Engine) -> BridgeResult<R>) -> BridgeResult<R> {
        if let Some(mut active) = self.active.get() {
            // SAFETY: `active` was installed by `lend` from a live `&mut Engine`
            // whose holder is suspended further up this thread's stack, and it
            // is cleared before that holder touches the engine again.
            return f(unsafe { active.as_mut() });
        }

        let mut guard = self
            .engine
            .try_borrow_mut()
            .map_err(|_| BridgeError::engine("engine is busy"))?;
        let engine = guard.as_mut().ok_or(BridgeError::ContextDestroyed)?;
        let result = f(engine);
        // The outermost call ends the job: let `WeakRef` targets go.
        engine.clear_kept_objects();
        result
    }

    /// Make `engine` available to nested [`with`](Self::with) calls while `f` runs.
    pub(crate) fn lend<R>(&self, engine: &mut Engine, f: impl FnOnce() -> R) -> R {
        let previous = self.active.replace(Some(NonNull::from(engine)));
        defer! {
            self.active.set(previous);
        }
        f()
    }

    /// Take the engine out for destruction. Refused while it is executing.
    pub(crate) fn take(&self) -> BridgeResult<Option<Engine>> {
        if self.active.get().is_some() {
            return Err(BridgeError::engine("cannot destroy a context while it is executing"));
        }
        let mut guard = self
            .engine
            .try_borrow_mut()
            .map_err(|_| BridgeError::engine("cannot destroy a context while it is executing"))?;
        Ok(guard.take())
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        match self.engine.try_borrow() {
            Ok(engine) => engine.is_none(),
            // Borrowed means running.
            Err(_) => false,
        }
    }
}

/// Engine built-ins the bridge calls directly, captured once per context.
pub(crate) struct Intrinsics {
    pub(crate) proxy: JsObject,
    pub(crate) weak_ref: JsObject,
    pub(crate) weak_ref_deref: JsObject,
    pub(crate) weak_map: JsObject,
    pub(crate) weak_map_get: JsObject,
    pub(crate) weak_map_set: JsObject,
    pub(crate) object_keys: JsObject,
}

impl Intrinsics {
    pub(crate) fn capture(engine: &mut Engine) -> BridgeResult<Self> {
        let global = engine.global_object();
        let proxy = lookup(&global, "Proxy", engine)?;
        let weak_ref = lookup(&global, "WeakRef", engine)?;
        let weak_map_ctor = lookup(&global, "WeakMap", engine)?;
        let object = lookup(&global, "Object", engine)?;

        let weak_ref_proto = lookup(&weak_ref, "prototype", engine)?;
        let weak_ref_deref = lookup(&weak_ref_proto, "deref", engine)?;
        let weak_map_proto = lookup(&weak_map_ctor, "prototype", engine)?;
        let weak_map_get = lookup(&weak_map_proto, "get", engine)?;
        let weak_map_set = lookup(&weak_map_proto, "set", engine)?;
        let object_keys = lookup(&object, "keys", engine)?;

        let weak_map = weak_map_ctor
            .construct(&[], None, engine)
            .map_err(|e| BridgeError::from_js(e, engine))?;

        Ok(Self {
            proxy,
            weak_ref,
            weak_ref_deref,
            weak_map,
            weak_map_get,
            weak_map_set,
            object_keys,
        })
    }
}

fn lookup(object: &JsObject, name: &str, engine: &mut Engine) -> BridgeResult<JsObject> {
    let value: JsValue = object
        .get(JsString::from(name), engine)
        .map_err(|e| BridgeError::from_js(e, engine))?;
    value
        .as_object()
        .map(|object| object.clone())
        .ok_or_else(|| BridgeError::engine(format!("engine built-in '{}' is missing", name)))
}
