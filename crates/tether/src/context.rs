//! Bridge context: one engine plus its identity tables.
//!
//! Proxies hold weak references to the context, so dropping or destroying
//! it turns every later proxy operation into a `ContextDestroyed` error.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use boa_engine::{Context as Engine, Source};
use tracing::debug;

use crate::codec;
use crate::config::ContextConfig;
use crate::engine::{EngineCell, Intrinsics};
use crate::engine_proxy::EngineProxy;
use crate::error::{BridgeError, BridgeResult};
use crate::registry::{EngineRegistry, NativeRegistry};
use crate::value::Value;

/// Shared per-context state reached from proxies and trap closures.
pub(crate) struct ContextInner {
    pub(crate) engine: EngineCell,
    pub(crate) intrinsics: RefCell<Option<Rc<Intrinsics>>>,
    pub(crate) natives: RefCell<NativeRegistry>,
    pub(crate) engines: RefCell<EngineRegistry>,
}

impl ContextInner {
    pub(crate) fn intrinsics(&self) -> BridgeResult<Rc<Intrinsics>> {
        self.intrinsics
            .borrow()
            .clone()
            .ok_or(BridgeError::ContextDestroyed)
    }

    fn evaluate(self: &Rc<Self>, source: &str) -> BridgeResult<Value> {
        self.engine.with(|engine| {
            let result = engine
                .eval(Source::from_bytes(source))
                .map_err(|e| BridgeError::from_js(e, engine))?;
            codec::to_native(self, &result, engine)
        })
    }

    fn global_object(self: &Rc<Self>) -> BridgeResult<EngineProxy> {
        self.engine.with(|engine| {
            let global = engine.global_object();
            Ok(EngineProxy::obtain(self, global))
        })
    }

    fn gc(&self) -> BridgeResult<()> {
        self.engine.with(|engine| {
            engine.clear_kept_objects();
            boa_gc::force_collect();
            Ok(())
        })?;
        let natives = self.natives.borrow_mut().prune();
        let engines = self.engines.borrow_mut().prune();
        debug!(natives, engines, "collected bridge garbage");
        Ok(())
    }

    fn destroy(&self) -> BridgeResult<()> {
        let Some(engine) = self.engine.take()? else {
            return Ok(());
        };
        self.intrinsics.borrow_mut().take();
        self.natives.borrow_mut().clear();
        self.engines.borrow_mut().clear();
        drop(engine);
        debug!("context destroyed");
        Ok(())
    }
}

/// Proxy and table counts for one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Native objects currently exposed to the engine.
    pub native_proxies: usize,
    /// Engine objects currently held by native code.
    pub engine_proxies: usize,
}

/// An engine execution context with its bridge state.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`; drive each context from one thread.
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    /// Create a context with default engine settings.
    pub fn new() -> BridgeResult<Self> {
        Self::with_config(ContextConfig::default())
    }

    /// Create a context with the given engine settings.
    pub fn with_config(config: ContextConfig) -> BridgeResult<Self> {
        let mut engine = Engine::default();
        engine.set_runtime_limits(config.runtime_limits());
        let intrinsics = Intrinsics::capture(&mut engine)?;

        debug!(?config, "context created");
        Ok(Self {
            inner: Rc::new(ContextInner {
                engine: EngineCell::new(engine),
                intrinsics: RefCell::new(Some(Rc::new(intrinsics))),
                natives: RefCell::new(NativeRegistry::default()),
                engines: RefCell::new(EngineRegistry::default()),
            }),
        })
    }

    /// The engine's global object.
    pub fn global_object(&self) -> BridgeResult<EngineProxy> {
        self.inner.global_object()
    }

    /// Evaluate script source and convert the completion value.
    pub fn evaluate(&self, source: &str) -> BridgeResult<Value> {
        self.inner.evaluate(source)
    }

    /// Force an engine collection and drop stale identity-table entries.
    pub fn gc(&self) -> BridgeResult<()> {
        self.inner.gc()
    }

    /// Tear down the engine. Idempotent; refused while the engine is running.
    pub fn destroy(&self) -> BridgeResult<()> {
        self.inner.destroy()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.engine.is_destroyed()
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            native_proxies: self.inner.natives.borrow().live(),
            engine_proxies: self.inner.engines.borrow().live(),
        }
    }

    /// A weak, cloneable handle native callables can capture.
    pub fn handle(&self) -> ContextHandle {
        ContextHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(error) = self.inner.destroy() {
            debug!(%error, "context dropped while executing");
        }
    }
}

/// Weak handle to a [`Context`].
///
/// Evaluating through a handle from inside a native callback re-enters the
/// running engine.
#[derive(Clone)]
pub struct ContextHandle {
    inner: Weak<ContextInner>,
}

impl ContextHandle {
    fn upgrade(&self) -> BridgeResult<Rc<ContextInner>> {
        self.inner.upgrade().ok_or(BridgeError::ContextDestroyed)
    }

    pub fn evaluate(&self, source: &str) -> BridgeResult<Value> {
        self.upgrade()?.evaluate(source)
    }

    pub fn global_object(&self) -> BridgeResult<EngineProxy> {
        self.upgrade()?.global_object()
    }

    pub fn is_alive(&self) -> bool {
        self.upgrade().is_ok_and(|inner| !inner.engine.is_destroyed())
    }
}
