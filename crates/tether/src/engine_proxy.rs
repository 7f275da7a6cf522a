//! Native-side view of engine objects
//!
//! [`EngineProxy`] forwards attribute access, keyed access, iteration and
//! calls to the engine object it wraps. Attribute reads of missing names
//! fail with `AttributeNotFound`; keyed reads of missing keys return
//! `undefined`, as the engine itself would.

use std::fmt;
use std::rc::{Rc, Weak};

use boa_engine::object::builtins::JsArray;
use boa_engine::{Context as Engine, JsObject, JsString, JsValue};
use tracing::trace;

use crate::codec;
use crate::context::ContextInner;
use crate::error::{BridgeError, BridgeResult};
use crate::registry::object_addr;
use crate::value::Value;

/// Key for mapping-style access: a property name or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(u32),
}

impl Key {
    fn to_js(&self) -> JsString {
        match self {
            Self::Name(name) => JsString::from(name.as_str()),
            Self::Index(index) => JsString::from(index.to_string().as_str()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for Key {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

/// The wrapped engine object; one per engine object per context.
pub(crate) struct ProxyInner {
    pub(crate) object: JsObject,
    context: Weak<ContextInner>,
}

impl ProxyInner {
    pub(crate) fn new(object: JsObject, context: Weak<ContextInner>) -> Self {
        Self { object, context }
    }
}

impl Drop for ProxyInner {
    fn drop(&mut self) {
        if let Some(context) = self.context.upgrade() {
            if let Ok(mut engines) = context.engines.try_borrow_mut() {
                engines.remove_dead(object_addr(&self.object));
            }
        }
        trace!("engine reference released");
    }
}

/// A JavaScript object seen from native code.
///
/// Cloning is cheap and keeps identity: two proxies compare equal exactly
/// when they wrap the same engine object. A function obtained through
/// [`get_attr`](Self::get_attr) or [`get_item`](Self::get_item) remembers
/// the object it came from and uses it as `this` when called.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync` because engine objects are tied to
/// their context's thread.
#[derive(Clone)]
pub struct EngineProxy {
    inner: Rc<ProxyInner>,
    receiver: Option<JsObject>,
}

impl EngineProxy {
    /// Get the live proxy for `object`, creating one if needed.
    pub(crate) fn obtain(context: &Rc<ContextInner>, object: JsObject) -> Self {
        let existing = context.engines.borrow().find(&object);
        let inner = match existing {
            Some(inner) => inner,
            None => {
                let inner = Rc::new(ProxyInner::new(object, Rc::downgrade(context)));
                context.engines.borrow_mut().insert(&inner);
                trace!(callable = inner.object.is_callable(), "engine proxy created");
                inner
            }
        };
        Self {
            inner,
            receiver: None,
        }
    }

    pub(crate) fn object(&self) -> &JsObject {
        &self.inner.object
    }

    pub(crate) fn belongs_to(&self, context: &Rc<ContextInner>) -> bool {
        std::ptr::eq(self.inner.context.as_ptr(), Rc::as_ptr(context))
    }

    fn with_receiver(mut self, receiver: &JsObject) -> Self {
        self.receiver = Some(receiver.clone());
        self
    }

    fn run<R>(
        &self,
        f: impl FnOnce(&Rc<ContextInner>, &JsObject, &mut Engine) -> BridgeResult<R>,
    ) -> BridgeResult<R> {
        let context = self
            .inner
            .context
            .upgrade()
            .ok_or(BridgeError::ContextDestroyed)?;
        context
            .engine
            .with(|engine| f(&context, &self.inner.object, engine))
    }

    /// Bind functions read off this object to it as `this`.
    fn bind(&self, value: Value) -> Value {
        match value {
            Value::Object(proxy) if proxy.is_callable() => {
                Value::Object(proxy.with_receiver(&self.inner.object))
            }
            other => other,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.inner.object.is_callable()
    }

    /// Read an attribute, failing with `AttributeNotFound` when absent.
    ///
    /// Inherited properties count as present.
    pub fn get_attr(&self, name: &str) -> BridgeResult<Value> {
        let value = self.run(|context, object, engine| {
            let key = JsString::from(name);
            let present = object
                .has_property(key.clone(), engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            if !present {
                return Err(BridgeError::attribute_not_found(name));
            }
            let value = object
                .get(key, engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            codec::to_native(context, &value, engine)
        })?;
        Ok(self.bind(value))
    }

    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> BridgeResult<()> {
        self.set_item(name, value)
    }

    /// Delete an attribute; absent names are a no-op.
    pub fn del_attr(&self, name: &str) -> BridgeResult<()> {
        self.del_item(name)
    }

    pub fn has_attr(&self, name: &str) -> BridgeResult<bool> {
        self.contains(name)
    }

    /// Mapping-style membership, including inherited properties.
    pub fn contains(&self, key: impl Into<Key>) -> BridgeResult<bool> {
        let key = key.into().to_js();
        self.run(|_, object, engine| {
            object
                .has_property(key, engine)
                .map_err(|e| BridgeError::from_js(e, engine))
        })
    }

    /// Mapping-style read; a missing key yields `undefined`.
    pub fn get_item(&self, key: impl Into<Key>) -> BridgeResult<Value> {
        let key = key.into().to_js();
        let value = self.run(|context, object, engine| {
            let value = object
                .get(key, engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            codec::to_native(context, &value, engine)
        })?;
        Ok(self.bind(value))
    }

    pub fn set_item(&self, key: impl Into<Key>, value: impl Into<Value>) -> BridgeResult<()> {
        let key = key.into().to_js();
        let value = value.into();
        self.run(|context, object, engine| {
            let value = codec::to_engine(context, &value, engine)?;
            object
                .set(key, value, true, engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            Ok(())
        })
    }

    /// Mapping-style delete; absent keys are a no-op.
    pub fn del_item(&self, key: impl Into<Key>) -> BridgeResult<()> {
        let key = key.into().to_js();
        self.run(|_, object, engine| {
            object
                .delete_property_or_throw(key, engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            Ok(())
        })
    }

    /// Own enumerable property names, snapshotted now and yielded lazily.
    ///
    /// Call again to restart from the object's current state.
    pub fn keys(&self) -> BridgeResult<Keys> {
        let names = self.run(|context, object, engine| {
            let intrinsics = context.intrinsics()?;
            let keys = intrinsics
                .object_keys
                .call(&JsValue::undefined(), &[object.clone().into()], engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            let keys = keys
                .as_object()
                .map(|keys| keys.clone())
                .ok_or_else(|| BridgeError::engine("Object.keys did not return an array"))?;
            let keys = JsArray::from_object(keys).map_err(|e| BridgeError::from_js(e, engine))?;
            let length = keys
                .length(engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;

            let mut names = Vec::with_capacity(length as usize);
            for index in 0..length {
                let name = keys
                    .get(index as i64, engine)
                    .map_err(|e| BridgeError::from_js(e, engine))?;
                if let Some(name) = name.as_string() {
                    names.push(name.clone());
                }
            }
            Ok(names)
        })?;
        Ok(Keys {
            names: names.into_iter(),
        })
    }

    /// Call with the bound receiver, or `undefined` as `this`.
    pub fn call(&self, args: &[Value]) -> BridgeResult<Value> {
        let this = self
            .receiver
            .as_ref()
            .map(|receiver| JsValue::from(receiver.clone()))
            .unwrap_or_default();
        self.invoke(this, args)
    }

    /// Call with an explicit `this`.
    pub fn call_with_this(&self, this: impl Into<Value>, args: &[Value]) -> BridgeResult<Value> {
        let this = this.into();
        let this = self.run(|context, _, engine| codec::to_engine(context, &this, engine))?;
        self.invoke(this, args)
    }

    /// Read `name` and call it with this object as `this`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> BridgeResult<Value> {
        match self.get_attr(name)? {
            Value::Object(method) => method.call(args),
            _ => Err(BridgeError::invocation("JSObject not callable")),
        }
    }

    fn invoke(&self, this: JsValue, args: &[Value]) -> BridgeResult<Value> {
        if !self.is_callable() {
            return Err(BridgeError::invocation("JSObject not callable"));
        }
        self.run(|context, object, engine| {
            let args = codec::args_to_engine(context, args, engine)?;
            let result = object
                .call(&this, &args, engine)
                .map_err(|e| BridgeError::from_js(e, engine))?;
            codec::to_native(context, &result, engine)
        })
    }
}

impl PartialEq for EngineProxy {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for EngineProxy {}

impl fmt::Display for EngineProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_callable() { "function" } else { "object" };
        write!(f, "<JSObject [{}] at {:p}>", kind, Rc::as_ptr(&self.inner))
    }
}

impl fmt::Debug for EngineProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineProxy({})", self)
    }
}

/// Property names of an engine object, yielded lazily.
#[derive(Clone)]
pub struct Keys {
    names: std::vec::IntoIter<JsString>,
}

impl Iterator for Keys {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.names.next().map(|name| name.to_std_string_lossy())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl ExactSizeIterator for Keys {}
