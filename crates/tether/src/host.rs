//! Native object model exposed to the engine.
//!
//! Anything implementing [`HostObject`] can be handed to the engine as a
//! [`Value::Host`]; the engine sees it through a native proxy that forwards
//! property access and calls back to the trait methods.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{BridgeError, BridgeResult};
use crate::policy::AccessFlags;
use crate::value::Value;

/// Shared reference to a native object. Identity is pointer identity.
pub type HostRef = Rc<dyn HostObject>;

/// Type-level descriptor shared by every instance of one native type.
///
/// Flags may be changed at any time; bridged operations read them fresh.
pub struct HostClass {
    name: String,
    flags: Cell<AccessFlags>,
}

impl HostClass {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_flags(name, AccessFlags::NONE)
    }

    pub fn with_flags(name: impl Into<String>, flags: AccessFlags) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            flags: Cell::new(flags),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> AccessFlags {
        self.flags.get()
    }

    pub fn set_flags(&self, flags: AccessFlags) {
        self.flags.set(flags);
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass")
            .field("name", &self.name)
            .field("flags", &self.flags.get())
            .finish()
    }
}

/// A native object the engine can read, write, enumerate and call.
///
/// Only [`get_attr`](HostObject::get_attr) is required. The defaults describe
/// a read-only, non-callable object with no type descriptor.
pub trait HostObject: 'static {
    /// Type descriptor carrying the access flags, if the type declares one.
    fn class(&self) -> Option<&HostClass> {
        None
    }

    /// Read an attribute. `Ok(None)` means the attribute does not exist.
    fn get_attr(&self, name: &str) -> BridgeResult<Option<Value>>;

    /// Write an attribute. The stored value may differ from `value`.
    fn set_attr(&self, name: &str, value: Value) -> BridgeResult<()> {
        let _ = value;
        Err(BridgeError::attribute_not_found(name))
    }

    /// Remove an attribute. Fails with `AttributeNotFound` when absent.
    fn del_attr(&self, name: &str) -> BridgeResult<()> {
        Err(BridgeError::attribute_not_found(name))
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(self.get_attr(name), Ok(Some(_)))
    }

    /// Attribute names in enumeration order, private ones included.
    fn attr_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, args: &[Value]) -> BridgeResult<Value> {
        let _ = args;
        Err(BridgeError::invocation(format!(
            "'{}' object is not callable",
            self.type_name()
        )))
    }

    fn type_name(&self) -> &str {
        self.class().map(HostClass::name).unwrap_or("object")
    }
}

/// Address of a native object, used as its identity key.
pub(crate) fn host_addr(host: &HostRef) -> usize {
    Rc::as_ptr(host) as *const () as usize
}

type SetHook = Box<dyn Fn(Value) -> Value>;

/// A dynamic attribute bag, the default native object.
///
/// Attributes keep insertion order. A per-attribute hook can rewrite values
/// on assignment, so what the engine reads back may differ from what it wrote.
pub struct Instance {
    class: Rc<HostClass>,
    attrs: RefCell<IndexMap<String, Value>>,
    hooks: HashMap<String, SetHook>,
}

impl Instance {
    pub fn new(class: Rc<HostClass>) -> Self {
        Self {
            class,
            attrs: RefCell::new(IndexMap::new()),
            hooks: HashMap::new(),
        }
    }

    /// Add an attribute while building.
    pub fn with_attr(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.borrow_mut().insert(name.into(), value.into());
        self
    }

    /// Rewrite values assigned to `name` through `hook`.
    pub fn on_set(mut self, name: impl Into<String>, hook: impl Fn(Value) -> Value + 'static) -> Self {
        self.hooks.insert(name.into(), Box::new(hook));
        self
    }

    pub fn into_ref(self) -> HostRef {
        Rc::new(self)
    }

    pub fn host_class(&self) -> &Rc<HostClass> {
        &self.class
    }

    /// Native-side read, ignoring access flags.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    /// Native-side write, ignoring access flags and hooks.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.attrs.borrow_mut().shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.attrs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.borrow().is_empty()
    }
}

impl HostObject for Instance {
    fn class(&self) -> Option<&HostClass> {
        Some(&self.class)
    }

    fn get_attr(&self, name: &str) -> BridgeResult<Option<Value>> {
        Ok(self.get(name))
    }

    fn set_attr(&self, name: &str, value: Value) -> BridgeResult<()> {
        let value = match self.hooks.get(name) {
            Some(hook) => hook(value),
            None => value,
        };
        self.attrs.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    fn del_attr(&self, name: &str) -> BridgeResult<()> {
        self.remove(name)
            .map(|_| ())
            .ok_or_else(|| BridgeError::attribute_not_found(name))
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attrs.borrow().contains_key(name)
    }

    fn attr_names(&self) -> Vec<String> {
        self.attrs.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("attrs", &self.attrs.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

type HostFn = Box<dyn Fn(&[Value]) -> BridgeResult<Value>>;

/// A named native callable.
pub struct HostFunction {
    name: String,
    func: HostFn,
}

impl HostFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> BridgeResult<Value> + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_ref(self) -> HostRef {
        Rc::new(self)
    }
}

impl HostObject for HostFunction {
    fn get_attr(&self, _name: &str) -> BridgeResult<Option<Value>> {
        Ok(None)
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, args: &[Value]) -> BridgeResult<Value> {
        (self.func)(args)
    }

    fn type_name(&self) -> &str {
        "function"
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction").field("name", &self.name).finish()
    }
}
