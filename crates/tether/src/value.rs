//! Native-side values crossing the bridge

use std::fmt;
use std::rc::Rc;

use crate::engine_proxy::EngineProxy;
use crate::host::{HostObject, HostRef, host_addr};

/// The "no value" marker, engine `undefined`.
pub const UNDEFINED: Value = Value::Undefined;

/// The null marker, engine `null`.
pub const NULL: Value = Value::Null;

/// A value on the native side of the bridge.
///
/// Objects are tagged by origin: [`Value::Host`] for native objects and
/// [`Value::Object`] for engine objects seen through an [`EngineProxy`].
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Host(HostRef),
    Object(EngineProxy),
}

impl Value {
    /// Wrap a native object.
    pub fn host(object: impl HostObject) -> Self {
        Self::Host(Rc::new(object))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&EngineProxy> {
        match self {
            Self::Object(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&HostRef> {
        match self {
            Self::Host(host) => Some(host),
            _ => None,
        }
    }

    /// Engine-style type name, as `typeof` would report it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Host(host) if host.is_callable() => "function",
            Self::Object(proxy) if proxy.is_callable() => "function",
            Self::Host(_) | Self::Object(_) => "object",
        }
    }
}

/// Render a number, spelling non-finite values as `inf`, `-inf` and `nan`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "nan".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Host(a), Self::Host(b)) => host_addr(a) == host_addr(b),
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(s),
            Self::Host(host) => write!(f, "<native {} at {:#x}>", host.type_name(), host_addr(host)),
            Self::Object(proxy) => write!(f, "{}", proxy),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "String({:?})", s),
            Self::Number(n) => write!(f, "Number({})", format_number(*n)),
            other => write!(f, "{}", other),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<HostRef> for Value {
    fn from(host: HostRef) -> Self {
        Self::Host(host)
    }
}

impl From<EngineProxy> for Value {
    fn from(proxy: EngineProxy) -> Self {
        Self::Object(proxy)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}
