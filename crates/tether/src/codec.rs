//! Value conversion across the bridge.
//!
//! `to_engine` turns a native [`Value`] into an engine value and `to_native`
//! goes the other way. Primitives are copied; objects are wrapped in the
//! proxy for their origin, reusing the live proxy when there is one.

use std::rc::Rc;

use boa_engine::{Context as Engine, JsObject, JsString, JsValue};

use crate::context::ContextInner;
use crate::engine_proxy::EngineProxy;
use crate::error::{BridgeError, BridgeResult};
use crate::native_proxy;
use crate::value::Value;

/// Convert a native value to an engine value.
pub(crate) fn to_engine(
    context: &Rc<ContextInner>,
    value: &Value,
    engine: &mut Engine,
) -> BridgeResult<JsValue> {
    Ok(match value {
        Value::Undefined => JsValue::undefined(),
        Value::Null => JsValue::null(),
        Value::Bool(b) => JsValue::from(*b),
        Value::Number(n) => JsValue::from(*n),
        Value::String(s) => JsValue::from(JsString::from(s.as_str())),
        Value::Host(host) => native_proxy::wrap(context, host, engine)?.into(),
        Value::Object(proxy) => {
            if !proxy.belongs_to(context) {
                return Err(BridgeError::conversion(
                    "object belongs to a different or destroyed context",
                ));
            }
            proxy.object().clone().into()
        }
    })
}

/// Convert an engine value to a native value.
pub(crate) fn to_native(
    context: &Rc<ContextInner>,
    value: &JsValue,
    engine: &mut Engine,
) -> BridgeResult<Value> {
    if value.is_undefined() {
        return Ok(Value::Undefined);
    }
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let Some(b) = value.as_boolean() {
        return Ok(Value::Bool(b));
    }
    if let Some(n) = value.as_number() {
        return Ok(Value::Number(n));
    }
    if let Some(s) = value.as_string() {
        return Ok(Value::String(s.to_std_string_lossy()));
    }
    if let Some(object) = value.as_object() {
        let object: JsObject = object.clone();
        if let Some(host) = native_proxy::unwrap(context, &object, engine)? {
            return Ok(Value::Host(host));
        }
        return Ok(Value::Object(EngineProxy::obtain(context, object)));
    }
    if value.is_symbol() {
        return Err(BridgeError::conversion("symbol values have no native representation"));
    }
    if value.is_bigint() {
        return Err(BridgeError::conversion("bigint values have no native representation"));
    }
    Err(BridgeError::conversion("unsupported engine value"))
}

/// Convert a list of engine arguments.
pub(crate) fn args_to_native(
    context: &Rc<ContextInner>,
    args: &[JsValue],
    engine: &mut Engine,
) -> BridgeResult<Vec<Value>> {
    args.iter()
        .map(|arg| to_native(context, arg, engine))
        .collect()
}

/// Convert a list of native arguments.
pub(crate) fn args_to_engine(
    context: &Rc<ContextInner>,
    args: &[Value],
    engine: &mut Engine,
) -> BridgeResult<Vec<JsValue>> {
    args.iter()
        .map(|arg| to_engine(context, arg, engine))
        .collect()
}
