//! Engine-side view of native objects.
//!
//! A native object reaches the engine as a `Proxy` whose handler traps call
//! back into [`HostObject`]. Every trap consults the type's [`AccessFlags`]
//! afresh, so flag changes apply to the very next property operation.
//!
//! The traps share one [`ProxyState`] holding the native reference. When the
//! engine collects the proxy (and with it the trap closures) the state is
//! dropped and the native reference released, exactly once.
//!
//! [`AccessFlags`]: crate::policy::AccessFlags

use std::rc::{Rc, Weak};

use boa_engine::object::builtins::JsArray;
use boa_engine::object::{FunctionObjectBuilder, ObjectInitializer};
use boa_engine::property::Attribute;
use boa_engine::{
    Context as Engine, JsArgs, JsNativeError, JsObject, JsResult, JsString, JsValue,
    NativeFunction,
};
use boa_gc::{Finalize, Trace, empty_trace};
use tracing::trace;

use crate::codec;
use crate::context::ContextInner;
use crate::engine::Intrinsics;
use crate::error::{BridgeError, BridgeResult};
use crate::host::{HostRef, host_addr};
use crate::policy::{self, AccessFlags};
use crate::registry::NativeSlot;

/// Native reference shared by the traps of one proxy.
pub(crate) struct ProxyState {
    id: u64,
    pub(crate) host: HostRef,
    context: Weak<ContextInner>,
}

impl ProxyState {
    fn flags(&self) -> AccessFlags {
        policy::access_flags(self.host.class())
    }
}

impl Drop for ProxyState {
    fn drop(&mut self) {
        if let Some(context) = self.context.upgrade() {
            if let Ok(mut natives) = context.natives.try_borrow_mut() {
                natives.remove(self.id);
            }
        }
        trace!(id = self.id, "native reference released");
    }
}

#[derive(Finalize)]
struct TrapCapture {
    state: Rc<ProxyState>,
}

// The capture holds no engine values.
unsafe impl Trace for TrapCapture {
    empty_trace!();
}

impl TrapCapture {
    fn context(&self) -> JsResult<Rc<ContextInner>> {
        self.state
            .context
            .upgrade()
            .ok_or_else(|| BridgeError::ContextDestroyed.into())
    }
}

type Trap = fn(&JsValue, &[JsValue], &TrapCapture, &mut Engine) -> JsResult<JsValue>;

fn trap(function: Trap, state: &Rc<ProxyState>) -> NativeFunction {
    NativeFunction::from_copy_closure_with_captures(
        function,
        TrapCapture {
            state: state.clone(),
        },
    )
}

/// Get the live proxy for `host`, creating one if needed.
pub(crate) fn wrap(
    context: &Rc<ContextInner>,
    host: &HostRef,
    engine: &mut Engine,
) -> BridgeResult<JsObject> {
    let intrinsics = context.intrinsics()?;
    let addr = host_addr(host);

    let existing = context.natives.borrow().weak_ref_for(addr);
    if let Some(weak_ref) = existing {
        let proxy = intrinsics
            .weak_ref_deref
            .call(&weak_ref.into(), &[], engine)
            .map_err(|e| BridgeError::from_js(e, engine))?;
        if let Some(proxy) = proxy.as_object() {
            return Ok(proxy.clone());
        }
    }

    create(context, &intrinsics, host.clone(), addr, engine)
}

/// The native object behind `object`, if it is one of this context's proxies.
pub(crate) fn unwrap(
    context: &Rc<ContextInner>,
    object: &JsObject,
    engine: &mut Engine,
) -> BridgeResult<Option<HostRef>> {
    let intrinsics = context.intrinsics()?;
    let id = intrinsics
        .weak_map_get
        .call(
            &intrinsics.weak_map.clone().into(),
            &[object.clone().into()],
            engine,
        )
        .map_err(|e| BridgeError::from_js(e, engine))?;
    let Some(id) = id.as_number() else {
        return Ok(None);
    };
    let state = context.natives.borrow().state(id as u64);
    Ok(state.map(|state| state.host.clone()))
}

fn create(
    context: &Rc<ContextInner>,
    intrinsics: &Intrinsics,
    host: HostRef,
    addr: usize,
    engine: &mut Engine,
) -> BridgeResult<JsObject> {
    let id = context.natives.borrow_mut().allocate_id();
    let callable = host.is_callable();
    let state = Rc::new(ProxyState {
        id,
        host,
        context: Rc::downgrade(context),
    });

    let target: JsObject = if callable {
        let name = JsString::from(state.host.type_name());
        FunctionObjectBuilder::new(engine.realm(), trap(call_native, &state))
            .name(name)
            .length(0)
            .constructor(false)
            .build()
            .into()
    } else {
        JsObject::with_object_proto(engine.intrinsics())
    };

    let handler = ObjectInitializer::new(engine)
        .function(trap(trap_get, &state), JsString::from("get"), 3)
        .function(trap(trap_set, &state), JsString::from("set"), 4)
        .function(trap(trap_has, &state), JsString::from("has"), 2)
        .function(trap(trap_delete, &state), JsString::from("deleteProperty"), 2)
        .function(trap(trap_own_keys, &state), JsString::from("ownKeys"), 1)
        .function(
            trap(trap_get_own_property_descriptor, &state),
            JsString::from("getOwnPropertyDescriptor"),
            2,
        )
        .function(
            trap(trap_define_property, &state),
            JsString::from("defineProperty"),
            3,
        )
        .function(
            trap(trap_prevent_extensions, &state),
            JsString::from("preventExtensions"),
            1,
        )
        .function(
            trap(trap_set_prototype_of, &state),
            JsString::from("setPrototypeOf"),
            2,
        )
        .build();

    let proxy = intrinsics
        .proxy
        .construct(&[target.into(), handler.into()], None, engine)
        .map_err(|e| BridgeError::from_js(e, engine))?;
    let weak_ref = intrinsics
        .weak_ref
        .construct(&[proxy.clone().into()], None, engine)
        .map_err(|e| BridgeError::from_js(e, engine))?;
    intrinsics
        .weak_map_set
        .call(
            &intrinsics.weak_map.clone().into(),
            &[proxy.clone().into(), JsValue::from(id as f64)],
            engine,
        )
        .map_err(|e| BridgeError::from_js(e, engine))?;

    context.natives.borrow_mut().insert(
        id,
        NativeSlot {
            addr,
            state: Rc::downgrade(&state),
            weak_ref,
        },
    );
    trace!(id, addr, callable, "native proxy created");
    Ok(proxy)
}

fn target_arg(args: &[JsValue]) -> JsResult<JsObject> {
    args.get_or_undefined(0)
        .as_object()
        .map(|target| target.clone())
        .ok_or_else(|| JsNativeError::typ().with_message("proxy target is not an object").into())
}

/// String keys as attribute names; `None` for symbols.
fn attr_name(key: &JsValue) -> JsResult<Option<String>> {
    match key.as_string() {
        Some(name) => name.to_std_string().map(Some).map_err(|_| {
            JsNativeError::typ()
                .with_message("malformed attribute name")
                .into()
        }),
        None => Ok(None),
    }
}

/// Missing or read-only native attributes make writes a no-op.
fn ignore_missing(result: BridgeResult<()>) -> BridgeResult<()> {
    match result {
        Err(BridgeError::AttributeNotFound(_)) => Ok(()),
        other => other,
    }
}

fn trap_get(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let target = target_arg(args)?;
    let key = args.get_or_undefined(1);
    let state = &capture.state;

    if let Some(name) = attr_name(key)? {
        if policy::is_visible(state.flags(), &name) {
            let context = capture.context()?;
            let value = context.engine.lend(engine, || state.host.get_attr(&name))?;
            if let Some(value) = value {
                return Ok(codec::to_engine(&context, &value, engine)?);
            }
        }
    }

    let key = key.to_property_key(engine)?;
    target.get(key, engine)
}

fn trap_set(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let Some(name) = attr_name(args.get_or_undefined(1))? else {
        return Ok(true.into());
    };
    if !policy::is_mutable(state.flags(), &name) {
        return Ok(true.into());
    }

    let context = capture.context()?;
    let value = codec::to_native(&context, args.get_or_undefined(2), engine)?;
    ignore_missing(context.engine.lend(engine, || state.host.set_attr(&name, value)))?;
    Ok(true.into())
}

fn trap_has(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let target = target_arg(args)?;
    let key = args.get_or_undefined(1);
    let state = &capture.state;

    if let Some(name) = attr_name(key)? {
        if policy::is_visible(state.flags(), &name) {
            let context = capture.context()?;
            if context.engine.lend(engine, || state.host.has_attr(&name)) {
                return Ok(true.into());
            }
        }
    }

    let key = key.to_property_key(engine)?;
    Ok(target.has_property(key, engine)?.into())
}

fn trap_delete(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let Some(name) = attr_name(args.get_or_undefined(1))? else {
        return Ok(true.into());
    };
    if !policy::is_mutable(state.flags(), &name) {
        return Ok(true.into());
    }

    let context = capture.context()?;
    ignore_missing(context.engine.lend(engine, || state.host.del_attr(&name)))?;
    Ok(true.into())
}

fn trap_own_keys(
    _this: &JsValue,
    _args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let context = capture.context()?;
    let names = context.engine.lend(engine, || state.host.attr_names());
    let flags = state.flags();
    let keys = names
        .iter()
        .filter(|name| policy::is_visible(flags, name))
        .map(|name| JsValue::from(JsString::from(name.as_str())));
    Ok(JsArray::from_iter(keys, engine).into())
}

fn trap_get_own_property_descriptor(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let Some(name) = attr_name(args.get_or_undefined(1))? else {
        return Ok(JsValue::undefined());
    };
    if !policy::is_visible(state.flags(), &name) {
        return Ok(JsValue::undefined());
    }

    let context = capture.context()?;
    let Some(value) = context.engine.lend(engine, || state.host.get_attr(&name))? else {
        return Ok(JsValue::undefined());
    };
    let value = codec::to_engine(&context, &value, engine)?;
    let descriptor = ObjectInitializer::new(engine)
        .property(JsString::from("value"), value, Attribute::all())
        .property(JsString::from("writable"), true, Attribute::all())
        .property(JsString::from("enumerable"), true, Attribute::all())
        .property(JsString::from("configurable"), true, Attribute::all())
        .build();
    Ok(descriptor.into())
}

fn trap_define_property(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let Some(name) = attr_name(args.get_or_undefined(1))? else {
        return Ok(false.into());
    };
    if !policy::is_mutable(state.flags(), &name) {
        return Ok(true.into());
    }

    let Some(descriptor) = args.get_or_undefined(2).as_object().map(|d| d.clone()) else {
        return Ok(false.into());
    };
    let context = capture.context()?;
    let value = descriptor.get(JsString::from("value"), engine)?;
    let value = codec::to_native(&context, &value, engine)?;
    ignore_missing(context.engine.lend(engine, || state.host.set_attr(&name, value)))?;
    Ok(true.into())
}

/// Refused so the target stays extensible for `ownKeys`.
fn trap_prevent_extensions(
    _this: &JsValue,
    _args: &[JsValue],
    _capture: &TrapCapture,
    _engine: &mut Engine,
) -> JsResult<JsValue> {
    Ok(false.into())
}

/// Accepts only the current prototype.
fn trap_set_prototype_of(
    _this: &JsValue,
    args: &[JsValue],
    _capture: &TrapCapture,
    _engine: &mut Engine,
) -> JsResult<JsValue> {
    let target = target_arg(args)?;
    let current = target
        .prototype()
        .map_or_else(JsValue::null, JsValue::from);
    Ok(JsValue::same_value(&current, args.get_or_undefined(1)).into())
}

fn call_native(
    _this: &JsValue,
    args: &[JsValue],
    capture: &TrapCapture,
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let state = &capture.state;
    let context = capture.context()?;
    let args = codec::args_to_native(&context, args, engine)?;
    let result = context.engine.lend(engine, || state.host.call(&args))?;
    Ok(codec::to_engine(&context, &result, engine)?)
}
