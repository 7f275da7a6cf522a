//! Native objects bound onto the global object of every CLI context.

use std::rc::Rc;

use tether::{
    BridgeResult, Context, HostClass, HostFunction, HostObject, Instance, Value,
};

/// Bind `print`, `tether` and `env` on the context's global object.
pub fn install(ctx: &Context, script_args: &[String]) -> BridgeResult<()> {
    let global = ctx.global_object()?;

    let print = HostFunction::new("print", |args| {
        let line: Vec<String> = args.iter().map(ToString::to_string).collect();
        println!("{}", line.join(" "));
        Ok(Value::Undefined)
    });
    global.set_attr("print", print.into_ref())?;

    let tether = Instance::new(HostClass::new("Tether"))
        .with_attr("version", env!("CARGO_PKG_VERSION"))
        .with_attr("args", Value::Host(Rc::new(ScriptArgs(script_args.to_vec()))));
    global.set_attr("tether", tether.into_ref())?;

    global.set_attr("env", Value::host(Environment))?;
    Ok(())
}

/// Read-only, array-like view of the script arguments.
struct ScriptArgs(Vec<String>);

impl HostObject for ScriptArgs {
    fn get_attr(&self, name: &str) -> BridgeResult<Option<Value>> {
        if name == "length" {
            return Ok(Some(Value::from(self.0.len() as u32)));
        }
        let arg = name
            .parse::<usize>()
            .ok()
            .and_then(|index| self.0.get(index));
        Ok(arg.map(|arg| Value::from(arg.as_str())))
    }

    fn attr_names(&self) -> Vec<String> {
        (0..self.0.len()).map(|index| index.to_string()).collect()
    }

    fn type_name(&self) -> &str {
        "args"
    }
}

/// Process environment variables, read-only.
struct Environment;

impl HostObject for Environment {
    fn get_attr(&self, name: &str) -> BridgeResult<Option<Value>> {
        Ok(std::env::var(name).ok().map(Value::from))
    }

    fn attr_names(&self) -> Vec<String> {
        std::env::vars().map(|(name, _)| name).collect()
    }

    fn type_name(&self) -> &str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals_installed() {
        let ctx = Context::new().unwrap();
        install(&ctx, &["one".to_string(), "two".to_string()]).unwrap();
        assert_eq!(ctx.evaluate("typeof print").unwrap(), Value::from("function"));
        assert_eq!(
            ctx.evaluate("tether.version").unwrap(),
            Value::from(env!("CARGO_PKG_VERSION"))
        );
        assert_eq!(ctx.evaluate("tether.args.length").unwrap(), Value::Number(2.0));
        assert_eq!(ctx.evaluate("tether.args[1]").unwrap(), Value::from("two"));
        assert_eq!(ctx.evaluate("Object.keys(tether.args).join()").unwrap(), Value::from("0,1"));
    }

    #[test]
    fn test_env_is_read_only() {
        let ctx = Context::new().unwrap();
        install(&ctx, &[]).unwrap();
        assert_eq!(ctx.evaluate("env.TETHER_SURELY_UNSET_VAR").unwrap(), Value::Undefined);
        ctx.evaluate("env.TETHER_SURELY_UNSET_VAR = 'x'").unwrap();
        assert!(std::env::var("TETHER_SURELY_UNSET_VAR").is_err());
        ctx.evaluate("tether.version = 'changed'").unwrap();
        assert_eq!(
            ctx.evaluate("tether.version").unwrap(),
            Value::from(env!("CARGO_PKG_VERSION"))
        );
    }
}
