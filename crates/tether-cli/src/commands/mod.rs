//! CLI command implementations.

pub mod eval;
pub mod repl;
pub mod run;

use tether::Value;

/// Render a completion value the way the REPL echoes it.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_quotes_strings() {
        assert_eq!(render(&Value::from("hi")), "\"hi\"");
        assert_eq!(render(&Value::Number(f64::NAN)), "nan");
        assert_eq!(render(&Value::Null), "null");
    }
}
