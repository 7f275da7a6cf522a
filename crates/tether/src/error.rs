//! Error types for bridge operations
//!
//! Errors raised by the engine keep the engine's error name and message so
//! that native callers can tell a `TypeError` thrown by a script apart from a
//! failed conversion on the native side.

use boa_engine::{Context as Engine, JsError, JsNativeError, JsString};
use thiserror::Error;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while moving values or calls across the bridge
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Value cannot be represented on the destination side
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Native-style attribute access on a missing name
    #[error("AttributeError: object has no attribute '{0}'")]
    AttributeNotFound(String),

    /// Calling a non-callable, or the callee raised
    #[error("Invocation error: {0}")]
    Invocation(String),

    /// Exception thrown by the engine during evaluation or a call
    #[error("{error_type}: {message}")]
    Script { error_type: String, message: String },

    /// The owning context was destroyed or dropped
    #[error("Context has been destroyed")]
    ContextDestroyed,

    /// Any other engine-side fault
    #[error("Engine error: {0}")]
    Engine(String),
}

impl BridgeError {
    /// Create a conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    /// Create an attribute-not-found error
    pub fn attribute_not_found(name: impl Into<String>) -> Self {
        Self::AttributeNotFound(name.into())
    }

    /// Create an invocation error
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation(message.into())
    }

    /// Create a script error from error type and message
    pub fn script_error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Script {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Create an engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Check if this error was thrown by script code
    pub fn is_script_error(&self) -> bool {
        matches!(self, Self::Script { .. })
    }

    /// Check if this is an attribute-not-found error
    pub fn is_attribute_not_found(&self) -> bool {
        matches!(self, Self::AttributeNotFound(_))
    }

    /// Get the engine error name (e.g. "TypeError") if this is a script error
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Script { error_type, .. } => Some(error_type),
            _ => None,
        }
    }

    /// Wrap an engine exception, reading `name` and `message` off thrown error objects.
    pub(crate) fn from_js(error: JsError, engine: &mut Engine) -> Self {
        if let Some(native) = error.as_native() {
            return split_error_text(&native.to_string());
        }

        let thrown = error.to_opaque(engine);
        if let Some(object) = thrown.as_object() {
            let name = object
                .get(JsString::from("name"), engine)
                .ok()
                .and_then(|value| value.as_string().map(|s| s.to_std_string_lossy()))
                .unwrap_or_else(|| "Error".to_string());
            let message = object
                .get(JsString::from("message"), engine)
                .ok()
                .and_then(|value| value.as_string().map(|s| s.to_std_string_lossy()))
                .unwrap_or_default();
            return Self::script_error(name, message);
        }

        Self::script_error("Uncaught", thrown.display().to_string())
    }
}

/// Split "TypeError: message" into its parts
fn split_error_text(text: &str) -> BridgeError {
    match text.split_once(": ") {
        Some((kind, message)) if !kind.is_empty() && !kind.contains(' ') => {
            BridgeError::script_error(kind, message)
        }
        _ => BridgeError::script_error("Error", text),
    }
}

impl From<BridgeError> for JsError {
    fn from(error: BridgeError) -> Self {
        let native = match &error {
            BridgeError::Conversion(_) | BridgeError::AttributeNotFound(_) => JsNativeError::typ(),
            BridgeError::Script { error_type, message } => {
                let native = match error_type.as_str() {
                    "TypeError" => JsNativeError::typ(),
                    "RangeError" => JsNativeError::range(),
                    "ReferenceError" => JsNativeError::reference(),
                    "SyntaxError" => JsNativeError::syntax(),
                    _ => JsNativeError::error(),
                };
                return native.with_message(message.clone()).into();
            }
            _ => JsNativeError::error(),
        };
        native.with_message(error.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_error_display() {
        let error = BridgeError::script_error("TypeError", "x is not a function");
        assert_eq!(error.to_string(), "TypeError: x is not a function");
        assert!(error.is_script_error());
        assert_eq!(error.error_type(), Some("TypeError"));
    }

    #[test]
    fn test_attribute_error_display() {
        let error = BridgeError::attribute_not_found("c");
        assert_eq!(error.to_string(), "AttributeError: object has no attribute 'c'");
        assert!(error.is_attribute_not_found());
        assert_eq!(error.error_type(), None);
    }

    #[test]
    fn test_split_error_text() {
        let error = split_error_text("RangeError: Maximum call stack size exceeded");
        assert_eq!(error.error_type(), Some("RangeError"));

        let error = split_error_text("something went wrong");
        assert_eq!(error.error_type(), Some("Error"));
        assert_eq!(error.to_string(), "Error: something went wrong");
    }

    #[test]
    fn test_from_js_native_error() {
        let mut engine = Engine::default();
        let error: JsError = JsNativeError::typ().with_message("bad value").into();
        let error = BridgeError::from_js(error, &mut engine);
        assert_eq!(error.error_type(), Some("TypeError"));
        assert_eq!(error.to_string(), "TypeError: bad value");
    }
}
