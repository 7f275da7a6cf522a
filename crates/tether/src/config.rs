//! Configuration for bridge contexts.
//!
//! Limits map directly onto the engine's runtime limits. `None` keeps the
//! engine default.

use boa_engine::vm::RuntimeLimits;
use serde::Deserialize;

/// Engine settings applied when a context is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContextConfig {
    /// Maximum iterations of a single loop before the engine throws.
    pub loop_iteration_limit: Option<u64>,

    /// Maximum call recursion depth.
    pub recursion_limit: Option<usize>,

    /// Maximum engine stack size, in values.
    pub stack_size_limit: Option<usize>,
}

impl ContextConfig {
    /// Create a config with engine defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loop iteration limit.
    pub fn loop_iteration_limit(mut self, limit: u64) -> Self {
        self.loop_iteration_limit = Some(limit);
        self
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// Set the stack size limit.
    pub fn stack_size_limit(mut self, limit: usize) -> Self {
        self.stack_size_limit = Some(limit);
        self
    }

    /// Overlay the values set in `other`.
    pub fn merge(mut self, other: &ContextConfig) -> Self {
        if other.loop_iteration_limit.is_some() {
            self.loop_iteration_limit = other.loop_iteration_limit;
        }
        if other.recursion_limit.is_some() {
            self.recursion_limit = other.recursion_limit;
        }
        if other.stack_size_limit.is_some() {
            self.stack_size_limit = other.stack_size_limit;
        }
        self
    }

    pub(crate) fn runtime_limits(&self) -> RuntimeLimits {
        let mut limits = RuntimeLimits::default();
        if let Some(limit) = self.loop_iteration_limit {
            limits.set_loop_iteration_limit(limit);
        }
        if let Some(limit) = self.recursion_limit {
            limits.set_recursion_limit(limit);
        }
        if let Some(limit) = self.stack_size_limit {
            limits.set_stack_size_limit(limit);
        }
        limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContextConfig::new();
        assert_eq!(config.loop_iteration_limit, None);
        assert_eq!(config.recursion_limit, None);
        assert_eq!(config.stack_size_limit, None);
    }

    #[test]
    fn test_builder_methods() {
        let config = ContextConfig::new()
            .loop_iteration_limit(1_000)
            .recursion_limit(64)
            .stack_size_limit(512 * 1024);
        assert_eq!(config.loop_iteration_limit, Some(1_000));
        assert_eq!(config.recursion_limit, Some(64));
        assert_eq!(config.stack_size_limit, Some(512 * 1024));

        let limits = config.runtime_limits();
        assert_eq!(limits.loop_iteration_limit(), 1_000);
        assert_eq!(limits.recursion_limit(), 64);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let base = ContextConfig::new().recursion_limit(32).loop_iteration_limit(10);
        let overlay = ContextConfig::new().loop_iteration_limit(20);
        let merged = base.merge(&overlay);
        assert_eq!(merged.loop_iteration_limit, Some(20));
        assert_eq!(merged.recursion_limit, Some(32));
    }

    #[test]
    fn test_deserialize_toml() {
        let config: ContextConfig = toml::from_str(
            r#"
            loop-iteration-limit = 5000
            recursion-limit = 128
            "#,
        )
        .unwrap();
        assert_eq!(config.loop_iteration_limit, Some(5000));
        assert_eq!(config.recursion_limit, Some(128));
        assert_eq!(config.stack_size_limit, None);
    }
}
