//! Configuration file parsing for tether.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tether::ContextConfig;

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Engine limits for every context the CLI creates
    #[serde(default)]
    pub context: ContextConfig,
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path.map(PathBuf::from).or_else(find_config_file);

    match config_path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        Some(path) => Err(anyhow::anyhow!("Config file not found: {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Search for a configuration file in the current directory and its parents.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    const CONFIG_NAMES: &[&str] = &["tether.toml", ".tetherrc.toml"];

    let mut dir = Some(cwd.as_path());
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.context, ContextConfig::default());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[context]
loop-iteration-limit = 1000000
recursion-limit = 256
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.context.loop_iteration_limit, Some(1_000_000));
        assert_eq!(config.context.recursion_limit, Some(256));
        assert_eq!(config.context.stack_size_limit, None);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = load_config(Some(Path::new("/definitely/not/here/tether.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = ContextConfig::new().loop_iteration_limit(10).recursion_limit(5);
        let flags = ContextConfig::new().loop_iteration_limit(20);
        let merged = file.merge(&flags);
        assert_eq!(merged.loop_iteration_limit, Some(20));
        assert_eq!(merged.recursion_limit, Some(5));
    }
}
