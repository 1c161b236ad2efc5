//! Scrape configuration.
//!
//! A [`ScrapeConfig`] is built once at startup (defaults, then an optional
//! JSON file, then CLI overrides) and passed down by reference. Nothing in
//! the classifier or merge engine reads process-global settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TypeName;

/// Default name of the root pseudo-module.
pub const DEFAULT_BUILTIN_MODULE: &str = "builtins";

/// Default bound on nested type extraction.
pub const DEFAULT_MAX_TYPE_DEPTH: usize = 64;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Which overload-resolver strategy to use for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Parse signatures out of doc text.
    #[default]
    Docstring,
    /// Use signatures the runtime declares, falling back to doc text.
    Introspect,
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Name of the root pseudo-module (`builtins` or `__builtin__`).
    pub builtin_module: String,
    /// Type reflection reports when it knows nothing narrower.
    /// Defaults to `(builtin_module, "object")`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_type: Option<TypeName>,
    /// Nesting depth past which types are emitted as references.
    pub max_type_depth: usize,
    pub resolver: ResolverKind,
    /// Module names never scraped.
    pub skip_modules: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            builtin_module: DEFAULT_BUILTIN_MODULE.to_string(),
            placeholder_type: None,
            max_type_depth: DEFAULT_MAX_TYPE_DEPTH,
            resolver: ResolverKind::default(),
            skip_modules: vec!["__main__".to_string()],
        }
    }
}

impl ScrapeConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScrapeConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.builtin_module.is_empty() {
            return Err(ConfigError::Invalid {
                message: "builtin_module must not be empty".to_string(),
            });
        }
        if self.max_type_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "max_type_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The placeholder ("unknown") type for this run.
    pub fn placeholder(&self) -> TypeName {
        self.placeholder_type
            .clone()
            .unwrap_or_else(|| self.builtin_type("object"))
    }

    /// A type name in the root pseudo-module.
    pub fn builtin_type(&self, name: &str) -> TypeName {
        TypeName::new(&self.builtin_module, name)
    }

    /// Whether `module` should be scraped as an ordinary module.
    ///
    /// The root pseudo-module is handled separately and is excluded here.
    pub fn should_scrape(&self, module: &str) -> bool {
        module != self.builtin_module && !self.skip_modules.iter().any(|m| m == module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.placeholder(), TypeName::new("builtins", "object"));
        assert_eq!(config.resolver, ResolverKind::Docstring);
        assert!(!config.should_scrape("__main__"));
        assert!(!config.should_scrape("builtins"));
        assert!(config.should_scrape("sys"));
    }

    #[test]
    fn placeholder_follows_builtin_module() {
        let config = ScrapeConfig {
            builtin_module: "__builtin__".to_string(),
            ..Default::default()
        };
        assert_eq!(config.placeholder(), TypeName::new("__builtin__", "object"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("idbgen.json");
        fs::write(&path, r#"{"resolver": "introspect", "placeholder_type": ["m", "Any"]}"#)
            .unwrap();

        let config = ScrapeConfig::from_file(&path).unwrap();
        assert_eq!(config.resolver, ResolverKind::Introspect);
        assert_eq!(config.placeholder(), TypeName::new("m", "Any"));
        assert_eq!(config.max_type_depth, DEFAULT_MAX_TYPE_DEPTH);
        assert_eq!(config.builtin_module, "builtins");
    }

    #[test]
    fn zero_depth_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("idbgen.json");
        fs::write(&path, r#"{"max_type_depth": 0}"#).unwrap();

        assert!(matches!(
            ScrapeConfig::from_file(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("idbgen.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            ScrapeConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
