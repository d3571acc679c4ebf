//! Bootstrap configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ident::{is_identifier, is_module_path};
use crate::probe::SearchPathFinder;
use crate::registry::DuplicatePolicy;

/// Errors that can occur when loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How the module tree is built and which siblings are probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloConfig {
    /// Name of the top-level namespace
    #[serde(default = "default_module")]
    pub module: String,

    /// Name of the sub-namespace holding the hello functions
    #[serde(default = "default_submodule")]
    pub submodule: String,

    /// What to do when a function name is registered twice
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Optional sibling libraries, imported at bootstrap when present
    #[serde(default = "default_siblings")]
    pub siblings: Vec<String>,

    /// Directories searched by the native finder, in order
    #[serde(default)]
    pub search_path: Vec<PathBuf>,

    /// Path-list environment variable appended to `search_path`
    #[serde(default = "default_search_path_env")]
    pub search_path_env: Option<String>,
}

fn default_module() -> String {
    "proj".to_string()
}

fn default_submodule() -> String {
    "hello".to_string()
}

fn default_siblings() -> Vec<String> {
    vec!["vxl".to_string()]
}

fn default_search_path_env() -> Option<String> {
    Some("PYTHONPATH".to_string())
}

impl Default for HelloConfig {
    fn default() -> Self {
        Self {
            module: default_module(),
            submodule: default_submodule(),
            duplicate_policy: DuplicatePolicy::default(),
            siblings: default_siblings(),
            search_path: Vec::new(),
            search_path_env: default_search_path_env(),
        }
    }
}

impl HelloConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Load by extension: `.json` is JSON, anything else YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    /// Check every name the bootstrap will bind or probe.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.module) {
            return Err(ConfigError::Invalid(format!(
                "module '{}' is not an identifier",
                self.module
            )));
        }
        if !is_identifier(&self.submodule) {
            return Err(ConfigError::Invalid(format!(
                "submodule '{}' is not an identifier",
                self.submodule
            )));
        }
        if let Some(bad) = self.siblings.iter().find(|s| !is_module_path(s)) {
            return Err(ConfigError::Invalid(format!(
                "sibling '{}' is not a module path",
                bad
            )));
        }
        Ok(())
    }

    /// Native finder over `search_path` followed by `search_path_env`.
    pub fn finder(&self) -> SearchPathFinder {
        let finder = SearchPathFinder::new(self.search_path.iter().cloned());
        match &self.search_path_env {
            Some(var) => finder.with_env(var),
            None => finder,
        }
    }
}
