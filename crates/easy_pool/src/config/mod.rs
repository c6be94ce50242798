//! Configuration
//!
//! Pool settings load from TOML or RON, picked by file extension. Templates
//! are runtime objects, so startup pools name a template that the host
//! supplies through a [`TemplateLibrary`].

use crate::entity::Entity;
use crate::pooling::{PoolingStrategy, DEFAULT_CAPACITY};
use std::collections::HashMap;
use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("ron") => Ok(Format::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Settings are well-formed but unusable
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// A sub-pool registered when a manager starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupPool {
    /// Name the blueprint is registered under
    pub pool_name: String,

    /// Template name, resolved through the [`TemplateLibrary`]
    pub template: String,

    /// Strategy; falls back to [`PoolSettings::default_strategy`]
    #[serde(default)]
    pub strategy: Option<PoolingStrategy>,

    /// Initial capacity; falls back to [`PoolSettings::default_capacity`]
    #[serde(default)]
    pub initial_size: Option<usize>,
}

impl StartupPool {
    /// Startup pool using the settings' defaults
    pub fn new(pool_name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            pool_name: pool_name.into(),
            template: template.into(),
            strategy: None,
            initial_size: None,
        }
    }
}

/// Pool manager settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Capacity of the empty pool and of startup pools without a size
    pub default_capacity: usize,

    /// Strategy of startup pools without one
    pub default_strategy: PoolingStrategy,

    /// Pools registered at startup, in order
    pub startup: Vec<StartupPool>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            default_strategy: PoolingStrategy::DEFAULT,
            startup: Vec::new(),
        }
    }
}

impl Config for PoolSettings {}

impl PoolSettings {
    /// Reject empty names and zero capacities
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_capacity == 0 {
            return Err(ConfigError::Invalid("default_capacity must be positive".into()));
        }

        for pool in &self.startup {
            if pool.pool_name.is_empty() {
                return Err(ConfigError::Invalid("startup pool without a name".into()));
            }
            if pool.template.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "startup pool '{}' has no template",
                    pool.pool_name
                )));
            }
            if pool.initial_size == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "startup pool '{}' has zero initial_size",
                    pool.pool_name
                )));
            }
        }
        Ok(())
    }
}

/// Named template entities supplied by the host
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Entity>,
}

impl TemplateLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, returning the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, template: Entity) -> Option<Entity> {
        self.templates.insert(name.into(), template)
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, template: Entity) -> Self {
        self.insert(name, template);
        self
    }

    /// Look up a template
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.templates.get(name)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library holds no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
