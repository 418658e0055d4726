//! Strategy chain configuration via TOML
//!
//! A host describes its strategy chain declaratively and builds a
//! [`StrategyStore`] from it. Order in the file is routing order.
//!
//! ```toml
//! [[strategy]]
//! kind = "identity"
//! name = "facts"
//! accept = ["app::facts::*"]
//!
//! [[strategy]]
//! kind = "native"
//! ```

use crate::acceptor::{PatternError, TypePatternAcceptor};
use crate::identity::{IdentityPlaceholderStrategy, IDENTITY_STRATEGY_NAME};
use crate::native::{NativeSerializationStrategy, NATIVE_STRATEGY_NAME};
use crate::store::StrategyStore;
use crate::strategy::MarshallingStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Failed to access config file '{}': {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An accept pattern is invalid
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    /// Two strategies share a name
    #[error("Duplicate strategy name '{0}'")]
    DuplicateName(String),

    /// The strategy list is empty
    #[error("No strategies configured")]
    Empty,
}

/// Which strategy implementation a chain entry builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// [`IdentityPlaceholderStrategy`]
    Identity,
    /// [`NativeSerializationStrategy`]
    Native,
}

impl StrategyKind {
    /// Name used when a chain entry does not give one.
    pub fn default_name(self) -> &'static str {
        match self {
            StrategyKind::Identity => IDENTITY_STRATEGY_NAME,
            StrategyKind::Native => NATIVE_STRATEGY_NAME,
        }
    }
}

/// One strategy in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    /// Strategy implementation.
    pub kind: StrategyKind,
    /// Strategy name; defaults to the kind's default name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type-name patterns this strategy accepts; empty accepts everything.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
}

impl StrategySpec {
    /// Effective strategy name.
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.default_name())
    }

    fn build(&self) -> Result<Box<dyn MarshallingStrategy>, ConfigError> {
        let acceptor = Arc::new(TypePatternAcceptor::new(&self.accept)?);
        let name = self.effective_name();
        Ok(match self.kind {
            StrategyKind::Identity => Box::new(IdentityPlaceholderStrategy::with_name(name, acceptor)),
            StrategyKind::Native => Box::new(NativeSerializationStrategy::with_name(name, acceptor)),
        })
    }
}

fn default_strategies() -> Vec<StrategySpec> {
    vec![StrategySpec {
        kind: StrategyKind::Native,
        name: None,
        accept: Vec::new(),
    }]
}

/// Strategy chain configuration.
///
/// # Example
///
/// ```toml
/// [[strategy]]
/// kind = "identity"
/// accept = ["app::facts::*"]
///
/// [[strategy]]
/// kind = "native"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStoreConfig {
    /// Strategies in routing order.
    #[serde(rename = "strategy", default = "default_strategies")]
    pub strategies: Vec<StrategySpec>,
}

impl Default for StrategyStoreConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }
}

impl StrategyStoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Marshalling strategy chain
#
# Strategies are tried in file order; the first one whose accept patterns
# match an object's type name marshals it.
#
# kind   = "identity" | "native"
#   "identity" = write a surrogate key, re-link shared references on restore
#   "native"   = deep-serialize the full object
# name   = optional, must be unique (defaults to the kind's name)
# accept = type-name patterns: "*", "app::facts::*", or an exact name
#          (omit to accept everything)

# [[strategy]]
# kind = "identity"
# accept = ["app::facts::*"]

[[strategy]]
kind = "native"
"#
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StrategyStoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check names are unique and patterns parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut seen = HashSet::new();
        for spec in &self.strategies {
            let name = spec.effective_name();
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateName(name.to_string()));
            }
            TypePatternAcceptor::new(&spec.accept)?;
        }
        Ok(())
    }

    /// Build the configured strategy store.
    pub fn build(&self) -> Result<StrategyStore, ConfigError> {
        self.validate()?;
        let mut store = StrategyStore::new();
        for spec in &self.strategies {
            store.push(spec.build()?);
        }
        info!(strategies = ?store.names(), "built strategy store from configuration");
        Ok(store)
    }
}
