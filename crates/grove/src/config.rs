//! Registry configuration.
//!
//! Declares which grammars a `GrammarRegistry` exposes and under which names.
//! Stored as YAML:
//!
//! ```yaml
//! grammars:
//!   - name: javascript
//!     aliases: [node]
//!   - name: ecma
//!     provider: javascript
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grammars::{GrammarProvider, builtin_providers};

/// Conventional file name for a registry configuration.
pub const CONFIG_FILE_NAME: &str = "grammars.yaml";

/// Configuration for a `GrammarRegistry`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Grammars to register, in order
    #[serde(default)]
    pub grammars: Vec<GrammarEntry>,
}

/// One configured grammar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrammarEntry {
    /// Name the grammar is registered under
    pub name: String,

    /// Built-in provider backing this entry (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Extra names the grammar answers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl GrammarEntry {
    /// Create an entry backed by the built-in provider of the same name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
            aliases: Vec::new(),
        }
    }

    /// Back this entry with a differently named built-in provider.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add extra names for this entry.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Name of the built-in provider backing this entry.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().unwrap_or(&self.name)
    }
}

impl RegistryConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not a valid configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Render the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be read, or `Error::Config` if
    /// its contents are invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails or `Error::Io` if the
    /// file can't be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}

impl Default for RegistryConfig {
    /// Every built-in grammar under its canonical name.
    fn default() -> Self {
        Self {
            grammars: builtin_providers()
                .iter()
                .map(|grammar| GrammarEntry::new(grammar.name()))
                .collect(),
        }
    }
}
