//! Grammar registration and caching.
//!
//! A `GrammarRegistry` maps names to grammar providers and caches the
//! `Grammar` handle produced the first time each name is loaded.
//!
//! ## Concurrency
//!
//! Providers are registered up front through `&mut self`, so the name and
//! alias tables are immutable once the registry is shared. The only state
//! written through `&self` is the handle cache, guarded by an `RwLock`: loads
//! of already-cached names take the read lock, and the write lock is taken
//! at most once per distinct name. Racing first loads both build a
//! candidate, but only the first one inserted is ever handed out.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, trace};

use crate::config::RegistryConfig;
use crate::error::{Error, LoadFailureReason, Result};
use crate::grammar::Grammar;
use crate::grammars::{GrammarProvider, builtin_provider, builtin_providers};

/// Maps grammar names to providers and caches loaded handles.
pub struct GrammarRegistry {
    /// Canonical name -> provider
    providers: HashMap<String, Arc<dyn GrammarProvider>>,
    /// Alias -> canonical name
    aliases: HashMap<String, String>,
    /// Canonical name -> loaded handle
    cache: RwLock<HashMap<String, Grammar>>,
}

impl GrammarRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            aliases: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry containing every built-in grammar.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in builtin_providers() {
            let aliases = builtin.aliases().iter().map(|a| (*a).to_string()).collect();
            registry.insert(builtin.name().to_string(), aliases, Arc::new(*builtin));
        }
        registry
    }

    /// Create a registry containing only the configured grammars.
    ///
    /// A provider's own aliases are kept only when the entry uses the
    /// provider's canonical name; renamed entries get just the aliases listed
    /// in the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if an entry names an unknown provider, has an
    /// empty name, or claims a name already taken by another entry.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::new();
        for entry in &config.grammars {
            let provider_name = entry.provider_name();
            let provider = builtin_provider(provider_name).ok_or_else(|| {
                Error::Config(format!(
                    "grammar '{}' refers to unknown provider '{provider_name}'",
                    entry.name
                ))
            })?;

            let mut aliases = entry.aliases.clone();
            if entry.name == provider_name {
                aliases.extend(provider.aliases().iter().map(|a| (*a).to_string()));
            }
            registry.register_as(&entry.name, Arc::new(*provider), &aliases)?;
        }
        debug!(
            grammars = registry.providers.len(),
            aliases = registry.aliases.len(),
            "Built grammar registry from configuration"
        );
        Ok(registry)
    }

    /// The process-wide registry holding every built-in grammar.
    ///
    /// Created on first use and never dropped.
    pub fn shared() -> &'static GrammarRegistry {
        static SHARED: OnceLock<GrammarRegistry> = OnceLock::new();
        SHARED.get_or_init(GrammarRegistry::with_builtins)
    }

    /// Register a provider under its own name and aliases.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the name or an alias is already claimed.
    pub fn register(&mut self, provider: Arc<dyn GrammarProvider>) -> Result<()> {
        let name = provider.name().to_string();
        let aliases: Vec<String> = provider.aliases().iter().map(|a| (*a).to_string()).collect();
        self.register_as(&name, provider, &aliases)
    }

    /// Register a provider under an explicit name and aliases.
    ///
    /// Names are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the name is empty, or the name or an alias
    /// is already claimed.
    pub fn register_as(
        &mut self,
        name: &str,
        provider: Arc<dyn GrammarProvider>,
        aliases: &[String],
    ) -> Result<()> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::Config("grammar name cannot be empty".to_string()));
        }

        let aliases: Vec<String> = aliases
            .iter()
            .map(|alias| alias.trim().to_lowercase())
            .filter(|alias| !alias.is_empty() && *alias != name)
            .collect();
        for claimed in std::iter::once(&name).chain(&aliases) {
            if self.is_registered(claimed) {
                return Err(Error::Config(format!(
                    "grammar name '{claimed}' is already registered"
                )));
            }
        }

        self.insert(name, aliases, provider);
        Ok(())
    }

    fn insert(&mut self, name: String, aliases: Vec<String>, provider: Arc<dyn GrammarProvider>) {
        trace!(grammar = %name, ?aliases, "Registering grammar provider");
        for alias in aliases {
            self.aliases.insert(alias, name.clone());
        }
        self.providers.insert(name, provider);
    }

    /// Load a grammar by canonical name or alias.
    ///
    /// The first load of a name invokes the provider's constructor and
    /// validates the descriptor; later loads return the cached handle.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownGrammar` if nothing is registered under `name`
    /// - `Error::LoadFailure` if the descriptor is empty or its ABI version
    ///   is outside the range the engine supports
    /// - `Error::Internal` if the cache lock is poisoned
    pub fn load(&self, name: &str) -> Result<Grammar> {
        let canonical = self
            .resolve(name)
            .ok_or_else(|| Error::unknown_grammar(name))?;

        if let Some(grammar) = self.read_cache()?.get(canonical) {
            trace!(grammar = canonical, "Grammar cache hit");
            return Ok(grammar.clone());
        }

        let provider = self
            .providers
            .get(canonical)
            .ok_or_else(|| Error::Internal(format!("alias points at missing grammar '{canonical}'")))?;
        let candidate = instantiate(canonical, provider.as_ref())?;

        let mut cache = self.write_cache()?;
        let grammar = cache
            .entry(canonical.to_string())
            .or_insert(candidate)
            .clone();
        debug!(
            grammar = canonical,
            requested = name,
            abi_version = grammar.abi_version(),
            node_kinds = grammar.node_kind_count(),
            "Loaded grammar"
        );
        Ok(grammar)
    }

    /// Returns `true` if `name` is a registered canonical name or alias.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Canonical names of all registered grammars, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of grammars loaded so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the cache lock is poisoned.
    pub fn loaded_count(&self) -> Result<usize> {
        Ok(self.read_cache()?.len())
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        let key = name.trim().to_lowercase();
        if let Some((canonical, _)) = self.providers.get_key_value(&key) {
            return Some(canonical.as_str());
        }
        self.aliases.get(&key).map(String::as_str)
    }

    fn read_cache(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Grammar>>> {
        self.cache
            .read()
            .map_err(|e| Error::Internal(format!("grammar cache lock poisoned: {e}")))
    }

    fn write_cache(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Grammar>>> {
        self.cache
            .write()
            .map_err(|e| Error::Internal(format!("grammar cache lock poisoned: {e}")))
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("grammars", &self.names())
            .field("aliases", &self.aliases.len())
            .finish_non_exhaustive()
    }
}

/// Load a grammar from the process-wide registry of built-in grammars.
///
/// # Errors
///
/// See `GrammarRegistry::load`.
pub fn load_grammar(name: &str) -> Result<Grammar> {
    GrammarRegistry::shared().load(name)
}

/// Invoke a provider's constructor and validate the descriptor it returns.
fn instantiate(name: &str, provider: &dyn GrammarProvider) -> Result<Grammar> {
    trace!(
        grammar = name,
        constructor = %provider.constructor_symbol(),
        "Invoking grammar constructor"
    );
    let language = provider.language();

    if language.node_kind_count() == 0 {
        error!(grammar = name, "Grammar constructor returned an empty descriptor");
        return Err(Error::load_failure(name, LoadFailureReason::InvalidDescriptor));
    }
    check_abi_version(name, language.version())?;

    Ok(Grammar::new(name, language))
}

/// Check that a grammar's ABI version is one the engine can read.
///
/// A mismatch means the grammar was generated for another engine release.
/// It is reported as a `LoadFailure`, which is never worth retrying.
fn check_abi_version(name: &str, found: usize) -> Result<()> {
    let min = tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION;
    let max = tree_sitter::LANGUAGE_VERSION;
    if (min..=max).contains(&found) {
        return Ok(());
    }

    error!(
        grammar = name,
        found,
        min,
        max,
        "Grammar ABI version is incompatible with the parsing engine"
    );
    Err(Error::load_failure(
        name,
        LoadFailureReason::IncompatibleAbi { found, min, max },
    ))
}
