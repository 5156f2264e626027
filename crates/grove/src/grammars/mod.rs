//! Pluggable grammar providers.
//!
//! Each compiled grammar module is reached through a `GrammarProvider`, which
//! knows the grammar's name and how to invoke its constructor. The registry
//! only ever talks to this trait, so new languages plug in without touching
//! the core.
//!
//! ## Adding a New Grammar
//!
//! 1. Add the grammar crate to `Cargo.toml`
//! 2. Add a `BuiltinGrammar` entry to `BUILTINS` in `builtin.rs`
//!
//! Grammars that aren't built in can implement `GrammarProvider` directly and
//! be added with `GrammarRegistry::register`.

mod builtin;

pub use builtin::{BuiltinGrammar, builtin_provider, builtin_providers};

/// Trait for a compiled grammar module.
///
/// Implementations must be cheap to call repeatedly; the registry caches the
/// resulting `Grammar`, so `language()` normally runs once per name.
pub trait GrammarProvider: Send + Sync {
    /// Canonical grammar name (e.g. `"javascript"`).
    fn name(&self) -> &str;

    /// Alternative names this grammar answers to.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Name of the foreign constructor entry point.
    ///
    /// Follows the `tree_sitter_<name>` convention used by compiled grammars.
    fn constructor_symbol(&self) -> String {
        format!("tree_sitter_{}", self.name().replace('-', "_"))
    }

    /// Invoke the grammar constructor.
    fn language(&self) -> tree_sitter::Language;
}

impl std::fmt::Debug for dyn GrammarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarProvider")
            .field("name", &self.name())
            .field("aliases", &self.aliases())
            .finish()
    }
}
