//! Loaded grammar handles.

use std::sync::Arc;

/// An immutable, shareable handle to a loaded grammar.
///
/// Handles are produced by `GrammarRegistry::load` and are cheap to clone.
/// Two handles compare equal only if they point at the same cached
/// descriptor, so loading a name twice from one registry yields equal
/// handles.
#[derive(Clone)]
pub struct Grammar {
    inner: Arc<GrammarInner>,
}

struct GrammarInner {
    name: String,
    language: tree_sitter::Language,
}

impl Grammar {
    pub(crate) fn new(name: impl Into<String>, language: tree_sitter::Language) -> Self {
        Self {
            inner: Arc::new(GrammarInner {
                name: name.into(),
                language,
            }),
        }
    }

    /// Canonical name this grammar was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// ABI version of the compiled grammar tables.
    #[must_use]
    pub fn abi_version(&self) -> usize {
        self.inner.language.version()
    }

    /// Number of distinct node kinds (named and anonymous) in the grammar.
    #[must_use]
    pub fn node_kind_count(&self) -> usize {
        self.inner.language.node_kind_count()
    }

    /// Name of the node kind with the given numeric id.
    #[must_use]
    pub fn kind_name(&self, kind_id: u16) -> Option<&'static str> {
        self.inner.language.node_kind_for_id(kind_id)
    }

    /// Numeric id of a node kind, if the grammar defines it.
    #[must_use]
    pub fn kind_id(&self, kind: &str, named: bool) -> Option<u16> {
        // Id 0 is the engine's end-of-input symbol, returned for unknown kinds.
        match self.inner.language.id_for_node_kind(kind, named) {
            0 => None,
            id => Some(id),
        }
    }

    /// Whether the node kind with the given id is a named production.
    #[must_use]
    pub fn is_named_kind(&self, kind_id: u16) -> bool {
        self.inner.language.node_kind_is_named(kind_id)
    }

    /// Names of every field the grammar assigns to children.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let count = u16::try_from(self.inner.language.field_count()).unwrap_or(u16::MAX);
        (1..=count)
            .filter_map(|id| self.inner.language.field_name_for_id(id))
            .collect()
    }

    pub(crate) fn language(&self) -> &tree_sitter::Language {
        &self.inner.language
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Grammar {}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name())
            .field("abi_version", &self.abi_version())
            .finish_non_exhaustive()
    }
}
