//! Error types for Grove operations.
//!
//! Only infrastructure failures are errors. Source text that does not match
//! the grammar is *not* an error: the parse still succeeds and the returned
//! tree carries `ERROR` and missing nodes over the unparseable spans.
//!
//! ## Error Categorization
//!
//! - **Recoverable**: the caller asked for something that isn't there
//!   (`UnknownGrammar`) and may try another name.
//! - **Fatal**: the grammar module itself is unusable (`LoadFailure`). This is
//!   a configuration defect and retrying won't change the outcome.
//! - **Programmer errors**: misuse of the API (`NoGrammarSelected`,
//!   `InvalidEdit`), surfaced immediately.

use thiserror::Error;

/// Result type for Grove operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Grove operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No grammar is registered under the requested name
    #[error("unknown grammar: {name}")]
    UnknownGrammar {
        /// The name that was looked up
        name: String,
    },

    /// The grammar module was found but cannot be used
    #[error("failed to load grammar '{name}': {reason}")]
    LoadFailure {
        /// Canonical name of the grammar
        name: String,
        /// Why the descriptor was rejected
        reason: LoadFailureReason,
    },

    /// `parse` was called before a grammar was selected
    #[error("no grammar selected for parser")]
    NoGrammarSelected,

    /// The parsing engine produced no tree
    #[error("parser engine error: {0}")]
    Engine(String),

    /// An edit does not describe the supplied buffers
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    /// Node text is not valid UTF-8
    #[error("node text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSON serialization of a tree failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant broken (e.g. a poisoned lock)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a grammar descriptor was rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailureReason {
    /// The constructor returned a descriptor with no node kinds
    InvalidDescriptor,

    /// The grammar was generated for an ABI the engine can't read
    IncompatibleAbi {
        /// ABI version reported by the grammar
        found: usize,
        /// Oldest ABI version the engine accepts
        min: usize,
        /// Newest ABI version the engine accepts
        max: usize,
    },

    /// The engine refused the grammar for another reason
    Rejected(String),
}

impl std::fmt::Display for LoadFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescriptor => write!(f, "invalid grammar descriptor"),
            Self::IncompatibleAbi { found, min, max } => write!(
                f,
                "incompatible ABI version {found} (supported: {min}..={max})"
            ),
            Self::Rejected(message) => write!(f, "rejected by engine: {message}"),
        }
    }
}

impl Error {
    /// Create an unknown grammar error.
    #[must_use]
    pub fn unknown_grammar(name: impl Into<String>) -> Self {
        Self::UnknownGrammar { name: name.into() }
    }

    /// Create a load failure for a grammar.
    #[must_use]
    pub fn load_failure(name: impl Into<String>, reason: LoadFailureReason) -> Self {
        Self::LoadFailure {
            name: name.into(),
            reason,
        }
    }

    /// Returns `true` if the caller can reasonably retry with different input.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownGrammar { .. })
    }

    /// Returns `true` if this error is a configuration-time defect.
    ///
    /// Fatal errors should stop startup; they never resolve on retry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LoadFailure { .. } | Self::Config(_))
    }
}
