//! # Grove: one parsing API over many compiled grammars
//!
//! Grove loads compiled tree-sitter grammars by name and turns source bytes
//! into immutable concrete syntax trees, with a canonical S-expression form
//! for comparing trees in tests.
//!
//! ## Design Philosophy
//!
//! - **Front end, not parser** - Scanning and parsing belong to the compiled
//!   grammar; Grove registers grammars, drives them and owns the results
//! - **Pluggable grammars** - Languages are `GrammarProvider`s chosen by
//!   configuration, not hardwired
//! - **Immutable trees** - A parse yields a self-contained arena that can be
//!   shared across threads; re-parsing always builds a new tree
//! - **Bad input is data** - Syntax errors become `ERROR` nodes, never `Err`
//!
//! ## Quick Start
//!
//! ```
//! use grove::{Parser, load_grammar};
//!
//! let javascript = load_grammar("javascript")?;
//!
//! let mut parser = Parser::new();
//! parser.set_grammar(&javascript)?;
//!
//! let tree = parser.parse(b"let a = 1")?;
//! assert_eq!(
//!     tree.root_node().to_string(),
//!     "(program (lexical_declaration (variable_declarator (identifier) (number))))"
//! );
//! # Ok::<(), grove::Error>(())
//! ```
//!
//! ## Registries
//!
//! `load_grammar` uses a process-wide registry of every built-in grammar.
//! For a restricted or extended set, build a `GrammarRegistry` yourself:
//!
//! ```
//! use grove::{GrammarEntry, GrammarRegistry, RegistryConfig};
//!
//! let config = RegistryConfig {
//!     grammars: vec![GrammarEntry::new("bash").with_aliases(["zsh"])],
//! };
//! let registry = GrammarRegistry::from_config(&config)?;
//!
//! assert_eq!(registry.load("zsh")?.name(), "bash");
//! assert!(registry.load("javascript").is_err());
//! # Ok::<(), grove::Error>(())
//! ```

mod batch;
mod config;
mod dump;
mod error;
mod grammar;
pub mod grammars;
mod parser;
mod registry;
pub mod sexp;
mod tree;
mod types;

pub use batch::parse_batch;
pub use config::{CONFIG_FILE_NAME, GrammarEntry, RegistryConfig};
pub use dump::NodeDump;
pub use error::{Error, LoadFailureReason, Result};
pub use grammar::Grammar;
pub use grammars::GrammarProvider;
pub use parser::Parser;
pub use registry::{GrammarRegistry, load_grammar};
pub use tree::{Descendants, Node, Tree};
pub use types::{ByteRange, Edit, Point};
