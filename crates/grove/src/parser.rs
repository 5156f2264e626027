//! Parsing source buffers into syntax trees.
//!
//! A `Parser` binds to one `Grammar` at a time and turns byte buffers into
//! immutable `Tree`s. The scanning and parsing automaton belongs to the
//! engine; this module only drives it and copies the result out.
//!
//! ## Design
//!
//! Parsing is blocking and CPU-bound, with no cancellation. `parse` takes
//! `&mut self`, so one parser can't run two parses at once. Use one parser
//! per thread (see `parse_batch`).
//!
//! Syntax errors never fail a parse. They show up in the tree as `ERROR`
//! and missing nodes. Only infrastructure problems are returned as errors.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, LoadFailureReason, Result};
use crate::grammar::Grammar;
use crate::tree::Tree;
use crate::types::{ByteRange, Edit};

/// Converts source bytes into syntax trees using one grammar at a time.
pub struct Parser {
    engine: tree_sitter::Parser,
    grammar: Option<Grammar>,
}

impl Parser {
    /// Create a parser with no grammar selected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: tree_sitter::Parser::new(),
            grammar: None,
        }
    }

    /// Select the grammar used by subsequent parses.
    ///
    /// Trees already produced are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `Error::LoadFailure` if the engine refuses the grammar.
    pub fn set_grammar(&mut self, grammar: &Grammar) -> Result<()> {
        self.engine.set_language(grammar.language()).map_err(|e| {
            Error::load_failure(grammar.name(), LoadFailureReason::Rejected(e.to_string()))
        })?;
        debug!(grammar = grammar.name(), "Parser grammar selected");
        self.grammar = Some(grammar.clone());
        Ok(())
    }

    /// The currently selected grammar.
    #[must_use]
    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    /// Parse a complete source buffer.
    ///
    /// Invalid syntax does not fail the call; check `Tree::has_errors`.
    ///
    /// # Errors
    ///
    /// - `Error::NoGrammarSelected` if `set_grammar` hasn't been called
    /// - `Error::Engine` if the engine produced no tree
    pub fn parse(&mut self, source: &[u8]) -> Result<Tree> {
        self.run(source, None)
    }

    /// Parse `source`, reusing the unchanged parts of `previous`.
    ///
    /// `edit` describes how `previous.source()` became `source`. The
    /// previous tree is left untouched; the result is a new tree whose
    /// `changed_ranges` reports what moved. If `previous` came from a
    /// different grammar, this is a full parse.
    ///
    /// # Errors
    ///
    /// - `Error::NoGrammarSelected` if `set_grammar` hasn't been called
    /// - `Error::InvalidEdit` if `edit` doesn't fit the two buffers
    /// - `Error::Engine` if the engine produced no tree
    pub fn reparse(&mut self, previous: &Tree, edit: &Edit, source: &[u8]) -> Result<Tree> {
        let grammar = self.grammar.as_ref().ok_or(Error::NoGrammarSelected)?;
        edit.validate(previous.source().len(), source.len())?;

        if previous.grammar() != grammar {
            debug!(
                previous = previous.grammar().name(),
                current = grammar.name(),
                "Previous tree uses another grammar, parsing from scratch"
            );
            return self.parse(source);
        }

        let mut edited = previous.engine_tree().clone();
        edited.edit(&edit.to_input_edit(previous.source(), source));
        self.run(source, Some(&edited))
    }

    /// Discard any transient engine state.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    fn run(&mut self, source: &[u8], edited: Option<&tree_sitter::Tree>) -> Result<Tree> {
        let grammar = self.grammar.clone().ok_or(Error::NoGrammarSelected)?;

        let Some(engine_tree) = self.engine.parse(source, edited) else {
            self.engine.reset();
            return Err(Error::Engine(format!(
                "no tree produced for {} bytes of {} source",
                source.len(),
                grammar.name()
            )));
        };

        let changed_ranges = edited.map(|old| {
            old.changed_ranges(&engine_tree)
                .map(|range| ByteRange::new(range.start_byte, range.end_byte))
                .collect()
        });
        let tree = Tree::build(grammar, Arc::from(source), engine_tree, changed_ranges);
        trace!(
            grammar = tree.grammar().name(),
            bytes = source.len(),
            nodes = tree.node_count(),
            has_errors = tree.has_errors(),
            incremental = edited.is_some(),
            "Parsed source"
        );
        Ok(tree)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("grammar", &self.grammar.as_ref().map(Grammar::name))
            .finish_non_exhaustive()
    }
}
