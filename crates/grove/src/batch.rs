//! Parallel parsing of many buffers with one grammar.
//!
//! ```text
//! sources.par_iter()  ──►  one Parser per rayon worker  ──►  Vec<Result<Tree>>
//! ```
//!
//! Parsers aren't shareable, so each worker builds its own; the grammar
//! handle is shared. Output order matches input order.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::grammar::Grammar;
use crate::parser::Parser;
use crate::tree::Tree;

/// Parse every buffer in `sources` with `grammar`, in parallel.
///
/// # Errors
///
/// Returns `Error::LoadFailure` up front if the engine refuses the grammar.
/// Per-buffer failures are reported in the matching slot of the result.
pub fn parse_batch<S>(grammar: &Grammar, sources: &[S]) -> Result<Vec<Result<Tree>>>
where
    S: AsRef<[u8]> + Sync,
{
    Parser::new().set_grammar(grammar)?;
    debug!(
        grammar = grammar.name(),
        sources = sources.len(),
        "Starting batch parse"
    );

    Ok(sources
        .par_iter()
        .map_init(Parser::new, |parser, source| {
            if parser.grammar().is_none() {
                parser.set_grammar(grammar)?;
            }
            parser.parse(source.as_ref())
        })
        .collect())
}
