//! Canonical S-expression rendering.
//!
//! A node with no named children renders as `(kind)`; otherwise as `(kind`
//! followed by each named child's rendering, space-separated, then `)`.
//! Anonymous tokens are never written, though their text still occupies
//! bytes in the tree. Field names and missing-node markers are not part of
//! the canonical form.
//!
//! JavaScript `let a = 1` renders as
//! `(program (lexical_declaration (variable_declarator (identifier) (number))))`.

use std::fmt;

use crate::tree::Node;

enum Step<'tree> {
    Open { node: Node<'tree>, spaced: bool },
    Close,
}

/// Render a subtree as a canonical S-expression.
#[must_use]
pub fn to_sexp(node: Node<'_>) -> String {
    node.to_string()
}

/// Write a subtree's canonical S-expression into `out`.
///
/// Uses an explicit stack, so arbitrarily deep trees are safe.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
pub fn write_sexp<W: fmt::Write + ?Sized>(node: Node<'_>, out: &mut W) -> fmt::Result {
    let mut stack = vec![Step::Open {
        node,
        spaced: false,
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Open { node, spaced } => {
                if spaced {
                    out.write_char(' ')?;
                }
                out.write_char('(')?;
                out.write_str(node.kind())?;
                stack.push(Step::Close);
                stack.extend(node.named_children().rev().map(|child| Step::Open {
                    node: child,
                    spaced: true,
                }));
            }
            Step::Close => out.write_char(')')?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::registry::load_grammar;
    use crate::tree::Tree;
    use rstest::rstest;

    fn parse(grammar: &str, source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_grammar(&load_grammar(grammar).expect("grammar should load"))
            .expect("grammar should bind");
        parser.parse(source.as_bytes()).expect("parse should succeed")
    }

    #[rstest]
    #[case::let_binding(
        "javascript",
        "let a = 1",
        "(program (lexical_declaration (variable_declarator (identifier) (number))))"
    )]
    #[case::empty_program("javascript", "", "(program)")]
    #[case::call("javascript", "f(x)", "(program (expression_statement (call_expression (identifier) (arguments (identifier)))))")]
    #[case::rust_function("rust", "fn main() {}", "(source_file (function_item (identifier) (parameters) (block)))")]
    #[case::bash_command("bash", "echo hi", "(program (command (command_name (word)) (word)))")]
    fn canonical_forms(#[case] grammar: &str, #[case] source: &str, #[case] expected: &str) {
        let tree = parse(grammar, source);

        assert_eq!(tree.root_node().to_sexp(), expected);
        assert_eq!(tree.root_node().to_string(), expected, "Display matches to_sexp");
    }

    #[test]
    fn subtree_rendering_starts_at_node() {
        let tree = parse("javascript", "let a = 1");
        let declarator = tree
            .descendants()
            .find(|node| node.kind() == "variable_declarator")
            .expect("declarator present");

        assert_eq!(to_sexp(declarator), "(variable_declarator (identifier) (number))");
    }

    #[test]
    fn anonymous_leaf_renders_bare() {
        let tree = parse("javascript", "let a = 1");
        let equals = tree
            .descendants()
            .find(|node| node.kind() == "=")
            .expect("= token present");

        assert_eq!(to_sexp(equals), "(=)");
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 3_000;
        let source = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let tree = parse("javascript", &source);

        let rendered = tree.root_node().to_sexp();
        assert_eq!(rendered.matches("(array").count(), depth);
    }

    #[test]
    fn streaming_and_owned_rendering_agree() {
        let tree = parse("bash", "if [ -f x ]; then cat x; fi\n");
        let root = tree.root_node();

        let mut streamed = String::new();
        write_sexp(root, &mut streamed).expect("writing to a String succeeds");

        assert_eq!(to_sexp(root), streamed);
        assert_eq!(format!("{root}"), streamed);
    }
}
