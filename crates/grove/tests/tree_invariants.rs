//! Structural invariants of produced trees.
//!
//! Every tree, whatever the input, must satisfy:
//! - children lie within their parent's byte range
//! - siblings are ordered and never overlap
//! - the root spans the whole source

use grove::{Node, Parser, Tree, load_grammar};
use proptest::prelude::*;
use rstest::rstest;

fn parse_with(grammar: &str, source: &[u8]) -> Tree {
    let mut parser = Parser::new();
    parser
        .set_grammar(&load_grammar(grammar).expect("grammar should load"))
        .expect("grammar should bind");
    parser.parse(source).expect("parse should succeed")
}

/// Check containment and sibling ordering for every node in the tree.
///
/// With `strict`, sibling start bytes must strictly increase; otherwise
/// zero-width recovery tokens may share a start with their neighbour.
fn check_structure(tree: &Tree, strict: bool) -> Result<(), String> {
    let root = tree.root_node();
    if root.start_byte() != 0 || root.end_byte() != tree.source().len() {
        return Err(format!(
            "root spans {:?}, source has {} bytes",
            root.byte_range(),
            tree.source().len()
        ));
    }

    for node in tree.descendants() {
        let mut previous: Option<Node<'_>> = None;
        for child in node.children() {
            if !node.byte_range().contains(&child.byte_range()) {
                return Err(format!("{child:?} escapes parent {node:?}"));
            }
            if child.parent() != Some(node) {
                return Err(format!("{child:?} does not link back to {node:?}"));
            }
            if let Some(previous) = previous {
                if previous.end_byte() > child.start_byte() {
                    return Err(format!("{previous:?} overlaps {child:?}"));
                }
                if strict && previous.start_byte() >= child.start_byte() {
                    return Err(format!("{previous:?} and {child:?} are out of order"));
                }
            }
            previous = Some(child);
        }
    }
    Ok(())
}

#[rstest]
#[case("javascript", "let a = 1")]
#[case("javascript", "class A extends B { constructor() { super(); this.x = [1, {y: 2}]; } }\n")]
#[case("bash", "if [ -f x ]; then\n  cat x | wc -l\nfi\n")]
#[case("cpp", "template <typename T> T max(T a, T b) { return a > b ? a : b; }\n")]
#[case("rust", "// comment\nfn main() {\n    let v: Vec<u8> = Vec::new();\n}\n")]
#[case("c_sharp", "namespace N { public class C { public int P { get; set; } } }\n")]
fn valid_sources_satisfy_strict_invariants(#[case] grammar: &str, #[case] source: &str) {
    let tree = parse_with(grammar, source.as_bytes());

    check_structure(&tree, true).expect("tree should be well formed");
}

#[test]
fn extras_are_children_of_the_enclosing_node() {
    let tree = parse_with("rust", b"// leading\nfn main() {}\n");
    let comment = tree
        .descendants()
        .find(|node| node.kind() == "line_comment")
        .expect("comment present");

    assert!(comment.is_extra());
    assert_eq!(comment.parent(), Some(tree.root_node()));
}

fn javascript_fragment() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "let", "const", "x", "y", "=", "1", "2.5", "\"s\"", "(", ")", "{", "}", "[", "]",
            ";", ",", "+", "=>", "function", "return", "if", "else", " ", "\n", "//c\n",
        ]),
        0..40,
    )
    .prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn arbitrary_javascript_keeps_structure(source in javascript_fragment()) {
        let tree = parse_with("javascript", source.as_bytes());

        prop_assert!(check_structure(&tree, false).is_ok(), "{:?}", check_structure(&tree, false));
    }

    #[test]
    fn arbitrary_bytes_keep_structure(source in prop::collection::vec(any::<u8>(), 0..256)) {
        let tree = parse_with("bash", &source);

        prop_assert!(check_structure(&tree, false).is_ok(), "{:?}", check_structure(&tree, false));
    }

    #[test]
    fn reparsing_same_bytes_is_deterministic(source in javascript_fragment()) {
        let first = parse_with("javascript", source.as_bytes());
        let second = parse_with("javascript", source.as_bytes());

        prop_assert_eq!(first.root_node().to_sexp(), second.root_node().to_sexp());
    }

    #[test]
    fn canonical_form_contains_no_anonymous_kinds(source in javascript_fragment()) {
        let tree = parse_with("javascript", source.as_bytes());
        let rendered = tree.root_node().to_sexp();

        let named = tree.descendants().filter(|node| node.is_named()).count();
        prop_assert_eq!(rendered.matches('(').count(), named);
    }
}
