//! Immutable syntax trees.
//!
//! A `Tree` owns a single arena of nodes copied out of the engine's tree
//! when a parse completes. Nodes are laid out breadth-first, so each node's
//! children occupy one contiguous run of indices. `Node` is a `Copy` view of
//! `(tree, index)` and borrows the tree it came from.
//!
//! ## Invariants
//!
//! - Each child's byte range lies within its parent's.
//! - Siblings are ordered by start byte and never overlap.
//! - The root spans the whole source, `[0, source.len())`.
//! - Nothing in a tree changes after construction; re-parsing builds a new
//!   tree.

use std::ops::Range;
use std::sync::Arc;

use crate::dump::NodeDump;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::sexp;
use crate::types::{ByteRange, Point};

/// An immutable concrete syntax tree.
///
/// Cloning is cheap; clones share the node arena and the source buffer.
#[derive(Clone)]
pub struct Tree {
    inner: Arc<TreeInner>,
}

struct TreeInner {
    grammar: Grammar,
    source: Arc<[u8]>,
    nodes: Vec<NodeData>,
    /// Engine tree this arena was copied from, kept for incremental reparse.
    engine: tree_sitter::Tree,
    /// Ranges that changed relative to the tree this one was reparsed from.
    changed_ranges: Option<Vec<ByteRange>>,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    kind_id: u16,
    named: bool,
    error: bool,
    missing: bool,
    extra: bool,
    has_error: bool,
    range: ByteRange,
    start: Point,
    end: Point,
    field: Option<&'static str>,
    parent: Option<usize>,
    children: Range<usize>,
}

impl NodeData {
    fn from_engine(
        node: tree_sitter::Node<'_>,
        parent: Option<usize>,
        field: Option<&'static str>,
    ) -> Self {
        Self {
            kind: node.kind(),
            kind_id: node.kind_id(),
            named: node.is_named(),
            error: node.is_error(),
            missing: node.is_missing(),
            extra: node.is_extra(),
            has_error: node.has_error(),
            range: ByteRange::new(node.start_byte(), node.end_byte()),
            start: node.start_position().into(),
            end: node.end_position().into(),
            field,
            parent,
            children: 0..0,
        }
    }
}

impl Tree {
    /// Copy an engine tree into an arena.
    pub(crate) fn build(
        grammar: Grammar,
        source: Arc<[u8]>,
        engine: tree_sitter::Tree,
        changed_ranges: Option<Vec<ByteRange>>,
    ) -> Self {
        let mut nodes = Vec::new();
        {
            // `order[i]` is the engine node copied into `nodes[i]`.
            let root = engine.root_node();
            let mut order = vec![root];
            nodes.push(NodeData::from_engine(root, None, None));

            let mut cursor = engine.walk();
            let mut index = 0;
            while index < order.len() {
                let first_child = order.len();
                cursor.reset(order[index]);
                if cursor.goto_first_child() {
                    loop {
                        let child = cursor.node();
                        order.push(child);
                        nodes.push(NodeData::from_engine(child, Some(index), cursor.field_name()));
                        if !cursor.goto_next_sibling() {
                            break;
                        }
                    }
                }
                nodes[index].children = first_child..order.len();
                index += 1;
            }
        }

        // The engine's root starts at the first token; widen it to the buffer.
        let root = &mut nodes[0];
        root.range = ByteRange::new(0, source.len());
        root.start = Point::default();
        root.end = Point::for_offset(&source, source.len());

        Self {
            inner: Arc::new(TreeInner {
                grammar,
                source,
                nodes,
                engine,
                changed_ranges,
            }),
        }
    }

    /// The root node, the single entry point into the tree.
    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: &self.inner,
            id: 0,
        }
    }

    /// The source bytes this tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.inner.source
    }

    /// The grammar that produced this tree.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.inner.grammar
    }

    /// Total number of nodes, named and anonymous.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Returns `true` if the source contained syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.root_node().has_error()
    }

    /// Every `ERROR` node and missing node, in pre-order.
    #[must_use]
    pub fn error_nodes(&self) -> Vec<Node<'_>> {
        self.root_node()
            .descendants()
            .filter(|node| node.is_error() || node.is_missing())
            .collect()
    }

    /// All nodes in pre-order, starting with the root.
    pub fn descendants(&self) -> Descendants<'_> {
        self.root_node().descendants()
    }

    /// Byte ranges whose structure changed relative to the tree this one
    /// was reparsed from.
    ///
    /// Returns `None` for trees produced by a full parse.
    #[must_use]
    pub fn changed_ranges(&self) -> Option<&[ByteRange]> {
        self.inner.changed_ranges.as_deref()
    }

    /// Render the whole tree as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root_node().dump())?)
    }

    pub(crate) fn engine_tree(&self) -> &tree_sitter::Tree {
        &self.inner.engine
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("grammar", &self.grammar().name())
            .field("source_len", &self.source().len())
            .field("nodes", &self.node_count())
            .finish_non_exhaustive()
    }
}

/// A node in a `Tree`.
///
/// Nodes are lightweight views; copying one is free. Methods take `self`
/// by value and hand back nodes tied to the tree's lifetime.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree TreeInner,
    id: usize,
}

impl<'tree> Node<'tree> {
    fn data(self) -> &'tree NodeData {
        &self.tree.nodes[self.id]
    }

    fn at(self, id: usize) -> Node<'tree> {
        Node {
            tree: self.tree,
            id,
        }
    }

    /// Index of this node in its tree's arena. The root is `0`.
    #[must_use]
    pub fn id(self) -> usize {
        self.id
    }

    /// The grammar rule or token this node represents.
    #[must_use]
    pub fn kind(self) -> &'tree str {
        self.data().kind
    }

    /// Numeric id of this node's kind within its grammar.
    #[must_use]
    pub fn kind_id(self) -> u16 {
        self.data().kind_id
    }

    /// `true` for grammar productions, `false` for anonymous tokens such as
    /// keywords and punctuation.
    #[must_use]
    pub fn is_named(self) -> bool {
        self.data().named
    }

    /// `true` if this is an `ERROR` node covering unparseable input.
    #[must_use]
    pub fn is_error(self) -> bool {
        self.data().error
    }

    /// `true` if error recovery inserted this zero-width token.
    #[must_use]
    pub fn is_missing(self) -> bool {
        self.data().missing
    }

    /// `true` for tokens allowed anywhere, such as comments.
    #[must_use]
    pub fn is_extra(self) -> bool {
        self.data().extra
    }

    /// `true` if this node or any descendant is an error or missing node.
    #[must_use]
    pub fn has_error(self) -> bool {
        self.data().has_error
    }

    /// Offset of the first byte covered by this node.
    #[must_use]
    pub fn start_byte(self) -> usize {
        self.data().range.start
    }

    /// Offset one past the last byte covered by this node.
    #[must_use]
    pub fn end_byte(self) -> usize {
        self.data().range.end
    }

    /// The `[start, end)` byte range covered by this node.
    #[must_use]
    pub fn byte_range(self) -> ByteRange {
        self.data().range
    }

    /// Row/column of the node's first byte.
    #[must_use]
    pub fn start_position(self) -> Point {
        self.data().start
    }

    /// Row/column one past the node's last byte.
    #[must_use]
    pub fn end_position(self) -> Point {
        self.data().end
    }

    /// Field name this node occupies in its parent, if any.
    #[must_use]
    pub fn field_name(self) -> Option<&'tree str> {
        self.data().field
    }

    /// The node's parent, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Node<'tree>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Number of children, named and anonymous.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.data().children.len()
    }

    /// The child at `index`, counting named and anonymous children.
    #[must_use]
    pub fn child(self, index: usize) -> Option<Node<'tree>> {
        let children = &self.data().children;
        (index < children.len()).then(|| self.at(children.start + index))
    }

    /// All children in source order, named and anonymous.
    pub fn children(
        self,
    ) -> impl ExactSizeIterator<Item = Node<'tree>> + DoubleEndedIterator + 'tree {
        let tree = self.tree;
        self.data().children.clone().map(move |id| Node { tree, id })
    }

    /// Named children in source order.
    pub fn named_children(self) -> impl DoubleEndedIterator<Item = Node<'tree>> + 'tree {
        self.children().filter(|child| child.is_named())
    }

    /// Number of named children.
    #[must_use]
    pub fn named_child_count(self) -> usize {
        self.named_children().count()
    }

    /// The first child occupying the given field.
    #[must_use]
    pub fn child_by_field_name(self, field: &str) -> Option<Node<'tree>> {
        self.children().find(|child| child.field_name() == Some(field))
    }

    /// This node and everything below it, in pre-order.
    #[must_use]
    pub fn descendants(self) -> Descendants<'tree> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// The smallest node within this subtree that spans `[start, end)`.
    ///
    /// Returns `None` if this node doesn't span the range itself.
    #[must_use]
    pub fn descendant_for_byte_range(self, start: usize, end: usize) -> Option<Node<'tree>> {
        let target = ByteRange::new(start, end);
        if !self.byte_range().contains(&target) {
            return None;
        }

        let mut current = self;
        while let Some(child) = current
            .children()
            .find(|child| child.byte_range().contains(&target))
        {
            current = child;
        }
        Some(current)
    }

    /// The raw source bytes covered by this node.
    #[must_use]
    pub fn text(self) -> &'tree [u8] {
        &self.tree.source[Range::from(self.byte_range())]
    }

    /// The source text covered by this node.
    ///
    /// # Errors
    ///
    /// Returns `Error::Utf8` if the covered bytes are not valid UTF-8.
    pub fn utf8_text(self) -> Result<&'tree str> {
        std::str::from_utf8(self.text()).map_err(|e| {
            tracing::trace!(
                byte_range = ?self.byte_range(),
                error = %e,
                node_kind = %self.kind(),
                "Failed to decode node text as UTF-8"
            );
            e.into()
        })
    }

    /// Canonical S-expression for this subtree.
    ///
    /// Only named nodes appear; see the `sexp` module.
    #[must_use]
    pub fn to_sexp(self) -> String {
        sexp::to_sexp(self)
    }

    /// Owned, serializable copy of this subtree.
    #[must_use]
    pub fn dump(self) -> NodeDump {
        NodeDump::from_node(self)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

impl std::fmt::Display for Node<'_> {
    /// Writes the canonical S-expression.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        sexp::write_sexp(*self, f)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'tree> {
    tree: &'tree TreeInner,
    stack: Vec<usize>,
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.nodes[id].children.clone().rev());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::registry::load_grammar;

    fn parse(grammar: &str, source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_grammar(&load_grammar(grammar).expect("grammar should load"))
            .expect("grammar should bind");
        parser.parse(source.as_bytes()).expect("parse should succeed")
    }

    #[test]
    fn children_are_contiguous_and_linked_to_parent() {
        let tree = parse("javascript", "let a = 1;\nlet b = 2;");
        let root = tree.root_node();

        assert_eq!(root.kind(), "program");
        assert_eq!(root.child_count(), 2);
        for child in root.children() {
            assert_eq!(child.parent(), Some(root));
            assert_eq!(child.kind(), "lexical_declaration");
        }
        assert_eq!(root.child(2), None);
    }

    #[test]
    fn anonymous_tokens_are_children_but_not_named() {
        let tree = parse("javascript", "let a = 1");
        let declarator = tree
            .descendants()
            .find(|node| node.kind() == "variable_declarator")
            .expect("declarator present");

        let kinds: Vec<&str> = declarator.children().map(Node::kind).collect();
        assert_eq!(kinds, vec!["identifier", "=", "number"]);
        assert_eq!(declarator.named_child_count(), 2);
        assert!(!declarator.child(1).expect("= token").is_named());
    }

    #[test]
    fn fields_are_recorded() {
        let tree = parse("javascript", "let answer = 42");
        let declarator = tree
            .descendants()
            .find(|node| node.kind() == "variable_declarator")
            .expect("declarator present");

        let name = declarator.child_by_field_name("name").expect("name field");
        let value = declarator.child_by_field_name("value").expect("value field");
        assert_eq!(name.utf8_text().expect("utf8"), "answer");
        assert_eq!(value.utf8_text().expect("utf8"), "42");
        assert_eq!(name.field_name(), Some("name"));
        assert_eq!(declarator.child_by_field_name("body"), None);
    }

    #[test]
    fn root_spans_whole_source_including_surrounding_whitespace() {
        let source = "\n\n  let a = 1;  \n";
        let tree = parse("javascript", source);
        let root = tree.root_node();

        assert_eq!(root.start_byte(), 0);
        assert_eq!(root.end_byte(), source.len());
        assert_eq!(root.start_position(), Point::new(0, 0));
        assert_eq!(root.end_position(), Point::new(3, 0));
    }

    #[test]
    fn positions_track_rows_and_columns() {
        let tree = parse("javascript", "let a = 1;\nlet bc = 2;");
        let second = tree.root_node().child(1).expect("second declaration");
        let name = second
            .descendants()
            .find(|node| node.kind() == "identifier")
            .expect("identifier present");

        assert_eq!(name.start_position(), Point::new(1, 4));
        assert_eq!(name.end_position(), Point::new(1, 6));
        assert_eq!(name.byte_range(), ByteRange::new(15, 17));
    }

    #[test]
    fn descendant_for_byte_range_finds_smallest_node() {
        let source = "let a = 1";
        let tree = parse("javascript", source);
        let root = tree.root_node();

        let number = root.descendant_for_byte_range(8, 9).expect("in range");
        assert_eq!(number.kind(), "number");

        let declarator = root.descendant_for_byte_range(4, 9).expect("in range");
        assert_eq!(declarator.kind(), "variable_declarator");

        assert_eq!(root.descendant_for_byte_range(0, 99), None);
    }

    #[test]
    fn descendants_visit_every_node_in_preorder() {
        let tree = parse("javascript", "f(x, y)");
        let visited: Vec<Node<'_>> = tree.descendants().collect();

        assert_eq!(visited.len(), tree.node_count());
        assert_eq!(visited[0], tree.root_node());
        let mut starts = visited.iter().skip(1).map(|node| node.start_byte());
        let first = starts.next().expect("has children");
        assert!(starts.all(|start| start >= first));
    }

    #[test]
    fn invalid_utf8_text_is_an_error() {
        let mut parser = Parser::new();
        parser
            .set_grammar(&load_grammar("bash").expect("grammar should load"))
            .expect("grammar should bind");
        let tree = parser.parse(b"echo \xff\xfe").expect("parse should succeed");

        let root = tree.root_node();
        assert_eq!(root.text(), b"echo \xff\xfe");
        assert!(matches!(root.utf8_text(), Err(crate::Error::Utf8(_))));
    }

    #[test]
    fn debug_shows_kind_and_positions() {
        let tree = parse("javascript", "x");
        let debug = format!("{:?}", tree.root_node());

        assert_eq!(debug, "{Node program 0:0 - 0:1}");
    }

    #[test]
    fn trees_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
        assert_send_sync::<Node<'static>>();
    }
}
