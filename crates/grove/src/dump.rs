//! Owned, serializable snapshots of syntax trees.
//!
//! Unlike the canonical S-expression, a dump keeps everything: anonymous
//! tokens, fields, ranges and error flags. Used for tooling that wants the
//! tree as JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::Node;
use crate::types::{ByteRange, Point};

/// An owned copy of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDump {
    /// Node kind
    pub kind: String,
    /// Whether the node is a named production
    pub named: bool,
    /// Field name under the parent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Byte range covered
    pub range: ByteRange,
    /// Start position
    pub start: Point,
    /// End position
    pub end: Point,
    /// Whether the node is an `ERROR` node
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    /// Whether error recovery inserted the node
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
    /// Children in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDump>,
}

impl NodeDump {
    /// Copy a node and everything below it.
    #[must_use]
    pub fn from_node(node: Node<'_>) -> Self {
        // Ancestors of `current`, each with the children finished so far.
        let mut stack: Vec<(Node<'_>, Vec<Self>)> = Vec::new();
        let mut current = (node, Vec::with_capacity(node.child_count()));
        loop {
            if let Some(child) = current.0.child(current.1.len()) {
                let next = (child, Vec::with_capacity(child.child_count()));
                stack.push(std::mem::replace(&mut current, next));
                continue;
            }

            let (finished, children) = current;
            let dump = Self::with_children(finished, children);
            match stack.pop() {
                Some(mut parent) => {
                    parent.1.push(dump);
                    current = parent;
                }
                None => return dump,
            }
        }
    }

    /// Read a dump back from JSON produced by `Tree::to_json`.
    ///
    /// Nesting depth is unbounded; the stack grows on the heap as needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if `json` is not a valid dump.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let dump = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(dump)
    }

    /// Number of nodes in this dump, itself included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(dump) = pending.pop() {
            count += 1;
            pending.extend(dump.children.iter());
        }
        count
    }

    fn with_children(node: Node<'_>, children: Vec<Self>) -> Self {
        Self {
            kind: node.kind().to_string(),
            named: node.is_named(),
            field: node.field_name().map(str::to_string),
            range: node.byte_range(),
            start: node.start_position(),
            end: node.end_position(),
            error: node.is_error(),
            missing: node.is_missing(),
            children,
        }
    }
}
