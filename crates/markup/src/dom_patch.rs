//! Instruction vocabulary shared by the diff engine, the serializer, and the applier.
//!
//! Invariants:
//! - A `DiffTree` mirrors the "before" document. Each `DiffNode` carries exactly one
//!   `Instruction`; `Keep` marks containers that only group changed descendants.
//! - Children of a diff-node are ordered attribute nodes first, then child entries in replay
//!   order.
//! - `index` on a child entry is the zero-based child position at replay time, after every
//!   earlier sibling entry has been applied. Removals do not advance it; kept and inserted
//!   nodes do.
//! - An instruction is only attached to a diff-node of a compatible kind (`attaches_to`), and
//!   only dispatched against a live node of a compatible kind (`Operation::allows`).
//! - Unchanged subtrees are pruned. Diffing identical documents yields an empty tree.

use crate::position::DOCUMENT_PATH;
use crate::types::{Node, NodeKind};
use std::fmt;

/// Edit operations, one per instruction element of the instruction document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    AttributeSet,
    AttributeRemove,
    TextReplace,
    CommentReplace,
    ElementInsert,
    ElementRemove,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::AttributeSet,
        Operation::AttributeRemove,
        Operation::TextReplace,
        Operation::CommentReplace,
        Operation::ElementInsert,
        Operation::ElementRemove,
    ];

    /// Element name used for this operation in the instruction document.
    pub const fn tag(self) -> &'static str {
        match self {
            Operation::AttributeSet => "set-attribute",
            Operation::AttributeRemove => "remove-attribute",
            Operation::TextReplace => "replace-text",
            Operation::CommentReplace => "replace-comment",
            Operation::ElementInsert => "insert",
            Operation::ElementRemove => "remove",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tag() == tag)
    }

    /// Legality table: the node kinds this operation may be dispatched against at apply time.
    ///
    /// For `ElementInsert` the target is the parent container receiving the new child.
    pub const fn allows(self, target: NodeKind) -> bool {
        match self {
            Operation::AttributeSet | Operation::AttributeRemove => {
                matches!(target, NodeKind::Element)
            }
            Operation::TextReplace => matches!(target, NodeKind::Text),
            Operation::CommentReplace => matches!(target, NodeKind::Comment),
            Operation::ElementInsert => matches!(target, NodeKind::Document | NodeKind::Element),
            Operation::ElementRemove => matches!(target, NodeKind::Element | NodeKind::Comment),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Instruction {
    #[default]
    Keep,
    AttributeSet {
        name: String,
        value: String,
    },
    AttributeRemove {
        name: String,
    },
    TextReplace {
        content: String,
    },
    CommentReplace {
        content: String,
    },
    /// Insert `subtree` (an element or a comment) at the diff-node's replay index.
    ElementInsert {
        subtree: Node,
    },
    ElementRemove,
}

impl Instruction {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Instruction::Keep => None,
            Instruction::AttributeSet { .. } => Some(Operation::AttributeSet),
            Instruction::AttributeRemove { .. } => Some(Operation::AttributeRemove),
            Instruction::TextReplace { .. } => Some(Operation::TextReplace),
            Instruction::CommentReplace { .. } => Some(Operation::CommentReplace),
            Instruction::ElementInsert { .. } => Some(Operation::ElementInsert),
            Instruction::ElementRemove => Some(Operation::ElementRemove),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Instruction::Keep)
    }

    /// Whether this instruction may decorate a diff-node of `kind`.
    pub fn attaches_to(&self, kind: NodeKind) -> bool {
        match self {
            Instruction::Keep => matches!(kind, NodeKind::Document | NodeKind::Element),
            Instruction::AttributeSet { .. } | Instruction::AttributeRemove { .. } => {
                kind == NodeKind::Attribute
            }
            Instruction::TextReplace { .. } => kind == NodeKind::Text,
            Instruction::CommentReplace { .. } => kind == NodeKind::Comment,
            Instruction::ElementInsert { subtree } => {
                kind == subtree.kind() && matches!(kind, NodeKind::Element | NodeKind::Comment)
            }
            Instruction::ElementRemove => matches!(kind, NodeKind::Element | NodeKind::Comment),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffNode {
    pub kind: NodeKind,
    /// Element or attribute name.
    pub name: Option<String>,
    pub path: String,
    /// Replay index within the parent; `None` for the document and attribute nodes.
    pub index: Option<usize>,
    pub instruction: Instruction,
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    pub fn new(
        kind: NodeKind,
        name: Option<String>,
        path: impl Into<String>,
        index: Option<usize>,
        instruction: Instruction,
    ) -> Self {
        debug_assert!(
            instruction.attaches_to(kind),
            "{instruction:?} cannot attach to a {kind} diff-node"
        );
        Self {
            kind,
            name,
            path: path.into(),
            index,
            instruction,
            children: Vec::new(),
        }
    }

    pub fn document() -> Self {
        Self::new(
            NodeKind::Document,
            None,
            DOCUMENT_PATH,
            None,
            Instruction::Keep,
        )
    }

    pub fn with_children(mut self, children: Vec<DiffNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of non-`Keep` instructions in this subtree.
    pub fn instruction_count(&self) -> usize {
        let own = usize::from(!self.instruction.is_keep());
        own + self
            .children
            .iter()
            .map(DiffNode::instruction_count)
            .sum::<usize>()
    }
}

/// Before-shaped tree of edit instructions rooted at the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffTree {
    pub root: DiffNode,
}

impl DiffTree {
    pub fn new(children: Vec<DiffNode>) -> Self {
        Self {
            root: DiffNode::document().with_children(children),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.root.instruction_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Element;

    #[test]
    fn tags_round_trip_through_operations() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_tag(op.tag()), Some(op));
        }
        assert_eq!(Operation::from_tag("node"), None);
    }

    #[test]
    fn legality_table_matches_target_kinds() {
        use NodeKind::*;
        let allowed = |op: Operation| -> Vec<NodeKind> {
            [Document, Element, Attribute, Text, Comment]
                .into_iter()
                .filter(|kind| op.allows(*kind))
                .collect()
        };
        assert_eq!(allowed(Operation::AttributeSet), vec![Element]);
        assert_eq!(allowed(Operation::AttributeRemove), vec![Element]);
        assert_eq!(allowed(Operation::TextReplace), vec![Text]);
        assert_eq!(allowed(Operation::CommentReplace), vec![Comment]);
        assert_eq!(allowed(Operation::ElementInsert), vec![Document, Element]);
        assert_eq!(allowed(Operation::ElementRemove), vec![Element, Comment]);
    }

    #[test]
    fn inserts_attach_to_the_kind_of_the_inserted_unit() {
        let insert_element = Instruction::ElementInsert {
            subtree: Element::new("x").into(),
        };
        let insert_text = Instruction::ElementInsert {
            subtree: Node::text("t"),
        };
        assert!(insert_element.attaches_to(NodeKind::Element));
        assert!(!insert_element.attaches_to(NodeKind::Comment));
        assert!(!insert_text.attaches_to(NodeKind::Text));
        assert!(!Instruction::ElementRemove.attaches_to(NodeKind::Text));
        assert!(!Instruction::ElementRemove.attaches_to(NodeKind::Attribute));
    }

    #[test]
    fn instruction_count_skips_keep_containers() {
        let tree = DiffTree::new(vec![
            DiffNode::new(
                NodeKind::Element,
                Some("a".to_string()),
                "/a[1]",
                Some(0),
                Instruction::Keep,
            )
            .with_children(vec![DiffNode::new(
                NodeKind::Attribute,
                Some("x".to_string()),
                "/a[1]/@x",
                None,
                Instruction::AttributeRemove {
                    name: "x".to_string(),
                },
            )]),
        ]);
        assert!(!tree.is_empty());
        assert_eq!(tree.instruction_count(), 1);
        assert!(DiffTree::new(Vec::new()).is_empty());
    }
}
