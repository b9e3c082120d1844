//! The instruction document: a portable, markup-serializable form of a `DiffTree`.
//!
//! ```text
//! <patch version="1">
//!   <node index="0" path="/a[1]">
//!     <remove-attribute attribute="old" path="/a[1]/@old"/>
//!     <set-attribute attribute="x" value="2" path="/a[1]/@x"/>
//!     <replace-text index="0" path="/a[1]/text()[1]">new text</replace-text>
//!     <remove index="1" path="/a[1]/c[1]"/>
//!     <insert index="1" path="/a[1]/d[1]"><d k="v"/></insert>
//!   </node>
//! </patch>
//! ```
//!
//! `<node>` selects the current child at `index` as the target of its nested entries. Indices
//! are zero-based and relative to the state left by earlier sibling entries. `path` is
//! diagnostic only. Whitespace-only text between entries is indentation and carries no meaning.
use crate::dom_patch::{DiffNode, DiffTree, Instruction, Operation};
use crate::serialize::to_markup;
use crate::tokenizer::ParseError;
use crate::types::{Document, Element, Node};

pub const PATCH_ROOT: &str = "patch";
pub const NODE_SHELL: &str = "node";
pub const FORMAT_VERSION: &str = "1";

pub(crate) const ATTR_INDEX: &str = "index";
pub(crate) const ATTR_PATH: &str = "path";
pub(crate) const ATTR_ATTRIBUTE: &str = "attribute";
pub(crate) const ATTR_VALUE: &str = "value";
pub(crate) const ATTR_VERSION: &str = "version";

const INDENT: &str = "  ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionDocument {
    document: Document,
}

impl InstructionDocument {
    /// Wraps an already-built document. Its shape is checked when it is applied.
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// Reads the text form. Whitespace inside payloads is preserved.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parse_document(input).map(Self::from_document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The `<patch>` element, when present.
    pub fn root(&self) -> Option<&Element> {
        self.document
            .root_element()
            .filter(|root| root.name == PATCH_ROOT)
    }

    pub fn is_empty(&self) -> bool {
        self.root()
            .is_none_or(|root| !root.children.iter().any(|child| child.as_element().is_some()))
    }

    pub fn to_markup(&self) -> String {
        to_markup(&self.document)
    }
}

/// Serializes a diff tree into an instruction document, one entry per diff-node in replay order.
pub fn serialize(tree: &DiffTree) -> InstructionDocument {
    let mut root = Element::new(PATCH_ROOT).with_attr(ATTR_VERSION, FORMAT_VERSION);
    write_entries(&mut root, &tree.root, 1);
    InstructionDocument::from_document(Document::new().with_child(root))
}

fn write_entries(parent: &mut Element, node: &DiffNode, depth: usize) {
    if node.children.is_empty() {
        return;
    }
    for child in &node.children {
        parent
            .children
            .push(Node::text(format!("\n{}", INDENT.repeat(depth))));
        parent.children.push(entry(child, depth).into());
    }
    parent
        .children
        .push(Node::text(format!("\n{}", INDENT.repeat(depth - 1))));
}

fn entry(node: &DiffNode, depth: usize) -> Element {
    let tag = node
        .instruction
        .operation()
        .map_or(NODE_SHELL, Operation::tag);
    let mut element = Element::new(tag);
    match &node.instruction {
        Instruction::AttributeSet { name, value } => {
            element.set_attr(ATTR_ATTRIBUTE, name.as_str());
            element.set_attr(ATTR_VALUE, value.as_str());
        }
        Instruction::AttributeRemove { name } => {
            element.set_attr(ATTR_ATTRIBUTE, name.as_str());
        }
        _ => {
            if let Some(index) = node.index {
                element.set_attr(ATTR_INDEX, index.to_string());
            }
        }
    }
    element.set_attr(ATTR_PATH, node.path.as_str());
    match &node.instruction {
        Instruction::Keep => write_entries(&mut element, node, depth + 1),
        Instruction::TextReplace { content } | Instruction::CommentReplace { content } => {
            if !content.is_empty() {
                element.children.push(Node::text(content.as_str()));
            }
        }
        Instruction::ElementInsert { subtree } => element.children.push(subtree.clone()),
        Instruction::AttributeSet { .. }
        | Instruction::AttributeRemove { .. }
        | Instruction::ElementRemove => {}
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentityAttributes;
    use crate::dom_diff::diff_markup;

    #[test]
    fn serializes_nested_entries_with_indentation() {
        let tree = diff_markup(
            &IdentityAttributes::default(),
            "<a old=\"1\"><b>x</b><c/></a>",
            "<a><b>y</b><d k=\"v\"/></a>",
        )
        .expect("diff");
        let text = serialize(&tree).to_markup();
        assert_eq!(
            text,
            concat!(
                "<patch version=\"1\">\n",
                "  <node index=\"0\" path=\"/a[1]\">\n",
                "    <remove-attribute attribute=\"old\" path=\"/a[1]/@old\"/>\n",
                "    <node index=\"0\" path=\"/a[1]/b[1]\">\n",
                "      <replace-text index=\"0\" path=\"/a[1]/b[1]/text()[1]\">y</replace-text>\n",
                "    </node>\n",
                "    <remove index=\"1\" path=\"/a[1]/c[1]\"/>\n",
                "    <insert index=\"1\" path=\"/a[1]/d[1]\"><d k=\"v\"/></insert>\n",
                "  </node>\n",
                "</patch>",
            )
        );
    }

    #[test]
    fn empty_diff_serializes_to_an_empty_patch() {
        let tree = diff_markup(&IdentityAttributes::default(), "<a/>", "<a/>").expect("diff");
        let doc = serialize(&tree);
        assert!(doc.is_empty());
        assert_eq!(doc.to_markup(), "<patch version=\"1\"/>");
    }

    #[test]
    fn text_form_reads_back_to_the_same_document() {
        let tree = diff_markup(
            &IdentityAttributes::default(),
            "<a><!--c--> x </a>",
            "<a><!-- d -->  y\n</a>",
        )
        .expect("diff");
        let doc = serialize(&tree);
        let reread = InstructionDocument::parse(&doc.to_markup()).expect("parse");
        assert_eq!(reread, doc);
        assert_eq!(reread.to_markup(), doc.to_markup());
    }

    #[test]
    fn root_requires_the_patch_element() {
        let doc = InstructionDocument::parse("<other/>").expect("parse");
        assert!(doc.root().is_none());
        assert!(doc.is_empty());
    }
}
