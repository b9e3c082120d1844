//! Structured document diff/patch engine.
//!
//! `diff` compares two documents under a `MatchDecision` policy and produces a `DiffTree`;
//! `serialize` turns it into a portable `InstructionDocument`; `apply` replays that document
//! against a live copy of "before", enforcing per-node-kind legality.

pub mod debug;
pub mod dom_apply;
pub mod dom_diff;
pub mod dom_patch;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod golden_corpus;
pub mod instructions;
pub mod matching;
pub mod perf_fixtures;
pub mod position;
pub mod traverse;

mod dom_builder;
mod entities;
mod serialize;
#[cfg(test)]
mod test_utils;
mod tokenizer;
mod types;

pub use crate::dom_apply::{ApplyError, apply};
pub use crate::dom_builder::{TreeBuilderConfig, build_dom};
pub use crate::dom_diff::{DiffError, diff, diff_markup};
pub use crate::dom_patch::{DiffNode, DiffTree, Instruction, Operation};
pub use crate::instructions::{InstructionDocument, serialize};
pub use crate::matching::{IdentityAttributes, MatchDecision};
pub use crate::position::{ChildrenTraversal, PositionRecorder, collect_positions};
pub use crate::serialize::{node_to_markup, to_markup};
pub use crate::tokenizer::{ParseError, tokenize};
pub use crate::traverse::{ContainerRef, Visitor, count_nodes, walk_document};
pub use crate::types::{
    Document, Element, Fragment, MAX_NESTING_DEPTH, Node, NodeKind, Token, TokenStream,
    is_whitespace,
};

/// Reads markup into a document with the default tree builder configuration.
pub fn parse_document(input: &str) -> Result<Document, ParseError> {
    parse_document_with(input, TreeBuilderConfig::default())
}

pub fn parse_document_with(
    input: &str,
    config: TreeBuilderConfig,
) -> Result<Document, ParseError> {
    let stream = tokenize(input)?;
    build_dom(&stream, config)
}
