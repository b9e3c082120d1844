//! Deterministic structural diffing of two documents into a `DiffTree`.
//!
//! Contract:
//! - Element correspondence comes from a caller-supplied `MatchDecision`; element names must
//!   also be equal, since names are not patchable.
//! - Element anchors are chosen greedily in "before" order: each before element pairs with the
//!   earliest matching after element past the previous anchor.
//! - Text and comments between consecutive anchors pair greedily with same-kind after
//!   siblings; changed content emits `TextReplace` / `CommentReplace`.
//! - Unmatched elements and comments are removed or inserted at explicit replay indices.
//!   Unmatched whitespace-only text is tolerated on both sides.
//! - Unmatched non-whitespace text cannot be expressed. The enclosing element is reported
//!   unpatchable and its parent replaces it as a whole (remove + insert).
//! - Attribute removals precede attribute sets on the same element.
//! - Output is a pure function of the inputs.
//! - Inputs nested deeper than `MAX_NESTING_DEPTH` are rejected before any recursion.
//!
//! Complexity: O(n·m) per container in the worst case for anchor search, linear otherwise.

use crate::dom_patch::{DiffNode, DiffTree, Instruction};
use crate::matching::MatchDecision;
use crate::position::{ChildrenTraversal, DOCUMENT_PATH, attribute_path};
use crate::tokenizer::ParseError;
use crate::types::{Document, Element, MAX_NESTING_DEPTH, Node, NodeKind, is_whitespace};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("duplicate attribute `{name}` on element at {path}")]
    DuplicateAttribute { name: String, path: String },
    #[error("element at {path} has an empty name")]
    EmptyElementName { path: String },
    #[error("non-whitespace text directly under the document at {path}")]
    TextAtDocumentLevel { path: String },
    #[error("element at {path} is nested deeper than {limit} levels")]
    NestingTooDeep { path: String, limit: usize },
}

/// Computes the edit instructions turning `before` into `after`.
pub fn diff<M: MatchDecision + ?Sized>(
    decision: &M,
    before: &Document,
    after: &Document,
) -> Result<DiffTree, DiffError> {
    validate(before)?;
    validate(after)?;

    let children = diff_children(
        decision,
        DOCUMENT_PATH,
        DOCUMENT_PATH,
        &before.children,
        &after.children,
    )
    .map_err(|unpatchable| DiffError::TextAtDocumentLevel {
        path: unpatchable.path,
    })?;

    let tree = DiffTree::new(children);
    log::debug!(
        target: "markup.diff",
        "diff produced {} instructions across {} top-level entries",
        tree.instruction_count(),
        tree.root.children.len()
    );
    Ok(tree)
}

/// Parses both inputs and diffs them.
pub fn diff_markup<M: MatchDecision + ?Sized>(
    decision: &M,
    before: &str,
    after: &str,
) -> Result<DiffTree, DiffError> {
    let before = crate::parse_document(before)?;
    let after = crate::parse_document(after)?;
    diff(decision, &before, &after)
}

// Also bounds the recursion depth of `diff_children` / `diff_element`.
fn validate(document: &Document) -> Result<(), DiffError> {
    validate_children(&document.children, DOCUMENT_PATH, 1)
}

fn validate_children(children: &[Node], path: &str, depth: usize) -> Result<(), DiffError> {
    let mut session = ChildrenTraversal::open(path);
    for child in children {
        let child_path = session.traverse_child(child).to_string();
        match child {
            Node::Element(element) => {
                if element.name.is_empty() {
                    return Err(DiffError::EmptyElementName { path: child_path });
                }
                if depth > MAX_NESTING_DEPTH {
                    return Err(DiffError::NestingTooDeep {
                        path: child_path,
                        limit: MAX_NESTING_DEPTH,
                    });
                }
                for (i, (name, _)) in element.attributes.iter().enumerate() {
                    if element.attributes[..i].iter().any(|(seen, _)| seen == name) {
                        return Err(DiffError::DuplicateAttribute {
                            name: name.clone(),
                            path: child_path,
                        });
                    }
                }
                validate_children(&element.children, &child_path, depth + 1)?;
            }
            Node::Text { text } if depth == 1 && !is_whitespace(text) => {
                return Err(DiffError::TextAtDocumentLevel { path: child_path });
            }
            Node::Text { .. } | Node::Comment { .. } => {}
        }
    }
    Ok(())
}

/// A container whose children cannot be reconciled in place; `path` names the offending text.
#[derive(Debug)]
struct Unpatchable {
    path: String,
}

fn child_paths(container_path: &str, children: &[Node]) -> Vec<String> {
    let mut session = ChildrenTraversal::open(container_path);
    let paths = children
        .iter()
        .map(|child| session.traverse_child(child).to_string())
        .collect();
    session.stop();
    paths
}

fn element_name(node: &Node) -> Option<String> {
    node.as_element().map(|element| element.name.clone())
}

fn diff_children<M: MatchDecision + ?Sized>(
    decision: &M,
    before_path: &str,
    after_path: &str,
    before: &[Node],
    after: &[Node],
) -> Result<Vec<DiffNode>, Unpatchable> {
    let before_paths = child_paths(before_path, before);
    let after_paths = child_paths(after_path, after);

    // Element anchors, recursed immediately; unpatchable pairs are dropped.
    let mut anchors: Vec<(usize, usize, Option<DiffNode>)> = Vec::new();
    let mut next_after = 0;
    for (bi, before_node) in before.iter().enumerate() {
        let Node::Element(before_element) = before_node else {
            continue;
        };
        let Some(ai) = (next_after..after.len()).find(|&ai| {
            let same_name = matches!(
                &after[ai],
                Node::Element(candidate) if candidate.name == before_element.name
            );
            same_name && decision.matches(before_node, &after[ai])
        }) else {
            continue;
        };
        next_after = ai + 1;
        let Node::Element(after_element) = &after[ai] else {
            continue;
        };
        match diff_element(
            decision,
            before_element,
            after_element,
            &before_paths[bi],
            &after_paths[ai],
        ) {
            Ok(changes) => anchors.push((bi, ai, changes)),
            Err(unpatchable) => {
                log::debug!(
                    target: "markup.diff",
                    "{} cannot be patched in place (text at {}); replacing it",
                    before_paths[bi],
                    unpatchable.path
                );
            }
        }
    }

    // Pair text and comments inside each gap between anchors.
    let mut pairs: Vec<(usize, usize, Option<DiffNode>)> = Vec::new();
    let mut gap_before = 0;
    let mut gap_after = 0;
    for (bi, ai, changes) in anchors
        .into_iter()
        .map(Some)
        .chain(std::iter::once(None))
        .map(|anchor| match anchor {
            Some((bi, ai, changes)) => (bi, ai, Some(changes)),
            None => (before.len(), after.len(), None),
        })
    {
        let mut next = gap_after;
        for pb in gap_before..bi {
            if matches!(before[pb], Node::Element(_)) {
                continue;
            }
            let found = (next..ai).find(|&pa| {
                before[pb].kind() == after[pa].kind() && decision.matches(&before[pb], &after[pa])
            });
            if let Some(pa) = found {
                next = pa + 1;
                pairs.push((pb, pa, replace_leaf(&before[pb], &after[pa], &before_paths[pb])));
            }
        }
        if let Some(changes) = changes {
            pairs.push((bi, ai, changes));
        }
        gap_before = bi + 1;
        gap_after = ai + 1;
    }
    pairs.sort_by_key(|&(bi, _, _)| bi);

    // Replay order: per gap, removals, then insertions, then the next kept pair.
    let mut entries = Vec::new();
    let mut cursor = 0usize;
    let mut bi = 0;
    let mut ai = 0;
    for pair in pairs.into_iter().map(Some).chain(std::iter::once(None)) {
        let (pb, pa) = match &pair {
            Some((pb, pa, _)) => (*pb, *pa),
            None => (before.len(), after.len()),
        };
        for (offset, node) in before[bi..pb].iter().enumerate() {
            let path = &before_paths[bi + offset];
            match node {
                Node::Element(_) | Node::Comment { .. } => {
                    log::trace!(target: "markup.diff", "remove {path} at {cursor}");
                    entries.push(DiffNode::new(
                        node.kind(),
                        element_name(node),
                        path.as_str(),
                        Some(cursor),
                        Instruction::ElementRemove,
                    ));
                }
                Node::Text { text } if is_whitespace(text) => cursor += 1,
                Node::Text { .. } => return Err(Unpatchable { path: path.clone() }),
            }
        }
        for (offset, node) in after[ai..pa].iter().enumerate() {
            let path = &after_paths[ai + offset];
            match node {
                Node::Element(_) | Node::Comment { .. } => {
                    log::trace!(target: "markup.diff", "insert {path} at {cursor}");
                    entries.push(DiffNode::new(
                        node.kind(),
                        element_name(node),
                        path.as_str(),
                        Some(cursor),
                        Instruction::ElementInsert {
                            subtree: node.clone(),
                        },
                    ));
                    cursor += 1;
                }
                Node::Text { text } if is_whitespace(text) => {}
                Node::Text { .. } => return Err(Unpatchable { path: path.clone() }),
            }
        }
        let Some((_, _, changes)) = pair else {
            break;
        };
        if let Some(mut changed) = changes {
            changed.index = Some(cursor);
            entries.push(changed);
        }
        cursor += 1;
        bi = pb + 1;
        ai = pa + 1;
    }
    Ok(entries)
}

fn replace_leaf(before: &Node, after: &Node, path: &str) -> Option<DiffNode> {
    let (Some(old), Some(new)) = (before.content(), after.content()) else {
        return None;
    };
    if old == new {
        return None;
    }
    let instruction = match before {
        Node::Text { .. } => Instruction::TextReplace {
            content: new.to_string(),
        },
        Node::Comment { .. } => Instruction::CommentReplace {
            content: new.to_string(),
        },
        Node::Element(_) => return None,
    };
    log::trace!(target: "markup.diff", "replace {path}");
    Some(DiffNode::new(before.kind(), None, path, None, instruction))
}

/// Diffs a matched element pair. `Ok(None)` means nothing changed below or on the element.
fn diff_element<M: MatchDecision + ?Sized>(
    decision: &M,
    before: &Element,
    after: &Element,
    before_path: &str,
    after_path: &str,
) -> Result<Option<DiffNode>, Unpatchable> {
    let mut entries = diff_attributes(before, after, before_path);
    entries.extend(diff_children(
        decision,
        before_path,
        after_path,
        &before.children,
        &after.children,
    )?);
    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        DiffNode::new(
            NodeKind::Element,
            Some(before.name.clone()),
            before_path,
            None,
            Instruction::Keep,
        )
        .with_children(entries),
    ))
}

fn diff_attributes(before: &Element, after: &Element, element_path: &str) -> Vec<DiffNode> {
    let attribute_node = |name: &str, instruction: Instruction| {
        let path = attribute_path(element_path, name);
        log::trace!(target: "markup.diff", "{instruction:?} at {path}");
        DiffNode::new(
            NodeKind::Attribute,
            Some(name.to_string()),
            path,
            None,
            instruction,
        )
    };

    let mut entries: Vec<DiffNode> = before
        .attributes
        .iter()
        .filter(|(name, _)| after.attr(name).is_none())
        .map(|(name, _)| {
            attribute_node(
                name,
                Instruction::AttributeRemove { name: name.clone() },
            )
        })
        .collect();
    entries.extend(
        after
            .attributes
            .iter()
            .filter(|(name, value)| before.attr(name) != Some(value.as_str()))
            .map(|(name, value)| {
                attribute_node(
                    name,
                    Instruction::AttributeSet {
                        name: name.clone(),
                        value: value.clone(),
                    },
                )
            }),
    );
    entries
}
