//! Replays an instruction document against a live document.
//!
//! Entries are processed in document order, depth-first. Each entry is validated against the
//! node it targets before anything is mutated, so a failing entry never partially applies.
//! Entries applied before the failure stay applied: callers wanting all-or-nothing semantics
//! apply to a clone.

use crate::dom_patch::Operation;
use crate::instructions::{
    ATTR_ATTRIBUTE, ATTR_INDEX, ATTR_PATH, ATTR_VALUE, ATTR_VERSION, FORMAT_VERSION,
    InstructionDocument, NODE_SHELL, PATCH_ROOT,
};
use crate::position::{DOCUMENT_PATH, attribute_path, join_step};
use crate::types::{Document, Element, MAX_NESTING_DEPTH, Node, NodeKind};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("{operation} cannot target a {target} node at {path}")]
    IllegalTarget {
        operation: Operation,
        target: NodeKind,
        path: String,
    },
    #[error("{operation} cannot carry a {found} node at {path}")]
    IllegalPayload {
        operation: Operation,
        found: NodeKind,
        path: String,
    },
    #[error("<{instruction}> index {index} is out of range for {len} children at {path}")]
    MissingTarget {
        instruction: String,
        index: usize,
        len: usize,
        path: String,
    },
    #[error("attribute `{name}` does not exist at {path}")]
    MissingAttribute { name: String, path: String },
    #[error("<node> entries nest deeper than {limit} levels at {path}")]
    NestingTooDeep { path: String, limit: usize },
    #[error("malformed <{element}> at {path}: {reason}")]
    Malformed {
        element: String,
        reason: String,
        path: String,
    },
}

/// The node currently selected by the enclosing `<patch>` or `<node>` entry.
enum Target<'a> {
    Document(&'a mut Document),
    Node(&'a mut Node),
}

impl Target<'_> {
    fn kind(&self) -> NodeKind {
        match self {
            Target::Document(_) => NodeKind::Document,
            Target::Node(node) => node.kind(),
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Target::Document(document) => Some(&mut document.children),
            Target::Node(node) => node.children_mut(),
        }
    }

    fn element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Target::Document(_) => None,
            Target::Node(node) => node.as_element_mut(),
        }
    }
}

/// Applies `patch` to `document` in place.
pub fn apply(patch: &InstructionDocument, document: &mut Document) -> Result<(), ApplyError> {
    let root = patch.document().root_element().ok_or_else(|| ApplyError::Malformed {
        element: "#document".to_string(),
        reason: format!("missing <{PATCH_ROOT}> root element"),
        path: DOCUMENT_PATH.to_string(),
    })?;
    if root.name != PATCH_ROOT {
        return Err(ApplyError::Malformed {
            element: root.name.clone(),
            reason: format!("expected <{PATCH_ROOT}> root element"),
            path: DOCUMENT_PATH.to_string(),
        });
    }
    match root.attr(ATTR_VERSION) {
        Some(version) if version != FORMAT_VERSION => {
            return Err(ApplyError::Malformed {
                element: root.name.clone(),
                reason: format!("unsupported version `{version}`"),
                path: DOCUMENT_PATH.to_string(),
            });
        }
        _ => {}
    }

    let applied = apply_entries(&root.children, Target::Document(document), DOCUMENT_PATH, 0)?;
    log::debug!(target: "markup.apply", "applied {applied} instructions");
    Ok(())
}

// `depth` counts the enclosing `<node>` entries.
fn apply_entries(
    entries: &[Node],
    mut target: Target<'_>,
    target_path: &str,
    depth: usize,
) -> Result<usize, ApplyError> {
    let mut applied = 0;
    for entry in entries {
        let entry = match entry {
            Node::Element(element) => element,
            Node::Text { text } if crate::types::is_whitespace(text) => continue,
            Node::Comment { .. } => continue,
            Node::Text { .. } => {
                return Err(ApplyError::Malformed {
                    element: "#text".to_string(),
                    reason: "text between instructions".to_string(),
                    path: target_path.to_string(),
                });
            }
        };

        if entry.name == NODE_SHELL {
            let index = parse_index(entry, target_path)?;
            let path = entry_path(entry, target_path, index);
            if depth >= MAX_NESTING_DEPTH {
                return Err(ApplyError::NestingTooDeep {
                    path,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            let Some(children) = target.children_mut() else {
                return Err(missing_target(entry, index, 0, &path));
            };
            let len = children.len();
            let Some(child) = children.get_mut(index) else {
                return Err(missing_target(entry, index, len, &path));
            };
            applied += apply_entries(&entry.children, Target::Node(child), &path, depth + 1)?;
            continue;
        }

        let Some(operation) = Operation::from_tag(&entry.name) else {
            return Err(ApplyError::Malformed {
                element: entry.name.clone(),
                reason: "unknown instruction".to_string(),
                path: target_path.to_string(),
            });
        };
        apply_one(operation, entry, &mut target, target_path)?;
        applied += 1;
    }
    Ok(applied)
}

fn apply_one(
    operation: Operation,
    entry: &Element,
    target: &mut Target<'_>,
    target_path: &str,
) -> Result<(), ApplyError> {
    match operation {
        Operation::AttributeSet | Operation::AttributeRemove => {
            let name = required_attr(entry, ATTR_ATTRIBUTE, target_path)?;
            let path = entry
                .attr(ATTR_PATH)
                .map_or_else(|| attribute_path(target_path, name), str::to_string);
            let target_kind = target.kind();
            let Some(element) = target.element_mut().filter(|_| operation.allows(target_kind))
            else {
                return Err(ApplyError::IllegalTarget {
                    operation,
                    target: target_kind,
                    path,
                });
            };
            if operation == Operation::AttributeSet {
                let value = required_attr(entry, ATTR_VALUE, &path)?;
                element.set_attr(name, value);
            } else if element.remove_attr(name).is_none() {
                return Err(ApplyError::MissingAttribute {
                    name: name.to_string(),
                    path,
                });
            }
            log::trace!(target: "markup.apply", "{operation} {path}");
        }
        Operation::TextReplace | Operation::CommentReplace => {
            let index = parse_index(entry, target_path)?;
            let path = entry_path(entry, target_path, index);
            let content = text_payload(operation, entry, &path)?;
            let child = child_at(target, entry, index, &path)?;
            if !operation.allows(child.kind()) {
                return Err(ApplyError::IllegalTarget {
                    operation,
                    target: child.kind(),
                    path,
                });
            }
            if let Node::Text { text } | Node::Comment { text } = child {
                *text = content;
            }
            log::trace!(target: "markup.apply", "{operation} {path}");
        }
        Operation::ElementInsert => {
            let index = parse_index(entry, target_path)?;
            let path = entry_path(entry, target_path, index);
            let target_kind = target.kind();
            let children = match target.children_mut() {
                Some(children) if operation.allows(target_kind) => children,
                _ => {
                    return Err(ApplyError::IllegalTarget {
                        operation,
                        target: target_kind,
                        path,
                    });
                }
            };
            if index > children.len() {
                return Err(missing_target(entry, index, children.len(), &path));
            }
            let payload = insert_payload(entry, &path)?;
            children.insert(index, payload.clone());
            log::trace!(target: "markup.apply", "{operation} {path} at {index}");
        }
        Operation::ElementRemove => {
            if entry.attr(ATTR_ATTRIBUTE).is_some() {
                return Err(ApplyError::IllegalTarget {
                    operation,
                    target: NodeKind::Attribute,
                    path: entry
                        .attr(ATTR_PATH)
                        .unwrap_or(target_path)
                        .to_string(),
                });
            }
            let index = parse_index(entry, target_path)?;
            let path = entry_path(entry, target_path, index);
            let kind = child_at(target, entry, index, &path)?.kind();
            if !operation.allows(kind) {
                return Err(ApplyError::IllegalTarget {
                    operation,
                    target: kind,
                    path,
                });
            }
            if let Some(children) = target.children_mut() {
                children.remove(index);
            }
            log::trace!(target: "markup.apply", "{operation} {path}");
        }
    }
    Ok(())
}

fn child_at<'t>(
    target: &'t mut Target<'_>,
    entry: &Element,
    index: usize,
    path: &str,
) -> Result<&'t mut Node, ApplyError> {
    let Some(children) = target.children_mut() else {
        return Err(missing_target(entry, index, 0, path));
    };
    let len = children.len();
    children
        .get_mut(index)
        .ok_or_else(|| missing_target(entry, index, len, path))
}

fn missing_target(entry: &Element, index: usize, len: usize, path: &str) -> ApplyError {
    ApplyError::MissingTarget {
        instruction: entry.name.clone(),
        index,
        len,
        path: path.to_string(),
    }
}

fn parse_index(entry: &Element, target_path: &str) -> Result<usize, ApplyError> {
    let raw = required_attr(entry, ATTR_INDEX, target_path)?;
    raw.parse().map_err(|_| ApplyError::Malformed {
        element: entry.name.clone(),
        reason: format!("invalid index `{raw}`"),
        path: target_path.to_string(),
    })
}

fn required_attr<'e>(entry: &'e Element, name: &str, path: &str) -> Result<&'e str, ApplyError> {
    entry.attr(name).ok_or_else(|| ApplyError::Malformed {
        element: entry.name.clone(),
        reason: format!("missing `{name}` attribute"),
        path: path.to_string(),
    })
}

// Diagnostic path: the entry's own `path`, or a positional fallback.
fn entry_path(entry: &Element, target_path: &str, index: usize) -> String {
    match entry.attr(ATTR_PATH) {
        Some(path) => path.to_string(),
        None => join_step(target_path, &format!("node()[{}]", index + 1)),
    }
}

fn text_payload(operation: Operation, entry: &Element, path: &str) -> Result<String, ApplyError> {
    let mut content = String::new();
    for child in &entry.children {
        match child {
            Node::Text { text } => content.push_str(text),
            Node::Element(_) | Node::Comment { .. } => {
                return Err(ApplyError::IllegalPayload {
                    operation,
                    found: child.kind(),
                    path: path.to_string(),
                });
            }
        }
    }
    Ok(content)
}

fn insert_payload<'e>(entry: &'e Element, path: &str) -> Result<&'e Node, ApplyError> {
    let mut units = entry.children.iter().filter(|child| !child.is_whitespace_text());
    let payload = match (units.next(), units.next()) {
        (Some(payload), None) => payload,
        (first, second) => {
            let count = usize::from(first.is_some()) + usize::from(second.is_some()) + units.count();
            return Err(ApplyError::Malformed {
                element: entry.name.clone(),
                reason: format!("expected exactly one node to insert, found {count}"),
                path: path.to_string(),
            });
        }
    };
    if payload.kind() == NodeKind::Text {
        return Err(ApplyError::IllegalPayload {
            operation: Operation::ElementInsert,
            found: NodeKind::Text,
            path: path.to_string(),
        });
    }
    Ok(payload)
}
