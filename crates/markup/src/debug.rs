use crate::dom_patch::{DiffNode, DiffTree, Instruction};
use crate::types::{Document, Node};

struct IndentGuard<'a> {
    indent: &'a mut String,
    step: usize,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        let new_len = self.indent.len() - self.step;
        self.indent.truncate(new_len);
    }
}

const INDENT_STEP: &str = "  ";
const PREVIEW_CHARS: usize = 40;

fn trimmed_nonempty_slice(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn push_preview_replace_newlines(out: &mut String, s: &str, max_chars: usize) {
    let mut truncated = false;
    for (i, ch) in s.chars().enumerate() {
        if i == max_chars {
            truncated = true;
            break;
        }
        out.push(if ch == '\n' { ' ' } else { ch });
    }
    if truncated {
        out.push('…');
    }
}

/// Indented outline of a document, at most `cap` lines. Whitespace-only text is skipped.
pub fn outline_document(document: &Document, cap: usize) -> Vec<String> {
    fn walk(node: &Node, indent: &mut String, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        let mut line = String::with_capacity(indent.len() + 64);
        line.push_str(indent);
        match node {
            Node::Element(element) => {
                *left -= 1;
                line.push('<');
                line.push_str(&element.name);
                if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
                    line.push_str(" id=\"");
                    line.push_str(id);
                    line.push('"');
                }
                line.push('>');
                out.push(line);
                indent.push_str(INDENT_STEP);
                let guard = IndentGuard {
                    indent,
                    step: INDENT_STEP.len(),
                };
                for child in &element.children {
                    walk(child, guard.indent, out, left);
                }
            }
            Node::Text { text } => {
                if let Some(trimmed) = trimmed_nonempty_slice(text) {
                    *left -= 1;
                    line.push('"');
                    push_preview_replace_newlines(&mut line, trimmed, PREVIEW_CHARS);
                    line.push('"');
                    out.push(line);
                }
            }
            Node::Comment { text } => {
                *left -= 1;
                line.push_str("<!-- ");
                push_preview_replace_newlines(&mut line, text, PREVIEW_CHARS);
                line.push_str(" -->");
                out.push(line);
            }
        }
    }

    let mut out = Vec::new();
    if cap == 0 {
        return out;
    }
    out.push("#document".to_string());
    let mut left = cap - 1;
    let mut indent = INDENT_STEP.to_string();
    for child in &document.children {
        walk(child, &mut indent, &mut out, &mut left);
    }
    out
}

/// Indented outline of a diff tree: one line per diff-node with its instruction.
pub fn outline_diff_tree(tree: &DiffTree, cap: usize) -> Vec<String> {
    fn walk(node: &DiffNode, indent: &mut String, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let mut line = String::with_capacity(indent.len() + 64);
        line.push_str(indent);
        match &node.instruction {
            Instruction::Keep => line.push_str("keep"),
            Instruction::AttributeSet { value, .. } => {
                line.push_str("set-attribute \"");
                push_preview_replace_newlines(&mut line, value, PREVIEW_CHARS);
                line.push('"');
            }
            Instruction::AttributeRemove { .. } => line.push_str("remove-attribute"),
            Instruction::TextReplace { content } | Instruction::CommentReplace { content } => {
                line.push_str(if node.kind == crate::NodeKind::Text {
                    "replace-text \""
                } else {
                    "replace-comment \""
                });
                push_preview_replace_newlines(&mut line, content, PREVIEW_CHARS);
                line.push('"');
            }
            Instruction::ElementInsert { .. } => line.push_str("insert"),
            Instruction::ElementRemove => line.push_str("remove"),
        }
        if let Some(index) = node.index {
            line.push_str(&format!(" @{index}"));
        }
        line.push(' ');
        line.push_str(&node.path);
        out.push(line);
        indent.push_str(INDENT_STEP);
        let guard = IndentGuard {
            indent,
            step: INDENT_STEP.len(),
        };
        for child in &node.children {
            walk(child, guard.indent, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    let mut indent = String::new();
    walk(&tree.root, &mut indent, &mut out, &mut left);
    out
}
