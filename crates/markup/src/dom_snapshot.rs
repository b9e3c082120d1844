use crate::types::{Document, Node};
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Deterministic document snapshots and structural equality for tests and tooling.
/// Not a stable interchange format.
///
/// Equivalence rules:
/// - Node kinds and element names must agree.
/// - Attribute names and values must match; order is ignored unless disabled by options.
/// - Text nodes compare by decoded content.
/// - Comments must match exactly.
/// - Whitespace-only text nodes can be ignored by options.
#[derive(Clone, Copy, Debug)]
pub struct DomSnapshotOptions {
    pub ignore_whitespace_text: bool,
    pub ignore_attribute_order: bool,
}

impl Default for DomSnapshotOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace_text: true,
            ignore_attribute_order: true,
        }
    }
}

impl DomSnapshotOptions {
    /// Every node and the attribute order count.
    pub const fn exact() -> Self {
        Self {
            ignore_whitespace_text: false,
            ignore_attribute_order: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Subject<'a> {
    Document(&'a Document),
    Node(&'a Node),
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(document: &Document, options: DomSnapshotOptions) -> Self {
        Self::of(Subject::Document(document), options)
    }

    fn of(subject: Subject<'_>, options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(subject, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DomMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: Subject<'a>,
    actual_node: Subject<'a>,
    options: DomSnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl DomMismatch<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for DomMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| DomSnapshot::of(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| DomSnapshot::of(self.actual_node, self.options).render());
        writeln!(f, "document mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{}", expected_subtree)?;
        writeln!(f, "actual subtree:\n{}", actual_subtree)?;
        Ok(())
    }
}

impl std::error::Error for DomMismatch<'_> {}

pub fn assert_dom_eq(expected: &Document, actual: &Document, options: DomSnapshotOptions) {
    if let Err(mismatch) = compare_dom(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_dom<'a>(
    expected: &'a Document,
    actual: &'a Document,
    options: DomSnapshotOptions,
) -> Result<(), Box<DomMismatch<'a>>> {
    let mut path = vec!["#document".to_string()];
    compare_children(
        Subject::Document(expected),
        Subject::Document(actual),
        &expected.children,
        &actual.children,
        &options,
        &mut path,
    )
}

fn compare_nodes<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: &DomSnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    let fail = |path: &[String], detail: &str| -> Result<(), Box<DomMismatch<'a>>> {
        Err(Box::new(mismatch(
            path,
            detail,
            Subject::Node(expected),
            Subject::Node(actual),
            options,
        )))
    };
    match (expected, actual) {
        (Node::Element(expected_element), Node::Element(actual_element)) => {
            if expected_element.name != actual_element.name {
                return fail(&path[..], "element name");
            }
            let expected_attrs = &expected_element.attributes;
            let actual_attrs = &actual_element.attributes;
            if expected_attrs.len() != actual_attrs.len() {
                return fail(&path[..], "attribute count");
            }
            if options.ignore_attribute_order {
                for (name, value) in expected_attrs {
                    match actual_element.attr(name) {
                        None => return fail(&path[..], &format!("missing attribute `{name}`")),
                        Some(actual_value) if actual_value != value => {
                            return fail(&path[..], &format!("attribute value `{name}`"));
                        }
                        Some(_) => {}
                    }
                }
            } else {
                for (i, (exp, act)) in expected_attrs.iter().zip(actual_attrs.iter()).enumerate() {
                    if exp.0 != act.0 {
                        return fail(&path[..], &format!("attribute name at index {i}"));
                    }
                    if exp.1 != act.1 {
                        return fail(&path[..], &format!("attribute value at index {i}"));
                    }
                }
            }
            compare_children(
                Subject::Node(expected),
                Subject::Node(actual),
                &expected_element.children,
                &actual_element.children,
                options,
                path,
            )
        }
        (Node::Text { text: expected_text }, Node::Text { text: actual_text }) => {
            if expected_text != actual_text {
                return fail(&path[..], "text");
            }
            Ok(())
        }
        (Node::Comment { text: expected_text }, Node::Comment { text: actual_text }) => {
            if expected_text != actual_text {
                return fail(&path[..], "comment");
            }
            Ok(())
        }
        _ => fail(&path[..], "node kind"),
    }
}

fn compare_children<'a>(
    expected_parent: Subject<'a>,
    actual_parent: Subject<'a>,
    expected: &'a [Node],
    actual: &'a [Node],
    options: &DomSnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    let keep = |node: &&Node| !(options.ignore_whitespace_text && node.is_whitespace_text());
    let expected: Vec<(usize, &Node)> = expected
        .iter()
        .enumerate()
        .filter(|(_, node)| keep(node))
        .collect();
    let actual: Vec<&Node> = actual.iter().filter(keep).collect();
    if expected.len() != actual.len() {
        return Err(Box::new(mismatch(
            path,
            &format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
            options,
        )));
    }
    for (&(idx, exp), act) in expected.iter().zip(actual) {
        path.push(format!("{}[{}]", node_label(exp), idx));
        let result = compare_nodes(exp, act, options, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: Subject<'a>,
    actual: Subject<'a>,
    options: &DomSnapshotOptions,
) -> DomMismatch<'a> {
    let path = format!("/{}", path.join("/"));
    let expected_line = format_subject_line(expected);
    let actual_line = format_subject_line(actual);
    DomMismatch {
        path,
        detail: detail.to_string(),
        expected: truncate_line(expected_line, 160),
        actual: truncate_line(actual_line, 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Element(element) => {
            let mut label = element.name.clone();
            if let Some(id_value) = element.attr("id").filter(|value| !value.is_empty()) {
                label.push('#');
                write_escaped(&mut label, id_value);
            }
            label
        }
        Node::Text { .. } => "#text".to_string(),
        Node::Comment { .. } => "#comment".to_string(),
    }
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        let mut cut = max_len.saturating_sub(3);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
        line.push_str("...");
    }
    line
}

fn walk_snapshot(
    subject: Subject<'_>,
    options: &DomSnapshotOptions,
    indent_level: usize,
    out: &mut Vec<String>,
) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(indent_level.saturating_mul(INDENT_STEP));
    line.push_str(&format_subject_line(subject));
    out.push(line);
    let children = match subject {
        Subject::Document(document) => &document.children,
        Subject::Node(Node::Element(element)) => &element.children,
        Subject::Node(Node::Text { .. } | Node::Comment { .. }) => return,
    };
    for child in children {
        if options.ignore_whitespace_text && child.is_whitespace_text() {
            continue;
        }
        walk_snapshot(Subject::Node(child), options, indent_level + 1, out);
    }
}

fn format_subject_line(subject: Subject<'_>) -> String {
    let mut out = String::new();
    match subject {
        Subject::Document(_) => out.push_str("#document"),
        Subject::Node(Node::Element(element)) => {
            out.push('<');
            out.push_str(&element.name);
            for (attr, value) in &element.attributes {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                write_escaped(&mut out, value);
                out.push('"');
            }
            out.push('>');
        }
        Subject::Node(Node::Text { text }) => {
            out.push('"');
            write_escaped(&mut out, text);
            out.push('"');
        }
        Subject::Node(Node::Comment { text }) => {
            out.push_str("<!-- ");
            write_escaped(&mut out, text);
            out.push_str(" -->");
        }
    }
    out
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
