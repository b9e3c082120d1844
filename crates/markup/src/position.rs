//! Stable, printable node positions.
//!
//! One `ChildrenTraversal` session is opened per container and advanced once per child, in
//! document order. Paths look like `/a[1]/b[2]/text()[1]`. A comment whose previous sibling is an
//! element is addressed from that element instead of the container's comment counter:
//! `/a[1]/b[1]/following-sibling::comment()[1]`.
use crate::traverse::{ContainerRef, Visitor, walk_document};
use crate::types::{Document, Element, Node};
use std::collections::HashMap;

pub const DOCUMENT_PATH: &str = "/";

pub(crate) fn join_step(base: &str, step: &str) -> String {
    if base == DOCUMENT_PATH {
        format!("/{step}")
    } else {
        format!("{base}/{step}")
    }
}

/// Path of an attribute on the element at `element_path`.
pub fn attribute_path(element_path: &str, name: &str) -> String {
    join_step(element_path, &format!("@{name}"))
}

#[derive(Debug)]
pub struct ChildrenTraversal {
    container_path: String,
    element_counts: HashMap<String, usize>,
    text_count: usize,
    comment_count: usize,
    // Path of the last element sibling and the length of the comment run following it.
    anchor: Option<(String, usize)>,
    current: String,
    traversed: usize,
}

impl ChildrenTraversal {
    pub fn open(container_path: impl Into<String>) -> Self {
        let container_path = container_path.into();
        Self {
            current: container_path.clone(),
            container_path,
            element_counts: HashMap::new(),
            text_count: 0,
            comment_count: 0,
            anchor: None,
            traversed: 0,
        }
    }

    pub fn container_path(&self) -> &str {
        &self.container_path
    }

    /// Most recently traversed path; the container's own path before the first child.
    pub fn current_path(&self) -> &str {
        &self.current
    }

    pub fn traverse_child(&mut self, child: &Node) -> &str {
        match child {
            Node::Element(element) => self.traverse_element(&element.name),
            Node::Text { .. } => self.traverse_text(),
            Node::Comment { .. } => self.traverse_comment(),
        }
    }

    pub fn traverse_element(&mut self, name: &str) -> &str {
        let count = self.element_counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        let path = join_step(&self.container_path, &format!("{name}[{count}]"));
        self.anchor = Some((path.clone(), 0));
        self.advance(path)
    }

    pub fn traverse_text(&mut self) -> &str {
        self.anchor = None;
        self.text_count += 1;
        let path = join_step(&self.container_path, &format!("text()[{}]", self.text_count));
        self.advance(path)
    }

    pub fn traverse_comment(&mut self) -> &str {
        let path = match &mut self.anchor {
            Some((element_path, run)) => {
                *run += 1;
                format!("{element_path}/following-sibling::comment()[{run}]")
            }
            None => {
                self.comment_count += 1;
                join_step(
                    &self.container_path,
                    &format!("comment()[{}]", self.comment_count),
                )
            }
        };
        self.advance(path)
    }

    /// Closes the session, returning how many children were traversed.
    pub fn stop(self) -> usize {
        self.traversed
    }

    fn advance(&mut self, path: String) -> &str {
        self.traversed += 1;
        self.current = path;
        &self.current
    }
}

/// Visitor that records the path of every node and attribute in document order.
#[derive(Debug, Default)]
pub struct PositionRecorder {
    sessions: Vec<ChildrenTraversal>,
    paths: Vec<String>,
}

impl PositionRecorder {
    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }

    fn session(&mut self) -> Option<&mut ChildrenTraversal> {
        self.sessions.last_mut()
    }
}

impl Visitor for PositionRecorder {
    fn enter_container(&mut self, _container: ContainerRef<'_>) {
        let path = match self.sessions.last() {
            Some(parent) => parent.current_path().to_string(),
            None => {
                self.paths.push(DOCUMENT_PATH.to_string());
                DOCUMENT_PATH.to_string()
            }
        };
        self.sessions.push(ChildrenTraversal::open(path));
    }

    fn exit_container(&mut self, _container: ContainerRef<'_>) {
        if let Some(session) = self.sessions.pop() {
            let count = session.stop();
            log::trace!(target: "markup.position", "closed container after {count} children");
        }
    }

    fn element(&mut self, element: &Element) {
        if let Some(session) = self.session() {
            let path = session.traverse_element(&element.name).to_string();
            self.paths.push(path);
        }
    }

    fn attribute(&mut self, _element: &Element, name: &str, _value: &str) {
        if let Some(session) = self.session() {
            let path = attribute_path(session.current_path(), name);
            self.paths.push(path);
        }
    }

    fn text(&mut self, _text: &str) {
        if let Some(session) = self.session() {
            let path = session.traverse_text().to_string();
            self.paths.push(path);
        }
    }

    fn comment(&mut self, _text: &str) {
        if let Some(session) = self.session() {
            let path = session.traverse_comment().to_string();
            self.paths.push(path);
        }
    }
}

/// Paths of the document, every node, and every attribute, in document order.
pub fn collect_positions(document: &Document) -> Vec<String> {
    let mut recorder = PositionRecorder::default();
    walk_document(document, &mut recorder);
    recorder.into_paths()
}
