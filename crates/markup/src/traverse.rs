use crate::types::{Document, Element, Fragment, Node, NodeKind};

/// Borrowed view of a container: the document itself or an element.
#[derive(Clone, Copy, Debug)]
pub enum ContainerRef<'a> {
    Document(&'a Document),
    Element(&'a Element),
}

impl<'a> ContainerRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            ContainerRef::Document(_) => NodeKind::Document,
            ContainerRef::Element(_) => NodeKind::Element,
        }
    }

    pub fn children(self) -> &'a [Node] {
        match self {
            ContainerRef::Document(document) => document.children(),
            ContainerRef::Element(element) => element.children(),
        }
    }

    pub fn name(self) -> Option<&'a str> {
        match self {
            ContainerRef::Document(_) => None,
            ContainerRef::Element(element) => Some(&element.name),
        }
    }
}

/// Callbacks for a document-order walk. Every method defaults to a no-op.
pub trait Visitor {
    fn enter_container(&mut self, _container: ContainerRef<'_>) {}
    fn exit_container(&mut self, _container: ContainerRef<'_>) {}
    fn element(&mut self, _element: &Element) {}
    fn attribute(&mut self, _element: &Element, _name: &str, _value: &str) {}
    fn text(&mut self, _text: &str) {}
    fn comment(&mut self, _text: &str) {}
}

/// Depth-first, pre-order walk. For each element the order is `element`, its `attribute`s,
/// `enter_container`, children, `exit_container`.
///
/// Open containers live on an explicit stack, so any depth the reader builds can be walked.
pub fn walk_document<V: Visitor + ?Sized>(document: &Document, visitor: &mut V) {
    let root = ContainerRef::Document(document);
    visitor.enter_container(root);
    let mut open = vec![(root, document.children.iter())];
    while let Some((container, children)) = open.last_mut() {
        let Some(child) = children.next() else {
            let container = *container;
            open.pop();
            visitor.exit_container(container);
            continue;
        };
        match child {
            Node::Element(element) => {
                visitor.element(element);
                for (name, value) in &element.attributes {
                    visitor.attribute(element, name, value);
                }
                let container = ContainerRef::Element(element);
                visitor.enter_container(container);
                open.push((container, element.children.iter()));
            }
            Node::Text { text } => visitor.text(text),
            Node::Comment { text } => visitor.comment(text),
        }
    }
}

/// Counts every node below the document, elements, text, and comments alike.
pub fn count_nodes(document: &Document) -> usize {
    #[derive(Default)]
    struct Counter(usize);

    impl Visitor for Counter {
        fn element(&mut self, _element: &Element) {
            self.0 += 1;
        }
        fn text(&mut self, _text: &str) {
            self.0 += 1;
        }
        fn comment(&mut self, _text: &str) {
            self.0 += 1;
        }
    }

    let mut counter = Counter::default();
    walk_document(document, &mut counter);
    counter.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl Visitor for Recorder {
        fn enter_container(&mut self, container: ContainerRef<'_>) {
            self.0
                .push(format!("enter {}", container.name().unwrap_or("#document")));
        }
        fn exit_container(&mut self, container: ContainerRef<'_>) {
            self.0
                .push(format!("exit {}", container.name().unwrap_or("#document")));
        }
        fn element(&mut self, element: &Element) {
            self.0.push(format!("element {}", element.name));
        }
        fn attribute(&mut self, _element: &Element, name: &str, value: &str) {
            self.0.push(format!("@{name}={value}"));
        }
        fn text(&mut self, text: &str) {
            self.0.push(format!("text {text}"));
        }
        fn comment(&mut self, text: &str) {
            self.0.push(format!("comment {text}"));
        }
    }

    fn sample() -> Document {
        Document::new().with_child(
            Element::new("a")
                .with_attr("x", "1")
                .with_attr("y", "2")
                .with_child(Node::text("t"))
                .with_child(Element::new("b").with_child(Node::comment("c"))),
        )
    }

    #[test]
    fn walk_visits_in_document_order() {
        let mut recorder = Recorder::default();
        walk_document(&sample(), &mut recorder);
        assert_eq!(
            recorder.0,
            vec![
                "enter #document",
                "element a",
                "@x=1",
                "@y=2",
                "enter a",
                "text t",
                "element b",
                "enter b",
                "comment c",
                "exit b",
                "exit a",
                "exit #document",
            ]
        );
    }

    #[test]
    fn count_nodes_covers_every_kind() {
        assert_eq!(count_nodes(&sample()), 4);
    }

    #[test]
    fn walk_survives_deep_nesting() {
        let depth = 10_000;
        let mut element = Element::new("d");
        for _ in 1..depth {
            element = Element::new("d").with_child(element);
        }
        let mut doc = Document::new().with_child(element);
        assert_eq!(count_nodes(&doc), depth);

        let mut pending = std::mem::take(&mut doc.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}
