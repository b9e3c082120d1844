use crate::tokenizer::ParseError;
use crate::types::{Document, Element, Node, Token, TokenStream, is_whitespace};

/// Tree construction options.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilderConfig {
    /// Keep whitespace-only text inside elements. Whitespace between top-level nodes is always
    /// dropped since a document holds no text.
    pub keep_whitespace_text: bool,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            keep_whitespace_text: true,
        }
    }
}

/// Builds an owned `Document` from a token stream.
///
/// Open elements live on an explicit stack, so nesting depth is bounded by memory rather than
/// by the call stack. Adjacent text tokens are merged into one text node.
pub fn build_dom(stream: &TokenStream, config: TreeBuilderConfig) -> Result<Document, ParseError> {
    let mut document = Document::new();
    let mut open_elements: Vec<Element> = Vec::new();

    for token in stream.iter() {
        match token {
            Token::Comment { text, .. } => {
                push_child(&mut document, &mut open_elements, Node::comment(text.as_str()));
            }
            Token::Text { text, position } => {
                if open_elements.is_empty() {
                    if !is_whitespace(text) {
                        return Err(ParseError::TextOutsideRoot {
                            position: *position,
                        });
                    }
                    continue;
                }
                if text.is_empty() {
                    continue;
                }
                if let Some(parent) = open_elements.last_mut() {
                    if let Some(Node::Text { text: prev }) = parent.children.last_mut() {
                        prev.push_str(text);
                    } else {
                        parent.children.push(Node::text(text.as_str()));
                    }
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                let element = Element {
                    name: name.clone(),
                    attributes: attributes.clone(),
                    children: Vec::new(),
                };
                if *self_closing {
                    push_child(&mut document, &mut open_elements, element.into());
                } else {
                    open_elements.push(element);
                }
            }
            Token::EndTag { name, position } => {
                let Some(mut element) = open_elements.pop() else {
                    return Err(ParseError::UnexpectedEndTag {
                        name: name.clone(),
                        position: *position,
                    });
                };
                if element.name != *name {
                    return Err(ParseError::MismatchedEndTag {
                        expected: element.name,
                        found: name.clone(),
                        position: *position,
                    });
                }
                if !config.keep_whitespace_text {
                    element.children.retain(|child| !child.is_whitespace_text());
                }
                push_child(&mut document, &mut open_elements, element.into());
            }
        }
    }

    if let Some(unclosed) = open_elements.pop() {
        return Err(ParseError::UnclosedElement {
            name: unclosed.name,
        });
    }
    log::trace!(
        target: "markup.tree_builder",
        "built document with {} top-level nodes",
        document.children.len()
    );
    Ok(document)
}

fn push_child(document: &mut Document, open_elements: &mut [Element], node: Node) {
    match open_elements.last_mut() {
        Some(parent) => parent.children.push(node),
        None => document.children.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse(input: &str) -> Result<Document, ParseError> {
        build_dom(&tokenize(input)?, TreeBuilderConfig::default())
    }

    #[test]
    fn build_dom_stress_deep_nesting() {
        let depth: usize = 10_000;
        let mut tokens = Vec::with_capacity(depth * 2);
        for position in 0..depth {
            tokens.push(Token::StartTag {
                name: "div".to_string(),
                attributes: Vec::new(),
                self_closing: false,
                position,
            });
        }
        for position in 0..depth {
            tokens.push(Token::EndTag {
                name: "div".to_string(),
                position,
            });
        }

        let mut dom = build_dom(&TokenStream::new(tokens), TreeBuilderConfig::default())
            .expect("balanced tags build");

        assert_eq!(dom.children.len(), 1);
        let mut current = dom.children.first().and_then(Node::as_element);
        let mut seen = 0usize;
        while let Some(element) = current {
            assert_eq!(element.name, "div");
            seen += 1;
            assert!(element.children.len() <= 1);
            current = element.children.first().and_then(Node::as_element);
        }
        assert_eq!(seen, depth);

        // Unwind iteratively so dropping the chain does not recurse 10k frames deep.
        let mut pending = std::mem::take(&mut dom.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }

    #[test]
    fn top_level_whitespace_is_dropped_and_comments_kept() {
        let doc = parse("<!-- lead -->\n<root/>\n").expect("parse");
        assert_eq!(
            doc,
            Document::new()
                .with_child(Node::comment(" lead "))
                .with_child(Element::new("root"))
        );
    }

    #[test]
    fn text_outside_root_is_rejected() {
        let err = parse("<a/>tail").unwrap_err();
        assert_eq!(err, ParseError::TextOutsideRoot { position: 4 });
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MismatchedEndTag { ref expected, ref found, .. }
                if expected == "b" && found == "a"
        ));
    }

    #[test]
    fn stray_end_tag_and_unclosed_element_are_rejected() {
        assert!(matches!(
            parse("</a>").unwrap_err(),
            ParseError::UnexpectedEndTag { .. }
        ));
        assert_eq!(
            parse("<a><b/>").unwrap_err(),
            ParseError::UnclosedElement {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn whitespace_text_can_be_stripped() {
        let stream = tokenize("<a>\n  <b/>\n</a>").expect("tokenize");
        let kept = build_dom(&stream, TreeBuilderConfig::default()).expect("build");
        let stripped = build_dom(
            &stream,
            TreeBuilderConfig {
                keep_whitespace_text: false,
            },
        )
        .expect("build");
        assert_eq!(kept.root_element().map(|e| e.children.len()), Some(3));
        assert_eq!(
            stripped,
            Document::new().with_child(Element::new("a").with_child(Element::new("b")))
        );
    }

    #[test]
    fn case_is_significant_for_end_tags() {
        assert!(matches!(
            parse("<A></a>").unwrap_err(),
            ParseError::MismatchedEndTag { .. }
        ));
    }
}
