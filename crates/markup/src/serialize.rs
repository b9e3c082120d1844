use crate::types::{Document, Element, Node};

/// Writes a document back to markup.
///
/// Text escapes `& < >`; attribute values additionally escape `"` and the whitespace controls
/// `\n \r \t` so they survive attribute-value normalization on re-read. Elements without
/// children are written self-closing. Comments are written verbatim.
pub fn to_markup(document: &Document) -> String {
    let mut out = String::new();
    for child in &document.children {
        write_node(&mut out, child);
    }
    out
}

/// Writes a single node (and its subtree) to markup.
pub fn node_to_markup(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

enum Step<'a> {
    Open(&'a Node),
    Close(&'a Element),
}

fn write_node(out: &mut String, root: &Node) {
    let mut stack = vec![Step::Open(root)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(Node::Text { text }) => escape_text(out, text),
            Step::Open(Node::Comment { text }) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Step::Open(Node::Element(element)) => {
                out.push('<');
                out.push_str(&element.name);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(out, value);
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                    continue;
                }
                out.push('>');
                stack.push(Step::Close(element));
                for child in element.children.iter().rev() {
                    stack.push(Step::Open(child));
                }
            }
            Step::Close(element) => {
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    #[test]
    fn writes_empty_elements_self_closing() {
        let doc = Document::new().with_child(
            Element::new("a")
                .with_attr("k", "v")
                .with_child(Element::new("b"))
                .with_child(Node::text("t")),
        );
        assert_eq!(to_markup(&doc), "<a k=\"v\"><b/>t</a>");
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let doc = Document::new().with_child(
            Element::new("a")
                .with_attr("q", "\"<&>\n\t")
                .with_child(Node::text("1 < 2 & 3 > 0")),
        );
        assert_eq!(
            to_markup(&doc),
            "<a q=\"&quot;&lt;&amp;>&#10;&#9;\">1 &lt; 2 &amp; 3 &gt; 0</a>"
        );
    }

    #[test]
    fn written_markup_reads_back_identically() {
        let doc = Document::new()
            .with_child(Node::comment(" head "))
            .with_child(
                Element::new("root")
                    .with_attr("multi", "line\r\nvalue")
                    .with_child(Node::text("  spaced  "))
                    .with_child(Node::comment("c"))
                    .with_child(Element::new("leaf").with_attr("e", "")),
            );
        let reread = parse_document(&to_markup(&doc)).expect("reparse");
        assert_eq!(reread, doc);
    }
}
