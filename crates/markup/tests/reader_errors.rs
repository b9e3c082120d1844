use markup::{
    DiffError, Document, Element, IdentityAttributes, Node, ParseError, diff, diff_markup,
    parse_document,
};

fn parse_err(input: &str) -> ParseError {
    parse_document(input).expect_err("input must be rejected")
}

#[test]
fn unresolved_entity_in_attribute_value() {
    let err = parse_err("<a v=\"x &ext; y\"/>");
    assert!(
        matches!(err, ParseError::UnresolvedEntity { ref name, .. } if name == "ext"),
        "{err:?}"
    );
}

#[test]
fn unresolved_entity_in_text() {
    let err = parse_err("<a>&nbsp;</a>");
    assert!(matches!(err, ParseError::UnresolvedEntity { ref name, .. } if name == "nbsp"));
}

#[test]
fn cdata_sections_are_rejected() {
    let err = parse_err("<a><![CDATA[x < y]]></a>");
    assert_eq!(err, ParseError::UnsupportedCData { position: 3 });
}

#[test]
fn mismatched_and_unclosed_tags() {
    assert!(matches!(
        parse_err("<a><b></a>"),
        ParseError::MismatchedEndTag { ref expected, ref found, .. } if expected == "b" && found == "a"
    ));
    assert!(matches!(
        parse_err("<a><b/>"),
        ParseError::UnclosedElement { ref name } if name == "a"
    ));
    assert!(matches!(parse_err("</a>"), ParseError::UnexpectedEndTag { .. }));
}

#[test]
fn declarations_and_instructions() {
    assert!(parse_document("<?xml version=\"1.0\"?>\n<!DOCTYPE r>\n<r/>").is_ok());
    assert!(matches!(
        parse_err("<r><?pi data?></r>"),
        ParseError::UnsupportedProcessingInstruction { .. }
    ));
    assert!(matches!(
        parse_err("<!DOCTYPE r [<!ENTITY e \"v\">]><r/>"),
        ParseError::UnsupportedDoctype { .. }
    ));
}

#[test]
fn diff_markup_surfaces_reader_errors() {
    let err = diff_markup(&IdentityAttributes::default(), "<a/>", "<a v=\"&ext;\"/>")
        .expect_err("after is unreadable");
    assert!(matches!(err, DiffError::Parse(ParseError::UnresolvedEntity { .. })));
    assert!(err.to_string().contains("&ext;"));
}

#[test]
fn hand_built_trees_are_validated() {
    let policy = IdentityAttributes::default();
    let ok = Document::new().with_child(Element::new("a"));

    let mut duplicated = Element::new("a").with_attr("x", "1");
    duplicated.attributes.push(("x".to_string(), "2".to_string()));
    let bad = Document::new().with_child(duplicated);
    assert_eq!(
        diff(&policy, &ok, &bad),
        Err(DiffError::DuplicateAttribute {
            name: "x".to_string(),
            path: "/a[1]".to_string(),
        })
    );

    let nameless = Document::new().with_child(Element::new("a").with_child(Element::new("")));
    assert!(matches!(
        diff(&policy, &nameless, &ok),
        Err(DiffError::EmptyElementName { .. })
    ));

    let loose = Document::new()
        .with_child(Element::new("a"))
        .with_child(Node::text("stray"));
    assert_eq!(
        diff(&policy, &ok, &loose),
        Err(DiffError::TextAtDocumentLevel {
            path: "/text()[1]".to_string(),
        })
    );
}
