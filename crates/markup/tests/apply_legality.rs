use markup::dom_snapshot::{DomSnapshotOptions, assert_dom_eq};
use markup::{
    ApplyError, Document, IdentityAttributes, InstructionDocument, NodeKind, Operation, apply,
    diff_markup, parse_document, serialize,
};

fn doc(input: &str) -> Document {
    parse_document(input).expect("document parses")
}

fn patch(body: &str) -> InstructionDocument {
    InstructionDocument::parse(&format!("<patch version=\"1\">{body}</patch>")).expect("patch parses")
}

/// Applies `body` and asserts it fails without touching the document.
fn rejected(input: &str, body: &str) -> ApplyError {
    let mut target = doc(input);
    let before = target.clone();
    let err = apply(&patch(body), &mut target).expect_err("patch must be rejected");
    assert_eq!(target, before, "rejected patch mutated the document");
    err
}

#[test]
fn legality_table() {
    const ELEMENT: NodeKind = NodeKind::Element;
    let kinds = [
        NodeKind::Document,
        ELEMENT,
        NodeKind::Attribute,
        NodeKind::Text,
        NodeKind::Comment,
    ];
    let allowed: &[(Operation, &[NodeKind])] = &[
        (Operation::AttributeSet, &[ELEMENT]),
        (Operation::AttributeRemove, &[ELEMENT]),
        (Operation::TextReplace, &[NodeKind::Text]),
        (Operation::CommentReplace, &[NodeKind::Comment]),
        (Operation::ElementInsert, &[NodeKind::Document, ELEMENT]),
        (Operation::ElementRemove, &[ELEMENT, NodeKind::Comment]),
    ];
    for &(operation, targets) in allowed {
        for kind in kinds {
            assert_eq!(
                operation.allows(kind),
                targets.contains(&kind),
                "{operation} against {kind}"
            );
        }
    }
}

#[test]
fn remove_cannot_target_an_attribute() {
    let err = rejected(
        "<a x=\"1\"/>",
        "<node index=\"0\"><remove attribute=\"x\" path=\"/a[1]/@x\"/></node>",
    );
    assert_eq!(
        err,
        ApplyError::IllegalTarget {
            operation: Operation::ElementRemove,
            target: NodeKind::Attribute,
            path: "/a[1]/@x".to_string(),
        }
    );
}

#[test]
fn remove_cannot_target_text() {
    let err = rejected(
        "<a>keep me</a>",
        "<node index=\"0\"><remove index=\"0\" path=\"/a[1]/text()[1]\"/></node>",
    );
    assert_eq!(
        err,
        ApplyError::IllegalTarget {
            operation: Operation::ElementRemove,
            target: NodeKind::Text,
            path: "/a[1]/text()[1]".to_string(),
        }
    );
}

#[test]
fn insert_cannot_carry_bare_text() {
    let err = rejected("<a/>", "<node index=\"0\"><insert index=\"0\">loose</insert></node>");
    assert!(matches!(
        err,
        ApplyError::IllegalPayload {
            operation: Operation::ElementInsert,
            found: NodeKind::Text,
            ..
        }
    ));
}

#[test]
fn content_replacement_checks_the_node_kind() {
    let err = rejected(
        "<a>t<!--c--></a>",
        "<node index=\"0\"><replace-text index=\"1\">x</replace-text></node>",
    );
    assert!(matches!(
        err,
        ApplyError::IllegalTarget {
            operation: Operation::TextReplace,
            target: NodeKind::Comment,
            ..
        }
    ));

    let err = rejected(
        "<a>t<!--c--></a>",
        "<node index=\"0\"><replace-comment index=\"0\">x</replace-comment></node>",
    );
    assert!(matches!(
        err,
        ApplyError::IllegalTarget {
            operation: Operation::CommentReplace,
            target: NodeKind::Text,
            ..
        }
    ));
}

#[test]
fn attribute_operations_cannot_target_text() {
    let err = rejected(
        "<a>t</a>",
        "<node index=\"0\"><node index=\"0\"><set-attribute attribute=\"k\" value=\"v\"/></node></node>",
    );
    assert!(matches!(
        err,
        ApplyError::IllegalTarget {
            operation: Operation::AttributeSet,
            target: NodeKind::Text,
            ..
        }
    ));
}

#[test]
fn multiple_inserts_land_in_index_order() {
    let three = |start: usize| {
        format!(
            "<node index=\"0\">\
               <insert index=\"{}\"><i1/></insert>\
               <insert index=\"{}\"><i2/></insert>\
               <insert index=\"{}\"><i3/></insert>\
             </node>",
            start,
            start + 1,
            start + 2
        )
    };
    let cases = [
        ("<r><x/><y/></r>", 0, "<r><i1/><i2/><i3/><x/><y/></r>"),
        ("<r><x/><y/></r>", 2, "<r><x/><y/><i1/><i2/><i3/></r>"),
        ("<r><x/><y/></r>", 1, "<r><x/><i1/><i2/><i3/><y/></r>"),
    ];
    for (input, start, expected) in cases {
        let mut target = doc(input);
        apply(&patch(&three(start)), &mut target).expect("apply");
        assert_eq!(target, doc(expected), "inserting at {start}");
    }
}

#[test]
fn diffed_multi_inserts_use_increasing_indices() {
    let tree = diff_markup(
        &IdentityAttributes::default(),
        "<r><x/><y/></r>",
        "<r><x/><i1/><i2/><i3/><y/></r>",
    )
    .expect("diff");
    let text = serialize(&tree).to_markup();
    for (index, name) in [(1, "i1"), (2, "i2"), (3, "i3")] {
        let entry = format!("<insert index=\"{index}\" path=\"/r[1]/{name}[1]\"><{name}/></insert>");
        assert!(text.contains(&entry), "missing {entry} in\n{text}");
    }
}

#[test]
fn root_attribute_removal_changes_nothing_else() {
    let before = "<root keep=\"1\" drop=\"2\"><child a=\"b\">text</child><!--c--></root>";
    let after = "<root keep=\"1\"><child a=\"b\">text</child><!--c--></root>";
    let tree = diff_markup(&IdentityAttributes::default(), before, after).expect("diff");
    assert_eq!(tree.instruction_count(), 1);

    let mut target = doc(before);
    apply(&serialize(&tree), &mut target).expect("apply");
    assert_dom_eq(&doc(after), &target, DomSnapshotOptions::exact());
}

#[test]
fn comments_can_be_inserted_at_document_level() {
    let mut target = doc("<r/>");
    apply(&patch("<insert index=\"0\"><!--lead--></insert>"), &mut target).expect("apply");
    assert_eq!(target, doc("<!--lead--><r/>"));
}

#[test]
fn callers_clone_for_all_or_nothing() {
    let original = doc("<a x=\"1\"/>");
    let mut working = original.clone();
    let err = apply(
        &patch(
            "<node index=\"0\">\
               <set-attribute attribute=\"x\" value=\"2\"/>\
               <remove-attribute attribute=\"missing\"/>\
             </node>",
        ),
        &mut working,
    )
    .expect_err("missing attribute");
    assert!(matches!(err, ApplyError::MissingAttribute { ref name, .. } if name == "missing"));
    assert_eq!(working, doc("<a x=\"2\"/>"));
    assert_eq!(original, doc("<a x=\"1\"/>"));
}
