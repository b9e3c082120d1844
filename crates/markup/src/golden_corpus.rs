use crate::matching::IdentityAttributes;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FixtureKind {
    Attribute,
    Text,
    Comment,
    Insert,
    Remove,
    Reorder,
    Reset,
    Whitespace,
    Unchanged,
}

impl FixtureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Reorder => "reorder",
            Self::Reset => "reset",
            Self::Whitespace => "whitespace",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A before/after pair with the instruction tags its diff is expected to contain, in
/// depth-first replay order.
#[derive(Clone, Copy, Debug)]
pub struct DiffFixture {
    pub name: &'static str,
    pub before: &'static str,
    pub after: &'static str,
    /// Identity attributes for the match policy; empty means match by name only.
    pub identity: &'static [&'static str],
    pub covers: &'static str,
    pub expected: &'static [&'static str],
    pub kind: FixtureKind,
}

impl DiffFixture {
    pub fn policy(&self) -> IdentityAttributes {
        IdentityAttributes::new(self.identity.iter().copied())
    }
}

const DIFF_CORPUS_V1: &[DiffFixture] = &[
    DiffFixture {
        name: "attr_set_and_remove",
        before: "<root a=\"1\" b=\"2\"/>",
        after: "<root b=\"3\" c=\"4\"/>",
        identity: &[],
        covers: "Removed, changed, and added attributes on one element.",
        expected: &["remove-attribute", "set-attribute", "set-attribute"],
        kind: FixtureKind::Attribute,
    },
    DiffFixture {
        name: "attr_removal_only_on_root",
        before: "<root keep=\"1\" drop=\"2\"><child/></root>",
        after: "<root keep=\"1\"><child/></root>",
        identity: &[],
        covers: "A lone attribute removal on the root element.",
        expected: &["remove-attribute"],
        kind: FixtureKind::Attribute,
    },
    DiffFixture {
        name: "attr_namespaced_names",
        before: "<svg:g xlink:href=\"a\"/>",
        after: "<svg:g xlink:href=\"b\"/>",
        identity: &[],
        covers: "Prefixed element and attribute names are plain names.",
        expected: &["set-attribute"],
        kind: FixtureKind::Attribute,
    },
    DiffFixture {
        name: "text_replace",
        before: "<p>hello</p>",
        after: "<p>goodbye</p>",
        identity: &[],
        covers: "Text content change.",
        expected: &["replace-text"],
        kind: FixtureKind::Text,
    },
    DiffFixture {
        name: "text_utf8",
        before: "<p>é</p>",
        after: "<p>ï ö</p>",
        identity: &[],
        covers: "Non-ASCII text content.",
        expected: &["replace-text"],
        kind: FixtureKind::Text,
    },
    DiffFixture {
        name: "text_entities",
        before: "<p a=\"&lt;\">Tom &amp; Jerry</p>",
        after: "<p a=\"&gt;&#10;\">Tom &amp; Spike</p>",
        identity: &[],
        covers: "Decoded entities in text and attribute values survive serialization.",
        expected: &["set-attribute", "replace-text"],
        kind: FixtureKind::Text,
    },
    DiffFixture {
        name: "text_mixed_content",
        before: "<p>Hello <b>world</b>!</p>",
        after: "<p>Hi <b>there</b>!</p>",
        identity: &[],
        covers: "Text around and inside an inline element.",
        expected: &["replace-text", "replace-text"],
        kind: FixtureKind::Text,
    },
    DiffFixture {
        name: "text_nested_deep",
        before: "<a><b><c><d x=\"1\">t</d></c></b></a>",
        after: "<a><b><c><d x=\"2\">u</d></c></b></a>",
        identity: &[],
        covers: "Changes deep in the tree keep every ancestor in place.",
        expected: &["set-attribute", "replace-text"],
        kind: FixtureKind::Text,
    },
    DiffFixture {
        name: "comment_replace",
        before: "<r><a/><!--old--></r>",
        after: "<r><a/><!--new--></r>",
        identity: &[],
        covers: "Comment following an element.",
        expected: &["replace-comment"],
        kind: FixtureKind::Comment,
    },
    DiffFixture {
        name: "comment_between_elements",
        before: "<r><a/><!--x--><b/></r>",
        after: "<r><a/><!--y--><b/></r>",
        identity: &[],
        covers: "Comment paired inside the gap between two anchors.",
        expected: &["replace-comment"],
        kind: FixtureKind::Comment,
    },
    DiffFixture {
        name: "comment_document_level",
        before: "<!--old--><r/>",
        after: "<r/><!--new-->",
        identity: &[],
        covers: "Comments around the root element move by remove and insert.",
        expected: &["remove", "insert"],
        kind: FixtureKind::Comment,
    },
    DiffFixture {
        name: "insert_prepend",
        before: "<l><i id=\"c\"/></l>",
        after: "<l><i id=\"a\"/><i id=\"b\"/><i id=\"c\"/></l>",
        identity: &["id"],
        covers: "Several inserts before the first child.",
        expected: &["insert", "insert"],
        kind: FixtureKind::Insert,
    },
    DiffFixture {
        name: "insert_append",
        before: "<l><i id=\"a\"/></l>",
        after: "<l><i id=\"a\"/><i id=\"b\"/><i id=\"c\"/></l>",
        identity: &["id"],
        covers: "Several inserts after the last child.",
        expected: &["insert", "insert"],
        kind: FixtureKind::Insert,
    },
    DiffFixture {
        name: "insert_between",
        before: "<l><i id=\"a\"/><i id=\"d\"/></l>",
        after: "<l><i id=\"a\"/><i id=\"b\"/><i id=\"c\"/><i id=\"d\"/></l>",
        identity: &["id"],
        covers: "Several inserts between two kept siblings.",
        expected: &["insert", "insert"],
        kind: FixtureKind::Insert,
    },
    DiffFixture {
        name: "insert_payload_escaping",
        before: "<r/>",
        after: "<r><a t=\"line1&#10;line2 &quot;q&quot;\"/></r>",
        identity: &[],
        covers: "Inserted subtree with attribute values that need escaping.",
        expected: &["insert"],
        kind: FixtureKind::Insert,
    },
    DiffFixture {
        name: "remove_middle",
        before: "<l><i id=\"a\"/><i id=\"b\"/><i id=\"c\"/></l>",
        after: "<l><i id=\"a\"/><i id=\"c\"/></l>",
        identity: &["id"],
        covers: "Removal between kept siblings.",
        expected: &["remove"],
        kind: FixtureKind::Remove,
    },
    DiffFixture {
        name: "remove_all_children",
        before: "<r><a/><!--c--></r>",
        after: "<r/>",
        identity: &[],
        covers: "Consecutive removals share one index.",
        expected: &["remove", "remove"],
        kind: FixtureKind::Remove,
    },
    DiffFixture {
        name: "reorder_siblings",
        before: "<r><a/><b/></r>",
        after: "<r><b/><a/></r>",
        identity: &[],
        covers: "Swapped siblings become an insert and a remove.",
        expected: &["insert", "remove"],
        kind: FixtureKind::Reorder,
    },
    DiffFixture {
        name: "reorder_by_identity",
        before: "<l><i id=\"1\">a</i><i id=\"2\">b</i></l>",
        after: "<l><i id=\"2\">b</i><i id=\"1\">a</i></l>",
        identity: &["id"],
        covers: "Identity attributes keep the first item anchored.",
        expected: &["insert", "remove"],
        kind: FixtureKind::Reorder,
    },
    DiffFixture {
        name: "reset_on_text_reorder",
        before: "<r><p>one<b/></p></r>",
        after: "<r><p><b/>two</p></r>",
        identity: &[],
        covers: "Unmatchable text replaces the enclosing element.",
        expected: &["remove", "insert"],
        kind: FixtureKind::Reset,
    },
    DiffFixture {
        name: "reset_root_gains_text",
        before: "<r/>",
        after: "<r><a/>text</r>",
        identity: &[],
        covers: "New text under the root replaces the root.",
        expected: &["remove", "insert"],
        kind: FixtureKind::Reset,
    },
    DiffFixture {
        name: "reset_root_renamed",
        before: "<a/>",
        after: "<b/>",
        identity: &[],
        covers: "Element names are not patchable.",
        expected: &["remove", "insert"],
        kind: FixtureKind::Reset,
    },
    DiffFixture {
        name: "whitespace_pretty_printed",
        before: "<r>\n  <a/>\n</r>",
        after: "<r>\n  <a x=\"1\"/>\n  <b/>\n</r>",
        identity: &[],
        covers: "Indentation text is paired and an element is appended.",
        expected: &["set-attribute", "replace-text", "insert"],
        kind: FixtureKind::Whitespace,
    },
    DiffFixture {
        name: "unchanged_document",
        before: "<!--lead--><r><a x=\"1\">t</a><!--c--></r>",
        after: "<!--lead--><r><a x=\"1\">t</a><!--c--></r>",
        identity: &[],
        covers: "Identical documents diff to nothing.",
        expected: &[],
        kind: FixtureKind::Unchanged,
    },
];

pub fn fixtures() -> &'static [DiffFixture] {
    DIFF_CORPUS_V1
}
