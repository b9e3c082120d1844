use crate::types::{Element, Node};

/// Decides whether a "before" node and an "after" node are the same logical node.
///
/// Policies must be pure. The diff engine additionally requires equal element names, so a
/// policy never has to check them.
pub trait MatchDecision {
    fn matches_element(&self, before: &Element, after: &Element) -> bool;

    fn matches(&self, before: &Node, after: &Node) -> bool {
        match (before, after) {
            (Node::Element(before), Node::Element(after)) => {
                before.name == after.name && self.matches_element(before, after)
            }
            (Node::Text { .. }, Node::Text { .. }) | (Node::Comment { .. }, Node::Comment { .. }) => {
                true
            }
            _ => false,
        }
    }
}

impl<F> MatchDecision for F
where
    F: Fn(&Element, &Element) -> bool,
{
    fn matches_element(&self, before: &Element, after: &Element) -> bool {
        self(before, after)
    }
}

/// Matches elements by name plus a list of identity attributes whose values must agree.
/// An attribute absent on both sides agrees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityAttributes {
    names: Vec<String>,
}

impl IdentityAttributes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl MatchDecision for IdentityAttributes {
    fn matches_element(&self, before: &Element, after: &Element) -> bool {
        before.name == after.name
            && self
                .names
                .iter()
                .all(|name| before.attr(name) == after.attr(name))
    }
}
