//! Query Results
//!
//! A path yields nodes, or strings from attribute and function steps.

use std::borrow::Cow;

use crate::model::Node;

/// One result of a path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<'a> {
    Node(Node<'a>),
    /// Attribute value or function result
    Scalar(Cow<'a, str>),
}

impl<'a> Match<'a> {
    pub fn as_node(&self) -> Option<Node<'a>> {
        match self {
            Match::Node(node) => Some(*node),
            Match::Scalar(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Match::Node(_) => None,
            Match::Scalar(value) => Some(value.as_ref()),
        }
    }

    /// String compared by predicates: a scalar itself, or a node's text
    pub fn string_value(&self) -> Option<&str> {
        match self {
            Match::Node(node) => node.text(),
            Match::Scalar(value) => Some(value.as_ref()),
        }
    }
}

impl<'a> From<Node<'a>> for Match<'a> {
    fn from(node: Node<'a>) -> Self {
        Match::Node(node)
    }
}

impl<'a> From<&'a str> for Match<'a> {
    fn from(value: &'a str) -> Self {
        Match::Scalar(Cow::Borrowed(value))
    }
}

impl From<String> for Match<'_> {
    fn from(value: String) -> Self {
        Match::Scalar(Cow::Owned(value))
    }
}
