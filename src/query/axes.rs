//! Path Axes
//!
//! - child: metadata first, then ordinary members
//! - descendant-or-self: pre-order, document order
//! - parent: at most one node
//! - attribute: pseudo-attributes `id`, `type`, `name`, then the
//!   attribute map

use super::parser::NameTest;
use crate::model::namespace::{expand_namespace, split_clark};
use crate::model::{Ancestor, HasAttributes, HasId, Lookup, Node, View};

/// Does `node` pass a name test; a prefix is resolved from `node`'s scope
pub fn matches_name(node: Node<'_>, test: &NameTest) -> bool {
    if !test.is_wildcard() && node.name() != test.local {
        return false;
    }
    match &test.prefix {
        Some(prefix) => {
            let uri = expand_namespace(node.arena(), node.node_id(), prefix);
            node.namespace() == Some(uri)
        }
        None => true,
    }
}

/// child axis filtered by a name test
pub fn children<'a>(node: Node<'a>, test: &NameTest) -> Vec<Node<'a>> {
    node.members()
        .filter(|child| matches_name(*child, test))
        .collect()
}

/// descendant-or-self axis - the node, then its subtree in pre-order
pub fn descendants_or_self(node: Node<'_>) -> Vec<Node<'_>> {
    let mut result = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        result.push(current);
        let members: Vec<Node<'_>> = current.members().collect();
        stack.extend(members.into_iter().rev());
    }
    result
}

/// parent axis - parent node (at most one)
pub fn parent(node: Node<'_>) -> Option<Node<'_>> {
    node.parent()
}

/// attribute axis - values named by the test
pub fn attributes<'a>(node: Node<'a>, test: &NameTest) -> Vec<&'a str> {
    if test.is_wildcard() {
        let namespace = test
            .prefix
            .as_deref()
            .map(|prefix| expand_namespace(node.arena(), node.node_id(), prefix));
        return node
            .attributes()
            .iter()
            .filter(|(key, _)| namespace.is_none() || split_clark(key).0 == namespace)
            .map(|(_, value)| value.as_str())
            .collect();
    }

    let pseudo = match (test.prefix.as_deref(), test.local.as_str()) {
        (None, "id") => Some(node.id()),
        (None, "type") => Some(node.type_()),
        (None, "name") => Some(match node {
            Node::MetaChild(child) => Some(child.name()),
            _ => None,
        }),
        _ => None,
    };
    let value = match pseudo {
        Some(value) => value,
        None => {
            let lookup = Lookup {
                namespace: test.prefix.as_deref(),
                inherit: false,
            };
            node.lookup_attribute(&test.local, &lookup)
        }
    };
    value.into_iter().collect()
}
