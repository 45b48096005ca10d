//! Reference engine
//!
//! Tiers and items point at each other through alignment expressions held
//! in reference attributes. This module reads those expressions, resolves
//! them to text, indexes them in both directions and walks the resulting
//! chains.

pub mod chain;
pub mod expression;
pub mod grammar;
pub mod index;
pub mod resolve;

pub use chain::{
    ancestors, descendants, Ancestors, Descendants, Follow, Hop, DEFAULT_ANCESTOR_ATTRIBUTES,
    DEFAULT_DESCENDANT_ATTRIBUTES,
};
pub use expression::{compress, expand, ids, selections, spans};
pub use grammar::{Expression, Range, Selection, Span};
pub use index::{referents, referrers, ReferenceIndex, References};
pub use resolve::{resolve, resolve_with, Delimiters};

use crate::error::{Error, Result};
use crate::model::{HasAttributes, InstanceRef, Node, View};

pub const ALIGNMENT: &str = "alignment";
pub const CONTENT: &str = "content";
pub const SEGMENTATION: &str = "segmentation";

/// Standard reference attributes
pub const REFERENCE_ATTRIBUTES: [&str; 3] = [ALIGNMENT, CONTENT, SEGMENTATION];

/// Instance holding `node`, plus the ids its `attr` names
fn targets<'a>(node: Node<'a>, attr: &str) -> Result<(InstanceRef<'a>, Vec<&'a str>)> {
    let corpus = node.arena();
    let instance = corpus
        .owning_instance(node.node_id())
        .map(|id| InstanceRef::new(corpus, id))
        .ok_or_else(|| {
            Error::structure(format!("{} is not in an instance", corpus.describe(node.node_id())))
        })?;
    let expr = node.get_attribute(attr).ok_or_else(|| {
        Error::lookup(format!(
            "{} has no {} attribute",
            corpus.describe(node.node_id()),
            attr
        ))
    })?;
    Ok((instance, ids(expr)))
}

fn lookup<'a>(instance: InstanceRef<'a>, id: &str) -> Result<Node<'a>> {
    instance.get_any(id).ok_or_else(|| {
        Error::lookup(format!(
            "no tier or item {:?} in {}",
            id,
            instance.arena().describe(instance.node_id())
        ))
    })
}

/// First tier or item named by `attr` on `node`
pub fn dereference<'a>(node: impl Into<Node<'a>>, attr: &str) -> Result<Node<'a>> {
    let node = node.into();
    let (instance, ids) = targets(node, attr)?;
    let first = ids.first().ok_or_else(|| {
        Error::lookup(format!(
            "{} {} names nothing",
            node.arena().describe(node.node_id()),
            attr
        ))
    })?;
    lookup(instance, first)
}

/// Every tier or item named by `attr` on `node`, in expression order
pub fn dereference_all<'a>(node: impl Into<Node<'a>>, attr: &str) -> Result<Vec<Node<'a>>> {
    let (instance, ids) = targets(node.into(), attr)?;
    ids.into_iter().map(|id| lookup(instance, id)).collect()
}
