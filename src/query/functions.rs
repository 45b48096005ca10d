//! Path Functions
//!
//! - text(): literal text of a node
//! - value(): resolved value of an item, text of anything else
//! - referent(attr?): tiers and items the node's attribute names
//! - referrer(attr?): tiers and items naming the node through the attribute
//!
//! Without an attribute, referent() and referrer() use the first attribute
//! in `REFERENCE_PRIORITY` that yields anything.

use super::parser::Function;
use super::value::Match;
use crate::error::{Error, Result};
use crate::model::{HasAttributes, HasId, InstanceRef, Node, View};
use crate::reference::{ids, referrers, ALIGNMENT, CONTENT, SEGMENTATION};

/// Attribute order tried by unqualified referent() and referrer()
pub const REFERENCE_PRIORITY: [&str; 3] = [ALIGNMENT, SEGMENTATION, CONTENT];

/// Evaluate a function call
pub fn call<'a>(function: &Function, node: Node<'a>) -> Result<Vec<Match<'a>>> {
    match function {
        Function::Text => Ok(node.text().map(Match::from).into_iter().collect()),
        Function::Value => fn_value(node),
        Function::Referent(attr) => fn_referent(node, attr.as_deref()),
        Function::Referrer(attr) => fn_referrer(node, attr.as_deref()),
    }
}

fn fn_value(node: Node<'_>) -> Result<Vec<Match<'_>>> {
    let value = match node {
        Node::Item(item) => item.value()?.map(Match::from),
        other => other.text().map(Match::from),
    };
    Ok(value.into_iter().collect())
}

/// Instance a reference query runs in; tiers and items only
fn instance_of(node: Node<'_>) -> Option<InstanceRef<'_>> {
    match node {
        Node::Tier(tier) => tier.instance(),
        Node::Item(item) => item.instance(),
        _ => None,
    }
}

fn attributes_to_try(attr: Option<&str>) -> Vec<&str> {
    match attr {
        Some(attr) => vec![attr],
        None => REFERENCE_PRIORITY.to_vec(),
    }
}

fn lookup<'a>(instance: InstanceRef<'a>, id: &str) -> Result<Match<'a>> {
    instance.get_any(id).map(Match::Node).ok_or_else(|| {
        Error::lookup(format!(
            "no tier or item {:?} in {}",
            id,
            instance.arena().describe(instance.node_id())
        ))
    })
}

fn fn_referent<'a>(node: Node<'a>, attr: Option<&str>) -> Result<Vec<Match<'a>>> {
    let Some(instance) = instance_of(node) else {
        return Ok(Vec::new());
    };
    for attr in attributes_to_try(attr) {
        let targets = node.get_attribute(attr).map(ids).unwrap_or_default();
        if !targets.is_empty() {
            return targets.into_iter().map(|id| lookup(instance, id)).collect();
        }
    }
    Ok(Vec::new())
}

fn fn_referrer<'a>(node: Node<'a>, attr: Option<&str>) -> Result<Vec<Match<'a>>> {
    let (Some(instance), Some(id)) = (instance_of(node), node.id()) else {
        return Ok(Vec::new());
    };
    let attrs = attributes_to_try(attr);
    let sources = referrers(instance, id, Some(attrs.as_slice()));
    for attr in attrs {
        match sources.get(attr) {
            Some(found) if !found.is_empty() => {
                return found.iter().map(|id| lookup(instance, id)).collect();
            }
            _ => {}
        }
    }
    Ok(Vec::new())
}
