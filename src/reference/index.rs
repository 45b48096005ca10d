//! Referent and referrer indices
//!
//! Each instance keeps a flat id -> item index and, built on first use, a
//! forward index (id -> attribute -> referenced ids) with its exact
//! inverse. Both are thrown away together on any mutation under the
//! instance.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::OnceCell;
use tracing::debug;

use super::expression::ids;
use super::REFERENCE_ATTRIBUTES;
use crate::error::{Error, Result};
use crate::model::{Corpus, HasAttributes, HasId, InstanceRef, Node, NodeId, View};

/// Attribute name -> ids
pub type References = BTreeMap<String, Vec<String>>;

/// Derived per-instance caches
#[derive(Debug, Clone, Default)]
pub(crate) struct InstanceIndex {
    pub items: HashMap<String, NodeId>,
    pub references: OnceCell<ReferenceIndex>,
}

/// Forward and reverse reference index of one instance
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    referents: HashMap<String, References>,
    referrers: HashMap<String, References>,
}

impl ReferenceIndex {
    /// Scan every id-bearing tier, then every item, of `instance`
    pub(crate) fn build(corpus: &Corpus, instance: NodeId) -> Self {
        let instance = InstanceRef::new(corpus, instance);
        let objects = instance
            .tiers()
            .map(Node::Tier)
            .chain(instance.all_items().map(Node::Item));

        let mut index = ReferenceIndex::default();
        for object in objects {
            let Some(id) = object.id() else { continue };
            if index.referents.contains_key(id) {
                continue;
            }
            let mut forward = References::new();
            for attr in REFERENCE_ATTRIBUTES {
                let targets: Vec<String> = object
                    .get_attribute(attr)
                    .map(|expr| ids(expr).into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                for target in &targets {
                    let sources = index
                        .referrers
                        .entry(target.clone())
                        .or_default()
                        .entry(attr.to_string())
                        .or_default();
                    if sources.last().map(String::as_str) != Some(id) {
                        sources.push(id.to_string());
                    }
                }
                forward.insert(attr.to_string(), targets);
            }
            index.referents.insert(id.to_string(), forward);
        }
        debug!(
            instance = instance.id().unwrap_or("-"),
            objects = index.referents.len(),
            referenced = index.referrers.len(),
            "built reference index"
        );
        index
    }

    #[inline]
    pub fn referents(&self, id: &str) -> Option<&References> {
        self.referents.get(id)
    }

    #[inline]
    pub fn referrers(&self, id: &str) -> Option<&References> {
        self.referrers.get(id)
    }

    pub(crate) fn referenced_len(&self) -> usize {
        self.referrers.len()
    }
}

fn is_standard(attr: &str) -> bool {
    REFERENCE_ATTRIBUTES.contains(&attr)
}

/// Ids named by each requested attribute of the object `id`
///
/// Without `attrs`, every standard reference attribute is reported. Each
/// requested attribute is present in the result, possibly empty.
pub fn referents(instance: InstanceRef<'_>, id: &str, attrs: Option<&[&str]>) -> Result<References> {
    let object = instance.get_any(id).ok_or_else(|| {
        Error::lookup(format!(
            "no tier or item {:?} in {}",
            id,
            instance.arena().describe(instance.node_id())
        ))
    })?;
    let attrs = attrs.unwrap_or(&REFERENCE_ATTRIBUTES);
    let cached = instance
        .arena()
        .reference_index(instance.node_id())
        .and_then(|index| index.referents(id));

    let mut result = References::new();
    for &attr in attrs {
        let targets = match cached.and_then(|forward| forward.get(attr)) {
            Some(targets) if is_standard(attr) => targets.clone(),
            _ => object
                .get_attribute(attr)
                .map(|expr| ids(expr).into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        result.insert(attr.to_string(), targets);
    }
    Ok(result)
}

/// Ids of the tiers and items whose requested attributes name `id`
///
/// Standard attributes come from the cached reverse index; any other
/// attribute is computed by scanning the instance.
pub fn referrers(instance: InstanceRef<'_>, id: &str, attrs: Option<&[&str]>) -> References {
    let attrs = attrs.unwrap_or(&REFERENCE_ATTRIBUTES);
    let cached = instance
        .arena()
        .reference_index(instance.node_id())
        .and_then(|index| index.referrers(id));

    let mut result = References::new();
    for &attr in attrs {
        let sources = if is_standard(attr) {
            cached
                .and_then(|reverse| reverse.get(attr))
                .cloned()
                .unwrap_or_default()
        } else {
            scan_referrers(instance, id, attr)
        };
        result.insert(attr.to_string(), sources);
    }
    result
}

fn scan_referrers(instance: InstanceRef<'_>, id: &str, attr: &str) -> Vec<String> {
    instance
        .tiers()
        .map(Node::Tier)
        .chain(instance.all_items().map(Node::Item))
        .filter(|object| {
            object
                .get_attribute(attr)
                .is_some_and(|expr| ids(expr).contains(&id))
        })
        .filter_map(|object| object.id().map(str::to_string))
        .collect()
}

impl<'a> InstanceRef<'a> {
    /// See [`referents`]
    pub fn referents(&self, id: &str, attrs: Option<&[&str]>) -> Result<References> {
        referents(*self, id, attrs)
    }

    /// See [`referrers`]
    pub fn referrers(&self, id: &str, attrs: Option<&[&str]>) -> References {
        referrers(*self, id, attrs)
    }
}
