//! Corpus arena
//!
//! Owns every node of the tree and performs all mutations. Mutations are
//! validated before anything changes, and any structural edit under an
//! instance rebuilds its flat item index and drops its reference index.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::node::{is_valid_id, NodeData, NodeId, NodeKind, ROOT};
use super::record::Record;
use super::views::{CorpusRef, Node};
use crate::error::{Error, Result};
use crate::reference::index::{InstanceIndex, ReferenceIndex};
use crate::reference::{ALIGNMENT, CONTENT, SEGMENTATION};

/// An IGT corpus and the arena holding all of its nodes
#[derive(Debug, Clone)]
pub struct Corpus {
    nodes: Vec<NodeData>,
    indices: HashMap<NodeId, InstanceIndex>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Corpus {
            nodes: vec![NodeData::new(NodeKind::Corpus)],
            indices: HashMap::new(),
        }
    }

    /// Build a corpus from parsed record data
    pub fn from_record(record: Record) -> Result<Self> {
        if record.kind != NodeKind::Corpus {
            return Err(Error::structure(format!(
                "cannot build a corpus from a {} record",
                record.kind.name()
            )));
        }
        let Record {
            id,
            type_,
            namespace,
            nsmap,
            attributes,
            children,
            metadata,
            ..
        } = record;
        if let Some(id) = &id {
            validate_id(id)?;
        }

        let mut corpus = Corpus::new();
        let root = &mut corpus.nodes[ROOT as usize];
        root.id = id;
        root.type_ = type_;
        root.namespace = namespace;
        root.nsmap = nsmap;
        root.attributes = attributes;

        for record in metadata.into_iter().chain(children) {
            let node = corpus.build(record)?;
            corpus.attach(ROOT, usize::MAX, node)?;
        }
        debug!(
            instances = corpus.data(ROOT).children.len(),
            nodes = corpus.nodes.len(),
            "built corpus"
        );
        Ok(corpus)
    }

    /// The corpus root
    #[inline]
    pub fn root(&self) -> CorpusRef<'_> {
        CorpusRef::new(self, ROOT)
    }

    /// Typed view of any node in the arena
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        if (id as usize) < self.nodes.len() {
            Some(Node::new(self, id))
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id as usize]
    }

    /// Build a detached subtree; attach it with `append` or `insert`
    pub fn create(&mut self, record: Record) -> Result<NodeId> {
        if record.kind == NodeKind::Corpus {
            return Err(Error::structure("a corpus cannot be nested"));
        }
        self.build(record)
    }

    fn build(&mut self, record: Record) -> Result<NodeId> {
        let Record {
            kind,
            id,
            type_,
            name,
            namespace,
            nsmap,
            attributes,
            text,
            children,
            metadata,
        } = record;

        if let Some(id) = &id {
            validate_id(id)?;
        }
        if kind == NodeKind::MetaChild {
            match &name {
                Some(name) if is_valid_id(name) => {}
                Some(name) => {
                    return Err(Error::validation(format!("invalid name {:?}", name)));
                }
                None => return Err(Error::validation("meta child requires a name")),
            }
            if let Some((_, id)) = attributes.iter().find(|(k, _)| k == "id") {
                validate_id(id)?;
            }
        }
        if kind.has_references() {
            check_reference_group(attributes.iter().map(|(k, _)| k.as_str()))?;
        }
        if !kind.has_metadata() && !metadata.is_empty() {
            return Err(Error::structure(format!(
                "{} cannot carry metadata",
                kind.name()
            )));
        }

        let node = self.nodes.len() as NodeId;
        self.nodes.push(NodeData {
            id,
            type_,
            name,
            namespace,
            nsmap,
            attributes,
            text,
            ..NodeData::new(kind)
        });
        if kind == NodeKind::Instance {
            self.indices.insert(node, InstanceIndex::default());
        }

        for record in metadata.into_iter().chain(children) {
            let child = self.build(record)?;
            self.attach(node, usize::MAX, child)?;
        }
        Ok(node)
    }

    /// Append a detached node to `parent`
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.attach(parent, usize::MAX, child)
    }

    /// Insert a detached node at `index`; an index past the end appends
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.attach(parent, index, child)
    }

    pub fn extend(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for child in children {
            self.attach(parent, usize::MAX, child)?;
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_node(parent)?;
        self.check_node(child)?;
        let parent_kind = self.data(parent).kind;
        let child_data = self.data(child);
        let child_kind = child_data.kind;

        let accepted = if child_kind == NodeKind::Metadata {
            parent_kind.has_metadata()
        } else {
            parent_kind.accepts(child_kind)
        };
        if !accepted {
            return Err(Error::structure(format!(
                "{} cannot contain {}",
                parent_kind.name(),
                child_kind.name()
            )));
        }
        if child_data.parent.is_some() || child == ROOT {
            return Err(Error::structure(format!(
                "{} is already attached",
                self.describe(child)
            )));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::structure("cannot attach a node inside itself"));
        }

        let child_id = if parent_kind.indexes_children() {
            child_data.id().map(str::to_string)
        } else {
            None
        };
        if let Some(id) = &child_id {
            if self.data(parent).members_for(child_kind).by_id(id).is_some() {
                return Err(Error::DuplicateId {
                    id: id.clone(),
                    scope: self.describe(parent),
                });
            }
        }
        if let Some(instance) = self.owning_instance(parent) {
            self.check_item_ids(instance, child)?;
        }

        self.nodes[child as usize].parent = Some(parent);
        self.nodes[parent as usize]
            .members_for_mut(child_kind)
            .insert(index, child, child_id.as_deref());
        self.touch(parent);
        Ok(())
    }

    /// Item ids entering an instance must be unique instance-wide
    fn check_item_ids(&self, instance: NodeId, child: NodeId) -> Result<()> {
        let data = self.data(child);
        let incoming: Vec<&str> = match data.kind {
            NodeKind::Item => data.id().into_iter().collect(),
            NodeKind::Tier => data
                .children
                .as_slice()
                .iter()
                .filter_map(|&item| self.data(item).id())
                .collect(),
            _ => return Ok(()),
        };
        let index = self.item_index(instance);
        let mut seen = HashSet::new();
        for id in incoming {
            if index.is_some_and(|items| items.contains_key(id)) || !seen.insert(id) {
                return Err(Error::DuplicateId {
                    id: id.to_string(),
                    scope: self.describe(instance),
                });
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_node(parent)?;
        self.check_node(child)?;
        let kind = self.data(child).kind;
        let position = self
            .data(parent)
            .members_for(kind)
            .position(child)
            .ok_or_else(|| {
                Error::lookup(format!(
                    "{} is not a member of {}",
                    self.describe(child),
                    self.describe(parent)
                ))
            })?;
        self.detach_at(parent, kind, position);
        Ok(())
    }

    /// Detach the child at `index` of `parent` and return it
    pub fn remove_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.check_node(parent)?;
        let child = self.data(parent).children.get(index).ok_or_else(|| {
            Error::lookup(format!(
                "{} has no member at index {}",
                self.describe(parent),
                index
            ))
        })?;
        let kind = self.data(child).kind;
        Ok(self.detach_at(parent, kind, index))
    }

    fn detach_at(&mut self, parent: NodeId, kind: NodeKind, index: usize) -> NodeId {
        let indexed = self.data(parent).kind.indexes_children();
        let child = match self.data(parent).members_for(kind).get(index) {
            Some(child) => child,
            None => return ROOT,
        };
        let id = if indexed {
            self.data(child).id().map(str::to_string)
        } else {
            None
        };
        self.nodes[parent as usize]
            .members_for_mut(kind)
            .remove_at(index, id.as_deref());
        self.nodes[child as usize].parent = None;
        self.touch(parent);
        child
    }

    /// Detach every child of `parent` (metadata is left in place)
    pub fn clear(&mut self, parent: NodeId) -> Result<()> {
        self.check_node(parent)?;
        let removed = self.nodes[parent as usize].children.clear();
        for child in removed {
            self.nodes[child as usize].parent = None;
        }
        self.touch(parent);
        Ok(())
    }

    /// Change a node's id, keeping every id index consistent
    pub fn set_id(&mut self, node: NodeId, id: Option<&str>) -> Result<()> {
        self.check_node(node)?;
        if let Some(id) = id {
            validate_id(id)?;
        }
        let data = self.data(node);
        let old = data.id().map(str::to_string);
        if old.as_deref() == id {
            return Ok(());
        }
        let kind = data.kind;

        if let (Some(parent), Some(new)) = (data.parent, id) {
            let parent_data = self.data(parent);
            if parent_data.kind.indexes_children() {
                if let Some(other) = parent_data.members_for(kind).by_id(new) {
                    if other != node {
                        return Err(Error::DuplicateId {
                            id: new.to_string(),
                            scope: self.describe(parent),
                        });
                    }
                }
            }
        }
        if let (NodeKind::Item, Some(new)) = (kind, id) {
            if let Some(instance) = self.owning_instance(node) {
                if let Some(&other) = self.item_index(instance).and_then(|items| items.get(new)) {
                    if other != node {
                        return Err(Error::DuplicateId {
                            id: new.to_string(),
                            scope: self.describe(instance),
                        });
                    }
                }
            }
        }

        if let Some(parent) = data.parent {
            if self.data(parent).kind.indexes_children() {
                self.nodes[parent as usize]
                    .members_for_mut(kind)
                    .reindex(node, old.as_deref(), id);
            }
        }
        let data = &mut self.nodes[node as usize];
        match (kind, id) {
            (NodeKind::MetaChild, Some(id)) => data.put_attribute("id", id),
            (NodeKind::MetaChild, None) => {
                data.take_attribute("id");
            }
            (_, id) => data.id = id.map(str::to_string),
        }
        self.touch(node);
        Ok(())
    }

    pub fn set_type(&mut self, node: NodeId, type_: Option<&str>) -> Result<()> {
        self.check_node(node)?;
        let data = &mut self.nodes[node as usize];
        match (data.kind, type_) {
            (NodeKind::MetaChild, Some(type_)) => data.put_attribute("type", type_),
            (NodeKind::MetaChild, None) => {
                data.take_attribute("type");
            }
            (_, type_) => data.type_ = type_.map(str::to_string),
        }
        Ok(())
    }

    /// Set an attribute. Reference attributes invalidate the instance's
    /// reference index.
    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        self.check_node(node)?;
        let data = self.data(node);
        if data.kind == NodeKind::MetaChild && key == "id" {
            return self.set_id(node, Some(value));
        }
        if data.kind.has_references() {
            let keys = data
                .attributes
                .iter()
                .map(|(k, _)| k.as_str())
                .filter(|k| *k != key)
                .chain(std::iter::once(key));
            check_reference_group(keys)?;
        }
        self.nodes[node as usize].put_attribute(key, value);
        self.touch(node);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<Option<String>> {
        self.check_node(node)?;
        if self.data(node).kind == NodeKind::MetaChild && key == "id" {
            let old = self.data(node).id().map(str::to_string);
            self.set_id(node, None)?;
            return Ok(old);
        }
        let removed = self.nodes[node as usize].take_attribute(key);
        self.touch(node);
        Ok(removed)
    }

    /// Set literal text on an item, meta or meta child
    pub fn set_text(&mut self, node: NodeId, text: Option<&str>) -> Result<()> {
        self.check_node(node)?;
        let data = &mut self.nodes[node as usize];
        match data.kind {
            NodeKind::Item | NodeKind::Meta | NodeKind::MetaChild => {
                data.text = text.map(str::to_string);
                Ok(())
            }
            kind => Err(Error::structure(format!("{} cannot hold text", kind.name()))),
        }
    }

    /// Rebuild the flat item index and the reference index of an instance
    pub fn refresh_indices(&mut self, instance: NodeId) -> Result<()> {
        self.check_node(instance)?;
        if self.data(instance).kind != NodeKind::Instance {
            return Err(Error::structure(format!(
                "{} is not an instance",
                self.describe(instance)
            )));
        }
        self.rebuild_items(instance);
        if let Some(index) = self.reference_index(instance) {
            debug!(
                instance = self.data(instance).id().unwrap_or("-"),
                referenced = index.referenced_len(),
                "refreshed reference index"
            );
        }
        Ok(())
    }

    /// Reorder tiers so each follows the tier it refers to
    ///
    /// Tiers are keyed by their chain of prioritized referents, highest
    /// ancestor first; ties keep document order.
    pub fn sort_tiers(&mut self, instance: NodeId, attrs: &[&str]) -> Result<()> {
        self.check_node(instance)?;
        let data = self.data(instance);
        if data.kind != NodeKind::Instance {
            return Err(Error::structure(format!(
                "{} is not an instance",
                self.describe(instance)
            )));
        }
        let tiers = data.children.as_slice().to_vec();
        let position: HashMap<NodeId, usize> =
            tiers.iter().enumerate().map(|(i, &t)| (t, i + 1)).collect();

        // tier -> (referenced tier, attribute priority)
        let mut prioritized: HashMap<NodeId, (NodeId, usize)> = HashMap::new();
        for &tier in &tiers {
            let tier_data = self.data(tier);
            let found = attrs
                .iter()
                .enumerate()
                .find_map(|(i, attr)| tier_data.attribute(attr).map(|value| (value, i)));
            if let Some((value, i)) = found {
                if let Some(target) = data.children.by_id(value.trim()) {
                    prioritized.insert(tier, (target, i));
                }
            }
        }

        let mut keys: HashMap<NodeId, Vec<(usize, usize)>> = HashMap::new();
        for &tier in &tiers {
            let mut key = vec![(position[&tier], 0)];
            let mut seen = HashSet::from([tier]);
            let mut next = prioritized.get(&tier);
            while let Some(&(target, priority)) = next {
                key.push((position[&target], priority));
                if !seen.insert(target) {
                    break;
                }
                next = prioritized.get(&target);
            }
            key.reverse();
            keys.insert(tier, key);
        }

        let mut order = tiers;
        order.sort_by(|a, b| keys[a].cmp(&keys[b]));
        self.nodes[instance as usize].children.replace_order(order);
        self.touch(instance);
        Ok(())
    }

    /// Flat id -> item index of an instance
    pub(crate) fn item_index(&self, instance: NodeId) -> Option<&HashMap<String, NodeId>> {
        self.indices.get(&instance).map(|index| &index.items)
    }

    /// Reference index of an instance, built on first use
    pub(crate) fn reference_index(&self, instance: NodeId) -> Option<&ReferenceIndex> {
        self.indices
            .get(&instance)
            .map(|index| index.references.get_or_init(|| ReferenceIndex::build(self, instance)))
    }

    /// Nearest instance at or above `node`
    pub(crate) fn owning_instance(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let data = self.data(id);
            if data.kind == NodeKind::Instance {
                return Some(id);
            }
            current = data.parent;
        }
        None
    }

    /// Invalidate the caches of the instance at or above `node`
    fn touch(&mut self, node: NodeId) {
        if let Some(instance) = self.owning_instance(node) {
            trace!(instance, "invalidating instance indices");
            self.rebuild_items(instance);
        }
    }

    fn rebuild_items(&mut self, instance: NodeId) {
        let mut items = HashMap::new();
        for &tier in self.data(instance).children.as_slice() {
            for &item in self.data(tier).children.as_slice() {
                if let Some(id) = self.data(item).id() {
                    items.entry(id.to_string()).or_insert(item);
                }
            }
        }
        self.indices.insert(
            instance,
            InstanceIndex {
                items,
                ..InstanceIndex::default()
            },
        );
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.data(id).parent;
        }
        false
    }

    fn check_node(&self, id: NodeId) -> Result<()> {
        if (id as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::lookup(format!("no node with handle {}", id)))
        }
    }

    /// Short human-readable label such as `tier w`
    pub(crate) fn describe(&self, node: NodeId) -> String {
        let data = self.data(node);
        let name = match data.kind {
            NodeKind::MetaChild => data.name.as_deref().unwrap_or("metachild"),
            kind => kind.name(),
        };
        match data.id() {
            Some(id) => format!("{} {}", name, id),
            None => name.to_string(),
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(Error::validation(format!("invalid id {:?}", id)))
    }
}

/// `segmentation` may not be combined with `alignment` or `content`
fn check_reference_group<'k>(keys: impl Iterator<Item = &'k str>) -> Result<()> {
    let mut segmentation = false;
    let mut aligned = false;
    for key in keys {
        match key {
            SEGMENTATION => segmentation = true,
            ALIGNMENT | CONTENT => aligned = true,
            _ => {}
        }
    }
    if segmentation && aligned {
        Err(Error::validation(
            "segmentation cannot be combined with alignment or content",
        ))
    } else {
        Ok(())
    }
}
