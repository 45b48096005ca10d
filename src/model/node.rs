//! Node representation
//!
//! Uses NodeId (u32) handles into the corpus arena. Parents are stored as
//! handles, never as references, so the tree has a single owner.

use std::collections::HashMap;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Arena slot of the corpus root
pub const ROOT: NodeId = 0;

/// Type of IGT node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Corpus root
    Corpus,
    /// An IGT instance
    Instance,
    Tier,
    Item,
    /// Metadata block attached to a corpus, instance or tier
    Metadata,
    Meta,
    /// Named, namespace-aware child of a meta
    MetaChild,
}

impl NodeKind {
    /// Element name used by path queries
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Corpus => "corpus",
            NodeKind::Instance => "igt",
            NodeKind::Tier => "tier",
            NodeKind::Item => "item",
            NodeKind::Metadata => "metadata",
            NodeKind::Meta => "meta",
            NodeKind::MetaChild => "metachild",
        }
    }

    /// Whether `child` may be placed in this node's member list
    pub(crate) fn accepts(self, child: NodeKind) -> bool {
        matches!(
            (self, child),
            (NodeKind::Corpus, NodeKind::Instance)
                | (NodeKind::Instance, NodeKind::Tier)
                | (NodeKind::Tier, NodeKind::Item)
                | (NodeKind::Metadata, NodeKind::Meta)
                | (NodeKind::Meta, NodeKind::MetaChild)
                | (NodeKind::MetaChild, NodeKind::MetaChild)
        )
    }

    /// Corpus, instances and tiers carry a metadata list
    #[inline]
    pub(crate) fn has_metadata(self) -> bool {
        matches!(self, NodeKind::Corpus | NodeKind::Instance | NodeKind::Tier)
    }

    /// Tiers and items carry reference attributes
    #[inline]
    pub(crate) fn has_references(self) -> bool {
        matches!(self, NodeKind::Tier | NodeKind::Item)
    }

    /// Whether children of this node are indexed by id
    #[inline]
    pub(crate) fn indexes_children(self) -> bool {
        !matches!(self, NodeKind::Meta | NodeKind::MetaChild)
    }
}

/// Ordered member list with an id index
#[derive(Debug, Clone, Default)]
pub(crate) struct MemberList {
    list: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl MemberList {
    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.list
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.list.get(index).copied()
    }

    #[inline]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.list.iter().position(|&n| n == node)
    }

    /// Insert at `index`, appending when past the end
    pub fn insert(&mut self, index: usize, node: NodeId, id: Option<&str>) {
        let index = index.min(self.list.len());
        self.list.insert(index, node);
        if let Some(id) = id {
            self.index.insert(id.to_string(), node);
        }
    }

    pub fn remove_at(&mut self, index: usize, id: Option<&str>) -> NodeId {
        let node = self.list.remove(index);
        if let Some(id) = id {
            if self.index.get(id) == Some(&node) {
                self.index.remove(id);
            }
        }
        node
    }

    pub fn reindex(&mut self, node: NodeId, old: Option<&str>, new: Option<&str>) {
        if let Some(old) = old {
            if self.index.get(old) == Some(&node) {
                self.index.remove(old);
            }
        }
        if let Some(new) = new {
            self.index.insert(new.to_string(), node);
        }
    }

    pub fn clear(&mut self) -> Vec<NodeId> {
        self.index.clear();
        std::mem::take(&mut self.list)
    }

    pub fn replace_order(&mut self, order: Vec<NodeId>) {
        self.list = order;
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    /// Parent node (None for the corpus root and detached nodes)
    pub(crate) parent: Option<NodeId>,
    pub(crate) id: Option<String>,
    pub(crate) type_: Option<String>,
    /// Local name, only set on meta children
    pub(crate) name: Option<String>,
    /// Namespace URI
    pub(crate) namespace: Option<String>,
    /// Prefix declarations made on this node
    pub(crate) nsmap: Vec<(String, String)>,
    /// Attributes in insertion order; namespaced keys use `{uri}local`
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: MemberList,
    pub(crate) metadata: MemberList,
}

impl NodeData {
    /// Create an empty node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            parent: None,
            id: None,
            type_: None,
            name: None,
            namespace: None,
            nsmap: Vec::new(),
            attributes: Vec::new(),
            text: None,
            children: MemberList::default(),
            metadata: MemberList::default(),
        }
    }

    /// Identifier of the node; meta children keep theirs in the attribute map
    #[inline]
    pub(crate) fn id(&self) -> Option<&str> {
        match self.kind {
            NodeKind::MetaChild => self.attribute("id"),
            _ => self.id.as_deref(),
        }
    }

    #[inline]
    pub(crate) fn type_(&self) -> Option<&str> {
        match self.kind {
            NodeKind::MetaChild => self.attribute("type"),
            _ => self.type_.as_deref(),
        }
    }

    pub(crate) fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping the position of an existing key
    pub(crate) fn put_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    pub(crate) fn take_attribute(&mut self, key: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Member list that holds children of `kind`
    pub(crate) fn members_for(&self, kind: NodeKind) -> &MemberList {
        if kind == NodeKind::Metadata {
            &self.metadata
        } else {
            &self.children
        }
    }

    pub(crate) fn members_for_mut(&mut self, kind: NodeKind) -> &mut MemberList {
        if kind == NodeKind::Metadata {
            &mut self.metadata
        } else {
            &mut self.children
        }
    }
}

/// Whether `id` is a valid identifier: an ASCII letter followed by letters,
/// digits, `.`, `-` or `_`
pub fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(is_id_char),
        _ => false,
    }
}

#[inline]
pub(crate) fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
