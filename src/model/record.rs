//! Parsed field data for building trees
//!
//! A `Record` is the hand-off point for codecs and importers: they fill in
//! already-parsed fields and the corpus validates them when the record is
//! turned into nodes.

use super::node::NodeKind;
use crate::reference::{ALIGNMENT, CONTENT, SEGMENTATION};

/// Field data for one node and its subtree
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) kind: NodeKind,
    pub(crate) id: Option<String>,
    pub(crate) type_: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) nsmap: Vec<(String, String)>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<Record>,
    pub(crate) metadata: Vec<Record>,
}

impl Record {
    fn new(kind: NodeKind) -> Self {
        Record {
            kind,
            id: None,
            type_: None,
            name: None,
            namespace: None,
            nsmap: Vec::new(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn corpus() -> Self {
        Self::new(NodeKind::Corpus)
    }

    pub fn instance() -> Self {
        Self::new(NodeKind::Instance)
    }

    pub fn tier() -> Self {
        Self::new(NodeKind::Tier)
    }

    pub fn item() -> Self {
        Self::new(NodeKind::Item)
    }

    pub fn metadata() -> Self {
        Self::new(NodeKind::Metadata)
    }

    pub fn meta() -> Self {
        Self::new(NodeKind::Meta)
    }

    /// Meta child with its mandatory local name
    pub fn meta_child(name: impl Into<String>) -> Self {
        let mut record = Self::new(NodeKind::MetaChild);
        record.name = Some(name.into());
        record
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Set the id. Meta children keep it as an attribute.
    pub fn id(self, id: impl Into<String>) -> Self {
        match self.kind {
            NodeKind::MetaChild => self.attribute("id", id),
            _ => Record {
                id: Some(id.into()),
                ..self
            },
        }
    }

    pub fn type_(self, type_: impl Into<String>) -> Self {
        match self.kind {
            NodeKind::MetaChild => self.attribute("type", type_),
            _ => Record {
                type_: Some(type_.into()),
                ..self
            },
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn alignment(self, expr: impl Into<String>) -> Self {
        self.attribute(ALIGNMENT, expr)
    }

    pub fn content(self, expr: impl Into<String>) -> Self {
        self.attribute(CONTENT, expr)
    }

    pub fn segmentation(self, expr: impl Into<String>) -> Self {
        self.attribute(SEGMENTATION, expr)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Namespace URI of the node itself
    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    /// Declare a namespace prefix on this node
    pub fn prefix(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.nsmap.push((prefix.into(), uri.into()));
        self
    }

    pub fn child(mut self, child: Record) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Record>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a metadata record
    pub fn add_metadata(mut self, metadata: Record) -> Self {
        self.metadata.push(metadata);
        self
    }
}
