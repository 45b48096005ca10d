//! Capability traits shared by the typed views
//!
//! Each view implements only the capabilities its node kind has. Parent
//! links come back as the typed `Node` enum so inheritance walks are
//! matched exhaustively.

use std::borrow::Cow;

use super::corpus::Corpus;
use super::namespace::{clark, expand_namespace};
use super::node::{NodeData, NodeId, NodeKind};
use super::views::{MetaRef, MetadataRef, Members, Node};
use crate::reference::{ALIGNMENT, CONTENT, SEGMENTATION};

/// Metadata type whose metas are searched by `get_meta`
pub const META_BLOCK_TYPE: &str = "xigt-meta";

/// Borrowed handle onto one arena node
pub trait View<'a>: Copy {
    /// The arena this node lives in
    fn arena(&self) -> &'a Corpus;

    fn node_id(&self) -> NodeId;

    #[inline]
    fn data(&self) -> &'a NodeData {
        self.arena().data(self.node_id())
    }

    #[inline]
    fn kind(&self) -> NodeKind {
        self.data().kind
    }

    #[inline]
    fn as_node(&self) -> Node<'a> {
        Node::new(self.arena(), self.node_id())
    }
}

/// Construction of a typed view from a handle
#[doc(hidden)]
pub trait FromNode<'a>: View<'a> {
    fn from_node(corpus: &'a Corpus, node: NodeId) -> Self;
}

pub trait Ancestor<'a>: View<'a> {
    /// Containing node, or None for the root and detached nodes
    fn parent(&self) -> Option<Node<'a>> {
        self.data()
            .parent
            .map(|parent| Node::new(self.arena(), parent))
    }
}

pub trait HasId<'a>: View<'a> {
    #[inline]
    fn id(&self) -> Option<&'a str> {
        self.data().id()
    }

    #[inline]
    fn type_(&self) -> Option<&'a str> {
        self.data().type_()
    }
}

/// Options for `lookup_attribute`
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup<'n> {
    /// Namespace prefix or URI of the attribute
    pub namespace: Option<&'n str>,
    /// Re-query the parent chain when the attribute is absent locally
    pub inherit: bool,
}

impl<'n> Lookup<'n> {
    pub fn inherited() -> Self {
        Lookup {
            namespace: None,
            inherit: true,
        }
    }

    pub fn in_namespace(namespace: &'n str) -> Self {
        Lookup {
            namespace: Some(namespace),
            inherit: false,
        }
    }

    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }
}

pub trait HasAttributes<'a>: Ancestor<'a> {
    /// Attributes in insertion order
    #[inline]
    fn attributes(&self) -> &'a [(String, String)] {
        &self.data().attributes
    }

    #[inline]
    fn get_attribute(&self, key: &str) -> Option<&'a str> {
        self.data().attribute(key)
    }

    /// Namespace-aware lookup, optionally inherited from ancestors.
    /// `id` and `type` are never inherited.
    fn lookup_attribute(&self, key: &str, lookup: &Lookup<'_>) -> Option<&'a str> {
        let corpus = self.arena();
        let key: Cow<'_, str> = match lookup.namespace {
            Some(namespace) => {
                Cow::Owned(clark(expand_namespace(corpus, self.node_id(), namespace), key))
            }
            None => Cow::Borrowed(key),
        };
        let local_only = matches!(key.as_ref(), "id" | "type");

        let mut current = Some(self.node_id());
        while let Some(node) = current {
            let data = corpus.data(node);
            if let Some(value) = data.attribute(&key) {
                return Some(value);
            }
            if !lookup.inherit || local_only {
                break;
            }
            current = data.parent;
        }
        None
    }
}

pub trait HasReferenceAttributes<'a>: HasAttributes<'a> {
    #[inline]
    fn alignment(&self) -> Option<&'a str> {
        self.get_attribute(ALIGNMENT)
    }

    #[inline]
    fn content(&self) -> Option<&'a str> {
        self.get_attribute(CONTENT)
    }

    #[inline]
    fn segmentation(&self) -> Option<&'a str> {
        self.get_attribute(SEGMENTATION)
    }
}

pub trait HasMetadata<'a>: Ancestor<'a> {
    fn metadata(&self) -> Members<'a, MetadataRef<'a>> {
        Members::new(self.arena(), self.data().metadata.as_slice())
    }

    /// Metas of `type_` inside `xigt-meta` metadata, falling back to the
    /// parent chain when none are found and `inherit` is set
    fn get_meta(&self, type_: &str, inherit: bool) -> Vec<MetaRef<'a>> {
        let metas: Vec<MetaRef<'a>> = self
            .metadata()
            .filter(|metadata| metadata.type_() == Some(META_BLOCK_TYPE))
            .flat_map(|metadata| metadata.metas())
            .filter(|meta| meta.type_() == Some(type_))
            .collect();
        if !metas.is_empty() || !inherit {
            return metas;
        }
        match self.parent() {
            Some(Node::Corpus(corpus)) => corpus.get_meta(type_, inherit),
            Some(Node::Instance(instance)) => instance.get_meta(type_, inherit),
            Some(Node::Tier(tier)) => tier.get_meta(type_, inherit),
            Some(_) | None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::Record;

    const OLAC: &str = "http://www.language-archives.org/OLAC/1.1/";

    fn inherited_corpus() -> Corpus {
        Corpus::from_record(
            Record::corpus()
                .attribute("source", "fieldwork")
                .child(
                    Record::instance()
                        .id("i1")
                        .type_("sentence")
                        .child(Record::tier().id("p").child(Record::item().id("p1"))),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_get_attribute() {
        let corpus = inherited_corpus();
        let item = corpus.root().get(0).unwrap().get_item("p1").unwrap();
        assert_eq!(item.get_attribute("source"), None);
        assert_eq!(
            item.lookup_attribute("source", &Lookup::inherited()),
            Some("fieldwork")
        );
        assert_eq!(item.lookup_attribute("missing", &Lookup::inherited()), None);
        assert_eq!(
            item.lookup_attribute("missing", &Lookup::inherited())
                .unwrap_or("default"),
            "default"
        );
    }

    #[test]
    fn test_id_and_type_not_inherited() {
        let corpus = inherited_corpus();
        let tier = corpus.root().get(0).unwrap().get(0).unwrap();
        assert_eq!(tier.lookup_attribute("type", &Lookup::inherited()), None);
        assert_eq!(tier.type_(), None);
    }

    #[test]
    fn test_namespaced_attribute() {
        let corpus = fixtures::xc1m();
        let igt = corpus.root().get(0).unwrap();
        let meta = igt.metadata().next().unwrap().metas().next().unwrap();
        let subject = meta.children().next().unwrap();

        assert_eq!(
            subject.lookup_attribute("code", &Lookup::in_namespace("olac")),
            Some("jpn")
        );
        assert_eq!(
            subject.lookup_attribute("code", &Lookup::in_namespace(OLAC)),
            Some("jpn")
        );
        assert_eq!(subject.get_attribute("code"), None);
    }

    #[test]
    fn test_get_meta_inherits() {
        let corpus = Corpus::from_record(
            Record::corpus()
                .add_metadata(
                    Record::metadata()
                        .type_(META_BLOCK_TYPE)
                        .child(Record::meta().id("m1").type_("language").text("jpn")),
                )
                .child(Record::instance().id("i1").child(Record::tier().id("p"))),
        )
        .unwrap();
        let tier = corpus.root().get(0).unwrap().get(0).unwrap();
        let metas = tier.get_meta("language", true);
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].text(), Some("jpn"));
        assert!(tier.get_meta("language", false).is_empty());
        assert!(tier.get_meta("author", true).is_empty());
    }
}
