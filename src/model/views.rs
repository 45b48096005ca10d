//! Typed views
//!
//! A view is a `(&Corpus, NodeId)` pair. Views are `Copy`, compare by
//! arena identity and node handle, and borrow the corpus immutably so the
//! tree cannot change while any of them is alive.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::corpus::Corpus;
use super::namespace::expand_namespace;
use super::node::{NodeId, NodeKind};
use super::traits::{
    Ancestor, FromNode, HasAttributes, HasId, HasMetadata, HasReferenceAttributes, View,
};
use crate::reference::{ALIGNMENT, CONTENT, SEGMENTATION};

macro_rules! define_view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            corpus: &'a Corpus,
            node: NodeId,
        }

        impl<'a> $name<'a> {
            #[inline]
            pub(crate) fn new(corpus: &'a Corpus, node: NodeId) -> Self {
                $name { corpus, node }
            }
        }

        impl<'a> View<'a> for $name<'a> {
            #[inline]
            fn arena(&self) -> &'a Corpus {
                self.corpus
            }

            #[inline]
            fn node_id(&self) -> NodeId {
                self.node
            }
        }

        impl<'a> FromNode<'a> for $name<'a> {
            #[inline]
            fn from_node(corpus: &'a Corpus, node: NodeId) -> Self {
                $name::new(corpus, node)
            }
        }

        impl<'a> Ancestor<'a> for $name<'a> {}
        impl<'a> HasId<'a> for $name<'a> {}
        impl<'a> HasAttributes<'a> for $name<'a> {}

        impl PartialEq for $name<'_> {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::eq(self.corpus, other.corpus) && self.node == other.node
            }
        }

        impl Eq for $name<'_> {}

        impl fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("node", &self.node)
                    .field("id", &self.id())
                    .finish()
            }
        }

        impl<'a> From<$name<'a>> for Node<'a> {
            #[inline]
            fn from(view: $name<'a>) -> Node<'a> {
                Node::new(view.corpus, view.node)
            }
        }
    };
}

define_view!(
    /// The corpus root
    CorpusRef
);
define_view!(
    /// An IGT instance
    InstanceRef
);
define_view!(TierRef);
define_view!(ItemRef);
define_view!(MetadataRef);
define_view!(MetaRef);
define_view!(
    /// Named child of a meta or of another meta child
    MetaChildRef
);

impl<'a> HasMetadata<'a> for CorpusRef<'a> {}
impl<'a> HasMetadata<'a> for InstanceRef<'a> {}
impl<'a> HasMetadata<'a> for TierRef<'a> {}
impl<'a> HasReferenceAttributes<'a> for TierRef<'a> {}
impl<'a> HasReferenceAttributes<'a> for ItemRef<'a> {}

/// Iterator over a member list
pub struct Members<'a, V> {
    corpus: &'a Corpus,
    ids: std::slice::Iter<'a, NodeId>,
    marker: PhantomData<V>,
}

impl<'a, V> Members<'a, V> {
    pub(crate) fn new(corpus: &'a Corpus, ids: &'a [NodeId]) -> Self {
        Members {
            corpus,
            ids: ids.iter(),
            marker: PhantomData,
        }
    }
}

impl<'a, V: FromNode<'a>> Iterator for Members<'a, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.ids.next().map(|&id| V::from_node(self.corpus, id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<'a, V: FromNode<'a>> DoubleEndedIterator for Members<'a, V> {
    fn next_back(&mut self) -> Option<V> {
        self.ids.next_back().map(|&id| V::from_node(self.corpus, id))
    }
}

impl<'a, V: FromNode<'a>> ExactSizeIterator for Members<'a, V> {}
impl<'a, V: FromNode<'a>> FusedIterator for Members<'a, V> {}

/// Field filter for `select`
///
/// Every set field must match exactly. `namespace` accepts a prefix or a
/// URI.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub id: Option<String>,
    pub type_: Option<String>,
    pub alignment: Option<String>,
    pub content: Option<String>,
    pub segmentation: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn type_(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn alignment(mut self, expr: impl Into<String>) -> Self {
        self.alignment = Some(expr.into());
        self
    }

    pub fn content(mut self, expr: impl Into<String>) -> Self {
        self.content = Some(expr.into());
        self
    }

    pub fn segmentation(mut self, expr: impl Into<String>) -> Self {
        self.segmentation = Some(expr.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn matches<'a>(&self, view: impl View<'a>) -> bool {
        let data = view.data();
        let same = |wanted: &Option<String>, actual: Option<&str>| match wanted {
            Some(wanted) => actual == Some(wanted.as_str()),
            None => true,
        };
        let namespace = self
            .namespace
            .as_deref()
            .map(|ns| expand_namespace(view.arena(), view.node_id(), ns));
        same(&self.id, data.id())
            && same(&self.type_, data.type_())
            && same(&self.alignment, data.attribute(ALIGNMENT))
            && same(&self.content, data.attribute(CONTENT))
            && same(&self.segmentation, data.attribute(SEGMENTATION))
            && same(&self.name, data.name.as_deref())
            && (namespace.is_none() || namespace == data.namespace.as_deref())
    }
}

macro_rules! container {
    ($view:ident, $member:ident, $iter:ident) => {
        impl<'a> $view<'a> {
            /// Members in order
            #[inline]
            pub fn $iter(&self) -> Members<'a, $member<'a>> {
                Members::new(self.corpus, self.data().children.as_slice())
            }

            /// Member at `index`
            pub fn get(&self, index: usize) -> Option<$member<'a>> {
                self.data()
                    .children
                    .get(index)
                    .map(|node| $member::new(self.corpus, node))
            }

            /// Member with `id`
            pub fn by_id(&self, id: &str) -> Option<$member<'a>> {
                self.data()
                    .children
                    .by_id(id)
                    .map(|node| $member::new(self.corpus, node))
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.data().children.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Lazily filter members
            pub fn select(&self, select: Select) -> impl Iterator<Item = $member<'a>> + 'a {
                self.$iter().filter(move |member| select.matches(*member))
            }
        }
    };
}

container!(CorpusRef, InstanceRef, instances);
container!(InstanceRef, TierRef, tiers);
container!(TierRef, ItemRef, items);
container!(MetadataRef, MetaRef, metas);
container!(MetaRef, MetaChildRef, children);
container!(MetaChildRef, MetaChildRef, children);

impl<'a> InstanceRef<'a> {
    pub fn corpus(&self) -> Option<CorpusRef<'a>> {
        self.parent().and_then(Node::as_corpus)
    }

    /// Item with `id` from any tier
    pub fn get_item(&self, id: &str) -> Option<ItemRef<'a>> {
        self.corpus
            .item_index(self.node)
            .and_then(|items| items.get(id))
            .map(|&node| ItemRef::new(self.corpus, node))
    }

    /// Tier with `id`, else item with `id`
    pub fn get_any(&self, id: &str) -> Option<Node<'a>> {
        match self.by_id(id) {
            Some(tier) => Some(Node::Tier(tier)),
            None => self.get_item(id).map(Node::Item),
        }
    }

    /// Every item of every tier, in document order
    pub fn all_items(&self) -> impl Iterator<Item = ItemRef<'a>> + 'a {
        self.tiers().flat_map(|tier| tier.items())
    }
}

impl<'a> TierRef<'a> {
    pub fn instance(&self) -> Option<InstanceRef<'a>> {
        self.parent().and_then(Node::as_instance)
    }
}

impl<'a> ItemRef<'a> {
    pub fn tier(&self) -> Option<TierRef<'a>> {
        self.parent().and_then(Node::as_tier)
    }

    pub fn instance(&self) -> Option<InstanceRef<'a>> {
        self.tier().and_then(|tier| tier.instance())
    }

    /// Literal text, if any
    #[inline]
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }
}

impl<'a> MetaRef<'a> {
    #[inline]
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }
}

impl<'a> MetaChildRef<'a> {
    /// Local name
    pub fn name(&self) -> &'a str {
        self.data().name.as_deref().unwrap_or_default()
    }

    /// Namespace URI
    pub fn namespace(&self) -> Option<&'a str> {
        self.data().namespace.as_deref()
    }

    #[inline]
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }
}

/// Any node, typed by kind
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Node<'a> {
    Corpus(CorpusRef<'a>),
    Instance(InstanceRef<'a>),
    Tier(TierRef<'a>),
    Item(ItemRef<'a>),
    Metadata(MetadataRef<'a>),
    Meta(MetaRef<'a>),
    MetaChild(MetaChildRef<'a>),
}

impl<'a> Node<'a> {
    pub(crate) fn new(corpus: &'a Corpus, node: NodeId) -> Self {
        match corpus.data(node).kind {
            NodeKind::Corpus => Node::Corpus(CorpusRef::new(corpus, node)),
            NodeKind::Instance => Node::Instance(InstanceRef::new(corpus, node)),
            NodeKind::Tier => Node::Tier(TierRef::new(corpus, node)),
            NodeKind::Item => Node::Item(ItemRef::new(corpus, node)),
            NodeKind::Metadata => Node::Metadata(MetadataRef::new(corpus, node)),
            NodeKind::Meta => Node::Meta(MetaRef::new(corpus, node)),
            NodeKind::MetaChild => Node::MetaChild(MetaChildRef::new(corpus, node)),
        }
    }

    /// Element name: the local name for meta children, the kind name otherwise
    pub fn name(&self) -> &'a str {
        match self {
            Node::MetaChild(child) => child.name(),
            other => other.kind().name(),
        }
    }

    /// Namespace URI of the node itself
    pub fn namespace(&self) -> Option<&'a str> {
        self.data().namespace.as_deref()
    }

    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    /// Metadata followed by ordinary members
    pub fn members(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let corpus = self.arena();
        let data = self.data();
        data.metadata
            .as_slice()
            .iter()
            .chain(data.children.as_slice())
            .map(move |&node| Node::new(corpus, node))
    }

    /// Topmost node reachable through parent links
    pub fn root(&self) -> Node<'a> {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn as_corpus(self) -> Option<CorpusRef<'a>> {
        match self {
            Node::Corpus(corpus) => Some(corpus),
            _ => None,
        }
    }

    pub fn as_instance(self) -> Option<InstanceRef<'a>> {
        match self {
            Node::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_tier(self) -> Option<TierRef<'a>> {
        match self {
            Node::Tier(tier) => Some(tier),
            _ => None,
        }
    }

    pub fn as_item(self) -> Option<ItemRef<'a>> {
        match self {
            Node::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl<'a> View<'a> for Node<'a> {
    fn arena(&self) -> &'a Corpus {
        match self {
            Node::Corpus(v) => v.arena(),
            Node::Instance(v) => v.arena(),
            Node::Tier(v) => v.arena(),
            Node::Item(v) => v.arena(),
            Node::Metadata(v) => v.arena(),
            Node::Meta(v) => v.arena(),
            Node::MetaChild(v) => v.arena(),
        }
    }

    fn node_id(&self) -> NodeId {
        match self {
            Node::Corpus(v) => v.node_id(),
            Node::Instance(v) => v.node_id(),
            Node::Tier(v) => v.node_id(),
            Node::Item(v) => v.node_id(),
            Node::Metadata(v) => v.node_id(),
            Node::Meta(v) => v.node_id(),
            Node::MetaChild(v) => v.node_id(),
        }
    }
}

impl<'a> Ancestor<'a> for Node<'a> {}
impl<'a> HasId<'a> for Node<'a> {}
impl<'a> HasAttributes<'a> for Node<'a> {}
