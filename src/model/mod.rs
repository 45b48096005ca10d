//! IGT model
//!
//! A corpus owns an arena of nodes: instances hold tiers, tiers hold items,
//! and corpora, instances and tiers may carry metadata blocks of metas and
//! meta children. Callers read the tree through typed, borrowed views and
//! edit it through `Corpus` methods addressed by `NodeId`.

mod corpus;
pub mod namespace;
pub mod node;
mod record;
mod traits;
mod views;

pub use corpus::Corpus;
pub use node::{is_valid_id, NodeData, NodeId, NodeKind, ROOT};
pub use record::Record;
pub use traits::{
    Ancestor, FromNode, HasAttributes, HasId, HasMetadata, HasReferenceAttributes, Lookup, View,
    META_BLOCK_TYPE,
};
pub use views::{
    CorpusRef, InstanceRef, ItemRef, MetaChildRef, MetaRef, MetadataRef, Members, Node, Select,
    TierRef,
};
