//! Interlinear - an in-memory model for interlinear glossed text
//!
//! Layers:
//! - `model`: corpus arena, typed views, validation on every edit
//! - `reference`: alignment expressions, resolution to text, the
//!   per-instance reference index and chain walks
//! - `query`: path queries over the tree and its reference graph
//!
//! ```ignore
//! use interlinear::{Corpus, Record, findall};
//!
//! let corpus = Corpus::from_record(record)?;
//! for gloss in findall(corpus.root(), "//tier[@type=\"glosses\"]/item/value()")? {
//!     println!("{}", gloss.as_str().unwrap_or_default());
//! }
//! ```

mod error;
pub mod model;
pub mod query;
pub mod reference;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use model::{
    Ancestor, Corpus, CorpusRef, HasAttributes, HasId, HasMetadata, HasReferenceAttributes,
    InstanceRef, ItemRef, Lookup, MetaChildRef, MetaRef, MetadataRef, Node, NodeId, NodeKind,
    Record, Select, TierRef, View,
};
#[cfg(feature = "parallel")]
pub use query::{findall_map, findall_parallel};
pub use query::{find, findall, CompiledPath, Match, PathCache};
pub use reference::{
    ancestors, dereference, dereference_all, descendants, referents, referrers, resolve,
    resolve_with, Delimiters, Follow, Hop,
};
