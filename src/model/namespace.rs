//! Namespace Resolution
//!
//! Prefixes are declared on any node's nsmap and resolved by walking up the
//! parent chain, nearest declaration first. Namespaced attribute keys are
//! stored in Clark notation (`{uri}local`).

use memchr::memchr;

use super::corpus::Corpus;
use super::node::NodeId;

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Split `prefix:local` into its parts
#[inline]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
        None => (None, name),
    }
}

/// Split a `{uri}local` key into its parts
pub fn split_clark(key: &str) -> (Option<&str>, &str) {
    let bytes = key.as_bytes();
    if bytes.first() == Some(&b'{') {
        if let Some(end) = memchr(b'}', bytes) {
            return (Some(&key[1..end]), &key[end + 1..]);
        }
    }
    (None, key)
}

/// Build a `{uri}local` key
#[inline]
pub fn clark(uri: &str, local: &str) -> String {
    format!("{{{}}}{}", uri, local)
}

/// Resolve a prefix to a namespace URI from `node` upward
pub fn resolve_prefix<'a>(corpus: &'a Corpus, node: NodeId, prefix: &str) -> Option<&'a str> {
    if prefix == "xml" {
        return Some(ns::XML);
    }
    let mut current = Some(node);
    while let Some(id) = current {
        let data = corpus.data(id);
        if let Some((_, uri)) = data.nsmap.iter().rev().find(|(p, _)| p == prefix) {
            return Some(uri.as_str());
        }
        current = data.parent;
    }
    None
}

/// Interpret `namespace` as a prefix if one is declared, otherwise as a URI
pub fn expand_namespace<'a>(corpus: &'a Corpus, node: NodeId, namespace: &'a str) -> &'a str {
    resolve_prefix(corpus, node, namespace).unwrap_or(namespace)
}
