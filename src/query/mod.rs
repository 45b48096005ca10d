//! Path Query Engine
//!
//! A small XPath-like language over the corpus tree and its reference graph:
//! - `/`, `//`, `.`, `..`, names and `*`, `@attr`
//! - predicates with `=` and `!=` against string literals
//! - `text()`, `value()`, `referent()`, `referrer()`
//! - `(a | b)` groups

pub mod axes;
pub mod cache;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod parser;
pub mod value;

pub use cache::PathCache;
pub use compiler::CompiledPath;
pub use lexer::{tokenize, Token};
#[cfg(feature = "parallel")]
pub use parallel::{findall_map, findall_parallel};
pub use parser::PathExpr;
pub use value::Match;

use crate::error::Result;
use crate::model::Node;

/// First result of `path` from `context`
pub fn find<'a>(context: impl Into<Node<'a>>, path: &str) -> Result<Option<Match<'a>>> {
    CompiledPath::compile(path)?.find(context)
}

/// Every result of `path` from `context`, in order, duplicates kept
pub fn findall<'a>(context: impl Into<Node<'a>>, path: &str) -> Result<Vec<Match<'a>>> {
    CompiledPath::compile(path)?.findall(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fixtures;
    use crate::model::{Corpus, HasMetadata, Node};
    use pretty_assertions::assert_eq;

    fn node<'a>(view: impl Into<Node<'a>>) -> Option<Match<'a>> {
        Some(Match::Node(view.into()))
    }

    fn nodes<'a, V: Into<Node<'a>>>(views: impl IntoIterator<Item = V>) -> Vec<Match<'a>> {
        views.into_iter().map(|v| Match::Node(v.into())).collect()
    }

    fn scalar(value: &str) -> Option<Match<'_>> {
        Some(Match::from(value))
    }

    fn tiers(corpus: &Corpus) -> Vec<Match<'_>> {
        nodes(corpus.root().get(0).unwrap().tiers())
    }

    #[test]
    fn test_find_root() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let tier = igt.get(0).unwrap();
        assert_eq!(find(xc1.root(), "/.").unwrap(), node(xc1.root()));
        assert_eq!(find(igt, "/.").unwrap(), node(xc1.root()));
        assert_eq!(find(tier, "/.").unwrap(), node(xc1.root()));
    }

    #[test]
    fn test_find_node() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let tier = igt.get(0).unwrap();
        assert_eq!(find(xc1.root(), "igt").unwrap(), node(igt));
        assert_eq!(find(xc1.root(), "tier").unwrap(), None);
        assert_eq!(find(igt, "tier").unwrap(), node(tier));
        assert_eq!(find(xc1.root(), "item").unwrap(), None);
        assert_eq!(find(igt, "item").unwrap(), None);
        assert_eq!(find(tier, "item").unwrap(), node(tier.get(0).unwrap()));
    }

    #[test]
    fn test_find_relative() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        assert_eq!(find(xc1.root(), ".").unwrap(), node(xc1.root()));
        assert_eq!(find(igt, ".").unwrap(), node(igt));
        assert_eq!(find(igt, "..").unwrap(), node(xc1.root()));
        assert_eq!(find(igt, "../.").unwrap(), node(xc1.root()));
        assert_eq!(find(xc1.root(), "..").unwrap(), None);
    }

    #[test]
    fn test_find_descendants() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let p1 = igt.get(0).unwrap().get(0).unwrap();
        let t = igt.get(1).unwrap();
        assert_eq!(find(xc1.root(), "//item").unwrap(), node(p1));
        assert_eq!(find(igt, ".//item").unwrap(), node(p1));
        assert_eq!(find(t, ".//item").unwrap(), node(t.get(0).unwrap()));
        assert_eq!(find(t, "//item").unwrap(), node(p1));

        let xc1m = fixtures::xc1m();
        let metadata = xc1m.root().get(0).unwrap().metadata().next().unwrap();
        assert_eq!(
            find(xc1m.root(), "//meta").unwrap(),
            node(metadata.get(0).unwrap())
        );
    }

    #[test]
    fn test_find_simple_path() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let p = igt.get(0).unwrap();
        assert_eq!(find(xc1.root(), "/igt").unwrap(), node(igt));
        assert_eq!(find(xc1.root(), "/igt/tier").unwrap(), node(p));
        assert_eq!(find(xc1.root(), "/igt/tier/item").unwrap(), node(p.get(0).unwrap()));
        assert_eq!(find(xc1.root(), "igt/tier/item").unwrap(), node(p.get(0).unwrap()));
        assert_eq!(find(xc1.root(), "tier/item").unwrap(), None);
        assert_eq!(find(igt, "tier/item").unwrap(), node(p.get(0).unwrap()));
    }

    #[test]
    fn test_findall() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let items = nodes([igt.get(0).unwrap().get(0).unwrap(), igt.get(1).unwrap().get(0).unwrap()]);
        assert_eq!(findall(xc1.root(), "/.").unwrap(), nodes([xc1.root()]));
        assert_eq!(findall(xc1.root(), "igt").unwrap(), nodes([igt]));
        assert!(findall(xc1.root(), "tier").unwrap().is_empty());
        assert_eq!(findall(igt, "tier").unwrap(), tiers(&xc1));
        assert_eq!(findall(xc1.root(), "igt/tier").unwrap(), tiers(&xc1));
        assert_eq!(findall(xc1.root(), "//tier").unwrap(), tiers(&xc1));
        assert_eq!(findall(xc1.root(), "igt/tier/item").unwrap(), items);
        assert_eq!(findall(xc1.root(), "//item").unwrap(), items);

        let xc1m = fixtures::xc1m();
        let metadata = xc1m.root().get(0).unwrap().metadata().next().unwrap();
        assert_eq!(findall(xc1m.root(), "//meta").unwrap(), nodes(metadata.metas()));
    }

    #[test]
    fn test_findall_is_stable() {
        let xc3 = fixtures::xc3();
        let first = findall(xc3.root(), "//item").unwrap();
        let expected = nodes(xc3.root().get(0).unwrap().all_items());
        assert_eq!(first, expected);
        assert_eq!(findall(xc3.root(), "//item").unwrap(), first);
    }

    #[test]
    fn test_star() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let items = nodes([igt.get(0).unwrap().get(0).unwrap(), igt.get(1).unwrap().get(0).unwrap()]);
        assert_eq!(findall(xc1.root(), "/*").unwrap(), nodes([igt]));
        assert_eq!(findall(xc1.root(), "/*/*").unwrap(), tiers(&xc1));
        assert_eq!(findall(xc1.root(), "//tier/*").unwrap(), items);

        // star includes metadata
        let xc1m = fixtures::xc1m();
        let igt = xc1m.root().get(0).unwrap();
        let mut expected = nodes(igt.metadata());
        expected.extend(tiers(&xc1m));
        assert_eq!(findall(xc1m.root(), "/igt/*").unwrap(), expected);
    }

    #[test]
    fn test_predicate() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let (p, t) = (igt.get(0).unwrap(), igt.get(1).unwrap());
        assert_eq!(find(xc1.root(), "//tier[@type=\"phrases\"]").unwrap(), node(p));
        assert_eq!(find(xc1.root(), "//tier[@type=\"translations\"]").unwrap(), node(t));
        assert_eq!(
            find(xc1.root(), "//tier[@type=\"phrases\"]/item").unwrap(),
            node(p.get(0).unwrap())
        );
        assert_eq!(
            find(xc1.root(), "//item[../@type=\"translations\"]").unwrap(),
            node(t.get(0).unwrap())
        );

        let xc3 = fixtures::xc3();
        let g2 = xc3.root().get(0).unwrap().get(3).unwrap().get(1).unwrap();
        assert_eq!(
            find(xc3.root(), "//item[../@type=\"glosses\"][value()=\"NOM\"]").unwrap(),
            node(g2)
        );
        assert_eq!(
            findall(xc3.root(), "//tier[@type=\"glosses\"]/item[value()=\"NOM\"]").unwrap(),
            nodes([g2])
        );
    }

    #[test]
    fn test_text_and_value() {
        let xc1 = fixtures::xc1();
        assert_eq!(find(xc1.root(), "//item/text()").unwrap(), scalar("inu=ga san-biki hoe-ru"));

        let xc3 = fixtures::xc3();
        assert_eq!(
            find(xc3.root(), "//tier[@type=\"words\"]/item/value()").unwrap(),
            scalar("inu=ga")
        );
        assert_eq!(
            findall(xc3.root(), "//tier[@type=\"morphemes\"]/item/value()").unwrap(),
            ["inu", "ga", "san", "biki", "hoe", "ru"].map(Match::from)
        );
    }

    #[test]
    fn test_find_metadata() {
        let xc1m = fixtures::xc1m();
        let metadata = xc1m.root().get(0).unwrap().metadata().next().unwrap();
        let meta = metadata.get(0).unwrap();
        let (subject, language) = (meta.get(0).unwrap(), meta.get(1).unwrap());
        let root = xc1m.root();

        assert_eq!(find(root, "igt/metadata").unwrap(), node(metadata));
        assert_eq!(findall(root, "igt/metadata").unwrap(), nodes([metadata]));
        assert_eq!(find(root, "igt/metadata/meta").unwrap(), node(meta));
        assert_eq!(findall(root, "igt/metadata/meta").unwrap(), nodes([meta]));
        assert_eq!(find(root, "igt/metadata/meta/*").unwrap(), node(subject));
        assert_eq!(
            findall(root, "igt/metadata/meta/*").unwrap(),
            nodes([subject, language])
        );
        assert_eq!(find(root, "igt/metadata/meta/dc:subject").unwrap(), node(subject));
        assert_eq!(find(root, "igt/metadata//dc:subject").unwrap(), node(subject));
        assert_eq!(
            find(root, "igt/metadata/meta/dc:subject/@olac:code").unwrap(),
            scalar("jpn")
        );
        assert_eq!(
            find(root, "igt/metadata/meta/dc:subject/text()").unwrap(),
            scalar("Japanese")
        );
        assert_eq!(
            findall(root, "igt/metadata/meta/dc:*/@olac:code").unwrap(),
            ["jpn", "eng"].map(Match::from)
        );
        assert_eq!(
            findall(root, "igt/metadata/meta/*/@name").unwrap(),
            ["subject", "language"].map(Match::from)
        );
    }

    #[test]
    fn test_find_referent() {
        let xc3 = fixtures::xc3();
        let igt = xc3.root().get(0).unwrap();
        let p = igt.get(0).unwrap();
        let p1 = p.get(0).unwrap();
        let root = xc3.root();

        assert_eq!(find(root, "//tier[@type=\"words\"]/referent()").unwrap(), node(p));
        assert_eq!(
            find(root, "//tier[@type=\"words\"]/referent(\"alignment\")").unwrap(),
            None
        );
        assert_eq!(
            find(root, "//tier[@type=\"words\"]/referent(\"segmentation\")").unwrap(),
            node(p)
        );
        assert_eq!(find(root, "//item[../@type=\"words\"]/referent()").unwrap(), node(p1));
        assert_eq!(
            findall(root, "//item[../@type=\"words\"]/referent()").unwrap(),
            nodes([p1, p1, p1])
        );
        assert!(findall(root, "//item[../@type=\"words\"]/referent(\"alignment\")")
            .unwrap()
            .is_empty());
        assert_eq!(
            findall(root, "//item[../@type=\"words\"]/referent(\"segmentation\")").unwrap(),
            nodes([p1, p1, p1])
        );
    }

    #[test]
    fn test_find_referrer() {
        let xc3 = fixtures::xc3();
        let igt = xc3.root().get(0).unwrap();
        let (w, m, t) = (igt.get(1).unwrap(), igt.get(2).unwrap(), igt.get(5).unwrap());
        let root = xc3.root();

        // alignment is tried before segmentation
        assert_eq!(find(root, "//tier[@type=\"phrases\"]/referrer()").unwrap(), node(t));
        assert_eq!(
            findall(root, "//tier[@type=\"phrases\"]/referrer()").unwrap(),
            nodes([t])
        );
        assert_eq!(
            find(root, "//tier[@type=\"phrases\"]/referrer(\"segmentation\")").unwrap(),
            node(w)
        );
        assert_eq!(
            find(root, "//tier[@type=\"phrases\"]/referrer(\"alignment\")").unwrap(),
            node(t)
        );
        assert_eq!(
            findall(root, "//item[../@type=\"phrases\"]/referrer()").unwrap(),
            nodes([t.get(0).unwrap()])
        );
        assert_eq!(
            findall(root, "//item[../@type=\"phrases\"]/referrer(\"segmentation\")").unwrap(),
            nodes(w.items())
        );
        assert_eq!(
            findall(root, "//item[../@type=\"words\"]/referrer(\"segmentation\")").unwrap(),
            nodes(m.items())
        );
    }

    #[test]
    fn test_disjunction() {
        let xc1 = fixtures::xc1();
        let igt = xc1.root().get(0).unwrap();
        let (p, t) = (igt.get(0).unwrap(), igt.get(1).unwrap());
        let root = xc1.root();

        let absolute = "(/igt/tier[@type=\"phrases\"] | /igt/tier[@type=\"translations\"])";
        assert_eq!(find(root, absolute).unwrap(), node(p));
        assert_eq!(findall(root, absolute).unwrap(), nodes([p, t]));

        let relative = "igt/(tier[@type=\"phrases\"] | tier[@type=\"translations\"])";
        assert_eq!(find(root, relative).unwrap(), node(p));
        assert_eq!(findall(root, relative).unwrap(), nodes([p, t]));
        assert_eq!(
            findall(root, &format!("{}/item", relative)).unwrap(),
            nodes([p.get(0).unwrap(), t.get(0).unwrap()])
        );
    }

    #[test]
    fn test_syntax_errors() {
        let xc1 = fixtures::xc1();
        for bad in ["igt/", "igt tier", "igt/frob()", "igt/(tier", "tier]", ""] {
            assert!(
                matches!(findall(xc1.root(), bad), Err(Error::PathSyntax { .. })),
                "{:?} should fail",
                bad
            );
        }
    }
}
