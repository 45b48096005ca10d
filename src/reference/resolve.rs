//! Span resolution
//!
//! Turns an alignment expression into text by looking up each span's
//! target item and slicing its value. Values derived from other references
//! are resolved recursively; an item met again while its own value is
//! being computed is a reference cycle.

use super::grammar::{Expression, Range};
use super::{CONTENT, SEGMENTATION};
use crate::error::{Error, Result};
use crate::model::{HasAttributes, ItemRef, Node, NodeId, TierRef, View};

/// Text inserted between resolved fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    /// Between selections (`,` and whitespace), a space by default
    pub selection: String,
    /// Between spans (`+`), empty by default
    pub span: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            selection: " ".to_string(),
            span: String::new(),
        }
    }
}

/// Resolve `expr` against an instance (ids of any item) or a tier (ids of
/// its items)
pub fn resolve<'a>(container: impl Into<Node<'a>>, expr: &str) -> Result<String> {
    resolve_with(container, expr, &Delimiters::default())
}

pub fn resolve_with<'a>(
    container: impl Into<Node<'a>>,
    expr: &str,
    delimiters: &Delimiters,
) -> Result<String> {
    Resolver::new(delimiters).resolve(container.into(), expr)
}

struct Resolver<'d> {
    delimiters: &'d Delimiters,
    /// Items whose values are being computed
    active: Vec<NodeId>,
}

impl<'d> Resolver<'d> {
    fn new(delimiters: &'d Delimiters) -> Self {
        Resolver {
            delimiters,
            active: Vec::new(),
        }
    }

    fn resolve(&mut self, container: Node<'_>, expr: &str) -> Result<String> {
        let expression = Expression::parse(expr)?;
        let mut out = String::new();
        for (i, selection) in expression.selections.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.delimiters.selection);
            }
            for (j, span) in selection.spans.iter().enumerate() {
                if j > 0 {
                    out.push_str(&self.delimiters.span);
                }
                let target = find_target(container, &span.id)?;
                let value = self.item_value(target)?.unwrap_or_default();
                if span.groups.is_empty() {
                    out.push_str(&value);
                    continue;
                }
                for (k, group) in span.groups.iter().enumerate() {
                    if k > 0 {
                        out.push_str(&self.delimiters.selection);
                    }
                    for (l, range) in group.iter().enumerate() {
                        if l > 0 {
                            out.push_str(&self.delimiters.span);
                        }
                        out.push_str(range.slice(&value));
                    }
                }
            }
        }
        Ok(out)
    }

    fn item_value(&mut self, item: ItemRef<'_>) -> Result<Option<String>> {
        if let Some(text) = item.text() {
            return Ok(Some(text.to_string()));
        }
        match [CONTENT, SEGMENTATION]
            .into_iter()
            .find(|attr| item.get_attribute(attr).is_some())
        {
            Some(attr) => self.resolve_attribute(item, attr).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_attribute(&mut self, item: ItemRef<'_>, attr: &str) -> Result<String> {
        let label = || item.arena().describe(item.node_id());
        let expr = item
            .get_attribute(attr)
            .ok_or_else(|| Error::lookup(format!("{} has no {} attribute", label(), attr)))?;
        let tier = item
            .tier()
            .ok_or_else(|| Error::structure(format!("{} is not in a tier", label())))?;
        let target = referenced_tier(tier, attr)?;

        if self.active.contains(&item.node_id()) {
            return Err(Error::structure(format!(
                "reference cycle through {}",
                label()
            )));
        }
        self.active.push(item.node_id());
        let result = self.resolve(Node::Tier(target), expr);
        self.active.pop();
        result
    }
}

/// Tier named by `tier`'s own `attr`
fn referenced_tier<'a>(tier: TierRef<'a>, attr: &str) -> Result<TierRef<'a>> {
    let label = || tier.arena().describe(tier.node_id());
    let target_id = tier
        .get_attribute(attr)
        .ok_or_else(|| Error::structure(format!("{} has no {} attribute", label(), attr)))?;
    let instance = tier
        .instance()
        .ok_or_else(|| Error::structure(format!("{} is not in an instance", label())))?;
    instance.by_id(target_id.trim()).ok_or_else(|| {
        Error::structure(format!(
            "{} refers to missing tier {:?}",
            label(),
            target_id
        ))
    })
}

fn find_target<'a>(container: Node<'a>, id: &str) -> Result<ItemRef<'a>> {
    let found = match container {
        Node::Instance(instance) => instance.get_item(id),
        Node::Tier(tier) => tier.by_id(id),
        other => {
            return Err(Error::structure(format!(
                "cannot resolve references against a {}",
                other.name()
            )))
        }
    };
    found.ok_or_else(|| {
        Error::lookup(format!(
            "no item {:?} in {}",
            id,
            container.arena().describe(container.node_id())
        ))
    })
}

impl<'a> ItemRef<'a> {
    /// Literal text, else the resolved `content`, else the resolved
    /// `segmentation`. None when the item has neither.
    pub fn value(&self) -> Result<Option<String>> {
        Resolver::new(&Delimiters::default()).item_value(*self)
    }

    /// Resolve this item's `attr` expression against the tier named by
    /// the owning tier's `attr`
    pub fn resolve_ref(&self, attr: &str) -> Result<String> {
        Resolver::new(&Delimiters::default()).resolve_attribute(*self, attr)
    }

    /// Slice of the value
    pub fn span(&self, start: Option<i64>, end: Option<i64>) -> Result<Option<String>> {
        let range = Range { start, end };
        Ok(self.value()?.map(|value| range.slice(&value).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::{Corpus, Record};

    fn content_corpus() -> Corpus {
        Corpus::from_record(Record::corpus().child(
            Record::instance()
                .id("i1")
                .child(Record::tier().id("a").child(Record::item().id("i2").text("text")))
                .child(
                    Record::tier()
                        .id("b")
                        .content("a")
                        .child(Record::item().id("i_ac").content("i2[0:2]"))
                        .child(Record::item().id("i_t").content("i2[0:2]").text("own"))
                        .child(Record::item().id("i_none")),
                )
                .child(
                    Record::tier()
                        .id("c")
                        .segmentation("a")
                        .child(Record::item().id("i_s").segmentation("i2[2:4]")),
                ),
        ))
        .unwrap()
    }

    #[test]
    fn test_value_from_segmentation() {
        let corpus = fixtures::xc3();
        let igt = corpus.root().get(0).unwrap();
        let w1 = igt.get_item("w1").unwrap();
        assert_eq!(w1.value().unwrap().as_deref(), Some("inu=ga"));
        assert_eq!(
            igt.get_item("w2").unwrap().value().unwrap().as_deref(),
            Some("san-biki")
        );
        assert_eq!(w1.span(Some(0), Some(3)).unwrap().as_deref(), Some("inu"));
    }

    #[test]
    fn test_value_multi_hop() {
        let corpus = fixtures::xc3();
        let igt = corpus.root().get(0).unwrap();
        assert_eq!(
            igt.get_item("m1").unwrap().value().unwrap().as_deref(),
            Some("inu")
        );
        assert_eq!(
            igt.get_item("m4").unwrap().value().unwrap().as_deref(),
            Some("biki")
        );
    }

    #[test]
    fn test_value_from_content() {
        let corpus = content_corpus();
        let igt = corpus.root().get(0).unwrap();
        assert_eq!(
            igt.get_item("i_ac").unwrap().value().unwrap().as_deref(),
            Some("te")
        );
        assert_eq!(
            igt.get_item("i_s").unwrap().value().unwrap().as_deref(),
            Some("xt")
        );
        // literal text wins over references
        assert_eq!(
            igt.get_item("i_t").unwrap().value().unwrap().as_deref(),
            Some("own")
        );
        assert_eq!(igt.get_item("i_none").unwrap().value().unwrap(), None);
    }

    #[test]
    fn test_resolve_ref_errors() {
        let corpus = content_corpus();
        let igt = corpus.root().get(0).unwrap();
        let item = igt.get_item("i_ac").unwrap();
        assert!(matches!(item.resolve_ref("alignment"), Err(Error::Lookup(_))));
        assert_eq!(item.resolve_ref("content").unwrap(), "te");

        let mut corpus = Corpus::new();
        let orphan = corpus.create(Record::item().segmentation("p1")).unwrap();
        let orphan = corpus.node(orphan).unwrap().as_item().unwrap();
        assert!(matches!(orphan.resolve_ref("segmentation"), Err(Error::Structure(_))));

        let mut corpus = Corpus::new();
        let tier = corpus
            .create(
                Record::tier()
                    .id("w")
                    .segmentation("p")
                    .child(Record::item().id("w1").segmentation("p1")),
            )
            .unwrap();
        let w1 = corpus.node(tier).unwrap().as_tier().unwrap().get(0).unwrap();
        assert!(matches!(w1.value(), Err(Error::Structure(_))));

        let corpus = Corpus::from_record(Record::corpus().child(
            Record::instance().id("i1").child(
                Record::tier()
                    .id("w")
                    .segmentation("p")
                    .child(Record::item().id("w1").segmentation("p1")),
            ),
        ))
        .unwrap();
        let w1 = corpus.root().get(0).unwrap().get_item("w1").unwrap();
        assert!(matches!(w1.value(), Err(Error::Structure(_))));
    }

    #[test]
    fn test_resolve_missing_item() {
        let corpus = Corpus::from_record(Record::corpus().child(
            Record::instance()
                .id("i1")
                .child(Record::tier().id("p").child(Record::item().id("p1").text("abc")))
                .child(
                    Record::tier()
                        .id("w")
                        .segmentation("p")
                        .child(Record::item().id("w1").segmentation("p2[0:1]")),
                ),
        ))
        .unwrap();
        let w1 = corpus.root().get(0).unwrap().get_item("w1").unwrap();
        assert!(matches!(w1.value(), Err(Error::Lookup(_))));
    }

    #[test]
    fn test_resolve_against_containers() {
        let corpus = fixtures::xc3();
        let igt = corpus.root().get(0).unwrap();
        assert!(matches!(
            resolve(corpus.root(), "p1"),
            Err(Error::Structure(_))
        ));
        assert_eq!(resolve(igt, "p1[0:6,7:15]").unwrap(), "inu=ga san-biki");
        assert_eq!(resolve(igt, "m1").unwrap(), "inu");
        assert_eq!(resolve(igt, "g1").unwrap(), "dog");
        assert_eq!(resolve(igt, "g1 g2").unwrap(), "dog NOM");
        assert_eq!(resolve(igt, "p1[0:3+4:6]").unwrap(), "inuga");
        assert_eq!(resolve(igt, "p1[0:3]+[4:6]").unwrap(), "inuga");
        assert_eq!(resolve(igt, "").unwrap(), "");

        let translations = igt.by_id("t").unwrap();
        assert!(matches!(resolve(translations, "p1"), Err(Error::Lookup(_))));
        assert_eq!(resolve(translations, "t1[-5:]").unwrap(), "bark.");
        assert!(matches!(
            resolve(igt, "p1[0:"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_custom_delimiters() {
        let corpus = fixtures::xc3();
        let igt = corpus.root().get(0).unwrap();
        let delimiters = Delimiters {
            selection: " | ".to_string(),
            span: "-".to_string(),
        };
        assert_eq!(
            resolve_with(igt, "p1[0:3+4:6],p1[7:10]", &delimiters).unwrap(),
            "inu-ga | san"
        );
    }

    #[test]
    fn test_existing_item_without_value() {
        let corpus = Corpus::from_record(Record::corpus().child(
            Record::instance()
                .id("i1")
                .child(Record::tier().id("p").child(Record::item().id("p1"))),
        ))
        .unwrap();
        let igt = corpus.root().get(0).unwrap();
        assert_eq!(resolve(igt, "p1").unwrap(), "");
        assert_eq!(resolve(igt, "p1[0:2]").unwrap(), "");
    }

    #[test]
    fn test_cycles_are_errors() {
        let corpus = fixtures::xc4();
        let w1 = corpus.root().get(0).unwrap().get_item("w1").unwrap();
        assert!(matches!(w1.value(), Err(Error::Structure(_))));

        let corpus = fixtures::xc5();
        let w2 = corpus.root().get(0).unwrap().get_item("w2").unwrap();
        assert!(matches!(w2.value(), Err(Error::Structure(_))));
    }
}
