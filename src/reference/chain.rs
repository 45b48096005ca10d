//! Chain walks
//!
//! `ancestors` follows reference attributes from a tier toward the tiers
//! it refers to; `descendants` walks breadth-first through the tiers that
//! refer back. Each yields one `Hop` per followed link. Both remember the
//! `(tier, attribute)` pairs already followed, so self-referencing tiers
//! stop after one hop.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace, warn};

use super::expression::ids;
use super::index::referrers;
use super::{ALIGNMENT, SEGMENTATION};
use crate::error::{Error, Result};
use crate::model::{HasAttributes, HasId, ItemRef, Node, NodeId, TierRef, View};

/// Default attribute priority for `ancestors`
pub const DEFAULT_ANCESTOR_ATTRIBUTES: [&str; 2] = [ALIGNMENT, SEGMENTATION];

/// Default attribute priority for `descendants`
pub const DEFAULT_DESCENDANT_ATTRIBUTES: [&str; 2] = [SEGMENTATION, ALIGNMENT];

/// Which referrer attributes `descendants` expands at each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Follow {
    /// Only the first attribute, in priority order, with any referrer
    #[default]
    First,
    /// Every attribute with referrers
    All,
}

/// One link of a chain walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop<'a> {
    pub tier: TierRef<'a>,
    pub attribute: String,
    pub target: TierRef<'a>,
    /// Items of `target` selected by the tracked items
    pub items: Vec<ItemRef<'a>>,
}

/// Starting tier and tracked items; a tier tracks all of its items
fn start_point<'a>(start: Node<'a>) -> Result<(TierRef<'a>, Vec<ItemRef<'a>>)> {
    match start {
        Node::Tier(tier) => Ok((tier, tier.items().collect())),
        Node::Item(item) => {
            let tier = item.tier().ok_or_else(|| {
                Error::structure(format!(
                    "{} is not in a tier",
                    item.arena().describe(item.node_id())
                ))
            })?;
            Ok((tier, vec![item]))
        }
        other => Err(Error::structure(format!(
            "chain walks start from a tier or an item, not a {}",
            other.name()
        ))),
    }
}

/// Does `item`'s `attr` expression mention any of `wanted`
fn mentions(item: &ItemRef<'_>, attr: &str, wanted: &HashSet<&str>) -> bool {
    item.get_attribute(attr)
        .is_some_and(|expr| ids(expr).iter().any(|id| wanted.contains(id)))
}

/// Walk toward referenced tiers, choosing the first attribute in `attrs`
/// present on each tier
pub fn ancestors<'a>(start: impl Into<Node<'a>>, attrs: &[&str]) -> Ancestors<'a> {
    let (state, error) = match start_point(start.into()) {
        Ok(state) => (Some(state), None),
        Err(err) => (None, Some(err)),
    };
    Ancestors {
        state,
        attrs: attrs.iter().map(|a| a.to_string()).collect(),
        visited: HashSet::new(),
        error,
    }
}

/// Iterator returned by [`ancestors`]
pub struct Ancestors<'a> {
    state: Option<(TierRef<'a>, Vec<ItemRef<'a>>)>,
    attrs: Vec<String>,
    visited: HashSet<(NodeId, String)>,
    error: Option<Error>,
}

impl<'a> Ancestors<'a> {
    fn step(
        &mut self,
        tier: TierRef<'a>,
        items: Vec<ItemRef<'a>>,
    ) -> Option<Result<Hop<'a>>> {
        let attr = self
            .attrs
            .iter()
            .find(|attr| tier.get_attribute(attr).is_some())?
            .clone();
        if !self.visited.insert((tier.node_id(), attr.clone())) {
            debug!(tier = tier.id().unwrap_or("-"), %attr, "stopping at visited tier");
            return None;
        }
        let target = match target_tier(tier, &attr) {
            Ok(target) => target,
            Err(err) => return Some(Err(err)),
        };

        let wanted: HashSet<&str> = items
            .iter()
            .filter_map(|item| item.get_attribute(&attr))
            .flat_map(ids)
            .collect();
        let selected: Vec<ItemRef<'a>> = target
            .items()
            .filter(|item| item.id().is_some_and(|id| wanted.contains(id)))
            .collect();
        trace!(
            tier = tier.id().unwrap_or("-"),
            %attr,
            target = target.id().unwrap_or("-"),
            items = selected.len(),
            "ancestor hop"
        );

        self.state = Some((target, selected.clone()));
        Some(Ok(Hop {
            tier,
            attribute: attr,
            target,
            items: selected,
        }))
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<Hop<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.error.take() {
            return Some(Err(err));
        }
        let (tier, items) = self.state.take()?;
        self.step(tier, items)
    }
}

/// Tier named by the first id of `tier`'s `attr`
fn target_tier<'a>(tier: TierRef<'a>, attr: &str) -> Result<TierRef<'a>> {
    let label = || tier.arena().describe(tier.node_id());
    let instance = tier
        .instance()
        .ok_or_else(|| Error::structure(format!("{} is not in an instance", label())))?;
    let expr = tier.get_attribute(attr).unwrap_or_default();
    let id = ids(expr)
        .into_iter()
        .next()
        .ok_or_else(|| Error::lookup(format!("{} {} names no tier", label(), attr)))?;
    instance
        .by_id(id)
        .ok_or_else(|| Error::lookup(format!("{} refers to missing tier {:?}", label(), id)))
}

/// Walk breadth-first through referring tiers
pub fn descendants<'a>(
    start: impl Into<Node<'a>>,
    attrs: &[&str],
    follow: Follow,
) -> Descendants<'a> {
    let mut agenda = VecDeque::new();
    let error = match start_point(start.into()) {
        Ok(state) => {
            agenda.push_back(state);
            None
        }
        Err(err) => Some(err),
    };
    Descendants {
        agenda,
        pending: VecDeque::new(),
        attrs: attrs.iter().map(|a| a.to_string()).collect(),
        follow,
        visited: HashSet::new(),
        error,
    }
}

/// Iterator returned by [`descendants`]
pub struct Descendants<'a> {
    agenda: VecDeque<(TierRef<'a>, Vec<ItemRef<'a>>)>,
    pending: VecDeque<Hop<'a>>,
    attrs: Vec<String>,
    follow: Follow,
    visited: HashSet<(NodeId, String)>,
    error: Option<Error>,
}

impl<'a> Descendants<'a> {
    fn expand(&mut self, tier: TierRef<'a>, items: &[ItemRef<'a>]) -> Result<()> {
        let Some(tier_id) = tier.id() else {
            return Ok(());
        };
        let instance = tier.instance().ok_or_else(|| {
            Error::structure(format!(
                "{} is not in an instance",
                tier.arena().describe(tier.node_id())
            ))
        })?;
        let attrs: Vec<&str> = self.attrs.iter().map(String::as_str).collect();
        let referring = referrers(instance, tier_id, Some(attrs.as_slice()));

        let mut followed = attrs
            .iter()
            .filter(|attr| referring.get(**attr).is_some_and(|ids| !ids.is_empty()))
            .map(|attr| attr.to_string());
        let chosen: Vec<String> = match self.follow {
            Follow::First => followed.next().into_iter().collect(),
            Follow::All => followed.collect(),
        };

        let tracked: HashSet<&str> = items.iter().filter_map(|item| item.id()).collect();
        for attr in chosen {
            if !self.visited.insert((tier.node_id(), attr.clone())) {
                debug!(tier = tier_id, %attr, "skipping visited tier");
                continue;
            }
            for referrer in &referring[&attr] {
                let Some(source) = instance.by_id(referrer) else {
                    warn!(tier = tier_id, %attr, %referrer, "referrer is not a tier");
                    continue;
                };
                let selected: Vec<ItemRef<'a>> = source
                    .items()
                    .filter(|item| mentions(item, &attr, &tracked))
                    .collect();
                trace!(
                    tier = tier_id,
                    %attr,
                    target = %referrer,
                    items = selected.len(),
                    "descendant hop"
                );
                self.agenda.push_back((source, selected.clone()));
                self.pending.push_back(Hop {
                    tier,
                    attribute: attr.clone(),
                    target: source,
                    items: selected,
                });
            }
        }
        Ok(())
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Result<Hop<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.error.take() {
            self.agenda.clear();
            return Some(Err(err));
        }
        loop {
            if let Some(hop) = self.pending.pop_front() {
                return Some(Ok(hop));
            }
            let (tier, items) = self.agenda.pop_front()?;
            if let Err(err) = self.expand(tier, &items) {
                self.agenda.clear();
                return Some(Err(err));
            }
        }
    }
}
