//! Path Evaluation Engine
//!
//! Evaluates parsed paths against a context node. Steps run left to right
//! over the node list produced by the previous step; results keep document
//! order within each context node and duplicates are not removed.

use super::axes;
use super::functions;
use super::parser::{Axis, Comparison, PathExpr, Predicate, Step, StepKind};
use super::value::Match;
use crate::error::Result;
use crate::model::Node;

/// Evaluate `path` from `context`
pub fn evaluate<'a>(path: &PathExpr, context: Node<'a>) -> Result<Vec<Match<'a>>> {
    // absolute paths rebind to the top of the tree, the corpus when attached
    let start = if path.absolute { context.root() } else { context };
    let mut current = vec![Match::Node(start)];

    for step in &path.steps {
        let mut next = Vec::new();
        for node in current.iter().filter_map(Match::as_node) {
            evaluate_step(step, node, &mut next)?;
        }
        current = next;
    }
    Ok(current)
}

fn evaluate_step<'a>(step: &Step, node: Node<'a>, out: &mut Vec<Match<'a>>) -> Result<()> {
    let start = out.len();
    match (step.axis, &step.kind) {
        (Axis::DescendantOrSelf, StepKind::Name(test)) => {
            out.extend(
                axes::descendants_or_self(node)
                    .into_iter()
                    .filter(|candidate| axes::matches_name(*candidate, test))
                    .map(Match::Node),
            );
        }
        (Axis::DescendantOrSelf, kind) => {
            for candidate in axes::descendants_or_self(node) {
                apply(kind, candidate, out)?;
            }
        }
        (Axis::Child, kind) => apply(kind, node, out)?,
    }

    if !step.predicates.is_empty() {
        let mut kept = Vec::with_capacity(out.len() - start);
        for candidate in out.drain(start..) {
            if let Some(node) = candidate.as_node() {
                if passes(&step.predicates, node)? {
                    kept.push(candidate);
                }
            }
        }
        out.extend(kept);
    }
    Ok(())
}

/// One step on the child axis
fn apply<'a>(kind: &StepKind, node: Node<'a>, out: &mut Vec<Match<'a>>) -> Result<()> {
    match kind {
        StepKind::SelfNode => out.push(Match::Node(node)),
        StepKind::Parent => out.extend(axes::parent(node).map(Match::Node)),
        StepKind::Name(test) => out.extend(axes::children(node, test).into_iter().map(Match::Node)),
        StepKind::Attribute(test) => {
            out.extend(axes::attributes(node, test).into_iter().map(Match::from))
        }
        StepKind::Function(function) => out.extend(functions::call(function, node)?),
        StepKind::Group(paths) => {
            for path in paths {
                out.extend(evaluate(path, node)?);
            }
        }
    }
    Ok(())
}

fn passes(predicates: &[Predicate], node: Node<'_>) -> Result<bool> {
    for predicate in predicates {
        if !test_predicate(predicate, node)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn test_predicate(predicate: &Predicate, node: Node<'_>) -> Result<bool> {
    let results = evaluate(&predicate.path, node)?;
    Ok(match &predicate.comparison {
        None => !results.is_empty(),
        Some((Comparison::Eq, literal)) => results
            .iter()
            .any(|result| result.string_value() == Some(literal.as_str())),
        Some((Comparison::NotEq, literal)) => results
            .iter()
            .all(|result| result.string_value() != Some(literal.as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::HasId;
    use crate::query::parser::parse;
    use pretty_assertions::assert_eq;

    fn eval<'a>(context: impl Into<Node<'a>>, path: &str) -> Vec<Match<'a>> {
        evaluate(&parse(path).unwrap(), context.into()).unwrap()
    }

    fn ids(matches: &[Match<'_>]) -> Vec<String> {
        matches
            .iter()
            .map(|m| {
                m.as_node()
                    .and_then(|node| node.id())
                    .unwrap_or("-")
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_predicates_filter_in_order() {
        let corpus = fixtures::xc3();
        let found = eval(corpus.root(), "//item[../@type=\"glosses\"][value()=\"NOM\"]");
        assert_eq!(ids(&found), ["g2"]);

        let found = eval(corpus.root(), "igt/tier[@type!=\"glosses\"][@alignment]");
        assert_eq!(ids(&found), ["x", "t"]);
    }

    #[test]
    fn test_not_equal_is_vacuous_on_empty() {
        let corpus = fixtures::xc1();
        let found = eval(corpus.root(), "//tier[@alignment!=\"p\"]");
        assert_eq!(ids(&found), ["p", "t"]);
    }

    #[test]
    fn test_descendant_steps_keep_duplicates() {
        let corpus = fixtures::xc1();
        let igt = corpus.root().get(0).unwrap();
        // every node under the instance reports its parent
        let parents = eval(igt, ".//..");
        assert_eq!(ids(&parents), ["xc1", "i1", "p", "i1", "t"]);
    }
}
