//! Compiled Paths
//!
//! Parse a path once and evaluate it against any number of context nodes.

use tracing::debug;

use super::eval::evaluate;
use super::parser::{parse, PathExpr};
use super::value::Match;
use crate::error::Result;
use crate::model::Node;

/// A parsed path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    source: String,
    expr: PathExpr,
}

impl CompiledPath {
    /// Parse `path`, failing with `PathSyntax` on malformed input
    pub fn compile(path: &str) -> Result<Self> {
        let expr = parse(path)?;
        debug!(path, steps = expr.steps.len(), "compiled path");
        Ok(CompiledPath {
            source: path.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &PathExpr {
        &self.expr
    }

    /// All results, in order, duplicates kept
    pub fn findall<'a>(&self, context: impl Into<Node<'a>>) -> Result<Vec<Match<'a>>> {
        evaluate(&self.expr, context.into())
    }

    /// First result, if any
    pub fn find<'a>(&self, context: impl Into<Node<'a>>) -> Result<Option<Match<'a>>> {
        Ok(self.findall(context)?.into_iter().next())
    }
}
