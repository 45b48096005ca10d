//! Parallel Path Evaluation
//!
//! Uses Rayon to evaluate independent queries against one corpus. Views
//! only borrow the corpus, so any number of threads can read it at once.

use rayon::prelude::*;

use super::value::Match;
use super::findall;
use crate::error::Result;
use crate::model::Node;

/// Evaluate several paths from the same context in parallel; results keep
/// the order of `paths`
pub fn findall_parallel<'a>(context: Node<'a>, paths: &[&str]) -> Vec<Result<Vec<Match<'a>>>> {
    paths.par_iter().map(|path| findall(context, path)).collect()
}

/// Evaluate a path and map its results in parallel
pub fn findall_map<'a, F, T>(context: Node<'a>, path: &str, mapper: F) -> Result<Vec<T>>
where
    F: Fn(&Match<'a>) -> T + Sync + Send,
    T: Send,
{
    let results = findall(context, path)?;
    Ok(results.par_iter().map(mapper).collect())
}
