// src/pipeline/diff.rs

//! Snapshot diffing.
//!
//! Computes which entities of the current run are absent from the prior
//! snapshot. Entities are matched on their [`Keyed`] key only; a changed
//! description or name on an existing id is not a change.

use std::collections::HashSet;

use crate::models::Keyed;

/// Diff of a current collection against a prior snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult<'a, T> {
    /// Current entities with no counterpart in the prior snapshot, in current order
    pub added: Vec<&'a T>,
    /// Prior entries no longer present
    pub removed: usize,
    /// Whether a prior snapshot existed at all
    pub had_baseline: bool,
}

impl<T> DiffResult<'_, T> {
    /// Check if there are any new entities.
    pub fn has_new(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Calculate the diff between a current collection and an optional prior snapshot.
///
/// The prior snapshot may hold a different record type as long as it shares
/// the key type. Neither input is modified.
pub fn calculate_diff<'a, T, P>(current: &'a [T], prior: Option<&[P]>) -> DiffResult<'a, T>
where
    T: Keyed,
    P: Keyed<Key = T::Key>,
{
    let Some(prior) = prior else {
        return DiffResult {
            added: current.iter().collect(),
            removed: 0,
            had_baseline: false,
        };
    };

    let prior_keys: HashSet<T::Key> = prior.iter().map(Keyed::key).collect();
    let current_keys: HashSet<T::Key> = current.iter().map(Keyed::key).collect();

    let added: Vec<&T> = current
        .iter()
        .filter(|entity| !prior_keys.contains(&entity.key()))
        .collect();
    let removed = prior_keys.difference(&current_keys).count();

    log::info!(
        "Diff: {} new, {} removed ({} current, {} prior)",
        added.len(),
        removed,
        current.len(),
        prior.len()
    );

    DiffResult {
        added,
        removed,
        had_baseline: true,
    }
}

/// Current entities whose key is absent from the prior snapshot.
pub fn diff_new<'a, T, P>(current: &'a [T], prior: Option<&[P]>) -> Vec<&'a T>
where
    T: Keyed,
    P: Keyed<Key = T::Key>,
{
    calculate_diff(current, prior).added
}
