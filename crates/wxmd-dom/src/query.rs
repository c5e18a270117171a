//! Snapshot-then-iterate DOM queries.
//!
//! Matches are collected into an immutable list first and visited second, so a
//! visitor may detach, replace or insert nodes freely. Nodes inserted by a
//! visitor are never visited, and matches that an earlier visit moved out of
//! the scope are skipped.

use crate::node::{Fragment, NodeId};
use crate::selector::Selector;

/// Elements below `scope` matching `selector`, in document order
pub fn select(fragment: &Fragment, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
    fragment
        .descendants(scope)
        .into_iter()
        .filter(|&id| selector.matches(fragment, id))
        .collect()
}

/// Visit every match of `selector` below `scope`. Returns the number of visits.
pub fn for_each<F>(fragment: &mut Fragment, scope: NodeId, selector: &Selector, mut visitor: F) -> usize
where
    F: FnMut(&mut Fragment, NodeId),
{
    let matches = select(fragment, scope, selector);
    let mut visited = 0;
    for id in matches {
        if id == scope || !fragment.is_within(id, scope) {
            continue;
        }
        visitor(fragment, id);
        visited += 1;
    }
    visited
}

/// Detach every match of `selector` below `scope`. Returns the number removed.
pub fn remove_all(fragment: &mut Fragment, scope: NodeId, selector: &Selector) -> usize {
    for_each(fragment, scope, selector, |fragment, id| fragment.detach(id))
}
