//! Phase 2: Determining Push Order
//!
//! A parent's commit that moves a submodule pointer is only valid on a
//! remote once the submodule commit it points to already exists there. So
//! every repository must be pushed after all of the repositories nested
//! inside it.
//!
//! Discovery already lists parents before their children, so reversing the
//! discovery sequence is enough: no graph algorithm is needed. The reversal
//! is pure and total, and applies only to the nested repositories; the root
//! is pushed separately at the very end of a run.

use super::{PushOrder, RepoTree};

/// Execute Phase 2: the push order of the nested repositories of `tree`.
///
/// Returns indices into `tree.repos`, deepest/last-discovered first.
pub fn execute(tree: &RepoTree) -> PushOrder {
    let nested: Vec<usize> = (1..tree.repos.len()).collect();
    PushOrder::new(reverse_discovery(&nested))
}

/// Reverse a discovery sequence.
pub fn reverse_discovery<T: Clone>(sequence: &[T]) -> Vec<T> {
    sequence.iter().rev().cloned().collect()
}
