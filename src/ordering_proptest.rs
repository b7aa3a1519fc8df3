//! Property-based tests for the push ordering policy.
//!
//! Trees are generated as parent-index lists in pre-order, then the policy
//! is checked against invariants that must hold for every shape.

#[cfg(test)]
mod proptest_tests {
    use crate::phases::{ordering, RepoHandle, RepoTree};
    use proptest::prelude::*;
    use std::path::PathBuf;

    /// Build a random tree in depth-first pre-order.
    ///
    /// Each new node attaches to a node on the current root-to-last path,
    /// which is exactly the set of parents that keeps the list pre-order.
    fn arb_tree() -> impl Strategy<Value = RepoTree> {
        prop::collection::vec(any::<prop::sample::Index>(), 0..40).prop_map(|picks| {
            let mut repos = vec![RepoHandle {
                path: PathBuf::new(),
                parent: None,
                depth: 0,
                name: "root".to_string(),
            }];
            let mut spine = vec![0usize];
            for (n, pick) in picks.into_iter().enumerate() {
                let parent = spine[pick.index(spine.len())];
                let depth = repos[parent].depth + 1;
                let path = repos[parent].path.join(format!("m{}", n));
                repos.push(RepoHandle {
                    path,
                    parent: Some(parent),
                    depth,
                    name: format!("m{}", n),
                });
                let index = repos.len() - 1;
                spine.truncate(spine.iter().position(|&s| s == parent).unwrap_or(0) + 1);
                spine.push(index);
            }
            RepoTree {
                root: PathBuf::from("/root"),
                repos,
            }
        })
    }

    proptest! {
        /// Property: every descendant is pushed before any of its ancestors
        #[test]
        fn descendants_are_pushed_before_ancestors(tree in arb_tree()) {
            let order = ordering::execute(&tree);
            let position = |i: usize| order.order.iter().position(|&x| x == i);
            for a in 1..tree.repos.len() {
                for b in 1..tree.repos.len() {
                    if tree.is_ancestor(a, b) {
                        prop_assert!(position(b) < position(a));
                    }
                }
            }
        }

        /// Property: the order is a permutation of the nested repositories
        #[test]
        fn order_covers_every_nested_repo_once(tree in arb_tree()) {
            let order = ordering::execute(&tree);
            let mut sorted = order.order.clone();
            sorted.sort_unstable();
            let expected: Vec<usize> = (1..tree.repos.len()).collect();
            prop_assert_eq!(sorted, expected);
        }

        /// Property: the order is deterministic (same tree = same order)
        #[test]
        fn order_is_deterministic(tree in arb_tree()) {
            prop_assert_eq!(ordering::execute(&tree), ordering::execute(&tree));
        }
    }
}
