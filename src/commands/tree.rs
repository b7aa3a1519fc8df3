//! # Tree Command Implementation
//!
//! `nested-sync --tree` prints the discovered repository tree in a
//! hierarchical format and exits. It is a read-only operation: nothing is
//! fetched, pushed or checked out.

use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use ptree::{write_tree, TreeItem};

use super::sync::SyncArgs;
use nested_sync::output::{emoji, OutputConfig};
use nested_sync::phases::{discovery, RepoTree};
use nested_sync::repository::DefaultGitOperations;

/// Execute the `--tree` operation.
pub fn execute(args: &SyncArgs, output: &OutputConfig) -> Result<()> {
    let git = DefaultGitOperations;
    let tree = discovery::discover(&args.dir, &git)?;

    println!(
        "{} Repository tree for: {}",
        emoji(output, "🌳", "==>"),
        tree.root.display()
    );
    print!("{}", render(&tree)?);

    Ok(())
}

/// Render the tree below the root, one repository per line.
pub fn render(tree: &RepoTree) -> Result<String> {
    let mut buffer = Vec::new();
    write_tree(&build_tree_node(tree, 0), &mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn build_tree_node(tree: &RepoTree, index: usize) -> TreeNode {
    let handle = &tree.repos[index];
    let label = if handle.is_root() {
        handle.name.clone()
    } else {
        format!("{} ({})", handle.name, handle.display_path())
    };
    let children = tree
        .children(index)
        .map(|child| build_tree_node(tree, child))
        .collect();
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
