//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::collections::HashSet;

use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::{LinkKey, NodeId, Snapshot, TreeStore};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data/export statements)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Format a magnitude with thousands separators and at most two decimals.
pub fn format_magnitude(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let (int, frac) = (cents / 100, cents % 100);
    let digits = int.to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",");
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

/// Full hierarchy as built, ignoring visibility.
pub fn store_tree(store: &TreeStore) -> Tree<String> {
    fn build(store: &TreeStore, id: NodeId, label: String) -> Tree<String> {
        let name = store.name_of(id).unwrap_or_default();
        let leaves: Vec<Tree<String>> = store
            .children_of(name)
            .into_iter()
            .filter(|&child| store.node(child).is_some_and(|n| !n.synthetic))
            .map(|child| {
                let value = store.link_between(id, child).map_or(0.0, |l| l.value);
                let child_name = store.name_of(child).unwrap_or_default();
                build(store, child, format!("{child_name} ({})", format_magnitude(value)))
            })
            .collect();
        Tree::new(label).with_leaves(leaves)
    }

    let roots = store.roots();
    let mut tree = Tree::new(format!(
        "{} nodes, roots: {}",
        store.len(),
        roots
            .iter()
            .filter_map(|&id| store.name_of(id))
            .join(", ")
    ));
    for id in roots {
        let total: f64 = store
            .links()
            .iter()
            .filter(|l| l.source == id)
            .map(|l| l.value)
            .sum();
        let name = store.name_of(id).unwrap_or_default();
        tree.push(build(store, id, format!("{name} ({})", format_magnitude(total))));
    }
    tree
}

/// Visible subgraph with values and share of parent.
///
/// Nodes reached through a link in `entering` are marked with a green `+`.
pub fn snapshot_tree(snapshot: &Snapshot, entering: &HashSet<LinkKey>) -> Tree<String> {
    fn label(snapshot: &Snapshot, id: NodeId, entering: bool) -> String {
        let name = snapshot.node(id).map_or("", |n| n.name.as_str());
        let mut text = format!("{name} {}", format_magnitude(snapshot.value_of(id)));
        if let Some(share) = snapshot.share_of_parent(id) {
            text.push_str(&format!(" ({share:.1}%)"));
        }
        if entering {
            format!("{} {text}", "+".green())
        } else {
            text
        }
    }

    fn build(
        snapshot: &Snapshot,
        id: NodeId,
        is_entering: bool,
        entering: &HashSet<LinkKey>,
    ) -> Tree<String> {
        let leaves: Vec<Tree<String>> = snapshot
            .outgoing(id)
            .map(|link| build(snapshot, link.target, entering.contains(&link.key), entering))
            .collect();
        Tree::new(label(snapshot, id, is_entering)).with_leaves(leaves)
    }

    let mut tree = Tree::new(format!(
        "{} visible nodes, {} links",
        snapshot.nodes.len(),
        snapshot.links.len()
    ));
    for node in snapshot
        .nodes
        .iter()
        .filter(|n| snapshot.incoming(n.id).next().is_none())
    {
        tree.push(build(snapshot, node.id, false, entering));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_whole_numbers_when_formatting_then_groups_thousands() {
        assert_eq!(format_magnitude(0.0), "0");
        assert_eq!(format_magnitude(999.0), "999");
        assert_eq!(format_magnitude(1234.0), "1,234");
        assert_eq!(format_magnitude(1_234_567.0), "1,234,567");
    }

    #[test]
    fn given_fraction_or_sign_when_formatting_then_keeps_two_decimals() {
        assert_eq!(format_magnitude(1234.5), "1,234.50");
        assert_eq!(format_magnitude(0.125), "0.13");
        assert_eq!(format_magnitude(-1500.0), "-1,500");
    }
}
