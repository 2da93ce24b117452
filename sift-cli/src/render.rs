//! Terminal output: the document tree with selections marked, and candidate
//! listings.

use std::collections::HashSet;
use std::fmt::Write;

use owo_colors::OwoColorize;
use sift_core::Candidate;
use sift_dom::{DomTree, ElementData, NodeId, NodeType};

/// Nodes to mark when printing a tree.
#[derive(Debug, Default)]
pub struct Highlights {
    /// Recorded targets, drawn in red.
    pub targets: HashSet<NodeId>,
    /// General-selector matches, drawn in blue.
    pub matches: HashSet<NodeId>,
    /// Emit ANSI colours; markers are printed either way.
    pub color: bool,
}

impl Highlights {
    fn paint(&self, id: NodeId, line: String) -> String {
        if self.targets.contains(&id) {
            let line = format!("{line}  <- target");
            if self.color { line.red().to_string() } else { line }
        } else if self.matches.contains(&id) {
            let line = format!("{line}  <- match");
            if self.color { line.blue().to_string() } else { line }
        } else {
            line
        }
    }
}

/// Opening tag with attributes, e.g. `<li class="item">`.
pub fn element_label(data: &ElementData) -> String {
    if data.attrs.is_empty() {
        return format!("<{}>", data.tag_name);
    }
    let attrs: Vec<String> = data
        .attrs
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                k.clone()
            } else {
                format!("{k}=\"{v}\"")
            }
        })
        .collect();
    format!("<{} {}>", data.tag_name, attrs.join(" "))
}

/// The subtree under `id`, one node per line, indented by depth.
pub fn render_tree(tree: &DomTree, id: NodeId, highlights: &Highlights) -> String {
    let mut out = String::new();
    let mut stack = vec![(id, 0_usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let prefix = "  ".repeat(depth);
        let line = match &node.node_type {
            NodeType::Document => format!("{prefix}Document"),
            NodeType::Element(data) => {
                highlights.paint(id, format!("{prefix}{}", element_label(data)))
            }
            NodeType::Text(text) => format!("{prefix}\"{}\"", text.replace('\n', "\\n")),
        };
        let _ = writeln!(out, "{line}");
        for &child in tree.children(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

/// Numbered candidate list, marking the last one with its uniqueness.
pub fn render_candidates(candidates: &[Candidate], guaranteed_unique: bool, color: bool) -> String {
    let mut out = String::new();
    let Some((last, earlier)) = candidates.split_last() else {
        return out;
    };
    for candidate in earlier {
        let _ = writeln!(out, "{:>3}  {candidate}", candidate.index());
    }
    let note = if guaranteed_unique { "unique" } else { "not unique" };
    if color {
        let _ = writeln!(out, "{:>3}  {}  ({note})", last.index(), last.green());
    } else {
        let _ = writeln!(out, "{:>3}  {last}  ({note})", last.index());
    }
    out
}
