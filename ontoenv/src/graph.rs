//! Directed graph of declared `owl:imports` relationships.
//!
//! Nodes are ontology URIs (or, for corpus files that declare no ontology,
//! file paths). An edge `a → b` means the document for `a` was observed to
//! declare `owl:imports b`. Cycles are legal.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Marker appended to a node in [`DependencyGraph::render_tree`] when its
/// subtree has already been printed.
pub const DUPLICATE_MARKER: &str = "(*)";

/// Import graph with deterministic (sorted) iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

/// On-disk form of a [`DependencyGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedGraph {
    /// Every node, sorted.
    pub nodes: Vec<String>,
    /// Every `[from, to]` edge, sorted.
    pub edges: Vec<(String, String)>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node if absent.
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.nodes.insert(node.into());
    }

    /// Adds the edge `from → to`, creating both nodes as needed.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges.entry(from).or_default().insert(to);
    }

    /// Removes a node and every edge touching it. Returns true if it existed.
    pub fn remove_node(&mut self, node: &str) -> bool {
        if !self.nodes.remove(node) {
            return false;
        }
        self.edges.remove(node);
        for targets in self.edges.values_mut() {
            targets.remove(node);
        }
        self.edges.retain(|_, targets| !targets.is_empty());
        true
    }

    /// Drops every outgoing edge of `node`, keeping the node itself.
    pub fn clear_edges_from(&mut self, node: &str) {
        self.edges.remove(node);
    }

    /// Returns true if `node` is in the graph.
    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Returns true if the edge `from → to` exists.
    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges
            .get(from)
            .map(|targets| targets.contains(to))
            .unwrap_or(false)
    }

    /// Direct imports of `node`, sorted.
    pub fn edges_from<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Every node, sorted.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Every edge as `(from, to)`, sorted.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from.as_str(), to.as_str())))
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Number of edges pointing at `node`.
    #[must_use]
    pub fn in_degree(&self, node: &str) -> usize {
        self.edges.values().filter(|t| t.contains(node)).count()
    }

    /// Roots for a full tree rendering.
    ///
    /// Nodes nothing imports come first; any node still unreachable from
    /// them (a component that is entirely cyclic) then contributes its
    /// smallest member as an extra root.
    #[must_use]
    pub fn default_roots(&self) -> Vec<String> {
        let mut roots = Vec::new();
        let mut reached: BTreeSet<&str> = BTreeSet::new();
        for node in self.nodes.iter().filter(|n| self.in_degree(n) == 0) {
            roots.push(node.clone());
            self.mark_reachable(node, &mut reached);
        }
        for node in &self.nodes {
            if !reached.contains(node.as_str()) {
                roots.push(node.clone());
                self.mark_reachable(node, &mut reached);
            }
        }
        roots
    }

    fn mark_reachable<'a>(&'a self, start: &'a str, reached: &mut BTreeSet<&'a str>) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if reached.insert(node) {
                stack.extend(self.edges_from(node));
            }
        }
    }

    /// Renders the graph as an indented tree below each of `roots`.
    ///
    /// A node whose subtree was already printed is printed again with
    /// [`DUPLICATE_MARKER`] and not expanded, which also cuts cycles.
    #[must_use]
    pub fn render_tree(&self, roots: &[String]) -> String {
        let mut out = String::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for root in roots {
            out.push_str(root);
            out.push('\n');
            seen.insert(root.as_str());

            let mut stack: Vec<(&str, usize, bool)> = Vec::new();
            self.push_children(root, 1, &mut stack);
            while let Some((node, depth, last)) = stack.pop() {
                let branch = if last { '┕' } else { '┝' };
                let indent = "|  ".repeat(depth);
                if !seen.insert(node) {
                    out.push_str(&format!("{indent}{branch} {node} {DUPLICATE_MARKER}\n"));
                    continue;
                }
                out.push_str(&format!("{indent}{branch} {node}\n"));
                self.push_children(node, depth + 1, &mut stack);
            }
        }
        out
    }

    /// Pushes the children of `node` so that they pop in sorted order.
    fn push_children<'a>(
        &'a self,
        node: &str,
        depth: usize,
        stack: &mut Vec<(&'a str, usize, bool)>,
    ) {
        let children: Vec<&str> = self.edges_from(node).collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate().rev() {
            stack.push((child, depth, i + 1 == count));
        }
    }

    /// Renders the graph in Graphviz DOT syntax.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dependencies {\n  rankdir=LR;\n");
        for node in &self.nodes {
            out.push_str(&format!("  {};\n", dot_id(node)));
        }
        for (from, to) in self.edges() {
            out.push_str(&format!("  {} -> {};\n", dot_id(from), dot_id(to)));
        }
        out.push_str("}\n");
        out
    }

    /// Converts to the on-disk form.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedGraph {
        PersistedGraph {
            nodes: self.nodes.iter().cloned().collect(),
            edges: self
                .edges()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Rebuilds a graph from its on-disk form.
    #[must_use]
    pub fn from_persisted(persisted: PersistedGraph) -> Self {
        let mut graph = Self::new();
        for node in persisted.nodes {
            graph.add_node(node);
        }
        for (from, to) in persisted.edges {
            graph.add_edge(from, to);
        }
        graph
    }
}

fn dot_id(node: &str) -> String {
    format!("\"{}\"", node.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph {
        let mut g = DependencyGraph::new();
        g.add_edge("urn:a", "urn:b");
        g.add_edge("urn:b", "urn:c");
        g.add_edge("urn:a", "urn:c");
        g
    }

    #[test]
    fn add_edge_creates_nodes() {
        let g = chain();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert!(g.has_edge("urn:a", "urn:b"));
        assert!(!g.has_edge("urn:b", "urn:a"));
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut g = chain();
        assert!(g.remove_node("urn:b"));
        assert!(!g.contains("urn:b"));
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge("urn:a", "urn:c"));
        assert!(!g.remove_node("urn:b"));
    }

    #[test]
    fn default_roots_cover_pure_cycles() {
        let mut g = chain();
        g.add_edge("urn:x", "urn:y");
        g.add_edge("urn:y", "urn:x");
        assert_eq!(g.default_roots(), vec!["urn:a".to_string(), "urn:x".to_string()]);
    }

    #[test]
    fn render_tree_marks_duplicates_once() {
        let g = chain();
        let tree = g.render_tree(&["urn:a".to_string()]);
        let expected = "urn:a\n\
                        |  ┝ urn:b\n\
                        |  |  ┕ urn:c\n\
                        |  ┕ urn:c (*)\n";
        assert_eq!(tree, expected);
    }

    #[test]
    fn render_tree_terminates_on_cycles() {
        let mut g = DependencyGraph::new();
        g.add_edge("urn:a", "urn:b");
        g.add_edge("urn:b", "urn:a");
        let tree = g.render_tree(&g.default_roots());
        assert_eq!(tree, "urn:a\n|  ┕ urn:b\n|  |  ┕ urn:a (*)\n");
    }

    #[test]
    fn persisted_round_trip() {
        let mut g = chain();
        g.add_node("isolated.ttl");
        let restored = DependencyGraph::from_persisted(g.to_persisted());
        assert_eq!(restored, g);
    }

    #[test]
    fn dot_output_lists_edges() {
        let dot = chain().to_dot();
        assert!(dot.starts_with("digraph dependencies {"));
        assert!(dot.contains("\"urn:a\" -> \"urn:b\";"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
