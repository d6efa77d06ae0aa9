use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// File-level include graph: an edge `a -> b` means `a` includes `b`
#[derive(Debug, Clone, Default)]
pub struct IncludeGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl IncludeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning its node (existing files are reused)
    pub fn add_file(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.index.insert(path.to_string(), idx);
        idx
    }

    /// Record that `includer` includes `included`
    pub fn add_include(&mut self, includer: &str, included: &str) {
        let from = self.add_file(includer);
        let to = self.add_file(included);
        self.graph.update_edge(from, to, ());
    }

    /// Files including `path` directly
    pub fn includers_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Incoming)
    }

    /// Files `path` includes directly
    pub fn includes_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Outgoing)
    }

    fn neighbors(&self, path: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(path) else {
            return Vec::new();
        };
        let mut files: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        files.sort_unstable();
        files
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All files, in insertion order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_and_neighbors() {
        let mut graph = IncludeGraph::new();
        graph.add_include("/b/board.dts", "/b/soc.dtsi");
        graph.add_include("/b/board.dts", "/b/gpio.h");
        graph.add_include("/b/soc.dtsi", "/b/gpio.h");
        graph.add_include("/b/soc.dtsi", "/b/gpio.h");

        assert_eq!(graph.file_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.includers_of("/b/gpio.h"), vec!["/b/board.dts", "/b/soc.dtsi"]);
        assert_eq!(graph.includes_of("/b/soc.dtsi"), vec!["/b/gpio.h"]);
        assert!(graph.includes_of("/missing").is_empty());
        assert!(!graph.has_cycles());

        graph.add_include("/b/gpio.h", "/b/board.dts");
        assert!(graph.has_cycles());
    }
}
