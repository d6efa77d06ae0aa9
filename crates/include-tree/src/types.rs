use crate::error::IncludeDiagnostic;
use crate::graph::IncludeGraph;
use serde::{Deserialize, Serialize};

/// How a node of the include tree ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeStatus {
    /// Found and expanded
    Resolved,
    /// Already on the path from the root; not expanded again
    Cycle,
    /// Not found in any search directory, or unreadable
    Unresolved,
}

/// Node of the include tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeTreeNode {
    /// Resolved path; the name as written for unresolved includes
    pub file_path: String,

    /// Final path segment
    pub display_name: String,

    pub status: IncludeStatus,

    /// Direct inclusions, in directive order
    pub children: Vec<IncludeTreeNode>,
}

impl IncludeTreeNode {
    pub fn new(file_path: impl Into<String>, status: IncludeStatus) -> Self {
        let file_path = file_path.into();
        let display_name = dtview_annotated::display_name_of(&file_path).to_string();
        Self {
            file_path,
            display_name,
            status,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Path of nodes from `self` down to the first node (depth-first, in
    /// directive order) whose path is `file_path`
    pub fn locate(&self, file_path: &str) -> Option<Vec<&IncludeTreeNode>> {
        if self.file_path == file_path {
            return Some(vec![self]);
        }
        self.children.iter().find_map(|child| {
            child.locate(file_path).map(|mut chain| {
                chain.insert(0, self);
                chain
            })
        })
    }

    /// How many times `file_path` appears in this subtree
    pub fn occurrences(&self, file_path: &str) -> usize {
        usize::from(self.file_path == file_path)
            + self
                .children
                .iter()
                .map(|child| child.occurrences(file_path))
                .sum::<usize>()
    }

    /// Visit every node depth-first with its depth
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a IncludeTreeNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a IncludeTreeNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// Result of include resolution
#[derive(Debug, Clone, Serialize)]
pub struct IncludeTree {
    pub root: IncludeTreeNode,

    /// File-level graph of every include edge seen
    #[serde(skip)]
    pub graph: IncludeGraph,

    pub diagnostics: Vec<IncludeDiagnostic>,
}

impl IncludeTree {
    /// Nodes from the root to the first occurrence of `file_path`: the file
    /// to highlight and all its ancestors
    pub fn locate(&self, file_path: &str) -> Option<Vec<&IncludeTreeNode>> {
        self.root.locate(file_path)
    }

    pub fn occurrences(&self, file_path: &str) -> usize {
        self.root.occurrences(file_path)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
