use serde::{Deserialize, Serialize};
use std::fmt;

/// One position in a provenance chain: the file and line range that produced
/// an emitted line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ProvenanceEntry {
    /// Resolved file path
    pub resolved_path: String,

    /// Final path segment of `resolved_path`
    pub display_name: String,

    /// Start line in the source file (1-indexed)
    pub start_line: usize,

    /// End line in the source file (1-indexed, inclusive)
    pub end_line: usize,
}

impl ProvenanceEntry {
    /// Create an entry; `display_name` is derived from the path
    #[must_use]
    pub fn new(resolved_path: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        let resolved_path = resolved_path.into();
        let display_name = display_name_of(&resolved_path).to_string();
        Self {
            resolved_path,
            display_name,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Check if the source range covers a line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

impl fmt::Display for ProvenanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.resolved_path, self.start_line, self.end_line
        )
    }
}

/// Final `/`- or `\`-separated segment of a path string
#[must_use]
pub fn display_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// One physical line of the annotated stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineRecord {
    /// Physical line number (1-indexed), unique within a parse
    pub line_number: usize,

    /// Code with the provenance comment stripped
    pub content: String,

    /// Whether the line carried the deletion tag
    pub is_deleted: bool,

    /// Provenance chain as emitted; the last entry is the originating file
    #[serde(default)]
    pub provenance_chain: Vec<ProvenanceEntry>,
}

impl LineRecord {
    /// Create a line without provenance
    pub fn new(line_number: usize, content: impl Into<String>) -> Self {
        Self {
            line_number,
            content: content.into(),
            is_deleted: false,
            provenance_chain: Vec::new(),
        }
    }

    /// Builder: set the provenance chain
    #[must_use]
    pub fn with_chain(mut self, chain: Vec<ProvenanceEntry>) -> Self {
        self.provenance_chain = chain;
        self
    }

    /// Builder: mark as deleted
    #[must_use]
    pub const fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Immediate origin of the line (last chain entry)
    #[must_use]
    pub fn origin(&self) -> Option<&ProvenanceEntry> {
        self.provenance_chain.last()
    }

    /// Inclusion ancestors, from the second-to-last entry back to the first
    pub fn ancestors(&self) -> impl Iterator<Item = &ProvenanceEntry> {
        let len = self.provenance_chain.len().saturating_sub(1);
        self.provenance_chain[..len].iter().rev()
    }

    #[must_use]
    pub fn opens_node(&self) -> bool {
        self.content.contains('{')
    }

    #[must_use]
    pub fn closes_node(&self) -> bool {
        self.content.contains('}')
    }

    /// Whether the whole line is a node-closing statement (`};`)
    #[must_use]
    pub fn is_closing_statement(&self) -> bool {
        matches!(self.content.trim(), "};" | "}")
    }
}

/// A folded node: the declaration line, its body, and the closing line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNode {
    /// Declaration text with the opening brace removed
    pub title: String,

    /// First and last line number of the node (inclusive)
    pub span: (usize, usize),

    /// Line holding the opening brace
    pub header: LineRecord,

    /// Lines and sub-nodes strictly between the braces
    pub children: Vec<TreeChild>,

    /// Line holding the closing brace; `None` when the header closes itself
    pub footer: Option<LineRecord>,
}

impl TreeNode {
    /// Number of lines folded into this node, header and footer included
    #[must_use]
    pub fn line_count(&self) -> usize {
        1 + usize::from(self.footer.is_some())
            + self.children.iter().map(TreeChild::line_count).sum::<usize>()
    }

    /// Check if a line number falls inside the node span
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.span.0 && line <= self.span.1
    }

    /// Direct sub-nodes
    pub fn child_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().filter_map(TreeChild::as_node)
    }
}

/// Element of a folded forest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeChild {
    Line(LineRecord),
    Node(TreeNode),
}

impl TreeChild {
    /// Line number the element starts at
    #[must_use]
    pub const fn first_line(&self) -> usize {
        match self {
            Self::Line(line) => line.line_number,
            Self::Node(node) => node.span.0,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        match self {
            Self::Line(_) => 1,
            Self::Node(node) => node.line_count(),
        }
    }

    #[must_use]
    pub const fn as_line(&self) -> Option<&LineRecord> {
        match self {
            Self::Line(line) => Some(line),
            Self::Node(_) => None,
        }
    }

    #[must_use]
    pub const fn as_node(&self) -> Option<&TreeNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Line(_) => None,
        }
    }
}

/// What a display row stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Concrete line with an origin (or a deleted line without one)
    Code,
    /// Concrete line without provenance, rendered muted
    Unattributed,
    /// Non-selectable placeholder for an inclusion ancestor
    Lineage,
}

/// One row of the flat provenance index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayRow {
    /// Line number shared with the concrete line
    pub line_number: usize,

    pub kind: RowKind,

    /// Code content; empty for lineage rows
    pub content: String,

    pub is_deleted: bool,

    /// Origin for code rows, the ancestor for lineage rows
    pub origin: Option<ProvenanceEntry>,
}

impl DisplayRow {
    /// Row for a concrete line
    #[must_use]
    pub fn concrete(record: &LineRecord, kind: RowKind) -> Self {
        Self {
            line_number: record.line_number,
            kind,
            content: record.content.clone(),
            is_deleted: record.is_deleted,
            origin: record.origin().cloned(),
        }
    }

    /// Placeholder row for an inclusion ancestor
    #[must_use]
    pub fn lineage(line_number: usize, ancestor: &ProvenanceEntry) -> Self {
        Self {
            line_number,
            kind: RowKind::Lineage,
            content: String::new(),
            is_deleted: false,
            origin: Some(ancestor.clone()),
        }
    }

    /// File name shown in the source column (empty without origin)
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.origin
            .as_ref()
            .map_or("", |entry| entry.display_name.as_str())
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.kind != RowKind::Lineage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, line: usize) -> ProvenanceEntry {
        ProvenanceEntry::new(path, line, line)
    }

    #[test]
    fn test_display_name_of() {
        assert_eq!(display_name_of("/src/arch/a.dtsi"), "a.dtsi");
        assert_eq!(display_name_of("a.dts"), "a.dts");
        assert_eq!(display_name_of(r"C:\boards\b.dts"), "b.dts");
    }

    #[test]
    fn test_entry_range_is_ordered() {
        let e = ProvenanceEntry::new("/x/a.dts", 12, 3);
        assert_eq!((e.start_line, e.end_line), (12, 12));
        assert!(e.contains_line(12));
        assert_eq!(e.to_string(), "/x/a.dts:12-12");
    }

    #[test]
    fn test_ancestors_run_backwards_from_second_to_last() {
        let record = LineRecord::new(1, "x;").with_chain(vec![
            entry("/a.dts", 1),
            entry("/b.dtsi", 2),
            entry("/c.dtsi", 3),
        ]);
        let names: Vec<_> = record
            .ancestors()
            .map(|e| e.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["b.dtsi", "a.dts"]);
        assert_eq!(record.origin().map(|e| e.display_name.as_str()), Some("c.dtsi"));

        let bare = LineRecord::new(2, "y;");
        assert_eq!(bare.ancestors().count(), 0);
    }

    #[test]
    fn test_closing_statement() {
        assert!(LineRecord::new(1, "\t};").is_closing_statement());
        assert!(!LineRecord::new(1, "\tfoo = <1>; };").is_closing_statement());
    }

    #[test]
    fn test_node_line_count() {
        let node = TreeNode {
            title: "foo".to_string(),
            span: (1, 4),
            header: LineRecord::new(1, "foo {"),
            children: vec![
                TreeChild::Line(LineRecord::new(2, "a;")),
                TreeChild::Line(LineRecord::new(3, "b;")),
            ],
            footer: Some(LineRecord::new(4, "};")),
        };
        assert_eq!(node.line_count(), 4);
        assert!(node.contains_line(4));
        assert_eq!(TreeChild::Node(node).first_line(), 1);
    }
}
