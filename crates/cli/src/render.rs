use console::Style;
use dtview_annotated::{
    concrete_row, identity, DisplayRow, LineRecord, ProvenanceEntry, Rgb, RowStyle, TreeChild,
    TreeNode,
};
use dtview_include_tree::{IncludeStatus, IncludeTreeNode};
use std::fmt::Write as _;

const INDENT: &str = "  ";

/// Text renderer for core results; `color` adds terminal styling
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Folded forest: one line per node header, children indented below
    pub fn forest(&self, forest: &[TreeChild]) -> String {
        let mut out = String::new();
        for child in forest {
            self.tree_child(&mut out, child, 0);
        }
        out
    }

    fn tree_child(&self, out: &mut String, child: &TreeChild, depth: usize) {
        match child {
            TreeChild::Line(line) => self.record(out, line, depth),
            TreeChild::Node(node) => self.node(out, node, depth),
        }
    }

    fn node(&self, out: &mut String, node: &TreeNode, depth: usize) {
        let title = format!("{} [{}-{}]", node.title, node.span.0, node.span.1);
        let title = if self.color {
            Style::new().bold().force_styling(true).apply_to(title).to_string()
        } else {
            title
        };
        let _ = writeln!(
            out,
            "{}{}{}",
            INDENT.repeat(depth),
            title,
            origin_suffix(node.header.origin())
        );
        for child in &node.children {
            self.tree_child(out, child, depth + 1);
        }
        if let Some(footer) = &node.footer {
            self.record(out, footer, depth + 1);
        }
    }

    fn record(&self, out: &mut String, line: &LineRecord, depth: usize) {
        let text = format!("{:>5}  {}", line.line_number, line.content);
        let text = if self.color {
            terminal_style(&RowStyle::for_row(&concrete_row(line)))
                .apply_to(text)
                .to_string()
        } else {
            text
        };
        let _ = writeln!(
            out,
            "{}{}{}",
            INDENT.repeat(depth),
            text,
            origin_suffix(line.origin())
        );
    }

    /// Flat provenance index, one row per line
    pub fn rows(&self, rows: &[DisplayRow]) -> String {
        let mut out = String::new();
        for row in rows {
            let style = RowStyle::for_row(row);
            let number = if style.hide_line_number {
                String::new()
            } else {
                row.line_number.to_string()
            };
            let source = row.origin.as_ref().map(short_origin).unwrap_or_default();
            let text = format!("{number:>5}  {:<40}  {source}", row.content);
            let text = if self.color {
                terminal_style(&style).apply_to(text).to_string()
            } else {
                text
            };
            let _ = writeln!(out, "{}", text.trim_end());
        }
        out
    }

    /// Include tree with one file per line
    pub fn include_tree(&self, root: &IncludeTreeNode) -> String {
        let mut out = String::new();
        root.walk(&mut |node, depth| {
            let marker = match node.status {
                IncludeStatus::Resolved => "",
                IncludeStatus::Cycle => "  (cycle)",
                IncludeStatus::Unresolved => "  (not found)",
            };
            let name = if self.color && node.status == IncludeStatus::Resolved {
                Style::new()
                    .on_color256(ansi256(identity(&node.display_name)))
                    .black()
                    .force_styling(true)
                    .apply_to(&node.display_name)
                    .to_string()
            } else {
                node.display_name.clone()
            };
            let _ = writeln!(
                out,
                "{}{}  {}{}",
                INDENT.repeat(depth),
                name,
                node.file_path,
                marker
            );
        });
        out
    }
}

fn short_origin(entry: &ProvenanceEntry) -> String {
    format!("{}:{}-{}", entry.display_name, entry.start_line, entry.end_line)
}

fn origin_suffix(origin: Option<&ProvenanceEntry>) -> String {
    origin
        .map(|entry| format!("    <{}>", short_origin(entry)))
        .unwrap_or_default()
}

fn terminal_style(style: &RowStyle) -> Style {
    let mut out = Style::new().force_styling(true);
    if style.background != Rgb::NEUTRAL {
        out = out.on_color256(ansi256(style.background)).black();
    }
    if let Some(fg) = style.foreground {
        out = out.color256(ansi256(fg));
    }
    if style.bold {
        out = out.bold();
    }
    if style.strikeout {
        out = out.strikethrough();
    }
    out
}

/// Nearest colour of the 6x6x6 cube of a 256-colour terminal
fn ansi256(rgb: Rgb) -> u8 {
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    16 + 36 * level(rgb.r) + 6 * level(rgb.g) + level(rgb.b)
}
