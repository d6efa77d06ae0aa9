//! Bracket matching over the flat line list.
//!
//! Each pass takes the first unconsumed line holding `}` and the nearest
//! unconsumed line at or before it holding `{`, and collapses everything in
//! between into a [`TreeNode`]. Innermost nodes therefore fold first and
//! the result is the same for any fixed input.

use crate::error::Diagnostic;
use crate::types::{LineRecord, TreeChild, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of folding: the forest plus whatever braces stayed unmatched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldOutcome {
    /// Top-level lines and nodes in line order
    pub forest: Vec<TreeChild>,

    /// Unconsumed lines still holding `{`
    pub unmatched_open: usize,

    /// Unconsumed lines still holding `}`
    pub unmatched_close: usize,
}

impl FoldOutcome {
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.unmatched_open == 0 && self.unmatched_close == 0
    }

    /// Total number of unmatched braces
    #[must_use]
    pub const fn imbalance(&self) -> usize {
        self.unmatched_open + self.unmatched_close
    }

    /// `UnbalancedBraces` when anything stayed unmatched
    #[must_use]
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        (!self.is_balanced()).then_some(Diagnostic::UnbalancedBraces {
            unmatched_open: self.unmatched_open,
            unmatched_close: self.unmatched_close,
        })
    }

    /// Number of lines held by the forest
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.forest.iter().map(TreeChild::line_count).sum()
    }

    /// Top-level nodes
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.forest.iter().filter_map(TreeChild::as_node)
    }
}

/// Fold concrete lines into a node forest
pub fn fold<I>(lines: I) -> FoldOutcome
where
    I: IntoIterator<Item = LineRecord>,
{
    fold_forest(lines.into_iter().map(TreeChild::Line))
}

/// Fold a partially folded forest further.
///
/// Already folded nodes take no part in brace matching, so running this on
/// its own output changes nothing.
pub fn fold_forest<I>(items: I) -> FoldOutcome
where
    I: IntoIterator<Item = TreeChild>,
{
    let mut working: BTreeMap<usize, TreeChild> = items
        .into_iter()
        .map(|item| (item.first_line(), item))
        .collect();

    // No unconsumed closing line sits below the cursor
    let mut cursor = 0;

    while let Some(close) = find_line(working.range(cursor..), LineRecord::closes_node) {
        let Some(open) = find_line(working.range(..=close).rev(), LineRecord::opens_node) else {
            log::warn!("Closing brace on line {close} has no opening brace, folding stopped");
            break;
        };

        let Some(node) = collapse(&mut working, open, close) else {
            break;
        };
        log::debug!(
            "Folded node '{}' over lines {}-{}",
            node.title,
            node.span.0,
            node.span.1
        );
        working.insert(open, TreeChild::Node(node));
        cursor = close + 1;
    }

    let mut outcome = FoldOutcome::default();
    for line in working.values().filter_map(TreeChild::as_line) {
        outcome.unmatched_open += usize::from(line.opens_node());
        outcome.unmatched_close += usize::from(line.closes_node());
    }
    outcome.forest = working.into_values().collect();

    if !outcome.is_balanced() {
        log::warn!(
            "Unbalanced braces: {} unmatched opening, {} unmatched closing",
            outcome.unmatched_open,
            outcome.unmatched_close
        );
    }
    outcome
}

/// First key whose element is a line matching `pred`
fn find_line<'a, I>(mut items: I, pred: fn(&LineRecord) -> bool) -> Option<usize>
where
    I: Iterator<Item = (&'a usize, &'a TreeChild)>,
{
    items.find_map(|(&key, item)| item.as_line().filter(|line| pred(line)).map(|_| key))
}

/// Remove lines `open..=close` from the working set and build their node
fn collapse(
    working: &mut BTreeMap<usize, TreeChild>,
    open: usize,
    close: usize,
) -> Option<TreeNode> {
    let header = take_line(working, open)?;
    let footer = if close == open {
        None
    } else {
        Some(take_line(working, close)?)
    };

    let inner: Vec<usize> = working.range(open..close).map(|(&key, _)| key).collect();
    let children = inner
        .into_iter()
        .filter_map(|key| working.remove(&key))
        .collect();

    Some(TreeNode {
        title: node_title(&header.content),
        span: (open, close),
        header,
        children,
        footer,
    })
}

fn take_line(working: &mut BTreeMap<usize, TreeChild>, key: usize) -> Option<LineRecord> {
    match working.remove(&key)? {
        TreeChild::Line(line) => Some(line),
        node @ TreeChild::Node(_) => {
            working.insert(key, node);
            None
        }
    }
}

/// Declaration text in front of the opening brace
fn node_title(content: &str) -> String {
    content
        .split_once('{')
        .map_or(content, |(before, _)| before)
        .trim()
        .to_string()
}
