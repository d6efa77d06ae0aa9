//! # DTView Annotated
//!
//! Rebuilds the node hierarchy of annotated devicetree compiler output,
//! together with where every emitted line came from.
//!
//! ## Architecture
//!
//! ```text
//! Annotated text (one stream, read once)
//!     │
//!     ├──> Provenance Parser
//!     │    ├─> Split code from the trailing `/* file:line-line, ... */` chain
//!     │    ├─> Resolve paths, drop `<no-file>:<no-line>` entries
//!     │    └─> Unmask lines carrying the deletion tag
//!     │
//!     ├──> Include-Chain Expander → DisplayRow[] (flat provenance index)
//!     │    └─> Identity resolver: one stable colour per source file
//!     │
//!     └──> Bracket-Hierarchy Folder → TreeChild[] (nested node forest)
//! ```
//!
//! Nothing here fails on bad input: malformed provenance and unbalanced
//! braces come back as [`Diagnostic`]s next to a best-effort result.
//!
//! ## Example
//!
//! ```rust
//! use dtview_annotated::{AnnotatedDocument, ParserConfig};
//!
//! let text = "foo { /* a.dts:10-10 */\n}; /* a.dts:11-11 */\n";
//! let doc = AnnotatedDocument::parse(text, &ParserConfig::lexical(None)).unwrap();
//!
//! let node = doc.forest()[0].as_node().unwrap();
//! assert_eq!(node.title, "foo");
//! assert_eq!(node.span, (1, 2));
//! assert!(doc.diagnostics().is_empty());
//! ```

mod config;
mod document;
mod error;
mod expander;
mod folder;
mod identity;
mod paths;
mod provenance;
mod types;

pub use config::{ParserConfig, PathResolution, DEFAULT_DELETED_TAG, DEFAULT_NO_PROVENANCE};
pub use document::AnnotatedDocument;
pub use error::{AnnotateError, Diagnostic, Result};
pub use expander::{concrete_row, expand, expand_line};
pub use folder::{fold, fold_forest, FoldOutcome};
pub use identity::{identity, Rgb, RowStyle};
pub use paths::{normalize_lexically, resolve_path};
pub use provenance::{ParsedLine, ProvenanceParser};
pub use types::{
    display_name_of, DisplayRow, LineRecord, ProvenanceEntry, RowKind, TreeChild, TreeNode,
};
