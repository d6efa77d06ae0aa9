//! # DTView Include Tree
//!
//! File-level view of a devicetree source: which file includes which, as a
//! tree rooted at the top-level `.dts`, for cross-referencing line
//! provenance.
//!
//! ## Architecture
//!
//! ```text
//! Root file + ordered search dirs
//!     │
//!     ├──> Directive scan (`#include "x"`, `#include <x>`, `/include/ "x"`)
//!     │
//!     ├──> Resolver
//!     │      ├─ Quoted: including file's dir, then search dirs
//!     │      ├─ Angled: search dirs only (first match wins)
//!     │      └─ Cycle check against the current resolution path
//!     │
//!     └──> IncludeTree
//!            ├─ IncludeTreeNode forest (resolved / cycle / unresolved)
//!            ├─ IncludeGraph (petgraph): includers, includes, cycles
//!            └─ Diagnostics
//! ```

mod directive;
mod error;
mod graph;
mod loader;
mod resolver;
mod types;

pub use directive::{scan_directives, Directive, DirectiveKind};
pub use error::{IncludeDiagnostic, IncludeTreeError, Result};
pub use graph::IncludeGraph;
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use resolver::IncludeResolver;
pub use types::{IncludeStatus, IncludeTree, IncludeTreeNode};
