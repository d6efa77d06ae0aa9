use crate::directive::{scan_directives, Directive};
use crate::error::IncludeDiagnostic;
use crate::graph::IncludeGraph;
use crate::loader::{FsLoader, SourceLoader};
use crate::types::{IncludeStatus, IncludeTree, IncludeTreeNode};
use std::path::{Path, PathBuf};

/// Resolves the include tree of a root file against ordered search dirs
pub struct IncludeResolver<L = FsLoader> {
    search_dirs: Vec<PathBuf>,
    loader: L,
}

impl IncludeResolver<FsLoader> {
    /// Resolver reading from the filesystem
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self::with_loader(search_dirs, FsLoader)
    }
}

struct Walk {
    /// Files on the path from the root to the file being expanded
    stack: Vec<PathBuf>,
    graph: IncludeGraph,
    diagnostics: Vec<IncludeDiagnostic>,
}

impl<L: SourceLoader> IncludeResolver<L> {
    pub fn with_loader(search_dirs: Vec<PathBuf>, loader: L) -> Self {
        Self {
            search_dirs,
            loader,
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolve the full include tree rooted at `root`
    pub fn resolve(&self, root: &Path) -> IncludeTree {
        let mut walk = Walk {
            stack: Vec::new(),
            graph: IncludeGraph::new(),
            diagnostics: Vec::new(),
        };

        let root_path = self.loader.canonicalize(root);
        walk.graph.add_file(&path_text(&root_path));
        let root = self.expand(&root_path, &mut walk);

        log::info!(
            "Resolved include tree of {}: {} files, {} include edges, {} problems",
            root_path.display(),
            walk.graph.file_count(),
            walk.graph.edge_count(),
            walk.diagnostics.len()
        );

        IncludeTree {
            root,
            graph: walk.graph,
            diagnostics: walk.diagnostics,
        }
    }

    /// Find the file a directive refers to. Search directory order decides
    /// between same-named candidates; the first existing one wins.
    pub fn locate(&self, directive: &Directive, includer_dir: Option<&Path>) -> Option<PathBuf> {
        let target = Path::new(&directive.target);
        if target.is_absolute() {
            return self
                .loader
                .exists(target)
                .then(|| self.loader.canonicalize(target));
        }

        let own_dir = includer_dir.filter(|_| directive.kind.searches_includer_dir());
        own_dir
            .into_iter()
            .chain(self.search_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(target))
            .find(|candidate| self.loader.exists(candidate))
            .map(|found| self.loader.canonicalize(&found))
    }

    fn expand(&self, path: &Path, walk: &mut Walk) -> IncludeTreeNode {
        let file = path_text(path);
        let text = match self.loader.read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Cannot read {file}: {err}");
                walk.diagnostics.push(IncludeDiagnostic::UnreadableFile {
                    file: file.clone(),
                    message: err.to_string(),
                });
                return IncludeTreeNode::new(file, IncludeStatus::Unresolved);
            }
        };

        let mut node = IncludeTreeNode::new(file.clone(), IncludeStatus::Resolved);
        walk.stack.push(path.to_path_buf());

        for directive in scan_directives(&text) {
            let Some(child) = self.locate(&directive, path.parent()) else {
                log::warn!("Cannot resolve include \"{}\" from {file}", directive.target);
                walk.diagnostics.push(IncludeDiagnostic::UnresolvableInclude {
                    includer: file.clone(),
                    requested: directive.target.clone(),
                });
                node.children.push(IncludeTreeNode::new(
                    directive.target,
                    IncludeStatus::Unresolved,
                ));
                continue;
            };

            let child_file = path_text(&child);
            walk.graph.add_include(&file, &child_file);

            if walk.stack.contains(&child) {
                log::warn!("Cyclic include of {child_file} from {file}");
                walk.diagnostics.push(IncludeDiagnostic::CyclicInclude {
                    includer: file.clone(),
                    file: child_file.clone(),
                });
                node.children
                    .push(IncludeTreeNode::new(child_file, IncludeStatus::Cycle));
                continue;
            }

            log::debug!("{file} includes {child_file}");
            node.children.push(self.expand(&child, walk));
        }

        walk.stack.pop();
        node
    }
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use crate::loader::MemoryLoader;
    use pretty_assertions::assert_eq;

    fn resolver(loader: MemoryLoader, dirs: &[&str]) -> IncludeResolver<MemoryLoader> {
        IncludeResolver::with_loader(dirs.iter().map(PathBuf::from).collect(), loader)
    }

    fn shape(node: &IncludeTreeNode) -> String {
        if node.children.is_empty() {
            return format!("{}:{:?}", node.display_name, node.status);
        }
        let children: Vec<_> = node.children.iter().map(shape).collect();
        format!("{}({})", node.display_name, children.join(","))
    }

    #[test]
    fn test_nested_includes() {
        let loader = MemoryLoader::new()
            .with_file("/p/board.dts", "#include \"soc.dtsi\"\n#include <dt-bindings/gpio.h>\n")
            .with_file("/p/soc.dtsi", "/include/ \"clocks.dtsi\"\n")
            .with_file("/p/clocks.dtsi", "/ { };\n")
            .with_file("/inc/dt-bindings/gpio.h", "#define GPIO_ACTIVE_HIGH 0\n");

        let tree = resolver(loader, &["/inc"]).resolve(Path::new("/p/board.dts"));
        assert!(tree.is_clean());
        assert_eq!(
            shape(&tree.root),
            "board.dts(soc.dtsi(clocks.dtsi:Resolved),gpio.h:Resolved)"
        );
        assert_eq!(tree.graph.file_count(), 4);
        assert_eq!(tree.graph.includers_of("/p/clocks.dtsi"), vec!["/p/soc.dtsi"]);
    }

    #[test]
    fn test_first_search_dir_wins() {
        let loader = MemoryLoader::new()
            .with_file("/p/board.dts", "#include <common.dtsi>\n")
            .with_file("/first/common.dtsi", "")
            .with_file("/second/common.dtsi", "");

        let tree = resolver(loader.clone(), &["/first", "/second"]).resolve(Path::new("/p/board.dts"));
        assert_eq!(tree.root.children[0].file_path, "/first/common.dtsi");

        let tree = resolver(loader, &["/second", "/first"]).resolve(Path::new("/p/board.dts"));
        assert_eq!(tree.root.children[0].file_path, "/second/common.dtsi");
    }

    #[test]
    fn test_quoted_prefers_includer_dir_angled_does_not() {
        let loader = MemoryLoader::new()
            .with_file("/p/a.dtsi", "")
            .with_file("/inc/a.dtsi", "");
        let r = resolver(loader, &["/inc"]);
        let dir = Some(Path::new("/p"));

        let quoted = Directive {
            target: "a.dtsi".to_string(),
            kind: DirectiveKind::Quoted,
            line: 1,
        };
        assert_eq!(r.locate(&quoted, dir), Some(PathBuf::from("/p/a.dtsi")));

        let angled = Directive {
            kind: DirectiveKind::Angled,
            ..quoted
        };
        assert_eq!(r.locate(&angled, dir), Some(PathBuf::from("/inc/a.dtsi")));
    }

    #[test]
    fn test_cycle_is_cut_and_reported() {
        let loader = MemoryLoader::new()
            .with_file("/p/a.dtsi", "#include \"b.dtsi\"\n")
            .with_file("/p/b.dtsi", "#include \"a.dtsi\"\n");

        let tree = resolver(loader, &[]).resolve(Path::new("/p/a.dtsi"));
        assert_eq!(shape(&tree.root), "a.dtsi(b.dtsi(a.dtsi:Cycle))");
        assert_eq!(
            tree.diagnostics,
            vec![IncludeDiagnostic::CyclicInclude {
                includer: "/p/b.dtsi".to_string(),
                file: "/p/a.dtsi".to_string(),
            }]
        );
        assert!(tree.graph.has_cycles());
    }

    #[test]
    fn test_shared_include_is_not_a_cycle() {
        let loader = MemoryLoader::new()
            .with_file("/p/board.dts", "#include \"x.dtsi\"\n#include \"y.dtsi\"\n")
            .with_file("/p/x.dtsi", "#include \"common.h\"\n")
            .with_file("/p/y.dtsi", "#include \"common.h\"\n")
            .with_file("/p/common.h", "");

        let tree = resolver(loader, &[]).resolve(Path::new("/p/board.dts"));
        assert!(tree.is_clean());
        assert_eq!(tree.occurrences("/p/common.h"), 2);
        assert!(!tree.graph.has_cycles());
    }

    #[test]
    fn test_missing_include_becomes_unresolved_leaf() {
        let loader = MemoryLoader::new().with_file("/p/board.dts", "#include <missing.h>\n");

        let tree = resolver(loader, &["/inc"]).resolve(Path::new("/p/board.dts"));
        let leaf = &tree.root.children[0];
        assert_eq!(leaf.file_path, "missing.h");
        assert_eq!(leaf.status, IncludeStatus::Unresolved);
        assert_eq!(
            tree.diagnostics,
            vec![IncludeDiagnostic::UnresolvableInclude {
                includer: "/p/board.dts".to_string(),
                requested: "missing.h".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_root_is_unresolved() {
        let tree = resolver(MemoryLoader::new(), &[]).resolve(Path::new("/p/none.dts"));
        assert_eq!(tree.root.status, IncludeStatus::Unresolved);
        assert_eq!(tree.diagnostics.len(), 1);
    }
}
