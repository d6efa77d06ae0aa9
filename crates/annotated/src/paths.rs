use crate::config::PathResolution;
use std::path::{Component, Path, PathBuf};

/// Resolve a provenance path according to the configured strategy
pub fn resolve_path(raw: &str, resolution: &PathResolution) -> String {
    let path = Path::new(raw);
    let resolved = match resolution {
        PathResolution::Canonical => {
            std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path, None))
        }
        PathResolution::Lexical { base } => normalize_lexically(path, base.as_deref()),
    };
    resolved.to_string_lossy().into_owned()
}

/// Drop `.` segments and fold `..` into the preceding segment.
///
/// Relative paths are joined onto `base` first when one is given. A `..`
/// that would climb above the start of a relative path is kept.
pub fn normalize_lexically(path: &Path, base: Option<&Path>) -> PathBuf {
    let joined;
    let path = match base {
        Some(base) if path.is_relative() => {
            joined = base.join(path);
            joined.as_path()
        }
        _ => path,
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
