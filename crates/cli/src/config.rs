use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dtv.toml";
const CONFIG_DIR_NAME: &str = "dtview";

/// Path segments a project root is recognised by, in order of preference
const ROOT_MARKERS: [&str; 2] = ["arch/", "src/"];

/// User settings stored in `dtv.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtvConfig {
    /// Include directories relative to a project root
    pub include_dir_stubs: Vec<String>,

    /// Editor command template; `$srcFileName` and `$srcLineNum` are
    /// substituted
    pub editor_cmd: String,
}

impl Default for DtvConfig {
    fn default() -> Self {
        Self {
            include_dir_stubs: vec![
                "include/".to_string(),
                "scripts/dtc/include-prefixes/".to_string(),
            ],
            editor_cmd: "gedit $srcFileName +$srcLineNum".to_string(),
        }
    }
}

impl DtvConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Search directories for a base source file: its own directory first,
    /// then every existing `root + stub`, stub-major
    pub fn include_dirs(&self, base_file: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(parent) = base_file.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            dirs.push(parent.to_path_buf());
        }

        let roots = project_roots(base_file);
        for stub in &self.include_dir_stubs {
            for root in &roots {
                let candidate = root.join(stub);
                if candidate.is_dir() && !dirs.contains(&candidate) {
                    dirs.push(candidate);
                }
            }
        }
        dirs
    }
}

/// Config file to use: explicit path, then `./dtv.toml`, then the user
/// config directory
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Candidate project roots of a base source file.
///
/// Both the absolute path (symlinks kept) and the canonical path are
/// considered; each contributes the prefix before its last `arch/`, or
/// before its last `src/` when it has no `arch/`.
pub fn project_roots(base_file: &Path) -> Vec<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let absolute = dtview_annotated::normalize_lexically(base_file, cwd.as_deref());
    let canonical = fs::canonicalize(base_file).unwrap_or_else(|_| absolute.clone());

    let mut roots: Vec<PathBuf> = Vec::new();
    for variant in [&absolute, &canonical] {
        if let Some(root) = root_prefix(&variant.to_string_lossy()) {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
    }
    roots
}

fn root_prefix(path: &str) -> Option<PathBuf> {
    ROOT_MARKERS
        .iter()
        .find_map(|marker| path.rfind(marker).map(|idx| PathBuf::from(&path[..idx])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_root_prefix_prefers_arch() {
        assert_eq!(
            root_prefix("/work/linux/arch/arm64/boot/dts/a.dts"),
            Some(PathBuf::from("/work/linux/"))
        );
        assert_eq!(
            root_prefix("/work/src/arch/x.dts"),
            Some(PathBuf::from("/work/src/"))
        );
        assert_eq!(
            root_prefix("/work/zephyr/src/boards/b.dts"),
            Some(PathBuf::from("/work/zephyr/"))
        );
        assert_eq!(root_prefix("/tmp/board.dts"), None);
    }

    #[test]
    fn test_missing_config_yields_defaults() {
        let temp = tempdir().unwrap();
        let config = DtvConfig::load(&temp.path().join("none.toml")).unwrap();
        assert_eq!(config, DtvConfig::default());
    }

    #[test]
    fn test_save_then_load_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/dtv.toml");
        DtvConfig::default().save(&path).unwrap();
        assert_eq!(DtvConfig::load(&path).unwrap(), DtvConfig::default());

        fs::write(&path, "editor_cmd = \"vim +$srcLineNum $srcFileName\"\n").unwrap();
        let config = DtvConfig::load(&path).unwrap();
        assert_eq!(config.editor_cmd, "vim +$srcLineNum $srcFileName");
        assert_eq!(config.include_dir_stubs, DtvConfig::default().include_dir_stubs);
    }

    #[test]
    fn test_include_dirs_stub_major_and_existing_only() {
        let temp = tempdir().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        let boot = root.join("arch/arm/boot/dts");
        fs::create_dir_all(&boot).unwrap();
        fs::create_dir_all(root.join("include")).unwrap();
        fs::create_dir_all(root.join("scripts/dtc/include-prefixes")).unwrap();
        let base = boot.join("board.dts");
        fs::write(&base, "/dts-v1/;\n").unwrap();

        let config = DtvConfig {
            include_dir_stubs: vec![
                "missing/".to_string(),
                "scripts/dtc/include-prefixes/".to_string(),
                "include/".to_string(),
            ],
            ..DtvConfig::default()
        };
        assert_eq!(
            config.include_dirs(&base),
            vec![
                boot.clone(),
                root.join("scripts/dtc/include-prefixes/"),
                root.join("include/"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_base_yields_both_roots() {
        let temp = tempdir().unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();
        let real = base.join("real/linux");
        fs::create_dir_all(real.join("arch/arm")).unwrap();
        fs::write(real.join("arch/arm/board.dts"), "").unwrap();
        fs::create_dir_all(base.join("view")).unwrap();
        std::os::unix::fs::symlink(real.join("arch/arm"), base.join("view/arch")).unwrap();

        let roots = project_roots(&base.join("view/arch/board.dts"));
        assert_eq!(roots, vec![base.join("view/"), real.join("")]);
    }
}
