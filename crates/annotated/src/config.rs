use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tag the devicetree compiler puts in front of content a later override deleted
pub const DEFAULT_DELETED_TAG: &str = "__[|>*DELETED*<|]__";

/// Placeholder the toolchain emits when it has no real source position
pub const DEFAULT_NO_PROVENANCE: &str = "<no-file>:<no-line>";

/// Configuration for parsing an annotated stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Marker opening the trailing provenance comment
    pub comment_open: String,

    /// Marker closing the trailing provenance comment
    pub comment_close: String,

    /// Chain entry meaning "no provenance"; dropped wherever it appears
    pub no_provenance_sentinel: String,

    /// Token marking a line as deleted by a later merge pass
    pub deleted_tag: String,

    /// How file paths inside provenance entries are resolved
    pub path_resolution: PathResolution,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            comment_open: "/*".to_string(),
            comment_close: "*/".to_string(),
            no_provenance_sentinel: DEFAULT_NO_PROVENANCE.to_string(),
            deleted_tag: DEFAULT_DELETED_TAG.to_string(),
            path_resolution: PathResolution::default(),
        }
    }
}

impl ParserConfig {
    /// Config that never touches the filesystem: paths are normalised
    /// lexically against `base` (or left relative when `base` is `None`).
    pub fn lexical(base: Option<PathBuf>) -> Self {
        Self {
            path_resolution: PathResolution::Lexical { base },
            ..Default::default()
        }
    }

    /// Builder: set the deletion tag
    #[must_use]
    pub fn with_deleted_tag(mut self, tag: impl Into<String>) -> Self {
        self.deleted_tag = tag.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.comment_open.is_empty() || self.comment_close.is_empty() {
            return Err("comment markers must not be empty".to_string());
        }

        if self.deleted_tag.trim().is_empty() {
            return Err("deleted_tag must not be empty".to_string());
        }

        if self.deleted_tag.contains(&self.comment_open)
            || self.deleted_tag.contains(&self.comment_close)
        {
            return Err(format!(
                "deleted_tag ({}) cannot contain a comment marker",
                self.deleted_tag
            ));
        }

        if self.no_provenance_sentinel.contains(',') {
            return Err(format!(
                "no_provenance_sentinel ({}) cannot contain ','",
                self.no_provenance_sentinel
            ));
        }

        Ok(())
    }
}

/// Strategy for turning provenance paths into resolved paths
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PathResolution {
    /// Resolve symlinks through the filesystem, falling back to lexical
    /// normalisation for paths that do not exist
    #[default]
    Canonical,

    /// Normalise `.` and `..` without touching the filesystem
    Lexical { base: Option<PathBuf> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ParserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.path_resolution, PathResolution::Canonical);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ParserConfig::default();

        config.deleted_tag = "  ".to_string();
        assert!(config.validate().is_err());

        config.deleted_tag = "/* nested */".to_string();
        assert!(config.validate().is_err());

        config = ParserConfig::default();
        config.comment_close.clear();
        assert!(config.validate().is_err());

        config = ParserConfig::default();
        config.no_provenance_sentinel = "a,b".to_string();
        assert!(config.validate().is_err());

        assert!(ParserConfig::default()
            .with_deleted_tag("__DELETED__")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"deleted_tag":"__DELETED__"}"#).unwrap();
        assert_eq!(config.deleted_tag, "__DELETED__");
        assert_eq!(config.comment_open, "/*");
        assert_eq!(config.path_resolution, PathResolution::Canonical);

        let config: ParserConfig =
            serde_json::from_str(r#"{"path_resolution":{"mode":"lexical","base":"/src"}}"#)
                .unwrap();
        assert_eq!(
            config.path_resolution,
            PathResolution::Lexical {
                base: Some(PathBuf::from("/src"))
            }
        );
    }
}
