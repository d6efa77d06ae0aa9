use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn directive_pattern() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(
            r#"(?m)^[ \t]*(?:#[ \t]*include[ \t]*(?:"(?P<quoted>[^"\n]+)"|<(?P<angled>[^>\n]+)>)|/include/[ \t]*"(?P<dts>[^"\n]+)")"#,
        )
        .expect("include directive pattern is valid")
    })
}

fn block_comment_pattern() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment pattern is valid"))
}

/// Form of an inclusion directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// `#include "file"`: including file's directory first, then search dirs
    Quoted,
    /// `#include <file>`: search dirs only
    Angled,
    /// `/include/ "file"`: resolved like a quoted include
    DtsInclude,
}

impl DirectiveKind {
    /// Whether the including file's own directory is searched first
    #[must_use]
    pub const fn searches_includer_dir(self) -> bool {
        !matches!(self, Self::Angled)
    }
}

/// One inclusion directive found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// File name as written
    pub target: String,
    pub kind: DirectiveKind,
    /// Line of the directive (1-indexed)
    pub line: usize,
}

/// Scan source text for inclusion directives, in order of appearance.
/// Directives inside `/* */` comments are ignored.
#[must_use]
pub fn scan_directives(text: &str) -> Vec<Directive> {
    // Blank out comments but keep their newlines so line numbers hold
    let uncommented = block_comment_pattern().replace_all(text, |caps: &regex::Captures<'_>| {
        caps[0].chars().filter(|&c| c == '\n').collect::<String>()
    });

    directive_pattern()
        .captures_iter(&uncommented)
        .filter_map(|caps| {
            let (target, kind) = if let Some(m) = caps.name("quoted") {
                (m, DirectiveKind::Quoted)
            } else if let Some(m) = caps.name("angled") {
                (m, DirectiveKind::Angled)
            } else {
                (caps.name("dts")?, DirectiveKind::DtsInclude)
            };
            let line = uncommented[..target.start()].matches('\n').count() + 1;
            Some(Directive {
                target: target.as_str().trim().to_string(),
                kind,
                line,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_directive_forms() {
        let text = r#"/dts-v1/;
#include "soc.dtsi"
# include <dt-bindings/gpio/gpio.h>
/include/ "board-common.dtsi"
/ {
	model = "x";
};
"#;
        let directives = scan_directives(text);
        assert_eq!(
            directives,
            vec![
                Directive {
                    target: "soc.dtsi".to_string(),
                    kind: DirectiveKind::Quoted,
                    line: 2
                },
                Directive {
                    target: "dt-bindings/gpio/gpio.h".to_string(),
                    kind: DirectiveKind::Angled,
                    line: 3
                },
                Directive {
                    target: "board-common.dtsi".to_string(),
                    kind: DirectiveKind::DtsInclude,
                    line: 4
                },
            ]
        );
    }

    #[test]
    fn test_commented_directives_are_ignored() {
        let text = "/*\n#include \"old.dtsi\"\n*/\n// #include \"off.dtsi\"\n#include \"new.dtsi\"\n";
        let directives = scan_directives(text);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].target, "new.dtsi");
        assert_eq!(directives[0].line, 5);
    }

    #[test]
    fn test_search_order_per_kind() {
        assert!(DirectiveKind::Quoted.searches_includer_dir());
        assert!(DirectiveKind::DtsInclude.searches_includer_dir());
        assert!(!DirectiveKind::Angled.searches_includer_dir());
    }
}
