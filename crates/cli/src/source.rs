use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$(?:(?P<escaped>\$)|\{(?P<braced>\w+)\}|(?P<bare>\w+))")
            .expect("placeholder pattern is valid")
    })
}

/// Lines `start..=end` (1-based) of a source file; the range is clamped to
/// the file
pub fn read_source_lines(path: &Path, start: usize, end: usize) -> Result<Vec<String>> {
    if start == 0 || end < start {
        bail!("Invalid line range {start}-{end}");
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source {}", path.display()))?;
    Ok(text
        .lines()
        .skip(start - 1)
        .take(end - start + 1)
        .map(str::to_string)
        .collect())
}

/// Expand an editor command template into its arguments.
///
/// The template is split on whitespace first, so a file name containing
/// spaces stays one argument. `$$` is a literal `$`; unknown placeholders
/// are kept as written.
pub fn expand_editor_command(template: &str, file: &str, line: usize) -> Vec<String> {
    let line = line.to_string();
    template
        .split_whitespace()
        .map(|arg| {
            placeholder_pattern()
                .replace_all(arg, |caps: &Captures<'_>| {
                    if caps.name("escaped").is_some() {
                        return "$".to_string();
                    }
                    let name = caps
                        .name("braced")
                        .or_else(|| caps.name("bare"))
                        .map_or("", |m| m.as_str());
                    match name {
                        "srcFileName" => file.to_string(),
                        "srcLineNum" => line.clone(),
                        _ => caps[0].to_string(),
                    }
                })
                .into_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_expand_default_template() {
        assert_eq!(
            expand_editor_command("gedit $srcFileName +$srcLineNum", "/k/a b.dtsi", 42),
            vec!["gedit", "/k/a b.dtsi", "+42"]
        );
    }

    #[test]
    fn test_expand_braced_escaped_and_unknown() {
        assert_eq!(
            expand_editor_command("code -g ${srcFileName}:${srcLineNum} $$HOME $other", "x.dts", 7),
            vec!["code", "-g", "x.dts:7", "$HOME", "$other"]
        );
    }

    #[test]
    fn test_read_source_lines_clamps() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.dtsi");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();

        assert_eq!(read_source_lines(&path, 2, 3).unwrap(), vec!["two", "three"]);
        assert_eq!(read_source_lines(&path, 3, 10).unwrap(), vec!["three"]);
        assert!(read_source_lines(&path, 0, 1).is_err());
        assert!(read_source_lines(&temp.path().join("none"), 1, 1).is_err());
    }
}
