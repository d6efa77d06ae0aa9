//! Per-line parsing of the annotated stream.
//!
//! A line looks like `\tcompatible = "acme,board"; /* a.dtsi:4:2-4:31, b.dts:9:1-9:20 */`.
//! The rightmost comment is the provenance chain; everything before it is
//! code. Lines a later override deleted are emitted masked, with the
//! deletion tag in front: `/* TAG */ /* status = "okay"; */ /* ... */`.

use crate::config::ParserConfig;
use crate::error::{AnnotateError, Diagnostic, Result};
use crate::paths::resolve_path;
use crate::types::{LineRecord, ProvenanceEntry};
use regex::Regex;
use std::sync::OnceLock;

/// `path:START[:COL][-END[:COL]]`
fn entry_pattern() -> &'static Regex {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    ENTRY.get_or_init(|| {
        Regex::new(r"^(?P<path>.+?):(?P<start>\d+)(?::\d+)?(?:-(?P<end>\d+)(?::\d+)?)?$")
            .expect("provenance entry pattern is valid")
    })
}

/// Outcome of parsing one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Whitespace-only line without provenance; no record, number still consumed
    Skip,

    /// A line record, plus a diagnostic if its provenance was unreadable
    Record {
        record: LineRecord,
        diagnostic: Option<Diagnostic>,
    },
}

/// How the body of a trailing comment was classified
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChainParse {
    Entries(Vec<ProvenanceEntry>),
    /// Only sentinel entries
    Absent,
    /// Looked like provenance but an entry failed to parse
    Malformed,
    /// An ordinary comment
    NotProvenance,
}

/// Parser for single annotated lines
#[derive(Debug, Clone)]
pub struct ProvenanceParser {
    config: ParserConfig,
}

impl ProvenanceParser {
    /// Create a parser with configuration
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate().map_err(AnnotateError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one physical line numbered `line_number`
    pub fn parse_line(&self, line_number: usize, raw: &str) -> ParsedLine {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let mut diagnostic = None;

        let (content, chain) = match self.split_trailing_comment(raw) {
            None => (raw.trim_end(), Vec::new()),
            // `/* TAG */ /* code */`: the last comment masks deleted code
            Some((code, _)) if self.ends_with_deletion_marker(code) => {
                (raw.trim_end(), Vec::new())
            }
            Some((code, body)) => match self.parse_chain(body) {
                ChainParse::Entries(chain) => (code.trim_end(), chain),
                ChainParse::Absent => (code.trim_end(), Vec::new()),
                ChainParse::NotProvenance => (raw.trim_end(), Vec::new()),
                ChainParse::Malformed => {
                    log::warn!("Malformed provenance on line {line_number}: {body}");
                    diagnostic = Some(Diagnostic::MalformedProvenance {
                        line: line_number,
                        comment: body.to_string(),
                    });
                    // Deleted lines keep only their masked code
                    let kept = if code.contains(&self.config.deleted_tag) {
                        code
                    } else {
                        raw
                    };
                    (kept.trim_end(), Vec::new())
                }
            },
        };

        if chain.is_empty() && content.trim().is_empty() {
            return ParsedLine::Skip;
        }

        let mut record = LineRecord::new(line_number, content).with_chain(chain);
        if content.contains(&self.config.deleted_tag) {
            record.content = self.unmask_deleted(content);
            record.is_deleted = true;
        }

        ParsedLine::Record { record, diagnostic }
    }

    /// Parse a comma-separated provenance chain.
    ///
    /// Returns `None` when the text is not a usable chain (malformed, an
    /// ordinary comment, or nothing but sentinels).
    pub fn parse_chain_text(&self, text: &str) -> Option<Vec<ProvenanceEntry>> {
        match self.parse_chain(text) {
            ChainParse::Entries(chain) => Some(chain),
            _ => None,
        }
    }

    /// Split `code /* body */` at the rightmost comment
    fn split_trailing_comment<'a>(&self, raw: &'a str) -> Option<(&'a str, &'a str)> {
        let open = self.config.comment_open.as_str();
        let idx = raw.rfind(open)?;
        let body = raw[idx + open.len()..]
            .trim()
            .strip_suffix(self.config.comment_close.as_str())?;
        Some((&raw[..idx], body.trim()))
    }

    /// Whether `code` ends with the `/* TAG */` wrapper of a deleted line
    fn ends_with_deletion_marker(&self, code: &str) -> bool {
        let open = self.config.comment_open.as_str();
        code.trim_end()
            .strip_suffix(self.config.comment_close.as_str())
            .and_then(|rest| rest.rfind(open).map(|idx| &rest[idx + open.len()..]))
            .is_some_and(|inner| inner.trim() == self.config.deleted_tag)
    }

    /// Classify a comment body. Only the last entry (the origin) must
    /// parse; unreadable ancestors are dropped.
    fn parse_chain(&self, body: &str) -> ChainParse {
        if !body.contains(':') {
            return ChainParse::NotProvenance;
        }

        let raw_entries: Vec<&str> = body
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty() && *entry != self.config.no_provenance_sentinel)
            .collect();
        let Some((last, ancestors)) = raw_entries.split_last() else {
            return ChainParse::Absent;
        };
        let Some(origin) = self.parse_entry(last) else {
            return ChainParse::Malformed;
        };

        let mut chain: Vec<ProvenanceEntry> = ancestors
            .iter()
            .filter_map(|raw_entry| {
                let entry = self.parse_entry(raw_entry);
                if entry.is_none() {
                    log::warn!("Dropping unreadable ancestor entry '{raw_entry}'");
                }
                entry
            })
            .collect();
        chain.push(origin);
        ChainParse::Entries(chain)
    }

    fn parse_entry(&self, raw_entry: &str) -> Option<ProvenanceEntry> {
        let caps = entry_pattern().captures(raw_entry)?;
        let path = caps.name("path")?.as_str().trim();
        let start_line: usize = caps.name("start")?.as_str().parse().ok()?;
        if path.is_empty() || start_line == 0 {
            return None;
        }

        // A trailing `-N` smaller than the start is a column on the same line
        let end_line = caps
            .name("end")
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .filter(|&end| end >= start_line)
            .unwrap_or(start_line);

        let resolved = resolve_path(path, &self.config.path_resolution);
        Some(ProvenanceEntry::new(resolved, start_line, end_line))
    }

    /// Remove the deletion tag and its wrapper, then unmask the commented-out
    /// code so it reads as live code again. Leading indentation is kept.
    fn unmask_deleted(&self, content: &str) -> String {
        let open = self.config.comment_open.as_str();
        let close = self.config.comment_close.as_str();
        let wrapper = format!("{open} {} {close}", self.config.deleted_tag);

        let untagged = match content.find(&wrapper) {
            Some(pos) => format!(
                "{}{}",
                &content[..pos],
                content[pos + wrapper.len()..].trim_start()
            ),
            None => content.replacen(&self.config.deleted_tag, "", 1),
        };

        let (Some(start), Some(end)) = (untagged.find(open), untagged.rfind(close)) else {
            return untagged.trim_end().to_string();
        };
        if end < start + open.len() {
            return untagged.trim_end().to_string();
        }

        let indent = &untagged[..start];
        let inner = untagged[start + open.len()..end].trim();
        let rest = untagged[end + close.len()..].trim();

        let mut unmasked = format!("{indent}{inner}");
        if !rest.is_empty() {
            unmasked.push(' ');
            unmasked.push_str(rest);
        }
        unmasked.trim_end().to_string()
    }
}
