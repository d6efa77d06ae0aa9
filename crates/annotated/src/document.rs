use crate::config::ParserConfig;
use crate::error::{Diagnostic, Result};
use crate::expander;
use crate::folder::{self, FoldOutcome};
use crate::provenance::{ParsedLine, ProvenanceParser};
use crate::types::{DisplayRow, LineRecord, TreeChild};
use serde::Serialize;
use std::borrow::Cow;
use std::io::BufRead;

/// A parsed annotated stream: concrete lines, the flat provenance index,
/// and the folded node forest
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedDocument {
    lines: Vec<LineRecord>,
    rows: Vec<DisplayRow>,
    fold: FoldOutcome,
    diagnostics: Vec<Diagnostic>,
    physical_lines: usize,
}

impl AnnotatedDocument {
    /// Parse annotated text with configuration
    pub fn parse(text: &str, config: &ParserConfig) -> Result<Self> {
        let parser = ProvenanceParser::new(config.clone())?;
        Ok(Self::parse_with(&parser, text.lines()))
    }

    /// Read a stream once and parse it. Bytes that are not valid UTF-8 are
    /// replaced per line; only I/O failures are errors.
    pub fn from_reader<R: BufRead>(mut reader: R, config: &ParserConfig) -> Result<Self> {
        let parser = ProvenanceParser::new(config.clone())?;

        let mut raw_lines = Vec::new();
        let mut buf = Vec::new();
        while reader.read_until(b'\n', &mut buf)? > 0 {
            let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let decoded = String::from_utf8_lossy(line);
            if matches!(decoded, Cow::Owned(_)) {
                log::warn!(
                    "Line {} is not valid UTF-8, undecodable bytes replaced",
                    raw_lines.len() + 1
                );
            }
            raw_lines.push(decoded.into_owned());
            buf.clear();
        }

        Ok(Self::parse_with(&parser, raw_lines.iter().map(String::as_str)))
    }

    /// Parse physical lines with an existing parser. Never fails: problems
    /// end up in [`AnnotatedDocument::diagnostics`].
    pub fn parse_with<'a, I>(parser: &ProvenanceParser, raw_lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lines = Vec::new();
        let mut diagnostics = Vec::new();
        let mut physical_lines = 0;

        for (idx, raw) in raw_lines.into_iter().enumerate() {
            physical_lines = idx + 1;
            if let ParsedLine::Record { record, diagnostic } = parser.parse_line(idx + 1, raw) {
                lines.push(record);
                diagnostics.extend(diagnostic);
            }
        }

        let opening = lines.iter().filter(|l| l.opens_node()).count();
        let closing = lines.iter().filter(|l| l.closes_node()).count();
        log::info!(
            "Parsed {} of {} lines: {} opening braces, {} closing braces",
            lines.len(),
            physical_lines,
            opening,
            closing
        );

        let rows = expander::expand(&lines);
        log::info!("Expanded {} lines into {} display rows", lines.len(), rows.len());
        let fold = folder::fold(lines.iter().cloned());
        diagnostics.extend(fold.diagnostic());

        Self {
            lines,
            rows,
            fold,
            diagnostics,
            physical_lines,
        }
    }

    /// Concrete line records in line order
    #[must_use]
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// Display rows (flat provenance index) in line order
    #[must_use]
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    /// Folded node forest
    #[must_use]
    pub fn forest(&self) -> &[TreeChild] {
        &self.fold.forest
    }

    #[must_use]
    pub const fn fold_outcome(&self) -> &FoldOutcome {
        &self.fold
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of physical lines read
    #[must_use]
    pub const fn physical_lines(&self) -> usize {
        self.physical_lines
    }

    /// Number of whitespace-only lines that produced no record
    #[must_use]
    pub fn skipped_lines(&self) -> usize {
        self.physical_lines - self.lines.len()
    }

    /// Line record by line number
    #[must_use]
    pub fn record(&self, line_number: usize) -> Option<&LineRecord> {
        self.lines
            .binary_search_by_key(&line_number, |l| l.line_number)
            .ok()
            .map(|idx| &self.lines[idx])
    }

    /// All display rows sharing a line number (lineage rows first)
    #[must_use]
    pub fn rows_for_line(&self, line_number: usize) -> &[DisplayRow] {
        let start = self.rows.partition_point(|r| r.line_number < line_number);
        let end = self.rows.partition_point(|r| r.line_number <= line_number);
        &self.rows[start..end]
    }

    /// Concrete lines whose origin is `resolved_path`
    pub fn lines_from<'a>(&'a self, resolved_path: &'a str) -> impl Iterator<Item = &'a LineRecord> {
        self.lines.iter().filter(move |line| {
            line.origin()
                .is_some_and(|origin| origin.resolved_path == resolved_path)
        })
    }
}
