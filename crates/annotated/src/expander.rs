use crate::types::{DisplayRow, LineRecord, RowKind};

/// Expand one line into its display rows.
///
/// Lines with an include chain get one lineage row per ancestor, from the
/// second-to-last entry back to the first, ahead of the concrete row. A
/// deleted closing brace does not repeat its lineage. Lines without
/// provenance become a single muted row unless they are deleted.
#[must_use]
pub fn expand_line(record: &LineRecord) -> Vec<DisplayRow> {
    if record.provenance_chain.is_empty() {
        return vec![concrete_row(record)];
    }

    let mut rows = Vec::with_capacity(record.provenance_chain.len());
    if !(record.is_deleted && record.is_closing_statement()) {
        rows.extend(
            record
                .ancestors()
                .map(|ancestor| DisplayRow::lineage(record.line_number, ancestor)),
        );
    }
    rows.push(concrete_row(record));
    rows
}

/// The concrete row of a line, without its lineage
#[must_use]
pub fn concrete_row(record: &LineRecord) -> DisplayRow {
    let kind = if record.origin().is_some() || record.is_deleted {
        RowKind::Code
    } else {
        RowKind::Unattributed
    };
    DisplayRow::concrete(record, kind)
}

/// Expand every line, keeping line-number order
#[must_use]
pub fn expand(records: &[LineRecord]) -> Vec<DisplayRow> {
    records.iter().flat_map(expand_line).collect()
}
