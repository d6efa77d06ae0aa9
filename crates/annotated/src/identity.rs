use crate::types::{DisplayRow, RowKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const IDENTITY_BUCKETS: u64 = 16;
const BUCKET_STEP: u8 = 4;

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Identity of lines without a source file
    pub const NEUTRAL: Self = Self::new(255, 255, 255);
    /// Foreground of deleted lines
    pub const DELETED: Self = Self::new(255, 0, 0);
    /// Foreground of lines without provenance
    pub const MUTED: Self = Self::new(175, 175, 175);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Background identity of a source file name.
///
/// Stable across runs: the name's SHA-256 picks one of 16 buckets, and the
/// bucket moves red down and blue up while green stays fixed. Empty names
/// map to [`Rgb::NEUTRAL`].
#[must_use]
pub fn identity(name: &str) -> Rgb {
    if name.is_empty() {
        return Rgb::NEUTRAL;
    }

    let digest = Sha256::digest(name.as_bytes());
    let wide = u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]);
    // bucket < 16, so step <= 60 and neither channel leaves u8
    let step = (wide % IDENTITY_BUCKETS) as u8 * BUCKET_STEP;
    Rgb::new(255 - step * 2, 240, 192 + step)
}

/// Presentation hints for one display row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStyle {
    pub background: Rgb,
    /// `None` keeps the surface default
    pub foreground: Option<Rgb>,
    pub bold: bool,
    pub strikeout: bool,
    /// Lineage rows hide their line number
    pub hide_line_number: bool,
}

impl RowStyle {
    /// Style of a row; a pure function of the row
    #[must_use]
    pub fn for_row(row: &DisplayRow) -> Self {
        let plain = Self {
            background: Rgb::NEUTRAL,
            foreground: None,
            bold: false,
            strikeout: false,
            hide_line_number: false,
        };

        match row.kind {
            RowKind::Lineage => Self {
                hide_line_number: true,
                ..plain
            },
            RowKind::Unattributed => Self {
                foreground: Some(Rgb::MUTED),
                ..plain
            },
            RowKind::Code if row.is_deleted => Self {
                background: identity(row.display_name()),
                foreground: Some(Rgb::DELETED),
                bold: true,
                strikeout: true,
                ..plain
            },
            RowKind::Code => Self {
                background: identity(row.display_name()),
                ..plain
            },
        }
    }
}
