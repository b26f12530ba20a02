// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Labelsheet.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Convert points to millimetres.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

/// Unique identifier for one generation request, carried in log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Barcode symbologies a code can be printed in, selected by code length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbology {
    Ean8,
    Ean13,
}

impl Symbology {
    /// Pick the symbology for a code of `len` digits.
    pub fn for_length(len: usize) -> Option<Self> {
        match len {
            8 => Some(Self::Ean8),
            13 => Some(Self::Ean13),
            _ => None,
        }
    }
}

/// Whether `s` is a printable code: ASCII digits only, 8 or 13 of them.
pub fn is_ean_code(s: &str) -> bool {
    Symbology::for_length(s.len()).is_some() && s.bytes().all(|b| b.is_ascii_digit())
}

/// One validated `(code, label)` pair destined for one printed cell.
///
/// The code is guaranteed to be 8 or 13 ASCII digits; the label may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    code: String,
    label: String,
}

impl Entry {
    /// Build an entry, returning `None` when `code` is not an EAN-8/EAN-13
    /// digit string.
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if !is_ean_code(&code) {
            return None;
        }
        Some(Self {
            code,
            label: label.into(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Raw label as it appeared in the input (already trimmed by the parser).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }

    pub fn symbology(&self) -> Symbology {
        // The constructor only admits 8- and 13-digit codes.
        if self.code.len() == 8 {
            Symbology::Ean8
        } else {
            Symbology::Ean13
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top_mm: f32,
    pub right_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
}

impl Margins {
    /// The same margin on all four sides.
    pub fn uniform(mm: f32) -> Self {
        Self {
            top_mm: mm,
            right_mm: mm,
            bottom_mm: mm,
            left_mm: mm,
        }
    }

    /// Separate vertical (top/bottom) and horizontal (left/right) margins.
    pub fn symmetric(vertical_mm: f32, horizontal_mm: f32) -> Self {
        Self {
            top_mm: vertical_mm,
            right_mm: horizontal_mm,
            bottom_mm: vertical_mm,
            left_mm: horizontal_mm,
        }
    }
}

/// Padding inside every table cell, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellPadding {
    pub top_mm: f32,
    pub right_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
}

impl CellPadding {
    pub fn horizontal(&self) -> f32 {
        self.left_mm + self.right_mm
    }

    pub fn vertical(&self) -> f32 {
        self.top_mm + self.bottom_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ean_code_requires_digits_and_length() {
        assert!(is_ean_code("12345678"));
        assert!(is_ean_code("4006381333931"));
        assert!(!is_ean_code("1234567"));
        assert!(!is_ean_code("123456789012"));
        assert!(!is_ean_code("1234567a"));
        assert!(!is_ean_code(""));
        // Non-ASCII digits are not accepted even when char-counted length matches.
        assert!(!is_ean_code("１２３４５６７８"));
    }

    #[test]
    fn entry_rejects_invalid_codes() {
        assert!(Entry::new("Widget", "").is_none());
        let entry = Entry::new("4006381333931", "Pencil").expect("valid entry");
        assert_eq!(entry.symbology(), Symbology::Ean13);
        assert!(entry.has_label());
    }

    #[test]
    fn symbology_by_length() {
        assert_eq!(Symbology::for_length(8), Some(Symbology::Ean8));
        assert_eq!(Symbology::for_length(13), Some(Symbology::Ean13));
        assert_eq!(Symbology::for_length(12), None);
    }

    #[test]
    fn a4_dimensions() {
        assert_eq!(PaperSize::A4.dimensions_mm(), (210, 297));
    }

    #[test]
    fn points_convert_to_millimetres() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-4);
    }
}
