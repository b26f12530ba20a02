// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode module — turns a digit string into positioned bars plus an optional
// human-readable text band.

pub mod ean;

pub use ean::EanRenderer;

use labelsheet_core::SymbolStyle;
use labelsheet_core::types::Symbology;
use thiserror::Error;

/// Why a renderer refused to build a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("no symbology encodes {0}-digit codes")]
    UnsupportedLength(usize),

    #[error("character {found:?} at position {position} is not a digit")]
    InvalidDigit { position: usize, found: char },

    #[error("invalid symbol geometry: {0}")]
    InvalidGeometry(String),
}

/// One dark bar, positioned from the symbol's left edge (quiet zone included).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x_mm: f32,
    pub width_mm: f32,
}

/// Digits printed underneath the bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolText {
    pub text: String,
    pub font_size_pt: f32,
    /// Height of the band reserved below the bars.
    pub band_height_mm: f32,
}

/// A fully laid out barcode symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub symbology: Symbology,
    pub bars: Vec<Bar>,
    /// Bounding box width, quiet zones included.
    pub width_mm: f32,
    pub bar_height_mm: f32,
    pub text: Option<SymbolText>,
}

impl Symbol {
    /// Bounding box height: bars plus the text band, if any.
    pub fn height_mm(&self) -> f32 {
        self.bar_height_mm + self.text.as_ref().map_or(0.0, |t| t.band_height_mm)
    }
}

/// Capability to draw a code as a barcode symbol.
///
/// Implementations must not panic on bad input; every rejection is a
/// [`SymbolError`].
pub trait SymbolRenderer {
    fn render(&self, code: &str, style: &SymbolStyle) -> Result<Symbol, SymbolError>;
}

impl<R: SymbolRenderer + ?Sized> SymbolRenderer for &R {
    fn render(&self, code: &str, style: &SymbolStyle) -> Result<Symbol, SymbolError> {
        (**self).render(code, style)
    }
}
