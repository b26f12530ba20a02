// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render adapter — builds the drawable cell content for one entry.
//
// The symbol comes from a `SymbolRenderer`; the adapter stacks the optional
// product label and code caption underneath it and measures the whole block.
// A renderer rejection becomes `RenderOutcome::Skipped` and never reaches the
// page layout.

use labelsheet_core::types::{Symbology, pt_to_mm};
use labelsheet_core::{Entry, Preset, SheetConfig};

use crate::barcode::{Symbol, SymbolError, SymbolRenderer};
use crate::text::{chars_per_line, estimate_width_mm, wrap_text};

/// A block of centred text lines inside a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size_pt: f32,
    pub leading_pt: f32,
    /// Offset of the block's top edge from the element's top edge.
    pub top_mm: f32,
}

impl TextBlock {
    pub fn height_mm(&self) -> f32 {
        self.lines.len() as f32 * pt_to_mm(self.leading_pt)
    }

    pub fn width_mm(&self) -> f32 {
        self.lines
            .iter()
            .map(|l| estimate_width_mm(l, self.font_size_pt))
            .fold(0.0, f32::max)
    }
}

/// Drawable content of one cell: symbol, then label, then caption.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    pub code: String,
    pub symbol: Symbol,
    pub label: Option<TextBlock>,
    pub caption: Option<TextBlock>,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Why an entry produced no element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The code length has no symbology.
    UnsupportedLength(usize),
    /// The renderer rejected the code or geometry.
    Renderer(SymbolError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLength(n) => write!(f, "unsupported code length {n}"),
            Self::Renderer(err) => write!(f, "renderer rejected code: {err}"),
        }
    }
}

/// Result of rendering one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(RenderedElement),
    Skipped(SkipReason),
}

impl RenderOutcome {
    pub fn into_element(self) -> Option<RenderedElement> {
        match self {
            Self::Rendered(element) => Some(element),
            Self::Skipped(_) => None,
        }
    }
}

/// Trim a label and cap it at `max_chars` characters, replacing the tail with
/// `"..."` when it is longer.
pub fn clean_label(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cleaned: String = trimmed.chars().take(max_chars.saturating_sub(3)).collect();
    cleaned.push_str("...");
    cleaned
}

/// Render one entry for a cell of the given preset.
pub fn render_entry<R: SymbolRenderer + ?Sized>(
    entry: &Entry,
    preset: &Preset,
    renderer: &R,
    config: &SheetConfig,
) -> RenderOutcome {
    let code = entry.code();
    if Symbology::for_length(code.len()).is_none() {
        return RenderOutcome::Skipped(SkipReason::UnsupportedLength(code.len()));
    }

    let symbol = match renderer.render(code, &config.symbol) {
        Ok(symbol) => symbol,
        Err(err) => return RenderOutcome::Skipped(SkipReason::Renderer(err)),
    };

    let label_style = &config.label;
    let inner_width = (preset.cell_width_mm - config.page.cell_padding.horizontal())
        .max(preset.cell_width_mm / 2.0);
    let wrap_at = chars_per_line(inner_width, label_style.font_size_pt);

    let mut cursor = symbol.height_mm();
    let mut width = symbol.width_mm;

    let mut text_block = |text: &str| -> Option<TextBlock> {
        let lines = wrap_text(text, wrap_at);
        if lines.is_empty() {
            return None;
        }
        let block = TextBlock {
            lines,
            font_size_pt: label_style.font_size_pt,
            leading_pt: label_style.leading_pt,
            top_mm: cursor + label_style.gap_mm,
        };
        cursor = block.top_mm + block.height_mm();
        width = width.max(block.width_mm());
        Some(block)
    };

    let label = if entry.has_label() {
        text_block(&clean_label(entry.label(), label_style.max_chars))
    } else {
        None
    };
    let caption = if label_style.show_code_caption {
        text_block(code)
    } else {
        None
    };

    RenderOutcome::Rendered(RenderedElement {
        code: code.to_string(),
        symbol,
        label,
        caption,
        width_mm: width,
        height_mm: cursor,
    })
}
