// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text metrics and wrapping for built-in Helvetica.
//
// No font files are loaded, so widths are estimated: the average Helvetica
// glyph is roughly half the font size wide.

use labelsheet_core::types::pt_to_mm;

/// Average glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.50;

/// Estimated width of `text` set in Helvetica at `font_size_pt`.
pub fn estimate_width_mm(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * glyph_width_mm(font_size_pt)
}

/// How many average glyphs fit into `width_mm`. Always at least one.
pub fn chars_per_line(width_mm: f32, font_size_pt: f32) -> usize {
    let fit = (width_mm / glyph_width_mm(font_size_pt)).floor();
    if fit.is_finite() && fit >= 1.0 { fit as usize } else { 1 }
}

fn glyph_width_mm(font_size_pt: f32) -> f32 {
    pt_to_mm(font_size_pt) * AVG_GLYPH_WIDTH_EM
}

/// Wrap `text` so that no line exceeds `max_chars` characters.
///
/// Splits on whitespace and word-wraps; words longer than `max_chars` are
/// force-broken. Character counts are Unicode scalar values, so multi-byte
/// labels never split inside a character.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_chars).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        } else if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
