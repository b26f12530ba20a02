// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EAN-13 / EAN-8 module encoder.
//
// An EAN-13 symbol is 95 modules: start guard, six left-half digits (L or G
// set, chosen by the first digit), centre guard, six right-half digits (R set)
// and end guard. EAN-8 is 67 modules with four digits per half, all left
// digits in the L set. The last digit is encoded as given; check digits are
// not verified.

use labelsheet_core::SymbolStyle;
use labelsheet_core::config::MAX_QUIET_ZONE_MODULES;
use labelsheet_core::types::{Symbology, pt_to_mm};
use tracing::trace;

use super::{Bar, Symbol, SymbolError, SymbolRenderer, SymbolText};

/// L-set digit patterns, 7 modules each, most significant bit first.
const L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011,
    0b0110001, 0b0101111, 0b0111011, 0b0110111, 0b0001011,
];

/// G-set digit patterns (the R set mirrored).
const G_CODES: [u8; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101,
    0b0111001, 0b0000101, 0b0010001, 0b0001001, 0b0010111,
];

/// R-set digit patterns (the L set inverted).
const R_CODES: [u8; 10] = [
    0b1110010, 0b1100110, 0b1101100, 0b1000010, 0b1011100,
    0b1001110, 0b1010000, 0b1000100, 0b1001000, 0b1110100,
];

/// Left-half parity for EAN-13, indexed by the first digit. Bit 5 is the
/// second digit; a set bit selects the G set.
const EAN13_PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011,
    0b011001, 0b011100, 0b010101, 0b010110, 0b011010,
];

const START_END_GUARD: &[bool] = &[true, false, true];
const CENTRE_GUARD: &[bool] = &[false, true, false, true, false];

/// Height of the human-readable band relative to the font size.
const TEXT_BAND_FACTOR: f32 = 1.4;

/// Encoder for EAN-8 and EAN-13 symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct EanRenderer;

impl EanRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Encode `code` into its module sequence (`true` = dark), without quiet
    /// zones.
    pub fn modules(code: &str) -> Result<(Symbology, Vec<bool>), SymbolError> {
        let symbology = Symbology::for_length(code.chars().count())
            .ok_or(SymbolError::UnsupportedLength(code.chars().count()))?;
        let digits = to_digits(code)?;

        let modules = match symbology {
            Symbology::Ean13 => encode_ean13(&digits),
            Symbology::Ean8 => encode_ean8(&digits),
        };
        Ok((symbology, modules))
    }
}

impl SymbolRenderer for EanRenderer {
    fn render(&self, code: &str, style: &SymbolStyle) -> Result<Symbol, SymbolError> {
        if !(style.x_dimension_mm.is_finite() && style.x_dimension_mm > 0.0) {
            return Err(SymbolError::InvalidGeometry(format!(
                "x-dimension must be positive, got {}",
                style.x_dimension_mm
            )));
        }
        if !(style.bar_height_mm.is_finite() && style.bar_height_mm > 0.0) {
            return Err(SymbolError::InvalidGeometry(format!(
                "bar height must be positive, got {}",
                style.bar_height_mm
            )));
        }

        let (symbology, modules) = Self::modules(code)?;
        let (quiet_left, quiet_right) = quiet_zone(symbology, style.quiet_zone_modules)?;
        let x = style.x_dimension_mm;

        let bars = bar_runs(&modules)
            .into_iter()
            .map(|(start, len)| Bar {
                x_mm: (quiet_left + start) as f32 * x,
                width_mm: len as f32 * x,
            })
            .collect::<Vec<_>>();

        let total_modules = quiet_left + modules.len() + quiet_right;
        let text = style.human_readable.then(|| SymbolText {
            text: code.to_string(),
            font_size_pt: style.font_size_pt,
            band_height_mm: pt_to_mm(style.font_size_pt) * TEXT_BAND_FACTOR,
        });

        trace!(code, modules = modules.len(), bars = bars.len(), "encoded symbol");

        Ok(Symbol {
            symbology,
            bars,
            width_mm: total_modules as f32 * x,
            bar_height_mm: style.bar_height_mm,
            text,
        })
    }
}

fn to_digits(code: &str) -> Result<Vec<u8>, SymbolError> {
    code.chars()
        .enumerate()
        .map(|(position, c)| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or(SymbolError::InvalidDigit { position, found: c })
        })
        .collect()
}

fn push_pattern(modules: &mut Vec<bool>, pattern: u8) {
    for bit in (0..7).rev() {
        modules.push(pattern & (1 << bit) != 0);
    }
}

fn encode_ean13(digits: &[u8]) -> Vec<bool> {
    let parity = EAN13_PARITY[digits[0] as usize];
    let mut modules = Vec::with_capacity(95);

    modules.extend_from_slice(START_END_GUARD);
    for (i, &d) in digits[1..7].iter().enumerate() {
        let use_g = parity & (1 << (5 - i)) != 0;
        push_pattern(&mut modules, if use_g { G_CODES[d as usize] } else { L_CODES[d as usize] });
    }
    modules.extend_from_slice(CENTRE_GUARD);
    for &d in &digits[7..13] {
        push_pattern(&mut modules, R_CODES[d as usize]);
    }
    modules.extend_from_slice(START_END_GUARD);
    modules
}

fn encode_ean8(digits: &[u8]) -> Vec<bool> {
    let mut modules = Vec::with_capacity(67);

    modules.extend_from_slice(START_END_GUARD);
    for &d in &digits[..4] {
        push_pattern(&mut modules, L_CODES[d as usize]);
    }
    modules.extend_from_slice(CENTRE_GUARD);
    for &d in &digits[4..] {
        push_pattern(&mut modules, R_CODES[d as usize]);
    }
    modules.extend_from_slice(START_END_GUARD);
    modules
}

/// Quiet zone (left, right) in modules.
fn quiet_zone(
    symbology: Symbology,
    configured: Option<u32>,
) -> Result<(usize, usize), SymbolError> {
    match (configured, symbology) {
        (Some(n), _) if n > MAX_QUIET_ZONE_MODULES => Err(SymbolError::InvalidGeometry(format!(
            "quiet zone of {n} modules exceeds {MAX_QUIET_ZONE_MODULES}"
        ))),
        (Some(n), _) => Ok((n as usize, n as usize)),
        (None, Symbology::Ean13) => Ok((11, 7)),
        (None, Symbology::Ean8) => Ok((7, 7)),
    }
}

/// Collapse a module sequence into `(start, length)` runs of dark modules.
fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &dark) in modules.iter().enumerate() {
        match (dark, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}
