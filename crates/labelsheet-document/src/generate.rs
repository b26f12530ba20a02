// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-call pipeline: raw text in, PDF bytes out.

use labelsheet_core::error::Result;
use labelsheet_core::parse::{DiscardedLine, parse};
use labelsheet_core::{Preset, SheetConfig};
use tracing::{debug, info, instrument};

use crate::barcode::EanRenderer;
use crate::layout::paginate::{DocumentSummary, SheetEngine};
use crate::pdf::PdfSheetWriter;

/// A finished sheet and what went into it.
#[derive(Debug, Clone)]
pub struct GeneratedSheet {
    pub pdf: Vec<u8>,
    /// The preset the sheet was laid out with, after fallback.
    pub preset: Preset,
    pub summary: DocumentSummary,
    /// Input lines that were neither a code nor a label paired with one.
    pub discarded_lines: Vec<DiscardedLine>,
    pub pages: usize,
}

/// Parse `raw`, lay it out with the preset named by `preset_key` (unknown or
/// missing keys fall back to the default) and render the PDF.
///
/// Fails with `NoValidEntries` before any layout work when the input holds no
/// codes at all.
#[instrument(skip(config, raw), fields(input_len = raw.len(), preset = ?preset_key))]
pub fn generate_sheet(
    config: &SheetConfig,
    raw: &str,
    preset_key: Option<&str>,
) -> Result<GeneratedSheet> {
    let mut outcome = parse(raw);
    let discarded_lines = std::mem::take(&mut outcome.discarded);
    if !discarded_lines.is_empty() {
        info!(count = discarded_lines.len(), "discarded unpaired input lines");
    }
    let entries = outcome.into_entries()?;

    let preset = config.presets.resolve(preset_key);
    debug!(
        entries = entries.len(),
        preset = %preset.key,
        columns = preset.columns_per_row.get(),
        "resolved layout"
    );

    let engine = SheetEngine::new(config, EanRenderer::new());
    let mut writer = PdfSheetWriter::new(&config.page);
    writer.set_title(sheet_title(entries.len(), &preset));
    let summary = engine.build(&entries, &preset, &mut writer)?;
    let pages = writer.page_count();
    let pdf = writer.finish()?;

    Ok(GeneratedSheet {
        pdf,
        preset,
        summary,
        discarded_lines,
        pages,
    })
}

/// PDF title metadata for a sheet of `entries` codes.
fn sheet_title(entries: usize, preset: &Preset) -> String {
    let noun = if entries == 1 { "barcode" } else { "barcodes" };
    format!("{entries} {noun}, {} per row", preset.columns_per_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelsheet_core::LabelsheetError;

    use crate::barcode::SymbolError;
    use crate::render::SkipReason;

    fn pdf_pages(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes)
            .expect("generated PDF should parse")
            .get_pages()
            .len()
    }

    #[test]
    fn labelled_input_produces_a_pdf() {
        let config = SheetConfig::labelled();
        let raw = "Widget A\n12345678\n4006381333931\nBlue mug\n96385074\n";
        let sheet = generate_sheet(&config, raw, Some("3")).expect("sheet");

        assert!(sheet.pdf.starts_with(b"%PDF"));
        assert_eq!(sheet.preset.key, "3");
        assert_eq!(sheet.summary.rendered, 3);
        assert_eq!(sheet.summary.parts, 1);
        assert!(sheet.summary.skipped.is_empty());
        assert!(sheet.discarded_lines.is_empty());
        assert_eq!(pdf_pages(&sheet.pdf), sheet.pages);
    }

    #[test]
    fn input_without_codes_is_rejected() {
        let config = SheetConfig::labelled();
        let err = generate_sheet(&config, "hello\nworld\n", None).expect_err("no codes");
        assert!(matches!(err, LabelsheetError::NoValidEntries));
        assert_eq!(err.to_string(), "No valid codes");
    }

    #[test]
    fn unknown_preset_falls_back_to_default() {
        let config = SheetConfig::labelled();
        let sheet = generate_sheet(&config, "12345678", Some("99")).expect("sheet");
        assert_eq!(sheet.preset.key, config.presets.default_key());
    }

    #[test]
    fn large_inputs_are_split_into_parts() {
        let config = SheetConfig::compact();
        let raw: String = (0..120)
            .map(|i| format!("{:08}\n", 20_000_000 + i))
            .collect();
        let sheet = generate_sheet(&config, &raw, None).expect("sheet");
        assert_eq!(sheet.summary.parts, 3);
        assert_eq!(sheet.summary.tables_emitted, 3);
        assert_eq!(sheet.summary.rendered, 120);
        assert_eq!(pdf_pages(&sheet.pdf), sheet.pages);
    }

    #[test]
    fn renderer_rejection_is_skipped_not_fatal() {
        let mut config = SheetConfig::labelled();
        config.symbol.quiet_zone_modules = Some(u32::MAX);
        let sheet = generate_sheet(&config, "Widget\n12345678\n4006381333931", None)
            .expect("sheet despite rejected symbols");

        assert_eq!(sheet.summary.rendered, 0);
        assert_eq!(sheet.summary.skipped.len(), 2);
        assert!(sheet.summary.skipped.iter().all(|s| matches!(
            s.reason,
            SkipReason::Renderer(SymbolError::InvalidGeometry(_))
        )));
        assert!(sheet.pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn title_names_count_and_columns() {
        let config = SheetConfig::labelled();
        let preset = config.presets.resolve(Some("3"));
        assert_eq!(sheet_title(1, &preset), "1 barcode, 3 per row");
        assert_eq!(sheet_title(120, &preset), "120 barcodes, 3 per row");
    }

    #[test]
    fn discarded_lines_are_reported() {
        let config = SheetConfig::labelled();
        let sheet = generate_sheet(&config, "orphan\nlabel\n12345678", None).expect("sheet");
        assert_eq!(sheet.discarded_lines.len(), 1);
        assert_eq!(sheet.discarded_lines[0].text, "orphan");
        assert_eq!(sheet.summary.rendered, 1);
    }
}
