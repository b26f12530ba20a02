// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — turns a laid-out page flow into PDF bytes using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Bars are emitted as filled rectangles, all text in
// the built-in Helvetica font.

use labelsheet_core::error::{LabelsheetError, Result};
use labelsheet_core::types::pt_to_mm;
use labelsheet_core::{PageStyle, Preset};
use printpdf::{
    BuiltinFont, Color, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, Rgb, TextItem, WindingOrder,
};
use tracing::{debug, info, instrument};

use crate::layout::flow::{PageFlow, Placement, Rect};
use crate::layout::grid::TableBlock;
use crate::render::{RenderedElement, TextBlock};
use crate::sink::DocumentSink;
use crate::text::estimate_width_mm;

const DEFAULT_TITLE: &str = "Labelsheet Barcodes";

/// Document sink that lays content onto pages and serialises them as PDF.
pub struct PdfSheetWriter {
    flow: PageFlow,
    heading_font_size_pt: f32,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfSheetWriter {
    pub fn new(style: &PageStyle) -> Self {
        Self {
            flow: PageFlow::new(style),
            heading_font_size_pt: style.heading_font_size_pt,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Pages laid out so far. Always at least one.
    pub fn page_count(&self) -> usize {
        self.flow.page_count()
    }

    /// Serialise every page. A flow with no content yields one blank page.
    #[instrument(skip(self), fields(pages = self.flow.page_count()))]
    pub fn finish(self) -> Result<Vec<u8>> {
        let frame = *self.flow.frame();
        let (page_w, page_h) = (Mm(frame.page_width_mm), Mm(frame.page_height_mm));
        let title = self.title.as_deref().unwrap_or(DEFAULT_TITLE);

        let mut doc = PdfDocument::new(title);
        let pages: Vec<PdfPage> = self
            .flow
            .into_pages()
            .into_iter()
            .map(|page| {
                let mut canvas = Canvas::new(frame.page_height_mm);
                for placement in &page.placements {
                    canvas.place(placement);
                }
                PdfPage::new(page_w, page_h, canvas.ops)
            })
            .collect();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }
        if output.is_empty() {
            return Err(LabelsheetError::PdfError(
                "printpdf produced an empty document".into(),
            ));
        }

        info!(bytes = output.len(), title, "Sheet PDF serialised");
        Ok(output)
    }
}

impl DocumentSink for PdfSheetWriter {
    fn append_heading(&mut self, text: &str) -> Result<()> {
        self.flow.add_heading(text, self.heading_font_size_pt);
        Ok(())
    }

    fn append_table(&mut self, table: TableBlock<RenderedElement>, preset: &Preset) -> Result<()> {
        self.flow.add_table(table, preset);
        Ok(())
    }

    fn append_spacer(&mut self, height_mm: f32) -> Result<()> {
        self.flow.add_spacer(height_mm);
        Ok(())
    }
}

// -- Drawing ------------------------------------------------------------------

/// Op list for one page; converts top-down millimetres to PDF points.
struct Canvas {
    page_height_mm: f32,
    ops: Vec<Op>,
}

impl Canvas {
    fn new(page_height_mm: f32) -> Self {
        Self {
            page_height_mm,
            ops: Vec::new(),
        }
    }

    fn point(&self, x_mm: f32, top_mm: f32) -> Point {
        Point {
            x: Pt(Mm(x_mm).into_pt().0),
            y: Pt(Mm(self.page_height_mm - top_mm).into_pt().0),
        }
    }

    fn place(&mut self, placement: &Placement) {
        match placement {
            Placement::Text {
                x_mm,
                baseline_mm,
                text,
                font_size_pt,
            } => self.text(*x_mm, *baseline_mm, text, *font_size_pt),
            Placement::Cell {
                content, element, ..
            } => self.element(content, element),
        }
    }

    fn element(&mut self, content: &Rect, element: &RenderedElement) {
        let symbol = &element.symbol;
        let symbol_x = content.x_mm + (content.width_mm - symbol.width_mm) / 2.0;

        self.ops.push(Op::SaveGraphicsState);
        self.ops.push(Op::SetFillColor {
            col: Color::Rgb(Rgb {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                icc_profile: None,
            }),
        });
        for bar in &symbol.bars {
            self.rect(
                symbol_x + bar.x_mm,
                content.top_mm,
                bar.width_mm,
                symbol.bar_height_mm,
            );
        }
        self.ops.push(Op::RestoreGraphicsState);

        if let Some(digits) = &symbol.text {
            let width = estimate_width_mm(&digits.text, digits.font_size_pt);
            self.text(
                content.x_mm + (content.width_mm - width) / 2.0,
                content.top_mm + symbol.bar_height_mm + pt_to_mm(digits.font_size_pt),
                &digits.text,
                digits.font_size_pt,
            );
        }

        for block in [&element.label, &element.caption].into_iter().flatten() {
            self.text_block(content, block);
        }
    }

    fn text_block(&mut self, content: &Rect, block: &TextBlock) {
        let leading_mm = pt_to_mm(block.leading_pt);
        let font_mm = pt_to_mm(block.font_size_pt);
        for (i, line) in block.lines.iter().enumerate() {
            let width = estimate_width_mm(line, block.font_size_pt);
            self.text(
                content.x_mm + (content.width_mm - width) / 2.0,
                content.top_mm + block.top_mm + i as f32 * leading_mm + font_mm,
                line,
                block.font_size_pt,
            );
        }
    }

    fn rect(&mut self, x_mm: f32, top_mm: f32, width_mm: f32, height_mm: f32) {
        let corners = [
            (x_mm, top_mm),
            (x_mm + width_mm, top_mm),
            (x_mm + width_mm, top_mm + height_mm),
            (x_mm, top_mm + height_mm),
        ];
        let points = corners
            .iter()
            .map(|&(x, y)| LinePoint {
                p: self.point(x, y),
                bezier: false,
            })
            .collect();
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing { points }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn text(&mut self, x_mm: f32, baseline_mm: f32, text: &str, font_size_pt: f32) {
        let pos = self.point(x_mm, baseline_mm);
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor { pos });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(font_size_pt),
            font: BuiltinFont::Helvetica,
        });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: BuiltinFont::Helvetica,
        });
        self.ops.push(Op::EndTextSection);
    }
}
