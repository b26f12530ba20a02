// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page flow — places headings, table rows and spacers top to bottom inside
// the page frame, starting a new page whenever the next item does not fit.
//
// All coordinates are millimetres from the top-left corner of the page; the
// PDF writer flips them into PDF's bottom-left space.

use labelsheet_core::types::{CellPadding, pt_to_mm};
use labelsheet_core::{PageStyle, Preset};
use tracing::debug;

use crate::layout::grid::TableBlock;
use crate::render::RenderedElement;
use crate::text::estimate_width_mm;

/// Tolerance for float accumulation when checking whether an item fits.
const FIT_EPSILON_MM: f32 = 1e-3;

/// Axis-aligned box, measured from the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_mm: f32,
    pub top_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Printable area of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub area: Rect,
}

impl PageFrame {
    pub fn from_style(style: &PageStyle) -> Self {
        let (w, h) = style.paper_size.dimensions_mm();
        let (w, h) = (w as f32, h as f32);
        let m = &style.margins;
        Self {
            page_width_mm: w,
            page_height_mm: h,
            area: Rect {
                x_mm: m.left_mm,
                top_mm: m.top_mm,
                width_mm: w - m.left_mm - m.right_mm,
                height_mm: h - m.top_mm - m.bottom_mm,
            },
        }
    }
}

/// Something drawn at a fixed position on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// A single line of text; `baseline_mm` is measured from the page top.
    Text {
        x_mm: f32,
        baseline_mm: f32,
        text: String,
        font_size_pt: f32,
    },
    /// One table cell and the element centred inside it.
    Cell {
        cell: Rect,
        content: Rect,
        element: RenderedElement,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub placements: Vec<Placement>,
}

/// Accumulates placed content page by page.
#[derive(Debug, Clone)]
pub struct PageFlow {
    frame: PageFrame,
    padding: CellPadding,
    pages: Vec<Page>,
    /// Height of the frame already consumed on the current page.
    used_mm: f32,
}

impl PageFlow {
    pub fn new(style: &PageStyle) -> Self {
        Self {
            frame: PageFrame::from_style(style),
            padding: style.cell_padding,
            pages: vec![Page::default()],
            used_mm: 0.0,
        }
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// A centred heading line.
    pub fn add_heading(&mut self, text: &str, font_size_pt: f32) {
        let font_mm = pt_to_mm(font_size_pt);
        let height = font_mm * 1.2 + font_mm / 3.0;
        self.ensure_room(height);

        let area = self.frame.area;
        let width = estimate_width_mm(text, font_size_pt);
        let placement = Placement::Text {
            x_mm: area.x_mm + ((area.width_mm - width) / 2.0).max(0.0),
            baseline_mm: area.top_mm + self.used_mm + font_mm,
            text: text.to_string(),
            font_size_pt,
        };
        self.current_page().placements.push(placement);
        self.used_mm += height;
    }

    /// Place a table row by row, centred horizontally in the frame.
    ///
    /// Rows are never split; a row taller than the whole frame gets a page of
    /// its own and overflows the bottom margin.
    pub fn add_table(&mut self, table: TableBlock<RenderedElement>, preset: &Preset) {
        let area = self.frame.area;
        let cell_width = preset.cell_width_mm;
        let table_x = (area.x_mm + (area.width_mm - preset.table_width_mm()) / 2.0).max(0.0);

        for row in table.into_rows() {
            let content_height = row.iter().map(|e| e.height_mm).fold(0.0, f32::max);
            let row_height = content_height + self.padding.vertical();
            self.ensure_room(row_height);

            let top = area.top_mm + self.used_mm;
            let padding = self.padding;
            let page = self.current_page();
            for (col, element) in row.into_iter().enumerate() {
                let cell = Rect {
                    x_mm: table_x + col as f32 * cell_width,
                    top_mm: top,
                    width_mm: cell_width,
                    height_mm: row_height,
                };
                let inner_width = cell_width - padding.horizontal();
                let content = Rect {
                    x_mm: cell.x_mm + padding.left_mm + (inner_width - element.width_mm) / 2.0,
                    top_mm: top + padding.top_mm + (content_height - element.height_mm) / 2.0,
                    width_mm: element.width_mm,
                    height_mm: element.height_mm,
                };
                page.placements.push(Placement::Cell {
                    cell,
                    content,
                    element,
                });
            }
            self.used_mm += row_height;
        }
    }

    /// Vertical space. A spacer that does not fit ends the current page and
    /// is not carried over.
    pub fn add_spacer(&mut self, height_mm: f32) {
        if self.used_mm + height_mm > self.frame.area.height_mm + FIT_EPSILON_MM {
            self.used_mm = self.frame.area.height_mm;
        } else {
            self.used_mm += height_mm;
        }
    }

    fn ensure_room(&mut self, height_mm: f32) {
        let fits = self.used_mm + height_mm <= self.frame.area.height_mm + FIT_EPSILON_MM;
        if !fits && self.used_mm > 0.0 {
            self.pages.push(Page::default());
            self.used_mm = 0.0;
            debug!(page = self.pages.len(), "page break");
        }
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::EanRenderer;
    use crate::layout::grid::pack;
    use crate::render::render_entry;
    use labelsheet_core::{Entry, SheetConfig};

    fn elements(config: &SheetConfig, preset: &Preset, n: usize) -> Vec<RenderedElement> {
        (0..n)
            .map(|i| {
                let entry = Entry::new(format!("{:08}", 10_000_000 + i), "").expect("entry");
                render_entry(&entry, preset, &EanRenderer, config)
                    .into_element()
                    .expect("rendered")
            })
            .collect()
    }

    fn row_height(config: &SheetConfig, preset: &Preset) -> f32 {
        elements(config, preset, 1)[0].height_mm + config.page.cell_padding.vertical()
    }

    fn cells_per_page(flow: &PageFlow) -> Vec<usize> {
        flow.pages()
            .iter()
            .map(|p| {
                p.placements
                    .iter()
                    .filter(|pl| matches!(pl, Placement::Cell { .. }))
                    .count()
            })
            .collect()
    }

    #[test]
    fn frame_is_page_minus_margins() {
        let frame = PageFrame::from_style(&SheetConfig::labelled().page);
        assert_eq!(frame.area.width_mm, 180.0);
        assert_eq!(frame.area.height_mm, 267.0);
        assert_eq!(frame.area.x_mm, 15.0);
    }

    #[test]
    fn rows_break_onto_new_pages() {
        let config = SheetConfig::labelled();
        let preset = config.presets.resolve(Some("3"));
        let mut flow = PageFlow::new(&config.page);

        let per_page = (flow.frame().area.height_mm / row_height(&config, &preset)).floor() as usize;
        assert!(per_page >= 1);

        let rows = per_page + 1;
        let table = pack(elements(&config, &preset, rows * 3), preset.columns_per_row);
        flow.add_table(table, &preset);

        assert_eq!(flow.page_count(), 2);
        assert_eq!(cells_per_page(&flow), vec![per_page * 3, 3]);
    }

    #[test]
    fn short_last_row_is_placed_left_to_right() {
        let config = SheetConfig::labelled();
        let preset = config.presets.resolve(Some("3"));
        let mut flow = PageFlow::new(&config.page);
        flow.add_table(pack(elements(&config, &preset, 5), preset.columns_per_row), &preset);

        let cells: Vec<Rect> = flow.pages()[0]
            .placements
            .iter()
            .filter_map(|p| match p {
                Placement::Cell { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[3].x_mm, cells[0].x_mm);
        assert_eq!(cells[4].x_mm, cells[1].x_mm);
        assert!(cells[3].top_mm > cells[0].top_mm);
    }

    #[test]
    fn content_is_centred_in_its_cell() {
        let config = SheetConfig::labelled();
        let preset = config.presets.resolve(Some("4"));
        let mut flow = PageFlow::new(&config.page);
        flow.add_table(pack(elements(&config, &preset, 1), preset.columns_per_row), &preset);

        match &flow.pages()[0].placements[0] {
            Placement::Cell { cell, content, .. } => {
                let left = content.x_mm - cell.x_mm;
                let right = (cell.x_mm + cell.width_mm) - (content.x_mm + content.width_mm);
                assert!((left - right).abs() < 1e-3);
            }
            other => panic!("expected a cell, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_spacer_ends_the_page_without_a_blank_trailer() {
        let config = SheetConfig::labelled();
        let mut flow = PageFlow::new(&config.page);
        flow.add_spacer(flow.frame().area.height_mm - 1.0);
        flow.add_spacer(5.0);
        assert_eq!(flow.page_count(), 1);

        flow.add_heading("PART 2", 18.0);
        assert_eq!(flow.page_count(), 2);
        match &flow.pages()[1].placements[0] {
            Placement::Text { baseline_mm, .. } => assert!(*baseline_mm < 30.0),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn first_item_never_forces_an_empty_page() {
        let config = SheetConfig::labelled();
        let preset = config.presets.resolve(Some("3"));
        let mut config_tall = config.clone();
        config_tall.symbol.bar_height_mm = 400.0;
        let tall = elements(&config_tall, &preset, 1);

        let mut flow = PageFlow::new(&config.page);
        flow.add_table(pack(tall, preset.columns_per_row), &preset);
        assert_eq!(flow.page_count(), 1);
        assert_eq!(cells_per_page(&flow), vec![1]);
    }
}
