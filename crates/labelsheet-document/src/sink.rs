// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document sink — receives the ordered stream of blocks the sheet engine
// produces.

use labelsheet_core::Preset;
use labelsheet_core::error::Result;

use crate::layout::grid::TableBlock;
use crate::render::RenderedElement;

/// Consumer of laid-out content, in emission order.
///
/// The engine never hands a sink an empty table block.
pub trait DocumentSink {
    /// A heading line above the next table.
    fn append_heading(&mut self, text: &str) -> Result<()>;

    /// One part's table, with the preset that sized its columns.
    fn append_table(&mut self, table: TableBlock<RenderedElement>, preset: &Preset) -> Result<()>;

    /// Vertical space between blocks.
    fn append_spacer(&mut self, height_mm: f32) -> Result<()>;
}

impl<S: DocumentSink + ?Sized> DocumentSink for &mut S {
    fn append_heading(&mut self, text: &str) -> Result<()> {
        (**self).append_heading(text)
    }

    fn append_table(&mut self, table: TableBlock<RenderedElement>, preset: &Preset) -> Result<()> {
        (**self).append_table(table, preset)
    }

    fn append_spacer(&mut self, height_mm: f32) -> Result<()> {
        (**self).append_spacer(height_mm)
    }
}
