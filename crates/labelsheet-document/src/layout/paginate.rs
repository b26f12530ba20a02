// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document paginator — splits the entry list into bounded parts and feeds one
// table block per part to a document sink.

use std::num::NonZeroUsize;

use labelsheet_core::error::Result;
use labelsheet_core::{Entry, Preset, SheetConfig};
use tracing::{debug, info, instrument, warn};

use crate::barcode::SymbolRenderer;
use crate::layout::grid::pack;
use crate::render::{RenderOutcome, SkipReason, render_entry};
use crate::sink::DocumentSink;

/// A contiguous slice of the entry list.
#[derive(Debug, Clone, PartialEq)]
pub struct Part<'a, T = Entry> {
    /// 1-based position of the part in the document.
    pub index: usize,
    /// Offset of the first item in the full list.
    pub offset: usize,
    pub items: &'a [T],
}

/// Split `items` into consecutive parts of at most `max_per_part` items.
///
/// Parts do not overlap, leave no gaps, and keep the original order; only the
/// last part may be shorter.
pub fn split_parts<T>(items: &[T], max_per_part: NonZeroUsize) -> Vec<Part<'_, T>> {
    items
        .chunks(max_per_part.get())
        .enumerate()
        .map(|(i, chunk)| Part {
            index: i + 1,
            offset: i * max_per_part.get(),
            items: chunk,
        })
        .collect()
}

/// An entry that produced no cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    /// 1-based part the entry belonged to.
    pub part: usize,
    /// 0-based position in the full entry list.
    pub position: usize,
    pub code: String,
    pub reason: SkipReason,
}

/// What a build emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSummary {
    pub parts: usize,
    pub tables_emitted: usize,
    pub rendered: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Lays out entries part by part and streams the result into a sink.
pub struct SheetEngine<'c, R> {
    config: &'c SheetConfig,
    renderer: R,
}

impl<'c, R: SymbolRenderer> SheetEngine<'c, R> {
    pub fn new(config: &'c SheetConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    /// Render, pack and emit every part of `entries`.
    ///
    /// Entries the renderer rejects are skipped and recorded in the summary.
    /// A part with nothing left to show emits nothing at all.
    #[instrument(skip_all, fields(entries = entries.len(), preset = %preset.key))]
    pub fn build<S: DocumentSink + ?Sized>(
        &self,
        entries: &[Entry],
        preset: &Preset,
        sink: &mut S,
    ) -> Result<DocumentSummary> {
        let parts = split_parts(entries, self.config.max_entries_per_part);
        let mut summary = DocumentSummary {
            parts: parts.len(),
            ..DocumentSummary::default()
        };

        for part in &parts {
            let mut elements = Vec::with_capacity(part.items.len());

            for (i, entry) in part.items.iter().enumerate() {
                match render_entry(entry, preset, &self.renderer, self.config) {
                    RenderOutcome::Rendered(element) => elements.push(element),
                    RenderOutcome::Skipped(reason) => {
                        warn!(code = entry.code(), part = part.index, %reason, "skipping entry");
                        summary.skipped.push(SkippedEntry {
                            part: part.index,
                            position: part.offset + i,
                            code: entry.code().to_string(),
                            reason,
                        });
                    }
                }
            }

            summary.rendered += elements.len();
            let table = pack(elements, preset.columns_per_row);
            if table.is_empty() {
                warn!(part = part.index, "no renderable entries in part; omitting table");
                continue;
            }

            debug!(
                part = part.index,
                rows = table.rows().len(),
                columns = table.columns().get(),
                cells = table.cell_count(),
                "emitting table block"
            );

            if self.config.page.part_headings {
                sink.append_heading(&format!("PART {}", part.index))?;
            }
            sink.append_table(table, preset)?;
            sink.append_spacer(self.config.page.part_spacing_mm)?;
            summary.tables_emitted += 1;
        }

        info!(
            parts = summary.parts,
            tables = summary.tables_emitted,
            rendered = summary.rendered,
            skipped = summary.skipped.len(),
            "document layout complete"
        );

        Ok(summary)
    }
}
