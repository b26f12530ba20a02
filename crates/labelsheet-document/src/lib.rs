// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelsheet-document — Everything between validated entries and PDF bytes.
//
// Provides the EAN-8/EAN-13 symbol renderer, the per-entry render adapter,
// the grid packer and part paginator, the page flow that places rows onto
// pages, and a `printpdf`-backed document sink.

pub mod barcode;
pub mod generate;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod sink;
pub mod text;

// Re-export the primary types so callers can use `labelsheet_document::SheetEngine` etc.
pub use barcode::{EanRenderer, Symbol, SymbolError, SymbolRenderer};
pub use generate::{GeneratedSheet, generate_sheet};
pub use layout::grid::{Row, TableBlock, pack};
pub use layout::paginate::{DocumentSummary, Part, SheetEngine, SkippedEntry, split_parts};
pub use pdf::PdfSheetWriter;
pub use render::{RenderOutcome, RenderedElement, SkipReason, clean_label, render_entry};
pub use sink::DocumentSink;
