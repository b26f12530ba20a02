// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module — grid packing, part pagination, and page flow.

pub mod flow;
pub mod grid;
pub mod paginate;

pub use flow::{Page, PageFlow, PageFrame, Placement, Rect};
pub use grid::{Row, TableBlock, pack};
pub use paginate::{DocumentSummary, Part, SheetEngine, SkippedEntry, split_parts};
