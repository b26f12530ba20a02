// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelsheet — Core types, configuration, and input parsing shared across all
// crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod parse;
pub mod preset;
pub mod types;

pub use config::{AppConfig, LabelStyle, PageStyle, SheetConfig, SymbolStyle};
pub use error::LabelsheetError;
pub use parse::{DiscardedLine, ParseOutcome, parse_entries};
pub use preset::{Preset, PresetGeometry, PresetTable};
pub use types::*;
