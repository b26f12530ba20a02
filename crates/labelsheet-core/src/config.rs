// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// `SheetConfig` is the immutable value object the layout engine is built
// from; `AppConfig` adds the HTTP server settings around it and is what gets
// loaded from disk.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LabelsheetError, Result};
use crate::preset::{PresetGeometry, PresetTable, preset_map};
use crate::types::{CellPadding, Margins, PaperSize, pt_to_mm};

/// Entries per generated document part.
pub const DEFAULT_MAX_ENTRIES_PER_PART: usize = 50;

/// Labels longer than this many characters are truncated.
pub const DEFAULT_MAX_LABEL_CHARS: usize = 60;

/// Widest configurable quiet zone, in modules per side.
pub const MAX_QUIET_ZONE_MODULES: u32 = 100;

/// Barcode symbol settings handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStyle {
    /// Height of the bars.
    pub bar_height_mm: f32,
    /// Width of one module (the X-dimension).
    pub x_dimension_mm: f32,
    /// Quiet zone on each side in modules; `None` uses the symbology's own
    /// minimum (11/7 for EAN-13, 7/7 for EAN-8).
    pub quiet_zone_modules: Option<u32>,
    /// Print the digits underneath the bars.
    pub human_readable: bool,
    /// Font size of the human-readable digits.
    pub font_size_pt: f32,
}

/// Product label settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub max_chars: usize,
    pub font_size_pt: f32,
    pub leading_pt: f32,
    /// Space between the symbol and the label block.
    pub gap_mm: f32,
    /// Print the code as a caption under the symbol.
    pub show_code_caption: bool,
}

/// Page geometry and spacing between table blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStyle {
    pub paper_size: PaperSize,
    pub margins: Margins,
    pub cell_padding: CellPadding,
    /// Vertical space emitted after every part's table.
    pub part_spacing_mm: f32,
    /// Emit a "PART n" heading before each part's table.
    pub part_headings: bool,
    pub heading_font_size_pt: f32,
}

/// Everything the sheet engine needs to lay out and render a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub presets: PresetTable,
    pub symbol: SymbolStyle,
    pub label: LabelStyle,
    pub page: PageStyle,
    pub max_entries_per_part: NonZeroUsize,
}

impl SheetConfig {
    /// Product-label sheets: human-readable digits, optional product names,
    /// three columns by default.
    pub fn labelled() -> Self {
        Self {
            presets: preset_table("3", &[("3", 3, 70.0), ("4", 4, 55.0), ("6", 6, 35.0)]),
            symbol: SymbolStyle {
                bar_height_mm: 20.0,
                x_dimension_mm: 0.42,
                quiet_zone_modules: None,
                human_readable: true,
                font_size_pt: 10.0,
            },
            label: LabelStyle {
                max_chars: DEFAULT_MAX_LABEL_CHARS,
                font_size_pt: 8.0,
                leading_pt: 10.0,
                gap_mm: pt_to_mm(6.0),
                show_code_caption: false,
            },
            page: PageStyle {
                paper_size: PaperSize::A4,
                margins: Margins::uniform(15.0),
                cell_padding: CellPadding {
                    top_mm: pt_to_mm(20.0),
                    right_mm: pt_to_mm(18.0),
                    bottom_mm: pt_to_mm(28.0),
                    left_mm: pt_to_mm(18.0),
                },
                part_spacing_mm: pt_to_mm(15.0),
                part_headings: false,
                heading_font_size_pt: 18.0,
            },
            max_entries_per_part: max_per_part(DEFAULT_MAX_ENTRIES_PER_PART),
        }
    }

    /// Dense code-only sheets: thin modules, the code printed as a caption,
    /// four columns by default and a heading per part.
    pub fn compact() -> Self {
        Self {
            presets: preset_table("4", &[("3", 3, 65.0), ("4", 4, 50.0), ("6", 6, 32.0)]),
            symbol: SymbolStyle {
                bar_height_mm: 15.0,
                x_dimension_mm: pt_to_mm(0.34),
                quiet_zone_modules: None,
                human_readable: false,
                font_size_pt: 9.0,
            },
            label: LabelStyle {
                max_chars: DEFAULT_MAX_LABEL_CHARS,
                font_size_pt: 9.0,
                leading_pt: 11.0,
                gap_mm: pt_to_mm(8.0),
                show_code_caption: true,
            },
            page: PageStyle {
                paper_size: PaperSize::A4,
                margins: Margins::symmetric(12.0, 10.0),
                cell_padding: CellPadding {
                    top_mm: pt_to_mm(10.0),
                    right_mm: pt_to_mm(8.0),
                    bottom_mm: pt_to_mm(18.0),
                    left_mm: pt_to_mm(8.0),
                },
                part_spacing_mm: pt_to_mm(10.0),
                part_headings: true,
                heading_font_size_pt: 18.0,
            },
            max_entries_per_part: max_per_part(DEFAULT_MAX_ENTRIES_PER_PART),
        }
    }

    /// Reject geometry that cannot produce a printable page.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("symbol.bar_height_mm", self.symbol.bar_height_mm),
            ("symbol.x_dimension_mm", self.symbol.x_dimension_mm),
            ("symbol.font_size_pt", self.symbol.font_size_pt),
            ("label.font_size_pt", self.label.font_size_pt),
            ("label.leading_pt", self.label.leading_pt),
            ("page.heading_font_size_pt", self.page.heading_font_size_pt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LabelsheetError::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("label.gap_mm", self.label.gap_mm),
            ("page.part_spacing_mm", self.page.part_spacing_mm),
            ("page.margins.top_mm", self.page.margins.top_mm),
            ("page.margins.right_mm", self.page.margins.right_mm),
            ("page.margins.bottom_mm", self.page.margins.bottom_mm),
            ("page.margins.left_mm", self.page.margins.left_mm),
            ("page.cell_padding.top_mm", self.page.cell_padding.top_mm),
            ("page.cell_padding.right_mm", self.page.cell_padding.right_mm),
            ("page.cell_padding.bottom_mm", self.page.cell_padding.bottom_mm),
            ("page.cell_padding.left_mm", self.page.cell_padding.left_mm),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LabelsheetError::Config(format!("{name} must not be negative, got {value}")));
            }
        }

        if let Some(quiet) = self.symbol.quiet_zone_modules {
            if quiet > MAX_QUIET_ZONE_MODULES {
                return Err(LabelsheetError::Config(format!(
                    "symbol.quiet_zone_modules must be at most {MAX_QUIET_ZONE_MODULES}, got {quiet}"
                )));
            }
        }

        // Truncation keeps `max_chars - 3` characters plus "...".
        if self.label.max_chars < 4 {
            return Err(LabelsheetError::Config(format!(
                "label.max_chars must be at least 4, got {}",
                self.label.max_chars
            )));
        }

        let (width, height) = self.page.paper_size.dimensions_mm();
        let margins = &self.page.margins;
        if margins.left_mm + margins.right_mm >= width as f32
            || margins.top_mm + margins.bottom_mm >= height as f32
        {
            return Err(LabelsheetError::Config("page margins leave no printable area".into()));
        }

        Ok(())
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self::labelled()
    }
}

/// Built-in tables always list their default key; the single-column
/// geometry only stands in if one ever does not.
fn preset_table(default_key: &str, entries: &[(&str, usize, f32)]) -> PresetTable {
    let presets = preset_map(entries);
    let default_geometry = presets.get(default_key).copied().unwrap_or(PresetGeometry {
        columns_per_row: NonZeroUsize::MIN,
        cell_width_mm: 60.0,
    });
    PresetTable::with_default(default_key, default_geometry, presets)
}

fn max_per_part(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

/// Persistent service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: IpAddr,
    /// Port for the HTTP server (default 5000).
    pub server_port: u16,
    /// Largest request body accepted before answering 413.
    pub max_request_bytes: usize,
    /// Value of the `Access-Control-Allow-Origin` header.
    pub cors_allow_origin: String,
    /// Layout engine configuration.
    pub sheet: SheetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            server_port: 5000,
            max_request_bytes: 4 * 1024 * 1024,
            cors_allow_origin: "*".into(),
            sheet: SheetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_request_bytes == 0 {
            return Err(LabelsheetError::Config("max_request_bytes must be positive".into()));
        }
        self.sheet.validate()
    }
}
