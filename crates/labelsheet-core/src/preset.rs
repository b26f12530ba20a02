// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid presets — named column counts and cell widths, with a designated
// default that every unknown or missing key falls back to.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{LabelsheetError, Result};

/// Geometry stored for one preset key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetGeometry {
    pub columns_per_row: NonZeroUsize,
    pub cell_width_mm: f32,
}

impl PresetGeometry {
    pub fn new(columns_per_row: usize, cell_width_mm: f32) -> Option<Self> {
        Some(Self {
            columns_per_row: NonZeroUsize::new(columns_per_row)?,
            cell_width_mm,
        })
    }
}

/// A resolved preset: the key that was actually used plus its geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub key: String,
    pub columns_per_row: NonZeroUsize,
    pub cell_width_mm: f32,
}

impl Preset {
    /// Total width of a full row.
    pub fn table_width_mm(&self) -> f32 {
        self.columns_per_row.get() as f32 * self.cell_width_mm
    }
}

/// Read-only mapping from preset keys to geometry.
///
/// The default key is guaranteed to be present, so [`PresetTable::resolve`]
/// never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPresetTable", into = "RawPresetTable")]
pub struct PresetTable {
    default_key: String,
    default_geometry: PresetGeometry,
    presets: BTreeMap<String, PresetGeometry>,
}

#[derive(Serialize, Deserialize)]
struct RawPresetTable {
    default_key: String,
    presets: BTreeMap<String, PresetGeometry>,
}

impl TryFrom<RawPresetTable> for PresetTable {
    type Error = LabelsheetError;

    fn try_from(raw: RawPresetTable) -> Result<Self> {
        Self::new(raw.default_key, raw.presets)
    }
}

impl From<PresetTable> for RawPresetTable {
    fn from(table: PresetTable) -> Self {
        Self {
            default_key: table.default_key,
            presets: table.presets,
        }
    }
}

impl PresetTable {
    /// Build a table, rejecting a default key that has no entry.
    pub fn new(
        default_key: impl Into<String>,
        presets: BTreeMap<String, PresetGeometry>,
    ) -> Result<Self> {
        let default_key = default_key.into();
        let Some(&default_geometry) = presets.get(&default_key) else {
            return Err(LabelsheetError::Config(format!(
                "default preset {default_key:?} is not in the preset table"
            )));
        };
        if let Some((key, _)) = presets
            .iter()
            .find(|(_, g)| !(g.cell_width_mm.is_finite() && g.cell_width_mm > 0.0))
        {
            return Err(LabelsheetError::Config(format!(
                "preset {key:?} has a non-positive cell width"
            )));
        }
        Ok(Self {
            default_key,
            default_geometry,
            presets,
        })
    }

    /// Build a table that is valid by construction: `default_geometry` is
    /// stored under `default_key`, replacing any entry already there.
    pub fn with_default(
        default_key: impl Into<String>,
        default_geometry: PresetGeometry,
        mut presets: BTreeMap<String, PresetGeometry>,
    ) -> Self {
        let default_key = default_key.into();
        presets.insert(default_key.clone(), default_geometry);
        Self {
            default_key,
            default_geometry,
            presets,
        }
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Known keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&PresetGeometry> {
        self.presets.get(key)
    }

    /// Resolve a requested key, degrading to the default preset when the key
    /// is absent or unknown. Keys match exactly; `" 4"` is not `"4"`.
    pub fn resolve(&self, key: Option<&str>) -> Preset {
        let requested = key.filter(|k| !k.is_empty());
        let (key, geometry) = match requested.and_then(|k| self.presets.get_key_value(k)) {
            Some((k, g)) => (k, g),
            None => {
                if let Some(k) = requested {
                    tracing::debug!(requested = k, fallback = %self.default_key, "unknown preset key");
                }
                (&self.default_key, &self.default_geometry)
            }
        };
        Preset {
            key: key.clone(),
            columns_per_row: geometry.columns_per_row,
            cell_width_mm: geometry.cell_width_mm,
        }
    }
}

/// Convenience for building preset maps from `(key, columns, width)` triples.
pub(crate) fn preset_map(entries: &[(&str, usize, f32)]) -> BTreeMap<String, PresetGeometry> {
    entries
        .iter()
        .filter_map(|&(key, columns, width)| {
            PresetGeometry::new(columns, width).map(|g| (key.to_string(), g))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PresetTable {
        PresetTable::new(
            "3",
            preset_map(&[("3", 3, 70.0), ("4", 4, 55.0), ("6", 6, 35.0)]),
        )
        .expect("valid table")
    }

    #[test]
    fn known_key_resolves_to_its_geometry() {
        let preset = table().resolve(Some("6"));
        assert_eq!(preset.key, "6");
        assert_eq!(preset.columns_per_row.get(), 6);
        assert_eq!(preset.cell_width_mm, 35.0);
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        let preset = table().resolve(Some("12"));
        assert_eq!(preset.key, "3");
        assert_eq!(preset.columns_per_row.get(), 3);
    }

    #[test]
    fn missing_or_blank_key_falls_back_to_default() {
        assert_eq!(table().resolve(None).key, "3");
        assert_eq!(table().resolve(Some("  ")).key, "3");
    }

    #[test]
    fn padded_key_is_unknown() {
        assert_eq!(table().resolve(Some(" 4")).key, "3");
        assert_eq!(table().resolve(Some("4 ")).key, "3");
        assert_eq!(table().resolve(Some("4")).key, "4");
    }

    #[test]
    fn default_key_must_exist() {
        let err = PresetTable::new("9", preset_map(&[("3", 3, 70.0)])).unwrap_err();
        assert!(matches!(err, LabelsheetError::Config(_)));
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(PresetTable::new("3", preset_map(&[("3", 3, 0.0)])).is_err());
    }

    #[test]
    fn zero_columns_never_enter_the_table() {
        assert!(PresetGeometry::new(0, 50.0).is_none());
    }

    #[test]
    fn deserialization_validates_default_key() {
        let json = r#"{"default_key":"4","presets":{"3":{"columns_per_row":3,"cell_width_mm":70.0}}}"#;
        assert!(serde_json::from_str::<PresetTable>(json).is_err());

        let json = r#"{"default_key":"3","presets":{"3":{"columns_per_row":3,"cell_width_mm":70.0}}}"#;
        let table: PresetTable = serde_json::from_str(json).expect("valid json");
        assert_eq!(table.default_key(), "3");
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn with_default_always_contains_its_default() {
        let geometry = PresetGeometry::new(2, 90.0).expect("geometry");
        let table = PresetTable::with_default("wide", geometry, preset_map(&[("3", 3, 70.0)]));
        assert_eq!(table.get("wide"), Some(&geometry));
        assert_eq!(table.resolve(Some("nope")).key, "wide");
        assert_eq!(table.keys().count(), 2);
    }
}
