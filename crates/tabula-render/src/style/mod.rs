//! Layouts: the named visual styles applied to a table.
//!
//! A layout resolves to an immutable [`StyleProfile`]. Resolution goes through
//! the [`StyleResolver`] trait so callers can plug in their own configuration
//! source; [`LayoutRegistry`] is the YAML-backed implementation and
//! [`StyleCache`] memoizes resolved profiles.
//!
//! # YAML shape
//!
//! ```yaml
//! academic:
//!   extends: corporate
//!   font_family: [Times New Roman, DejaVu Serif]
//!   header_bold: false
//!   header:
//!     palette: grays_cool
//!     tone: light
//!   alignment:
//!     content_horizontal: center
//! ```
//!
//! Fields not set by a layout come from the layout it `extends`. Nested
//! mappings (`alignment`, the palette references) are merged key by key.

mod cache;
mod registry;

pub use cache::StyleCache;
pub use registry::{LayoutRegistry, DEFAULT_LAYOUT, LAYOUT_EXTENSIONS};

use serde::{Deserialize, Serialize};

use crate::classify::CategoryRegistry;
use crate::error::{Result, TableError};
use crate::palette::PaletteStore;

/// Horizontal text alignment within a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text alignment within a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Alignment rules for header, content and numeric cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    pub header_vertical: VAlign,
    pub header_horizontal: Align,
    pub content_vertical: VAlign,
    pub content_horizontal: Align,
    /// Used instead of `content_horizontal` for numeric cells.
    pub numeric_horizontal: Align,
}

impl Default for Alignment {
    fn default() -> Self {
        Self {
            header_vertical: VAlign::Center,
            header_horizontal: Align::Center,
            content_vertical: VAlign::Center,
            content_horizontal: Align::Left,
            numeric_horizontal: Align::Right,
        }
    }
}

/// A palette and tone pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteRef {
    pub palette: String,
    pub tone: String,
}

impl PaletteRef {
    pub fn new(palette: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            palette: palette.into(),
            tone: tone.into(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Fully resolved visual style of one table.
///
/// Sizes are in points, lengths in inches. `cell_padding` is a fraction of the
/// column width applied on each side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleProfile {
    /// Primary font first, then fallbacks.
    pub font_family: Vec<String>,
    /// Irregular hand-drawn font; rows get extra height.
    #[serde(default)]
    pub hand_drawn: bool,
    pub header_font_size: f64,
    pub content_font_size: f64,
    pub cell_padding: f64,
    pub grid_line_width: f64,
    #[serde(default = "default_true")]
    pub header_bold: bool,
    #[serde(default)]
    pub alternating_rows: bool,
    pub table_width_inches: f64,
    pub base_cell_height_inches: f64,
    pub min_row_height_factor: f64,
    /// Outer margin around the grid.
    pub padding_inches: f64,
    /// Maximum characters per content line.
    pub wrap_width: usize,
    /// Font placed first for code-like cells.
    pub mono_font: String,
    #[serde(default)]
    pub alignment: Alignment,
    pub header: PaletteRef,
    pub border: PaletteRef,
    pub alternate: PaletteRef,
}

impl StyleProfile {
    /// Parses a complete profile from YAML, then validates it.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self> {
        let profile: StyleProfile =
            serde_yaml::from_str(yaml).map_err(|e| TableError::config(origin, e))?;
        profile.validate(origin)?;
        Ok(profile)
    }

    /// Rejects values that would produce a degenerate table.
    pub fn validate(&self, origin: &str) -> Result<()> {
        if self.font_family.is_empty() {
            return Err(TableError::config(origin, "font_family must not be empty"));
        }
        let positive = [
            ("header_font_size", self.header_font_size),
            ("content_font_size", self.content_font_size),
            ("table_width_inches", self.table_width_inches),
            ("base_cell_height_inches", self.base_cell_height_inches),
            ("min_row_height_factor", self.min_row_height_factor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TableError::config(
                    origin,
                    format!("{} must be positive, got {}", field, value),
                ));
            }
        }
        let non_negative = [
            ("cell_padding", self.cell_padding),
            ("grid_line_width", self.grid_line_width),
            ("padding_inches", self.padding_inches),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TableError::config(
                    origin,
                    format!("{} must not be negative, got {}", field, value),
                ));
            }
        }
        if self.cell_padding >= 0.5 {
            return Err(TableError::config(
                origin,
                "cell_padding must be below 0.5 of the column width",
            ));
        }
        if self.wrap_width == 0 {
            return Err(TableError::config(origin, "wrap_width must be at least 1"));
        }
        Ok(())
    }

    /// Font list for a cell, with the monospace font first for code.
    pub fn font_stack(&self, code: bool) -> Vec<&str> {
        let mut fonts: Vec<&str> = Vec::with_capacity(self.font_family.len() + 1);
        if code {
            fonts.push(&self.mono_font);
        }
        fonts.extend(
            self.font_family
                .iter()
                .map(String::as_str)
                .filter(|f| !code || *f != self.mono_font),
        );
        fonts
    }
}

/// Source of layouts, palettes and category rules.
pub trait StyleResolver {
    /// Resolves a layout name into a profile.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownLayout`] for unregistered names, other
    /// configuration errors for invalid or incomplete layouts.
    fn resolve(&self, layout: &str) -> Result<StyleProfile>;

    fn palettes(&self) -> &PaletteStore;

    fn categories(&self) -> &CategoryRegistry;

    /// Registered layout names, sorted.
    fn layout_names(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
font_family: [Helvetica, DejaVu Sans]
header_font_size: 11
content_font_size: 10
cell_padding: 0.04
grid_line_width: 0.5
table_width_inches: 6.5
base_cell_height_inches: 0.45
min_row_height_factor: 1.25
padding_inches: 0.04
wrap_width: 20
mono_font: DejaVu Sans Mono
header: { palette: grays_warm, tone: medium_light }
border: { palette: grays_warm, tone: medium }
alternate: { palette: grays_warm, tone: light }
"#;

    #[test]
    fn test_parse_with_defaults() {
        let profile = StyleProfile::from_yaml("inline", FULL).unwrap();
        assert!(profile.header_bold);
        assert!(!profile.alternating_rows);
        assert!(!profile.hand_drawn);
        assert_eq!(profile.alignment, Alignment::default());
        assert_eq!(profile.header, PaletteRef::new("grays_warm", "medium_light"));
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let yaml = FULL.replace("wrap_width: 20\n", "");
        let err = StyleProfile::from_yaml("inline", &yaml).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(err.to_string().contains("wrap_width"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = format!("{}colour: red\n", FULL);
        assert!(StyleProfile::from_yaml("inline", &yaml).is_err());
    }

    #[test]
    fn test_validation() {
        let yaml = FULL.replace("content_font_size: 10", "content_font_size: 0");
        assert!(StyleProfile::from_yaml("inline", &yaml).is_err());

        let yaml = FULL.replace("cell_padding: 0.04", "cell_padding: 0.6");
        assert!(StyleProfile::from_yaml("inline", &yaml).is_err());

        let yaml = FULL.replace("wrap_width: 20", "wrap_width: 0");
        assert!(StyleProfile::from_yaml("inline", &yaml).is_err());
    }

    #[test]
    fn test_alignment_parses_lowercase() {
        let yaml = format!(
            "{}alignment:\n  content_horizontal: center\n  header_vertical: top\n",
            FULL
        );
        let profile = StyleProfile::from_yaml("inline", &yaml).unwrap();
        assert_eq!(profile.alignment.content_horizontal, Align::Center);
        assert_eq!(profile.alignment.header_vertical, VAlign::Top);
        assert_eq!(profile.alignment.numeric_horizontal, Align::Right);
    }

    #[test]
    fn test_font_stack() {
        let profile = StyleProfile::from_yaml("inline", FULL).unwrap();
        assert_eq!(profile.font_stack(false), vec!["Helvetica", "DejaVu Sans"]);
        assert_eq!(
            profile.font_stack(true),
            vec!["DejaVu Sans Mono", "Helvetica", "DejaVu Sans"]
        );
    }
}
