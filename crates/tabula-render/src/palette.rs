//! Named color palettes.
//!
//! A palette maps tone names (`primary`, `light`, `medium_dark`, ...) to RGB
//! triples. Palettes are loaded from YAML where each tone is either a hex
//! string or an `[r, g, b]` sequence:
//!
//! ```yaml
//! blues:
//!   light: "#e3f2fd"
//!   medium: [100, 181, 246]
//! ```
//!
//! [`PaletteStore::lookup`] is the only place in the crate that tolerates a
//! missing color: it falls back to the neutral palette once and logs it.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::{Result, TableError};

/// Palette used when a requested palette or tone does not exist.
pub const NEUTRAL_PALETTE: &str = "neutrals";

/// Tone used for the neutral fallback.
pub const FALLBACK_TONE: &str = "medium_light";

/// Gradient tones from lightest to darkest.
pub const GRADIENT_TONES: [&str; 5] = ["light", "medium_light", "medium", "medium_dark", "dark"];

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Formats as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Relative luminance in [0, 1], used to pick a readable text color.
    pub fn luminance(self) -> f64 {
        (0.299 * self.0 as f64 + 0.587 * self.1 as f64 + 0.114 * self.2 as f64) / 255.0
    }

    /// Parses a color from a YAML value: a hex string or an `[r, g, b]` list.
    pub fn parse_value(value: &serde_yaml::Value) -> std::result::Result<Self, String> {
        match value {
            serde_yaml::Value::String(s) => Self::parse_str(s),
            serde_yaml::Value::Sequence(seq) => Self::parse_rgb_tuple(seq),
            _ => Err(format!("invalid color value: {:?}", value)),
        }
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{}' must start with '#'", s))?;
        Self::parse_hex(hex)
    }

    fn parse_hex(hex: &str) -> std::result::Result<Self, String> {
        let digit = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|d| u8::from_str_radix(d, 16).ok())
                .ok_or_else(|| format!("invalid hex: #{}", hex))
        };
        match hex.len() {
            3 => Ok(Rgb(digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17)),
            6 => Ok(Rgb(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
            _ => Err(format!("invalid hex color: #{} (must be 3 or 6 digits)", hex)),
        }
    }

    fn parse_rgb_tuple(seq: &[serde_yaml::Value]) -> std::result::Result<Self, String> {
        if seq.len() != 3 {
            return Err(format!(
                "RGB tuple must have exactly 3 values, got {}",
                seq.len()
            ));
        }
        let mut components = [0u8; 3];
        for (i, v) in seq.iter().enumerate() {
            let n = v
                .as_u64()
                .ok_or_else(|| format!("RGB component must be a number: {:?}", v))?;
            components[i] =
                u8::try_from(n).map_err(|_| format!("RGB component {} out of range (0-255)", n))?;
        }
        Ok(Rgb(components[0], components[1], components[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Tone name to color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    tones: BTreeMap<String, Rgb>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tone, builder style.
    pub fn with_tone(mut self, tone: impl Into<String>, color: Rgb) -> Self {
        self.tones.insert(tone.into(), color);
        self
    }

    pub fn get(&self, tone: &str) -> Option<Rgb> {
        self.tones.get(tone).copied()
    }

    pub fn tones(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.tones.iter().map(|(name, rgb)| (name.as_str(), *rgb))
    }

    /// The gradient tones this palette defines, lightest first.
    pub fn gradient(&self) -> Vec<Rgb> {
        GRADIENT_TONES
            .iter()
            .filter_map(|tone| self.get(tone))
            .collect()
    }
}

/// All known palettes by name.
#[derive(Debug, Clone, Default)]
pub struct PaletteStore {
    palettes: BTreeMap<String, Palette>,
}

impl PaletteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping of palette name to tone mapping.
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, serde_yaml::Value>> =
            serde_yaml::from_str(yaml).map_err(|e| TableError::config(origin, e))?;

        let mut store = Self::new();
        for (name, tones) in raw {
            let mut palette = Palette::new();
            for (tone, value) in tones {
                let rgb = Rgb::parse_value(&value).map_err(|msg| {
                    TableError::config(origin, format!("{}.{}: {}", name, tone, msg))
                })?;
                palette = palette.with_tone(tone, rgb);
            }
            store.insert(name, palette);
        }
        Ok(store)
    }

    /// Adds or replaces a palette.
    pub fn insert(&mut self, name: impl Into<String>, palette: Palette) {
        self.palettes.insert(name.into(), palette);
    }

    /// Copies every palette of `other` into this store; `other` wins on conflict.
    pub fn extend(&mut self, other: PaletteStore) {
        self.palettes.extend(other.palettes);
    }

    pub fn palette(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.palettes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, palette: &str, tone: &str) -> Option<Rgb> {
        self.palettes.get(palette).and_then(|p| p.get(tone))
    }

    /// Lookup with the single neutral fallback.
    ///
    /// # Errors
    ///
    /// [`TableError::MissingPalette`] when neither the requested color nor
    /// the neutral fallback exists.
    pub fn lookup(&self, palette: &str, tone: &str) -> Result<Rgb> {
        if let Some(rgb) = self.get(palette, tone) {
            return Ok(rgb);
        }
        debug!(
            palette,
            tone,
            fallback = NEUTRAL_PALETTE,
            "palette tone not found, using neutral fallback"
        );
        self.get(NEUTRAL_PALETTE, FALLBACK_TONE)
            .ok_or_else(|| TableError::MissingPalette {
                palette: NEUTRAL_PALETTE.to_string(),
                tone: FALLBACK_TONE.to_string(),
            })
    }

    /// Gradient colors of a palette, lightest first.
    ///
    /// # Errors
    ///
    /// [`TableError::MissingPalette`] when the palette is unknown or defines
    /// none of the gradient tones.
    pub fn gradient(&self, palette: &str) -> Result<Vec<Rgb>> {
        let colors = self
            .palettes
            .get(palette)
            .map(Palette::gradient)
            .unwrap_or_default();
        if colors.is_empty() {
            return Err(TableError::MissingPalette {
                palette: palette.to_string(),
                tone: GRADIENT_TONES.join("|"),
            });
        }
        Ok(colors)
    }
}
