//! YAML-backed layout registry.
//!
//! Layouts are collected from three kinds of sources, in increasing priority:
//!
//! 1. **Built-ins** embedded in the crate (`corporate`, `classic`, `modern`,
//!    `handwritten`, `academic`, `minimal`).
//! 2. **Directories** added with [`LayoutRegistry::add_dir`]. Each file is one
//!    layout named after its stem. Later directories shadow earlier ones.
//! 3. **Inline** layouts added with [`LayoutRegistry::add_inline`].
//!
//! Two file stems are reserved inside a directory: `palettes` extends the
//! palette store and `categories` replaces the category rules.
//!
//! # Supported Extensions
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.yaml` |
//! | 2 (lowest) | `.yml` |
//!
//! When `dark.yaml` and `dark.yml` sit in the same directory, `dark.yaml`
//! wins.
//!
//! Layouts are stored unparsed. Resolution walks the `extends` chain, merges
//! the raw mappings from the root down and only then deserializes the result
//! into a [`StyleProfile`], so a missing field is reported against the layout
//! that was asked for.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{StyleProfile, StyleResolver};
use crate::classify::CategoryRegistry;
use crate::error::{Result, TableError};
use crate::palette::PaletteStore;

/// Recognized layout file extensions in priority order.
pub const LAYOUT_EXTENSIONS: &[&str] = &[".yaml", ".yml"];

/// Layout used when the caller does not name one.
pub const DEFAULT_LAYOUT: &str = "corporate";

const EXTENDS_KEY: &str = "extends";
const PALETTES_STEM: &str = "palettes";
const CATEGORIES_STEM: &str = "categories";

const BUILTIN_LAYOUTS: &str = include_str!("../../assets/layouts.yaml");
const BUILTIN_PALETTES: &str = include_str!("../../assets/palettes.yaml");
const BUILTIN_CATEGORIES: &str = include_str!("../../assets/categories.yaml");

/// Registry of layouts, palettes and category rules.
///
/// # Example
///
/// ```rust
/// use tabula_render::{LayoutRegistry, StyleResolver};
///
/// let mut registry = LayoutRegistry::builtin().unwrap();
/// registry
///     .add_inline("wide", "extends: corporate\ntable_width_inches: 9.0\n")
///     .unwrap();
///
/// let profile = registry.resolve("wide").unwrap();
/// assert_eq!(profile.table_width_inches, 9.0);
/// assert!(registry.resolve("nope").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    /// Built-in and directory layouts. Later insertions win.
    layouts: BTreeMap<String, Mapping>,
    /// Inline layouts, checked first.
    inline: BTreeMap<String, Mapping>,
    palettes: PaletteStore,
    categories: CategoryRegistry,
}

impl LayoutRegistry {
    /// Creates an empty registry: no layouts, no palettes, only `general`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in layouts, palettes and rules.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.add_layouts_yaml("built-in layouts", BUILTIN_LAYOUTS)?;
        registry.palettes = PaletteStore::from_yaml("built-in palettes", BUILTIN_PALETTES)?;
        registry.categories =
            CategoryRegistry::from_yaml("built-in categories", BUILTIN_CATEGORIES)?;
        Ok(registry)
    }

    /// Adds one inline layout. Inline layouts shadow every other source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the YAML is not a mapping.
    pub fn add_inline(&mut self, name: impl Into<String>, yaml: &str) -> Result<()> {
        let name = name.into();
        let mapping = parse_mapping(&name, yaml)?;
        self.inline.insert(name, mapping);
        Ok(())
    }

    /// Adds every layout of a `name: { fields }` YAML document.
    pub fn add_layouts_yaml(&mut self, origin: &str, yaml: &str) -> Result<()> {
        let document = parse_mapping(origin, yaml)?;
        for (key, value) in document {
            let name = key
                .as_str()
                .ok_or_else(|| TableError::config(origin, "layout names must be strings"))?
                .to_string();
            let Value::Mapping(fields) = value else {
                return Err(TableError::config(
                    origin,
                    format!("layout '{}' must be a mapping", name),
                ));
            };
            self.layouts.insert(name, fields);
        }
        Ok(())
    }

    /// Adds palettes from YAML, replacing same-named ones.
    pub fn add_palettes_yaml(&mut self, origin: &str, yaml: &str) -> Result<()> {
        let store = PaletteStore::from_yaml(origin, yaml)?;
        self.palettes.extend(store);
        Ok(())
    }

    /// Replaces the category rules.
    pub fn set_categories(&mut self, categories: CategoryRegistry) {
        self.categories = categories;
    }

    /// Loads layout files from a directory.
    ///
    /// # Errors
    ///
    /// A configuration error if the directory or one of its files cannot be
    /// read, or if a file does not parse.
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let dir = path.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| TableError::config_io(dir, e))?;

        // stem -> (extension priority, path)
        let mut files: BTreeMap<String, (usize, std::path::PathBuf)> = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| TableError::config_io(dir, e))?;
            let file_path = entry.path();
            if !file_path.is_file() {
                continue;
            }
            let Some(file_name) = file_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((priority, stem)) = LAYOUT_EXTENSIONS
                .iter()
                .enumerate()
                .find_map(|(i, ext)| file_name.strip_suffix(ext).map(|stem| (i, stem)))
            else {
                continue;
            };
            let replace = files
                .get(stem)
                .map_or(true, |(existing, _)| priority < *existing);
            if replace {
                files.insert(stem.to_string(), (priority, file_path.clone()));
            }
        }

        for (stem, (_, file_path)) in files {
            let content =
                fs::read_to_string(&file_path).map_err(|e| TableError::config_io(&file_path, e))?;
            let origin = file_path.display().to_string();
            if stem == PALETTES_STEM {
                self.add_palettes_yaml(&origin, &content)?;
            } else if stem == CATEGORIES_STEM {
                self.categories = CategoryRegistry::from_yaml(&origin, &content)?;
            } else {
                let mapping = parse_mapping(&origin, &content)?;
                debug!(layout = %stem, path = %origin, "loaded layout file");
                self.layouts.insert(stem, mapping);
            }
        }
        Ok(())
    }

    fn raw(&self, name: &str) -> Option<&Mapping> {
        self.inline.get(name).or_else(|| self.layouts.get(name))
    }

    /// Whether a layout with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Walks the `extends` chain and merges it, root first.
    fn merged(&self, name: &str) -> Result<Mapping> {
        let mut path = vec![name.to_string()];
        let mut layers: Vec<&Mapping> = Vec::new();
        let mut current = name.to_string();

        loop {
            let layer = self
                .raw(&current)
                .ok_or_else(|| TableError::UnknownLayout(current.clone()))?;
            layers.push(layer);

            let parent = match layer.get(EXTENDS_KEY) {
                None => break,
                Some(Value::String(parent)) => parent.clone(),
                Some(other) => {
                    return Err(TableError::config(
                        current,
                        format!("extends must be a layout name, got {:?}", other),
                    ))
                }
            };

            if path.contains(&parent) {
                path.push(parent);
                return Err(TableError::ExtendsCycle { path });
            }
            path.push(parent.clone());
            current = parent;
        }

        let mut merged = Mapping::new();
        for layer in layers.into_iter().rev() {
            merge_into(&mut merged, layer.clone());
        }
        merged.remove(EXTENDS_KEY);
        Ok(merged)
    }
}

fn parse_mapping(origin: &str, yaml: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(yaml).map_err(|e| TableError::config(origin, e))? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(TableError::config(origin, "expected a YAML mapping")),
    }
}

/// Overlays `overlay` onto `base`. Nested mappings merge key by key; any
/// other value replaces the base value.
fn merge_into(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Mapping(mut existing)), Value::Mapping(nested)) => {
                merge_into(&mut existing, nested);
                Value::Mapping(existing)
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
}

impl StyleResolver for LayoutRegistry {
    fn resolve(&self, layout: &str) -> Result<StyleProfile> {
        let merged = self.merged(layout)?;
        let profile: StyleProfile = serde_yaml::from_value(Value::Mapping(merged))
            .map_err(|e| TableError::config(layout, e))?;
        profile.validate(layout)?;
        Ok(profile)
    }

    fn palettes(&self) -> &PaletteStore {
        &self.palettes
    }

    fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    fn layout_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .layouts
            .keys()
            .chain(self.inline.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
