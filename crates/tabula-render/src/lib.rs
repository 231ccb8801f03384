//! # Tabula Render - Styled Table Images
//!
//! `tabula-render` turns tabular data into publication-style table images
//! (PNG or SVG). A named layout controls fonts, spacing, colors and
//! alignment; a column classifier picks gradient palettes for highlighted
//! columns.
//!
//! ## Core Concepts
//!
//! - [`TabularDataset`]: ordered column names plus rows of [`CellValue`]s
//! - [`StyleProfile`]: one resolved layout, produced by a [`StyleResolver`]
//! - [`LayoutRegistry`]: YAML-backed layouts, palettes and category rules
//! - [`StyleCache`]: memoized layout resolution, invalidated explicitly
//! - [`TableRenderer`]: runs the whole pipeline for one dataset
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabula_render::{Highlight, ImageFormat, TableOptions, TableRenderer, TabularDataset};
//!
//! let dataset = TabularDataset::from_csv_str(
//!     "Member,Axial (kN),Moment (kN m)\nB1,120.5,45\nB2,NaN,80.25\n",
//! )?;
//!
//! let renderer = TableRenderer::builtin()?;
//! let options = TableOptions::new("corporate")
//!     .highlight(Highlight::AutoDetect)
//!     .format(ImageFormat::Png);
//! let path = renderer.render(&dataset, &options, "out/members.png")?;
//! println!("wrote {}", path.display());
//! # Ok::<(), tabula_render::TableError>(())
//! ```
//!
//! ## Layout Files
//!
//! A layout file holds one layout; its name is the file stem. A layout may
//! `extends` another and override any subset of its fields:
//!
//! ```yaml
//! # report.yaml
//! extends: corporate
//! header_font_size: 12
//! alignment:
//!   numeric_horizontal: center
//! ```
//!
//! Load a directory of such files with [`LayoutRegistry::add_dir`]. Files
//! named `palettes` and `categories` extend the built-in palettes and
//! replace the category rules.
//!
//! ## Pipeline
//!
//! 1. [`classify`](classify::classify) assigns a category per column
//! 2. [`layout::plan_table`] prepares the display text and sizing factors
//! 3. [`color`] picks header, border, alternate and gradient colors
//! 4. [`render`] draws the SVG scene and rasterizes it

pub mod classify;
pub mod color;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod palette;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod text;

pub use classify::{classify, CategoryRegistry, CategoryRule, Classification};
pub use dataset::{CellValue, TabularDataset};
pub use error::{ErrorKind, Result, TableError};
pub use layout::LayoutConstants;
pub use palette::{Palette, PaletteStore, Rgb};
pub use pipeline::{next_table_path, Highlight, TableOptions, TableRenderer};
pub use render::ImageFormat;
pub use style::{LayoutRegistry, StyleCache, StyleProfile, StyleResolver};
