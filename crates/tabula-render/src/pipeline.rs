//! End-to-end table rendering.
//!
//! [`TableRenderer`] ties the modules together: it resolves the layout
//! (through its [`StyleCache`]), classifies the columns, plans the layout,
//! picks the colors and writes the image.
//!
//! ```no_run
//! use tabula_render::{Highlight, TableOptions, TableRenderer, TabularDataset};
//!
//! let dataset = TabularDataset::from_csv_str("Node_X,Node_Y,Force_kN\n0,0,125.5\n3,0,80\n")?;
//! let renderer = TableRenderer::builtin()?;
//! let options = TableOptions::new("modern").highlight(Highlight::AutoDetect);
//! renderer.render(&dataset, &options, "out/forces.png")?;
//! # Ok::<(), tabula_render::TableError>(())
//! ```

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resvg::usvg::fontdb;
use tracing::debug;

use crate::classify::{classify, GENERAL_PALETTE};
use crate::color::{resolve_gradient, resolve_static_colors};
use crate::dataset::{CellValue, TabularDataset};
use crate::error::{Result, TableError};
use crate::layout::{plan_table, Geometry, LayoutConstants, TablePlan};
use crate::palette::Rgb;
use crate::render::{system_fonts, write_image, ImageFormat, Scene};
use crate::style::{LayoutRegistry, StyleCache, StyleResolver, DEFAULT_LAYOUT};

/// Default output resolution.
pub const DEFAULT_DPI: f64 = 300.0;

/// Default row limit for [`TableRenderer::render_parts`].
pub const DEFAULT_MAX_ROWS: usize = 25;

/// Prefix of generated file names.
pub const TABLE_FILE_PREFIX: &str = "table_";

/// Which columns get a gradient background.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    None,
    /// The named columns.
    Columns(Vec<String>),
    /// The columns the classifier marks as candidates.
    AutoDetect,
}

/// Per-render settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TableOptions {
    pub layout: String,
    pub highlight: Highlight,
    /// Gradient palette used instead of the column category palette.
    pub palette: Option<String>,
    pub format: ImageFormat,
    pub dpi: f64,
    pub max_rows_per_table: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.to_string(),
            highlight: Highlight::None,
            palette: None,
            format: ImageFormat::Png,
            dpi: DEFAULT_DPI,
            max_rows_per_table: DEFAULT_MAX_ROWS,
        }
    }
}

impl TableOptions {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            ..Self::default()
        }
    }

    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn max_rows_per_table(mut self, rows: usize) -> Self {
        self.max_rows_per_table = rows;
        self
    }
}

/// Renders datasets to image files.
///
/// Resolved layouts are cached; call [`TableRenderer::cache`] and
/// `invalidate` after changing the resolver's configuration.
pub struct TableRenderer<R: StyleResolver = LayoutRegistry> {
    resolver: R,
    cache: StyleCache,
    fonts: Arc<fontdb::Database>,
    constants: LayoutConstants,
}

impl TableRenderer<LayoutRegistry> {
    /// Renderer over the built-in layouts and the system fonts.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(LayoutRegistry::builtin()?))
    }
}

impl<R: StyleResolver> TableRenderer<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            cache: StyleCache::new(),
            fonts: system_fonts(),
            constants: LayoutConstants::default(),
        }
    }

    /// Replaces the font database used for PNG output.
    pub fn with_fonts(mut self, fonts: Arc<fontdb::Database>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_constants(mut self, constants: LayoutConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access to the resolver. The cache is cleared since cached
    /// profiles may no longer match.
    pub fn resolver_mut(&mut self) -> &mut R {
        self.cache.invalidate();
        &mut self.resolver
    }

    pub fn cache(&self) -> &StyleCache {
        &self.cache
    }

    pub fn constants(&self) -> &LayoutConstants {
        &self.constants
    }

    /// Classifies, plans and colors the dataset without drawing it.
    ///
    /// Returns the plan and the per-column gradient colors.
    ///
    /// # Errors
    ///
    /// Configuration errors from layout or palette resolution, and
    /// [`TableError::UnknownColumn`] for a requested highlight column the
    /// dataset does not have.
    pub fn plan(
        &self,
        dataset: &TabularDataset,
        options: &TableOptions,
    ) -> Result<(TablePlan, Vec<Option<Vec<Rgb>>>)> {
        let profile = self.cache.get_or_resolve(&options.layout, &self.resolver)?;
        let categories = self.resolver.categories();
        let classification = classify(dataset, categories);
        debug!(
            category = %classification.table_category,
            "classified {} columns",
            dataset.num_columns()
        );

        let mut highlighted = vec![false; dataset.num_columns()];
        match &options.highlight {
            Highlight::None => {}
            Highlight::Columns(names) => {
                for name in names {
                    highlighted[dataset.require_column(name)?] = true;
                }
            }
            Highlight::AutoDetect => {
                for index in classification.candidates() {
                    highlighted[index] = true;
                }
            }
        }

        let mut plan = plan_table(dataset, &profile, &self.constants);
        let mut gradients = Vec::with_capacity(plan.num_columns());
        for (index, column) in plan.columns.iter_mut().enumerate() {
            column.category = classification.category(index).to_string();
            column.highlight = highlighted[index];
            if !column.highlight {
                gradients.push(None);
                continue;
            }

            let palette = match &options.palette {
                Some(palette) => palette.clone(),
                None => categories
                    .palette_for(&column.category)
                    .unwrap_or(GENERAL_PALETTE)
                    .to_string(),
            };
            let values: Vec<CellValue> = dataset.column_values(index).cloned().collect();
            gradients.push(Some(resolve_gradient(
                &values,
                &palette,
                self.resolver.palettes(),
            )?));
            column.palette = Some(palette);
        }

        Ok((plan, gradients))
    }

    /// Renders one table image to `path` and returns the path.
    pub fn render(
        &self,
        dataset: &TabularDataset,
        options: &TableOptions,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let profile = self.cache.get_or_resolve(&options.layout, &self.resolver)?;
        let (plan, gradients) = self.plan(dataset, options)?;
        let colors = resolve_static_colors(&profile, self.resolver.palettes())?;
        let geometry = Geometry::compute(&plan, &profile, options.dpi);

        let scene = Scene {
            plan: &plan,
            geometry: &geometry,
            profile: &profile,
            colors: &colors,
            gradients: &gradients,
        };
        write_image(&scene, options.format, &self.fonts, path.as_ref())
    }

    /// Renders the dataset in chunks of at most `max_rows_per_table` rows,
    /// one numbered file per chunk in `dir`.
    pub fn render_parts(
        &self,
        dataset: &TabularDataset,
        options: &TableOptions,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let parts = dataset.chunks(options.max_rows_per_table);
        debug!("rendering {} rows as {} tables", dataset.num_rows(), parts.len());

        let mut written = Vec::with_capacity(parts.len());
        for part in &parts {
            let path = next_table_path(dir, options.format)?;
            written.push(self.render(part, options, path)?);
        }
        Ok(written)
    }
}

/// Next free `table_{n}.{ext}` path in `dir`.
///
/// `n` starts at one more than the number of entries whose name starts with
/// `table_` and moves past numbers whose file already exists, so an existing
/// table is never returned. A missing directory counts as empty.
pub fn next_table_path(dir: impl AsRef<Path>, format: ImageFormat) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let count = match fs::read_dir(dir) {
        Ok(entries) => {
            let mut count = 0;
            for entry in entries {
                let entry = entry.map_err(|e| TableError::io(dir, e))?;
                if entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(TABLE_FILE_PREFIX)
                {
                    count += 1;
                }
            }
            count
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => 0,
        Err(e) => return Err(TableError::io(dir, e)),
    };
    let mut n = count + 1;
    loop {
        let path = dir.join(format!("{}{}.{}", TABLE_FILE_PREFIX, n, format.extension()));
        if !path.exists() {
            return Ok(path);
        }
        n += 1;
    }
}
