//! Drawing a planned table.
//!
//! The renderer builds an SVG document from a [`TablePlan`] and its
//! [`Geometry`]. The document is either written as is or rasterized to PNG
//! (see [`raster`]).
//!
//! Each cell is one background rectangle with a uniform border plus one
//! `<text>` element holding a `<tspan>` per display line.

mod raster;

pub use raster::{encode_png, system_fonts};

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resvg::usvg::fontdb;
use tracing::info;

use crate::color::StaticColors;
use crate::error::{Result, TableError};
use crate::layout::{CellPlan, Geometry, Rect, TablePlan};
use crate::palette::Rgb;
use crate::style::{Align, StyleProfile, VAlign};

/// Line height as a multiple of the font size.
const LINE_SPACING: f64 = 1.2;

/// Backgrounds darker than this get white text.
const DARK_BACKGROUND: f64 = 0.45;

/// Output encoding of a rendered table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Guesses the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("png") {
            Some(ImageFormat::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(ImageFormat::Svg)
        } else {
            None
        }
    }
}

/// Everything needed to draw one table.
///
/// `gradients` holds, per column, one color per content row for highlighted
/// columns and `None` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub plan: &'a TablePlan,
    pub geometry: &'a Geometry,
    pub profile: &'a StyleProfile,
    pub colors: &'a StaticColors,
    pub gradients: &'a [Option<Vec<Rgb>>],
}

impl Scene<'_> {
    /// Background of a content cell; `row` is zero-based.
    ///
    /// A gradient wins over the alternate color, which applies to every
    /// second row (the 2nd, 4th, ...) when the layout asks for it.
    pub fn cell_background(&self, row: usize, col: usize) -> Rgb {
        if let Some(Some(colors)) = self.gradients.get(col) {
            if let Some(&color) = colors.get(row) {
                return color;
            }
        }
        if self.profile.alternating_rows && (row + 1) % 2 == 0 {
            self.colors.alternate
        } else {
            Rgb::WHITE
        }
    }

    /// Serializes the scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let (width, height) = self.geometry.canvas_size();
        let stroke = self.geometry.px(self.profile.grid_line_width);
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        );
        let _ = writeln!(
            svg,
            r#"  <rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            width,
            height,
            Rgb::WHITE.to_hex()
        );

        for (col, cell) in self.plan.header.cells.iter().enumerate() {
            let rect = self.geometry.header_rect(col);
            self.push_cell(&mut svg, rect, cell, self.colors.header, stroke, true);
        }
        for (row, plan) in self.plan.rows.iter().enumerate() {
            for (col, cell) in plan.cells.iter().enumerate() {
                let rect = self.geometry.cell_rect(row, col);
                let fill = self.cell_background(row, col);
                self.push_cell(&mut svg, rect, cell, fill, stroke, false);
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn push_cell(
        &self,
        svg: &mut String,
        rect: Rect,
        cell: &CellPlan,
        fill: Rgb,
        stroke: f64,
        header: bool,
    ) {
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}"/>"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            fill.to_hex(),
            self.colors.border.to_hex(),
            stroke
        );

        if cell.text.is_empty() {
            return;
        }

        let alignment = &self.profile.alignment;
        let (align, valign) = if header {
            (alignment.header_horizontal, alignment.header_vertical)
        } else if cell.numeric {
            (alignment.numeric_horizontal, alignment.content_vertical)
        } else {
            (alignment.content_horizontal, alignment.content_vertical)
        };

        let size = self.geometry.px(cell.font_size);
        let line_height = size * LINE_SPACING;
        let lines = cell.line_count() as f64;
        let pad_x = self.profile.cell_padding * rect.width * cell.padding_scale;
        let pad_y = self.profile.cell_padding * rect.height * cell.padding_scale;

        let (x, anchor) = match align {
            Align::Left => (rect.x + pad_x, "start"),
            Align::Center => (rect.x + rect.width / 2.0, "middle"),
            Align::Right => (rect.x + rect.width - pad_x, "end"),
        };
        let block = lines * line_height;
        let top = match valign {
            VAlign::Top => rect.y + pad_y,
            VAlign::Center => rect.y + (rect.height - block) / 2.0,
            VAlign::Bottom => rect.y + rect.height - pad_y - block,
        };

        let fonts = self
            .profile
            .font_stack(cell.code)
            .iter()
            .map(|f| format!("'{}'", escape_xml(f)))
            .collect::<Vec<_>>()
            .join(", ");
        let weight = if header && self.profile.header_bold {
            "bold"
        } else {
            "normal"
        };
        let style = if cell.missing { "italic" } else { "normal" };
        let ink = if fill.luminance() < DARK_BACKGROUND {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        };

        let _ = writeln!(
            svg,
            r#"  <text font-family="{}" font-size="{:.2}" font-weight="{}" font-style="{}" fill="{}" text-anchor="{}">"#,
            fonts,
            size,
            weight,
            style,
            ink.to_hex(),
            anchor
        );
        for (i, line) in cell.lines().enumerate() {
            // baseline sits a little below the middle of its line box
            let baseline = top + line_height * (i as f64 + 0.5) + size * 0.35;
            let _ = writeln!(
                svg,
                r#"    <tspan x="{:.2}" y="{:.2}">{}</tspan>"#,
                x,
                baseline,
                escape_xml(line)
            );
        }
        svg.push_str("  </text>\n");
    }
}

/// Escapes text for use in SVG content and attributes.
///
/// Control characters XML 1.0 does not allow are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if c < '\u{20}' || c == '\u{fffe}' || c == '\u{ffff}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Writes the scene to `path` in the requested format.
///
/// The parent directory is created when missing.
///
/// # Errors
///
/// [`TableError::Io`] when the directory or file cannot be written,
/// [`TableError::Encode`] when rasterization fails.
pub fn write_image(
    scene: &Scene<'_>,
    format: ImageFormat,
    fonts: &Arc<fontdb::Database>,
    path: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
    }

    let svg = scene.to_svg();
    let bytes = match format {
        ImageFormat::Svg => svg.into_bytes(),
        ImageFormat::Png => {
            let (width, height) = scene.geometry.canvas_size();
            encode_png(&svg, width, height, Arc::clone(fonts)).map_err(|message| {
                TableError::Encode {
                    path: path.to_path_buf(),
                    message,
                }
            })?
        }
    };

    fs::write(path, bytes).map_err(|e| TableError::io(path, e))?;
    info!("Generated table image: {:?}", path);
    Ok(path.to_path_buf())
}
