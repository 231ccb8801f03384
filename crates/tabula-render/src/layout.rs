//! Sizing of columns, rows and fonts.
//!
//! The calculator works in two steps:
//!
//! 1. [`plan_table`] turns a dataset into display text per cell and derives
//!    the dimensionless factors: a width factor per column, a height factor
//!    per row and a reduced font size per cell.
//! 2. [`Geometry::compute`] turns those factors into pixel rectangles for a
//!    given profile and DPI.
//!
//! Every tuned number lives in [`LayoutConstants`]; the defaults reproduce the
//! reference look and callers may override any of them.
//!
//! Text lengths are measured in characters. Rows are sized as a whole: every
//! cell of a row shares one height.

use serde::{Deserialize, Serialize};

use crate::classify::GENERAL;
use crate::dataset::{CellValue, TabularDataset};
use crate::style::StyleProfile;
use crate::text;

const POINTS_PER_INCH: f64 = 72.0;

/// Characters that make a cell look busy and shrink its font.
const BRACKET_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', '@', '#', '$', '%'];

/// Marker that counts as a special glyph for font reduction.
const SPECIAL_MARKERS: &[&str] = &["SRSS"];

/// Font reduction by text length for one kind of row.
///
/// `long` and `mid` are `(floor, cap)` pairs applied to `threshold / len`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LengthReduction {
    pub long: (f64, f64),
    pub mid: (f64, f64),
    pub short: f64,
    pub tiny: f64,
}

/// All tuned numbers used by the layout calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstants {
    /// `(max longest-line length, width factor)`, checked in order.
    pub width_bands: Vec<(usize, f64)>,
    /// Width factor when the longest line exceeds every band.
    pub width_factor_max: f64,
    /// Applied once to a column whose data holds special glyphs.
    pub special_glyph_width_boost: f64,

    /// Header text longer than this is estimated to wrap.
    pub header_line_threshold: usize,
    /// Content text longer than this is estimated to wrap.
    pub content_line_threshold: usize,
    /// A header line longer than this adds one line.
    pub long_line_length: usize,
    /// `(max lines, spacing)`, checked in order.
    pub spacing_bands: Vec<(usize, f64)>,
    /// Spacing when the line count exceeds every band.
    pub spacing_max: f64,
    pub header_row_boost: f64,
    pub hand_drawn_factor: f64,
    pub min_height_factor: f64,

    /// Length thresholds `[long, mid, short, tiny]` for font reduction.
    pub length_thresholds: [usize; 4],
    pub header_length: LengthReduction,
    pub content_length: LengthReduction,
    /// `(column count above, factor)`, checked in order.
    pub density_bands: Vec<(usize, f64)>,
    pub multiline_step: f64,
    pub multiline_floor: f64,
    pub special_glyph_font_factor: f64,
    pub bracket_step: f64,
    pub bracket_floor: f64,
    pub bracket_single: f64,
    /// Lower bound for the product of every font factor.
    pub min_font_factor: f64,

    /// Extra padding per line on multi-line header cells.
    pub header_padding_per_line: f64,
    /// Extra padding per line on multi-line content cells.
    pub content_padding_per_line: f64,

    /// Header length that triggers a split into two lines.
    pub header_split_threshold: usize,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            width_bands: vec![(3, 0.7), (8, 0.9), (15, 1.0), (25, 1.2), (35, 1.4)],
            width_factor_max: 1.6,
            special_glyph_width_boost: 1.05,

            header_line_threshold: 20,
            content_line_threshold: 25,
            long_line_length: 15,
            spacing_bands: vec![(1, 1.15), (3, 1.25), (5, 1.30)],
            spacing_max: 1.35,
            header_row_boost: 1.10,
            hand_drawn_factor: 1.25,
            min_height_factor: 1.0,

            length_thresholds: [25, 15, 10, 5],
            header_length: LengthReduction {
                long: (0.75, 0.85),
                mid: (0.85, 0.90),
                short: 0.95,
                tiny: 1.0,
            },
            content_length: LengthReduction {
                long: (0.65, 0.78),
                mid: (0.78, 0.85),
                short: 0.90,
                tiny: 0.95,
            },
            density_bands: vec![(12, 0.78), (8, 0.85), (5, 0.90), (3, 0.95)],
            multiline_step: 0.12,
            multiline_floor: 0.82,
            special_glyph_font_factor: 0.93,
            bracket_step: 0.03,
            bracket_floor: 0.85,
            bracket_single: 0.93,
            min_font_factor: 0.60,

            header_padding_per_line: 0.3,
            content_padding_per_line: 0.2,

            header_split_threshold: text::HEADER_SPLIT_THRESHOLD,
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn longest_line(s: &str) -> usize {
    s.split('\n').map(char_len).max().unwrap_or(0)
}

impl LayoutConstants {
    /// Width factor of a column from its header and wrapped data cells.
    ///
    /// ```rust
    /// use tabula_render::LayoutConstants;
    ///
    /// let c = LayoutConstants::default();
    /// assert_eq!(c.width_factor("ID", ["1", "22"]), 0.7);
    /// assert_eq!(c.width_factor("Name", ["a rather long label"]), 1.2);
    /// ```
    pub fn width_factor<'a, I>(&self, header: &str, cells: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut longest = longest_line(header);
        let mut special = false;
        for cell in cells {
            longest = longest.max(longest_line(cell));
            special |= text::has_special_glyph(cell);
        }

        let mut factor = self
            .width_bands
            .iter()
            .find(|(max_len, _)| longest <= *max_len)
            .map_or(self.width_factor_max, |(_, f)| *f);
        if special {
            factor *= self.special_glyph_width_boost;
        }
        factor
    }

    /// Estimated line count of one cell.
    pub fn line_estimate(&self, cell: &str, header: bool) -> usize {
        let breaks = cell.matches('\n').count();
        let mut lines = breaks + 1;

        let threshold = if header {
            self.header_line_threshold
        } else {
            self.content_line_threshold
        }
        .max(1);
        let len = char_len(cell);
        if len > threshold {
            lines = lines.max(len / threshold + 1);
        }

        if header && cell.split('\n').any(|line| char_len(line) > self.long_line_length) {
            lines = lines.max(breaks + 2);
        }
        lines
    }

    /// Height factor of a row, shared by all its cells.
    pub fn height_factor<'a, I>(&self, cells: I, header: bool, hand_drawn: bool) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lines = cells
            .into_iter()
            .map(|cell| self.line_estimate(cell, header))
            .max()
            .unwrap_or(1)
            .max(1);

        let mut spacing = self
            .spacing_bands
            .iter()
            .find(|(max_lines, _)| lines <= *max_lines)
            .map_or(self.spacing_max, |(_, s)| *s);
        if header {
            spacing *= self.header_row_boost;
        }
        let font_type = if hand_drawn {
            self.hand_drawn_factor
        } else {
            1.0
        };

        (lines as f64 * spacing * font_type).max(self.min_height_factor)
    }

    fn length_reduction(&self, longest: usize, header: bool) -> f64 {
        let bands = if header {
            &self.header_length
        } else {
            &self.content_length
        };
        let [long, mid, short, tiny] = self.length_thresholds;
        let ratio = |threshold: usize| threshold as f64 / longest as f64;
        if longest > long {
            ratio(long).clamp(bands.long.0, bands.long.1)
        } else if longest > mid {
            ratio(mid).clamp(bands.mid.0, bands.mid.1)
        } else if longest > short {
            bands.short
        } else if longest > tiny {
            bands.tiny
        } else {
            1.0
        }
    }

    fn density_reduction(&self, columns: usize) -> f64 {
        self.density_bands
            .iter()
            .find(|(above, _)| columns > *above)
            .map_or(1.0, |(_, f)| *f)
    }

    /// Font scale of one cell in `[min_font_factor, 1]`.
    pub fn font_factor(&self, cell: &str, header: bool, columns: usize) -> f64 {
        let lines = cell.split('\n').count();

        let length = self.length_reduction(longest_line(cell), header);
        let density = self.density_reduction(columns);
        let multiline = if lines > 1 {
            (1.0 - (lines - 1) as f64 * self.multiline_step).max(self.multiline_floor)
        } else {
            1.0
        };
        let special = if text::has_special_glyph(cell)
            || SPECIAL_MARKERS.iter().any(|m| cell.contains(m))
        {
            self.special_glyph_font_factor
        } else {
            1.0
        };
        let brackets = BRACKET_CHARS.iter().filter(|c| cell.contains(**c)).count();
        let formatting = match brackets {
            0 => 1.0,
            1 | 2 => self.bracket_single,
            n => (1.0 - n as f64 * self.bracket_step).max(self.bracket_floor),
        };

        (length * density * multiline * special * formatting).clamp(self.min_font_factor, 1.0)
    }

    /// Padding multiplier for a cell with `lines` lines.
    pub fn padding_scale(&self, lines: usize, header: bool) -> f64 {
        if lines <= 1 {
            return 1.0;
        }
        let per_line = if header {
            self.header_padding_per_line
        } else {
            self.content_padding_per_line
        };
        1.0 + lines as f64 * per_line
    }
}

/// Per-column derived state.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnPlan {
    pub category: String,
    pub width_factor: f64,
    pub highlight: bool,
    /// Gradient palette for a highlighted column.
    pub palette: Option<String>,
}

/// One cell ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct CellPlan {
    /// Display text with explicit line breaks.
    pub text: String,
    pub missing: bool,
    pub numeric: bool,
    pub code: bool,
    /// Font size in points after reduction.
    pub font_size: f64,
    pub padding_scale: f64,
}

impl CellPlan {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        text::line_count(&self.text)
    }
}

/// Per-row derived state.
#[derive(Clone, Debug, PartialEq)]
pub struct RowPlan {
    pub height_factor: f64,
    pub cells: Vec<CellPlan>,
}

/// Everything the renderer needs to know about the table, minus pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TablePlan {
    pub columns: Vec<ColumnPlan>,
    pub header: RowPlan,
    pub rows: Vec<RowPlan>,
}

impl TablePlan {
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Header display text: citations flattened, split at a structural hint,
/// superscripts applied, then each line wrapped at `wrap_width`.
pub fn header_text(header: &str, threshold: usize, wrap_width: usize) -> String {
    let flat = text::flatten_citations(header);
    let split = text::header_multiline(&flat, threshold);
    text::wrap(&text::format_superscripts(&split), wrap_width)
}

/// Display text of a content cell and its flags.
fn content_text(value: &CellValue, wrap_width: usize) -> (String, bool, bool, bool) {
    if text::is_missing(value) {
        return (text::MISSING_MARKER.to_string(), true, false, false);
    }
    let raw = value.display();
    let numeric = matches!(value, CellValue::Int(_) | CellValue::Float(_))
        || text::is_numeric_text(&raw);
    let code = !numeric && text::is_code_like(&raw);
    let shown = if code {
        raw
    } else {
        let flat = text::flatten_citations(&raw);
        text::format_superscripts(&flat).into_owned()
    };
    (text::wrap(&shown, wrap_width), false, numeric, code)
}

/// Builds the plan for a dataset.
///
/// Columns come out as `general` and not highlighted; the caller fills in
/// categories and highlighting.
pub fn plan_table(
    dataset: &TabularDataset,
    profile: &StyleProfile,
    constants: &LayoutConstants,
) -> TablePlan {
    let num_columns = dataset.num_columns();

    let header_texts: Vec<String> = dataset
        .columns()
        .iter()
        .map(|h| header_text(h, constants.header_split_threshold, profile.wrap_width))
        .collect();

    let header_cells = header_texts
        .iter()
        .map(|t| CellPlan {
            font_size: profile.header_font_size * constants.font_factor(t, true, num_columns),
            padding_scale: constants.padding_scale(text::line_count(t), true),
            text: t.clone(),
            missing: false,
            numeric: false,
            code: false,
        })
        .collect();
    let header = RowPlan {
        height_factor: constants.height_factor(
            header_texts.iter().map(String::as_str),
            true,
            profile.hand_drawn,
        ),
        cells: header_cells,
    };

    let rows: Vec<RowPlan> = dataset
        .rows()
        .iter()
        .map(|row| {
            let cells: Vec<CellPlan> = row
                .iter()
                .map(|value| {
                    let (shown, missing, numeric, code) = content_text(value, profile.wrap_width);
                    // the missing marker is never reduced
                    let factor = if missing {
                        1.0
                    } else {
                        constants.font_factor(&shown, false, num_columns)
                    };
                    CellPlan {
                        font_size: profile.content_font_size * factor,
                        padding_scale: constants.padding_scale(text::line_count(&shown), false),
                        text: shown,
                        missing,
                        numeric,
                        code,
                    }
                })
                .collect();
            RowPlan {
                height_factor: constants.height_factor(
                    cells.iter().map(|c| c.text.as_str()),
                    false,
                    profile.hand_drawn,
                ),
                cells,
            }
        })
        .collect();

    let columns = (0..num_columns)
        .map(|col| ColumnPlan {
            category: GENERAL.to_string(),
            width_factor: constants.width_factor(
                &header_texts[col],
                rows.iter().map(|r| r.cells[col].text.as_str()),
            ),
            highlight: false,
            palette: None,
        })
        .collect();

    TablePlan {
        columns,
        header,
        rows,
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Pixel geometry of a planned table.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub dpi: f64,
    /// Outer margin on every side.
    pub margin: f64,
    pub column_widths: Vec<f64>,
    pub header_height: f64,
    pub row_heights: Vec<f64>,
}

impl Geometry {
    /// Column widths share the table width in proportion to their width
    /// factors; each row is `base × min factor × height factor` tall.
    pub fn compute(plan: &TablePlan, profile: &StyleProfile, dpi: f64) -> Self {
        let table_width = profile.table_width_inches * dpi;
        let total_factor: f64 = plan.columns.iter().map(|c| c.width_factor).sum();
        let column_widths = plan
            .columns
            .iter()
            .map(|c| {
                if total_factor > 0.0 {
                    table_width * c.width_factor / total_factor
                } else {
                    0.0
                }
            })
            .collect();

        let unit = profile.base_cell_height_inches * profile.min_row_height_factor * dpi;
        Self {
            dpi,
            margin: profile.padding_inches * dpi,
            column_widths,
            header_height: unit * plan.header.height_factor,
            row_heights: plan.rows.iter().map(|r| unit * r.height_factor).collect(),
        }
    }

    pub fn table_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn table_height(&self) -> f64 {
        self.header_height + self.row_heights.iter().sum::<f64>()
    }

    /// Canvas size including the outer margin, rounded up to whole pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        let w = (self.table_width() + 2.0 * self.margin).ceil().max(1.0);
        let h = (self.table_height() + 2.0 * self.margin).ceil().max(1.0);
        (w as u32, h as u32)
    }

    /// Converts points to pixels.
    pub fn px(&self, points: f64) -> f64 {
        points * self.dpi / POINTS_PER_INCH
    }

    fn column_x(&self, col: usize) -> f64 {
        self.margin + self.column_widths[..col].iter().sum::<f64>()
    }

    /// Rectangle of a header cell.
    pub fn header_rect(&self, col: usize) -> Rect {
        Rect {
            x: self.column_x(col),
            y: self.margin,
            width: self.column_widths[col],
            height: self.header_height,
        }
    }

    /// Rectangle of a content cell; `row` is zero-based over data rows.
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        let y = self.margin + self.header_height + self.row_heights[..row].iter().sum::<f64>();
        Rect {
            x: self.column_x(col),
            y,
            width: self.column_widths[col],
            height: self.row_heights[row],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{LayoutRegistry, StyleResolver};

    fn profile() -> StyleProfile {
        LayoutRegistry::builtin().unwrap().resolve("corporate").unwrap()
    }

    fn dataset() -> TabularDataset {
        TabularDataset::new(
            vec!["Node_X".into(), "Node_Y".into(), "Force_kN".into()],
            vec![
                vec![0.0.into(), 0.0.into(), 125.5.into()],
                vec![3.0.into(), f64::NAN.into(), 80.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn width_bands() {
        let c = LayoutConstants::default();
        assert_eq!(c.width_factor("abc", Vec::<&str>::new()), 0.7);
        assert_eq!(c.width_factor("abcdefgh", Vec::<&str>::new()), 0.9);
        assert_eq!(c.width_factor("x", ["a".repeat(15).as_str()]), 1.0);
        assert_eq!(c.width_factor("x", ["a".repeat(25).as_str()]), 1.2);
        assert_eq!(c.width_factor("x", ["a".repeat(35).as_str()]), 1.4);
        assert_eq!(c.width_factor("x", ["a".repeat(36).as_str()]), 1.6);
    }

    #[test]
    fn width_uses_longest_line_only() {
        let c = LayoutConstants::default();
        assert_eq!(c.width_factor("ab", ["abcd\nab"]), 0.9);
    }

    #[test]
    fn width_special_glyph_boost_applies_once() {
        let c = LayoutConstants::default();
        let factor = c.width_factor("Area", ["m²", "× 2", "± 1"]);
        assert!((factor - 0.9 * 1.05).abs() < 1e-12);
        // header glyphs do not count
        assert_eq!(c.width_factor("m²", ["1"]), 0.7);
    }

    #[test]
    fn line_estimates() {
        let c = LayoutConstants::default();
        assert_eq!(c.line_estimate("short", false), 1);
        assert_eq!(c.line_estimate("a\nb\nc", false), 3);
        assert_eq!(c.line_estimate(&"x".repeat(26), false), 2);
        assert_eq!(c.line_estimate(&"x".repeat(21), true), 2);
        assert_eq!(c.line_estimate(&"x".repeat(21), false), 1);
        // a header line longer than 15 adds a line
        assert_eq!(c.line_estimate("Supercalifragilistic", true), 2);
        assert_eq!(c.line_estimate("A Bcdefghijklmnop", true), 2);
        assert_eq!(c.line_estimate("A Bcdefghijklmnop", false), 1);
        assert_eq!(c.line_estimate("Stress\n(MPa)", true), 2);
    }

    #[test]
    fn height_factor_spacing() {
        let c = LayoutConstants::default();
        assert!((c.height_factor(["one"], false, false) - 1.15).abs() < 1e-12);
        assert!((c.height_factor(["a\nb"], false, false) - 2.0 * 1.25).abs() < 1e-12);
        assert!((c.height_factor(["a\nb\nc\nd"], false, false) - 4.0 * 1.30).abs() < 1e-12);
        assert!((c.height_factor(["1\n2\n3\n4\n5\n6"], false, false) - 6.0 * 1.35).abs() < 1e-12);
        assert!((c.height_factor(["one"], true, false) - 1.15 * 1.10).abs() < 1e-12);
        assert!((c.height_factor(["one"], false, true) - 1.15 * 1.25).abs() < 1e-12);
    }

    #[test]
    fn height_factor_takes_row_maximum() {
        let c = LayoutConstants::default();
        let row = ["a", "b\nc\nd", "e"];
        assert!((c.height_factor(row, false, false) - 3.0 * 1.25).abs() < 1e-12);
    }

    #[test]
    fn font_factor_examples() {
        let c = LayoutConstants::default();
        assert_eq!(c.font_factor("abc", false, 1), 1.0);
        assert_eq!(c.font_factor("abcdefg", false, 1), 0.95);
        assert_eq!(c.font_factor("abcdefg", true, 1), 1.0);
        assert!((c.font_factor("abc", false, 4) - 0.95).abs() < 1e-12);
        assert!((c.font_factor("abc", false, 13) - 0.78).abs() < 1e-12);
        assert!((c.font_factor("a\nb", false, 1) - 0.88).abs() < 1e-12);
        assert!((c.font_factor("m²", false, 1) - 0.93).abs() < 1e-12);
        assert!((c.font_factor("(a)", false, 1) - 0.93).abs() < 1e-12);
        // four kinds of bracket
        assert!((c.font_factor("()[]", false, 1) - 0.88).abs() < 1e-12);
    }

    #[test]
    fn font_factor_hits_floor() {
        let c = LayoutConstants::default();
        let busy = format!("{}\n{}\n{} (x)[y]{{z}} m² SRSS", "a".repeat(40), "b", "c");
        assert_eq!(c.font_factor(&busy, false, 20), 0.60);
    }

    #[test]
    fn padding_scale_grows_with_lines() {
        let c = LayoutConstants::default();
        assert_eq!(c.padding_scale(1, true), 1.0);
        assert!((c.padding_scale(2, true) - 1.6).abs() < 1e-12);
        assert!((c.padding_scale(3, false) - 1.6).abs() < 1e-12);
    }

    #[test]
    fn header_text_pipeline() {
        assert_eq!(header_text("Stress (MPa)", 12, 25), "Stress\n(MPa)");
        assert_eq!(header_text("Area (m^2)", 12, 25), "Area\n(m²)");
        assert_eq!(header_text("Ref [@aci]", 12, 25), "Ref\n(aci)");
    }

    #[test]
    fn long_headers_are_wrapped() {
        let shown = header_text("Maximum allowable design shear force at support", 12, 25);
        assert_eq!(shown, "Maximum allowable design\nshear force at support");
        assert!(shown.split('\n').all(|line| line.chars().count() <= 25));

        let ds = TabularDataset::new(
            vec!["Maximum allowable design shear force at support".into()],
            vec![vec![1.0.into()]],
        )
        .unwrap();
        let plan = plan_table(&ds, &profile(), &LayoutConstants::default());
        assert_eq!(plan.header.cells[0].line_count(), 2);
    }

    #[test]
    fn plan_marks_missing_and_numeric() {
        let plan = plan_table(&dataset(), &profile(), &LayoutConstants::default());
        assert_eq!(plan.num_columns(), 3);
        assert_eq!(plan.rows.len(), 2);

        let nan = &plan.rows[1].cells[1];
        assert_eq!(nan.text, "---");
        assert!(nan.missing);
        assert!(!nan.numeric);

        let force = &plan.rows[0].cells[2];
        assert_eq!(force.text, "125.5");
        assert!(force.numeric);
        assert_eq!(plan.rows[0].cells[0].text, "0.0");
    }

    #[test]
    fn plan_wraps_content() {
        let ds = TabularDataset::new(
            vec!["Note".into()],
            vec![vec!["this sentence is certainly longer than the wrap width".into()]],
        )
        .unwrap();
        let plan = plan_table(&ds, &profile(), &LayoutConstants::default());
        let cell = &plan.rows[0].cells[0];
        assert!(cell.line_count() > 1);
        assert!(cell.lines().all(|l| l.chars().count() <= 25));
        assert!(plan.rows[0].height_factor > 1.15);
    }

    #[test]
    fn plan_detects_code() {
        let ds = TabularDataset::new(
            vec!["Snippet".into()],
            vec![vec!["def f(): return x == 1".into()], vec!["plain".into()]],
        )
        .unwrap();
        let plan = plan_table(&ds, &profile(), &LayoutConstants::default());
        assert!(plan.rows[0].cells[0].code);
        assert!(!plan.rows[1].cells[0].code);
    }

    #[test]
    fn geometry_shares_table_width() {
        let profile = profile();
        let plan = plan_table(&dataset(), &profile, &LayoutConstants::default());
        let geo = Geometry::compute(&plan, &profile, 300.0);
        assert!((geo.table_width() - profile.table_width_inches * 300.0).abs() < 1e-6);
        assert_eq!(geo.column_widths.len(), 3);

        let unit = profile.base_cell_height_inches * profile.min_row_height_factor * 300.0;
        assert!((geo.row_heights[0] - unit * plan.rows[0].height_factor).abs() < 1e-9);

        let (w, h) = geo.canvas_size();
        assert!(w as f64 >= geo.table_width() + 2.0 * geo.margin);
        assert!(h as f64 >= geo.table_height() + 2.0 * geo.margin);
    }

    #[test]
    fn geometry_cells_in_a_row_share_height() {
        let profile = profile();
        let plan = plan_table(&dataset(), &profile, &LayoutConstants::default());
        let geo = Geometry::compute(&plan, &profile, 150.0);
        for row in 0..plan.rows.len() {
            let first = geo.cell_rect(row, 0);
            for col in 1..plan.num_columns() {
                let rect = geo.cell_rect(row, col);
                assert_eq!(rect.height, first.height);
                assert_eq!(rect.y, first.y);
            }
        }
        let right_edge = geo.header_rect(2).x + geo.header_rect(2).width;
        assert!((right_edge - (geo.margin + geo.table_width())).abs() < 1e-6);
    }

    #[test]
    fn constants_deserialize_with_defaults() {
        let c: LayoutConstants = serde_yaml::from_str("min_font_factor: 0.5\n").unwrap();
        assert_eq!(c.min_font_factor, 0.5);
        assert_eq!(c.width_factor_max, 1.6);
    }
}
