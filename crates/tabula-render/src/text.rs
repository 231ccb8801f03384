//! Cell text processing: missing values, glyph substitution and wrapping.
//!
//! Everything here works on display strings and is independent of fonts or
//! pixels. Widths are measured in display columns with `unicode-width`, which
//! equals the character count for the Latin text these tables usually hold.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_width::UnicodeWidthStr;

use crate::dataset::{parse_number, CellValue};

/// What every missing value renders as.
pub const MISSING_MARKER: &str = "---";

/// Lower-cased, trimmed spellings treated as missing.
pub const MISSING_SPELLINGS: &[&str] = &["", "nan", "none", "null", "n/a", "na"];

/// Default split threshold for header hints.
pub const HEADER_SPLIT_THRESHOLD: usize = 12;

/// Headers up to this length are never split.
const HEADER_KEEP_LENGTH: usize = 8;

const SUPERSCRIPT_GLYPHS: &[char] = &[
    '⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹', '⁺', '⁻', '⁼', '⁽', '⁾', 'ⁿ', 'ⁱ',
];

const SUBSCRIPT_GLYPHS: &[char] = &[
    '₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉', '₊', '₋', '₌', '₍', '₎',
];

const OPERATOR_GLYPHS: &[char] = &['·', '×', '÷', '±', '≤', '≥'];

const CODE_INDICATORS: &[&str] = &[
    "def ", "function", "class ", "()", "{}", "[]", "import ", "from ", "=", "==",
];

static SUP_BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\{([^}]+)\}").unwrap());
static SUP_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^([+-]?[0-9]+)").unwrap());
static SUB_BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\{([^}]+)\}").unwrap());
static CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[@([^\]]+)\]").unwrap());

/// Returns the display width of a string.
///
/// ```rust
/// use tabula_render::text::display_width;
///
/// assert_eq!(display_width("hello"), 5);
/// assert_eq!(display_width("m²"), 2);
/// ```
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Width of the widest line.
pub fn max_line_width(s: &str) -> usize {
    s.split('\n').map(display_width).max().unwrap_or(0)
}

/// Number of lines, counting explicit breaks only.
pub fn line_count(s: &str) -> usize {
    s.matches('\n').count() + 1
}

/// Whether a cell value counts as missing.
///
/// Detection ignores case and surrounding whitespace.
///
/// ```rust
/// use tabula_render::{text::is_missing, CellValue};
///
/// assert!(is_missing(&CellValue::Text(" NULL ".into())));
/// assert!(is_missing(&CellValue::Float(f64::NAN)));
/// assert!(!is_missing(&CellValue::Text("0".into())));
/// ```
pub fn is_missing(value: &CellValue) -> bool {
    match value {
        CellValue::Missing => true,
        CellValue::Float(f) => f.is_nan(),
        CellValue::Int(_) => false,
        CellValue::Text(s) => {
            let normalized = s.trim().to_lowercase();
            MISSING_SPELLINGS.contains(&normalized.as_str())
        }
    }
}

/// The display string of a value, with missing values collapsed to `---`.
pub fn sanitize_missing(value: &CellValue) -> String {
    if is_missing(value) {
        MISSING_MARKER.to_string()
    } else {
        value.display()
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        _ => return None,
    })
}

/// Maps every char of the capture, or keeps the whole match untouched.
fn map_capture(caps: &Captures<'_>, map: fn(char) -> Option<char>) -> String {
    caps[1]
        .chars()
        .map(map)
        .collect::<Option<String>>()
        .unwrap_or_else(|| caps[0].to_string())
}

/// Replaces `^2`, `^{-1}` and `_{2}` markup with Unicode glyphs.
///
/// Bare underscores are left alone so names like `Node_X` survive.
///
/// ```rust
/// use tabula_render::text::format_superscripts;
///
/// assert_eq!(format_superscripts("m^2"), "m²");
/// assert_eq!(format_superscripts("s^{-1}"), "s⁻¹");
/// assert_eq!(format_superscripts("CO_{2}"), "CO₂");
/// assert_eq!(format_superscripts("Node_X"), "Node_X");
/// ```
pub fn format_superscripts(text: &str) -> Cow<'_, str> {
    if !text.contains('^') && !text.contains("_{") {
        return Cow::Borrowed(text);
    }
    let step = SUP_BRACED.replace_all(text, |c: &Captures<'_>| map_capture(c, superscript));
    let step = SUP_BARE.replace_all(&step, |c: &Captures<'_>| map_capture(c, superscript));
    let step = SUB_BRACED.replace_all(&step, |c: &Captures<'_>| map_capture(c, subscript));
    Cow::Owned(step.into_owned())
}

/// Turns `[@key]` citation markup into a plain `(key)`.
pub fn flatten_citations(text: &str) -> Cow<'_, str> {
    CITATION.replace_all(text, "($1)")
}

/// Whether the text holds a superscript/subscript glyph or a math operator.
pub fn has_special_glyph(text: &str) -> bool {
    text.chars().any(|c| {
        SUPERSCRIPT_GLYPHS.contains(&c) || SUBSCRIPT_GLYPHS.contains(&c) || OPERATOR_GLYPHS.contains(&c)
    })
}

/// Whether the text looks like source code (two or more indicators).
pub fn is_code_like(text: &str) -> bool {
    CODE_INDICATORS
        .iter()
        .filter(|indicator| text.contains(*indicator))
        .count()
        >= 2
}

/// Whether the text reads as a number (decimal comma and spaces allowed).
pub fn is_numeric_text(text: &str) -> bool {
    parse_number(text).is_some()
}

/// Greedy word wrap at `width` display columns.
///
/// Existing line breaks are kept and each line is wrapped on its own. Lines
/// that already fit are returned verbatim. A word wider than `width` is never
/// split; it stays whole on its own line. Wrapping is idempotent.
///
/// ```rust
/// use tabula_render::text::wrap;
///
/// assert_eq!(wrap("hello world foo bar", 11), "hello world\nfoo bar");
/// assert_eq!(wrap("short", 11), "short");
/// assert_eq!(wrap("a\nsupercalifragilistic word", 8), "a\nsupercalifragilistic\nword");
/// ```
pub fn wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    if !text.contains('\n') && display_width(text) <= width {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    if display_width(line) <= width {
        return line.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_whitespace() {
        let word_width = display_width(word);
        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Structural line-break hint for a header.
///
/// Tries, in order, and applies the first that leaves both halves within
/// `threshold` characters:
///
/// 1. after the first `/`
/// 2. before a parenthesised unit annotation
/// 3. at a space between words
/// 4. after a hyphen or dash
/// 5. at a lower→upper camel-case boundary
///
/// Headers of eight characters or fewer are returned unchanged, and headers
/// that already fit in `threshold` are only split by rules 1 and 2.
///
/// ```rust
/// use tabula_render::text::header_multiline;
///
/// assert_eq!(header_multiline("Stress (MPa)", 12), "Stress\n(MPa)");
/// assert_eq!(header_multiline("Load/Capacity", 12), "Load/\nCapacity");
/// assert_eq!(header_multiline("MaximumDisplacement", 12), "Maximum\nDisplacement");
/// ```
pub fn header_multiline(header: &str, threshold: usize) -> String {
    let len = |s: &str| s.chars().count();
    if len(header) <= HEADER_KEEP_LENGTH {
        return header.to_string();
    }

    if let Some((first, rest)) = header.split_once('/') {
        if len(first) <= threshold && len(rest) <= threshold {
            return format!("{}/\n{}", first, rest);
        }
    }

    if header.contains(')') {
        if let Some(start) = header.find('(').filter(|&i| i > 0) {
            let main = header[..start].trim();
            let unit = header[start..].trim();
            if len(main) <= threshold && len(unit) <= threshold {
                return format!("{}\n{}", main, unit);
            }
        }
    }

    if len(header) <= threshold {
        return header.to_string();
    }

    let words: Vec<&str> = header.split(' ').collect();
    for i in 1..words.len() {
        let first = words[..i].join(" ");
        let second = words[i..].join(" ");
        if len(&first) <= threshold && len(&second) <= threshold {
            return format!("{}\n{}", first, second);
        }
    }

    for separator in ['-', '–', '—'] {
        if let Some((first, second)) = header.split_once(separator) {
            if len(first) <= threshold && len(second) <= threshold {
                return format!("{}{}\n{}", first, separator, second);
            }
        }
    }

    let chars: Vec<char> = header.chars().collect();
    for i in 1..chars.len() {
        if chars[i - 1].is_lowercase() && chars[i].is_uppercase() {
            let (first, second) = chars.split_at(i);
            if first.len() <= threshold && second.len() <= threshold {
                let first: String = first.iter().collect();
                let second: String = second.iter().collect();
                return format!("{}\n{}", first, second);
            }
        }
    }

    header.to_string()
}
