//! Cell background colors.

use crate::dataset::CellValue;
use crate::error::Result;
use crate::palette::{PaletteStore, Rgb};
use crate::style::StyleProfile;

/// Colors shared by every cell of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticColors {
    pub header: Rgb,
    pub border: Rgb,
    pub alternate: Rgb,
}

/// Resolves the profile's header, border and alternate-row colors.
///
/// Missing palettes or tones fall back to the neutral palette (see
/// [`PaletteStore::lookup`]).
pub fn resolve_static_colors(profile: &StyleProfile, palettes: &PaletteStore) -> Result<StaticColors> {
    Ok(StaticColors {
        header: palettes.lookup(&profile.header.palette, &profile.header.tone)?,
        border: palettes.lookup(&profile.border.palette, &profile.border.tone)?,
        alternate: palettes.lookup(&profile.alternate.palette, &profile.alternate.tone)?,
    })
}

/// One gradient color per value, using the named palette.
///
/// # Errors
///
/// A configuration error when the palette is unknown or has no gradient
/// tones.
pub fn resolve_gradient(
    values: &[CellValue],
    palette: &str,
    palettes: &PaletteStore,
) -> Result<Vec<Rgb>> {
    let colors = palettes.gradient(palette)?;
    Ok(gradient_indices(values, colors.len())
        .into_iter()
        .map(|i| colors[i])
        .collect())
}

/// Maps values onto `0..len` by relative magnitude.
///
/// Only finite numbers set the range. Non-numeric values rank as `0.0` and
/// are clamped into it. Positive infinity always takes the last index and
/// negative infinity the first. With no range (`min == max` or no finite
/// numbers) every other value gets the middle index `len / 2`.
///
/// ```rust
/// use tabula_render::{color::gradient_indices, CellValue};
///
/// let values: Vec<CellValue> = vec![10.0.into(), 20.0.into(), 30.0.into()];
/// assert_eq!(gradient_indices(&values, 5), vec![0, 2, 4]);
/// assert_eq!(gradient_indices(&values[..1], 5), vec![2]);
/// ```
pub fn gradient_indices(values: &[CellValue], len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let numbers: Vec<Option<f64>> = values.iter().map(CellValue::as_extended_f64).collect();

    let range = numbers
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .filter(|(lo, hi)| lo < hi);

    let last = (len - 1) as f64;
    numbers
        .iter()
        .map(|v| match (*v, range) {
            (Some(v), _) if v == f64::INFINITY => len - 1,
            (Some(v), _) if v == f64::NEG_INFINITY => 0,
            (_, None) => len / 2,
            (v, Some((min, max))) => {
                let norm = (v.unwrap_or(0.0) - min) / (max - min);
                (norm * last).round().clamp(0.0, last) as usize
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::style::{LayoutRegistry, StyleResolver};

    fn store() -> PaletteStore {
        PaletteStore::from_yaml(
            "test",
            r##"
neutrals:
  medium_light: "#cccccc"
ramp:
  light: "#000001"
  medium_light: "#000002"
  medium: "#000003"
  medium_dark: "#000004"
  dark: "#000005"
"##,
        )
        .unwrap()
    }

    #[test]
    fn static_colors_from_builtin_layout() {
        let registry = LayoutRegistry::builtin().unwrap();
        let profile = registry.resolve("modern").unwrap();
        let colors = resolve_static_colors(&profile, registry.palettes()).unwrap();
        assert_eq!(colors.header, registry.palettes().get("blues", "medium_light").unwrap());
        assert_eq!(colors.alternate, registry.palettes().get("grays_cool", "light").unwrap());
    }

    #[test]
    fn static_colors_fall_back() {
        let registry = LayoutRegistry::builtin().unwrap();
        let mut profile = registry.resolve("corporate").unwrap();
        profile.header.palette = "does_not_exist".into();
        let colors = resolve_static_colors(&profile, registry.palettes()).unwrap();
        assert_eq!(colors.header, registry.palettes().get("neutrals", "medium_light").unwrap());
    }

    #[test]
    fn static_colors_without_neutral_fail() {
        let registry = LayoutRegistry::builtin().unwrap();
        let profile = registry.resolve("corporate").unwrap();
        let err = resolve_static_colors(&profile, &PaletteStore::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn gradient_spans_palette() {
        let values: Vec<CellValue> = vec![0.0.into(), 25.0.into(), 50.0.into(), 75.0.into(), 100.0.into()];
        let colors = resolve_gradient(&values, "ramp", &store()).unwrap();
        assert_eq!(
            colors,
            vec![Rgb(0, 0, 1), Rgb(0, 0, 2), Rgb(0, 0, 3), Rgb(0, 0, 4), Rgb(0, 0, 5)]
        );
    }

    #[test]
    fn gradient_single_value_is_middle() {
        let values: Vec<CellValue> = vec![42.0.into()];
        assert_eq!(resolve_gradient(&values, "ramp", &store()).unwrap(), vec![Rgb(0, 0, 3)]);
    }

    #[test]
    fn gradient_equal_values_are_middle() {
        let values: Vec<CellValue> = vec![7i64.into(), 7i64.into(), 7i64.into()];
        assert_eq!(gradient_indices(&values, 5), vec![2, 2, 2]);
        assert_eq!(gradient_indices(&values, 4), vec![2, 2, 2]);
    }

    #[test]
    fn gradient_without_numbers_is_middle() {
        let values: Vec<CellValue> = vec!["a".into(), CellValue::Missing];
        assert_eq!(gradient_indices(&values, 5), vec![2, 2]);
    }

    #[test]
    fn gradient_text_numbers_and_outliers() {
        let values: Vec<CellValue> = vec!["10".into(), "1,5e1".into(), "x".into(), 20i64.into()];
        // "x" ranks as 0.0 and clamps to the lightest color
        assert_eq!(gradient_indices(&values, 5), vec![0, 2, 0, 4]);
    }

    #[test]
    fn gradient_infinities_take_the_ends() {
        let values: Vec<CellValue> = vec![
            1i64.into(),
            2i64.into(),
            f64::INFINITY.into(),
            f64::NEG_INFINITY.into(),
        ];
        assert_eq!(gradient_indices(&values, 5), vec![0, 4, 4, 0]);

        let values: Vec<CellValue> = vec![5.0.into(), "inf".into()];
        assert_eq!(gradient_indices(&values, 5), vec![2, 4]);
    }

    #[test]
    fn gradient_nan_ranks_as_text() {
        let values: Vec<CellValue> = vec![f64::NAN.into(), 10i64.into(), 20i64.into()];
        assert_eq!(gradient_indices(&values, 5), vec![0, 0, 4]);
    }

    #[test]
    fn gradient_unknown_palette_is_error() {
        let values: Vec<CellValue> = vec![1i64.into(), 2i64.into()];
        let err = resolve_gradient(&values, "nope", &store()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn gradient_is_monotonic(
            mut values in proptest::collection::vec(-1e6f64..1e6, 2..40),
            len in 1usize..6,
        ) {
            values.sort_by(|a, b| a.total_cmp(b));
            let cells: Vec<CellValue> = values.iter().map(|&v| CellValue::Float(v)).collect();
            let indices = gradient_indices(&cells, len);
            prop_assert_eq!(indices.len(), cells.len());
            for pair in indices.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            for &i in &indices {
                prop_assert!(i < len);
            }
        }
    }
}
