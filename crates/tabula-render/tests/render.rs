//! Integration tests for the rendering pipeline.
//!
//! Fonts are loaded from an empty database so the tests do not depend on the
//! host's installed fonts; PNG output then contains shapes only.

use std::fs;
use std::sync::Arc;

use resvg::usvg::fontdb;
use tabula_render::{
    next_table_path, ErrorKind, Highlight, ImageFormat, LayoutRegistry, TableOptions,
    StyleResolver, TableRenderer, TabularDataset,
};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn renderer() -> TableRenderer {
    TableRenderer::builtin()
        .unwrap()
        .with_fonts(Arc::new(fontdb::Database::new()))
}

fn nodes() -> TabularDataset {
    TabularDataset::from_csv_str(
        "Node_X,Node_Y,Force_kN\n0,0,125.5\n3,NaN,80\n6,1.5,\n",
    )
    .unwrap()
}

// ============================================================================
// Single images
// ============================================================================

#[test]
fn renders_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("nodes.png");

    let written = renderer()
        .render(&nodes(), &TableOptions::default().dpi(72.0), &path)
        .unwrap();

    assert_eq!(written, path);
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(PNG_SIGNATURE));
}

#[test]
fn renders_svg_with_missing_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.svg");
    let options = TableOptions::new("modern").format(ImageFormat::Svg);

    renderer().render(&nodes(), &options, &path).unwrap();

    let svg = fs::read_to_string(&path).unwrap();
    assert_eq!(svg.matches(">---</tspan>").count(), 2);
    assert!(svg.contains(r#"font-style="italic""#));
    assert!(svg.contains(">Node_X</tspan>"));
}

#[test]
fn highlighted_column_uses_gradient_colors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forces.svg");
    let renderer = renderer();
    let options = TableOptions::new("minimal")
        .format(ImageFormat::Svg)
        .highlight(Highlight::Columns(vec!["Force_kN".into()]));

    renderer.render(&nodes(), &options, &path).unwrap();

    let reds = renderer.resolver().palettes().gradient("reds").unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains(&reds[0].to_hex()));
    assert!(svg.contains(&reds[4].to_hex()));
}

#[test]
fn canvas_scales_with_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = renderer();

    let small = dir.path().join("small.svg");
    let large = dir.path().join("large.svg");
    let options = TableOptions::default().format(ImageFormat::Svg);
    renderer.render(&nodes(), &options.clone().dpi(100.0), &small).unwrap();
    renderer.render(&nodes(), &options.dpi(200.0), &large).unwrap();

    let width = |path: &std::path::Path| -> f64 {
        let svg = fs::read_to_string(path).unwrap();
        let start = svg.find("width=\"").unwrap() + 7;
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end].parse().unwrap()
    };
    let ratio = width(&large) / width(&small);
    assert!((ratio - 2.0).abs() < 0.02, "ratio {}", ratio);
}

#[test]
fn control_characters_do_not_break_png() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = TabularDataset::from_csv_str("Note\nbell\u{7}here\n").unwrap();

    let png = dir.path().join("t.png");
    renderer()
        .render(&dataset, &TableOptions::default(), &png)
        .unwrap();
    assert!(fs::read(&png).unwrap().starts_with(PNG_SIGNATURE));

    let svg = dir.path().join("t.svg");
    renderer()
        .render(&dataset, &TableOptions::default().format(ImageFormat::Svg), &svg)
        .unwrap();
    let content = fs::read_to_string(&svg).unwrap();
    assert!(!content.contains('\u{7}'));
    assert!(content.contains(">bellhere</tspan>"));
}

#[test]
fn unknown_highlight_column_is_data_shape() {
    let dir = tempfile::tempdir().unwrap();
    let options = TableOptions::default().highlight(Highlight::Columns(vec!["Moment".into()]));
    let err = renderer()
        .render(&nodes(), &options, dir.path().join("t.png"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataShape);
    assert!(!dir.path().join("t.png").exists());
}

#[test]
fn custom_layout_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("report.yaml"),
        "extends: corporate\nheader_bold: false\n",
    )
    .unwrap();

    let mut registry = LayoutRegistry::builtin().unwrap();
    registry.add_dir(dir.path()).unwrap();
    let renderer =
        TableRenderer::new(registry).with_fonts(Arc::new(fontdb::Database::new()));

    let path = dir.path().join("report.svg");
    let options = TableOptions::new("report").format(ImageFormat::Svg);
    renderer.render(&nodes(), &options, &path).unwrap();
    assert!(!fs::read_to_string(&path).unwrap().contains(r#"font-weight="bold""#));
}

// ============================================================================
// Split tables
// ============================================================================

#[test]
fn render_parts_numbers_files() {
    let dir = tempfile::tempdir().unwrap();
    let rows: String = (0..7).map(|i| format!("P{},{}\n", i, i * 10)).collect();
    let dataset = TabularDataset::from_csv_str(&format!("Point,Load\n{}", rows)).unwrap();
    let options = TableOptions::default()
        .format(ImageFormat::Svg)
        .max_rows_per_table(3);

    let written = renderer().render_parts(&dataset, &options, dir.path()).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["table_1.svg", "table_2.svg", "table_3.svg"]);
    let last = fs::read_to_string(&written[2]).unwrap();
    assert!(last.contains(">P6</tspan>"));
    assert!(!last.contains(">P5</tspan>"));
}

#[test]
fn render_parts_continues_numbering() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("table_1.png"), b"").unwrap();
    let options = TableOptions::default().format(ImageFormat::Svg);

    let written = renderer().render_parts(&nodes(), &options, dir.path()).unwrap();

    assert_eq!(written, vec![dir.path().join("table_2.svg")]);
    assert_eq!(
        next_table_path(dir.path(), ImageFormat::Png).unwrap(),
        dir.path().join("table_3.png")
    );
}

#[test]
fn empty_dataset_renders_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = TabularDataset::from_csv_str("Member,Length\n").unwrap();
    let path = dir.path().join("empty.svg");
    renderer()
        .render(&dataset, &TableOptions::default().format(ImageFormat::Svg), &path)
        .unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains(">Member</tspan>"));
}

#[test]
fn long_header_is_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = TabularDataset::from_csv_str(
        "Maximum allowable design shear force at support\n12.5\n",
    )
    .unwrap();
    let path = dir.path().join("long.svg");
    renderer()
        .render(&dataset, &TableOptions::default().format(ImageFormat::Svg), &path)
        .unwrap();

    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains(">Maximum allowable design</tspan>"));
    assert!(svg.contains(">shear force at support</tspan>"));
}
