//! SVG to PNG.

use std::sync::Arc;

use once_cell::sync::Lazy;
use resvg::tiny_skia;
use resvg::usvg::{fontdb, Options, Tree};
use tracing::debug;

static SYSTEM_FONTS: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!("Loaded {} font faces from system", db.len());
    Arc::new(db)
});

/// Font database with the system fonts, loaded once per process.
pub fn system_fonts() -> Arc<fontdb::Database> {
    Arc::clone(&SYSTEM_FONTS)
}

/// Rasterizes an SVG document onto a white `width × height` canvas.
///
/// Fonts missing from `fonts` are skipped by the text layout, so text may be
/// absent but the call still succeeds.
pub fn encode_png(
    svg: &str,
    width: u32,
    height: u32,
    fonts: Arc<fontdb::Database>,
) -> Result<Vec<u8>, String> {
    let options = Options {
        fontdb: fonts,
        ..Default::default()
    };
    let tree = Tree::from_str(svg, &options).map_err(|e| format!("invalid SVG: {}", e))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("cannot allocate a {}x{} canvas", width, height))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn encodes_shapes_without_fonts() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="3" viewBox="0 0 4 3"><rect width="2" height="3" fill="#ff0000"/></svg>"##;
        let png = encode_png(svg, 4, 3, Arc::new(fontdb::Database::new())).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn rejects_broken_svg() {
        let err = encode_png("<svg", 4, 3, Arc::new(fontdb::Database::new())).unwrap_err();
        assert!(err.contains("invalid SVG"));
    }

    #[test]
    fn rejects_empty_canvas() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="3"/>"#;
        assert!(encode_png(svg, 0, 3, Arc::new(fontdb::Database::new())).is_err());
    }
}
