//! PNG output by rasterizing the SVG scene.

use cluster_common::{ClusterError, ClusterResult};
use tracing::debug;

/// Rasterize an SVG document at its own size and encode it as PNG.
///
/// Text is drawn only when fonts are available to the SVG parser.
pub fn svg_to_png(svg: &str) -> ClusterResult<Vec<u8>> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| ClusterError::RenderError(format!("SVG parse failed: {}", e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        ClusterError::RenderError(format!(
            "invalid canvas size {}x{}",
            size.width(),
            size.height()
        ))
    })?;

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let png = pixmap
        .encode_png()
        .map_err(|e| ClusterError::RenderError(format!("PNG encode failed: {}", e)))?;

    debug!(
        width = size.width(),
        height = size.height(),
        bytes = png.len(),
        "Rasterized scene"
    );
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_signature() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><circle cx="5" cy="5" r="4" fill="#2b6cb0"/></svg>"##;
        let png = svg_to_png(svg).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_invalid_svg() {
        assert!(matches!(
            svg_to_png("not svg"),
            Err(ClusterError::RenderError(_))
        ));
    }
}
