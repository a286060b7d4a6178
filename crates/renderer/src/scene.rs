//! SVG scene assembly.
//!
//! Layout:
//! ```text
//! <svg viewBox="0 0 w h">
//!   <g class="map-root" transform="translate(tx,ty) scale(k)">
//!     <g class="states"><path d=".."/>...</g>
//!   </g>
//!   <g class="clusters">
//!     <g class="cluster" data-key="cx,cy" transform="translate(x,y)">
//!       <circle r=".."/><text ..>sum</text>
//!     </g>
//!   </g>
//! </svg>
//! ```
//! The base map group carries the viewport transform; cluster positions are
//! already in screen space so circles stay round and labels stay legible.

use std::fmt::Write;

use cluster_common::{ViewportSize, ViewportTransform};
use serde::{Deserialize, Serialize};

use crate::basemap::BaseMapLayer;
use crate::marks::MarkLayer;

/// Colors and strokes for the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    pub background: String,
    pub state_fill: String,
    pub state_stroke: String,
    pub state_stroke_width: f64,
    pub cluster_fill: String,
    pub cluster_fill_opacity: f64,
    pub cluster_stroke: String,
    pub label_color: String,
    pub font_family: String,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            state_fill: "#eef1f4".to_string(),
            state_stroke: "#9aa5b1".to_string(),
            state_stroke_width: 0.75,
            cluster_fill: "#2b6cb0".to_string(),
            cluster_fill_opacity: 0.7,
            cluster_stroke: "#1a4971".to_string(),
            label_color: "#ffffff".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

/// SVG `transform` attribute value for a viewport transform.
pub fn transform_attr(t: &ViewportTransform) -> String {
    format!(
        "translate({},{}) scale({})",
        t.translate_x, t.translate_y, t.scale
    )
}

/// Render the full scene to an SVG document.
pub fn render_svg(
    viewport: &ViewportSize,
    transform: &ViewportTransform,
    basemap: &BaseMapLayer,
    marks: &MarkLayer,
    style: &SceneStyle,
) -> String {
    let mut svg = String::with_capacity(4096 + marks.len() * 256);

    // Writing to a String cannot fail; results are ignored throughout.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" preserveAspectRatio="xMidYMid meet">"#,
        w = viewport.width,
        h = viewport.height
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        escape(&style.background)
    );

    // States scale with the zoom, strokes should not.
    let stroke_width = style.state_stroke_width / transform.scale;
    let _ = writeln!(
        svg,
        r#"<g class="map-root" transform="{}">"#,
        transform_attr(transform)
    );
    let _ = writeln!(
        svg,
        r#"<g class="states" fill="{}" stroke="{}" stroke-width="{:.4}" stroke-linejoin="round">"#,
        escape(&style.state_fill),
        escape(&style.state_stroke),
        stroke_width
    );
    for path in basemap.paths().iter().filter(|p| !p.d.is_empty()) {
        match &path.name {
            Some(name) => {
                let _ = writeln!(
                    svg,
                    r#"<path data-name="{}" d="{}"/>"#,
                    escape(name),
                    path.d
                );
            }
            None => {
                let _ = writeln!(svg, r#"<path d="{}"/>"#, path.d);
            }
        }
    }
    svg.push_str("</g>\n</g>\n");

    let _ = writeln!(
        svg,
        r#"<g class="clusters" font-family="{}">"#,
        escape(&style.font_family)
    );
    for mark in marks.marks() {
        let _ = writeln!(
            svg,
            r#"<g class="cluster" data-key="{}" transform="translate({:.2},{:.2})">"#,
            mark.key, mark.x, mark.y
        );
        let _ = writeln!(
            svg,
            r#"<circle r="{:.2}" fill="{}" fill-opacity="{}" stroke="{}"/>"#,
            mark.radius,
            escape(&style.cluster_fill),
            style.cluster_fill_opacity,
            escape(&style.cluster_stroke)
        );
        let _ = writeln!(
            svg,
            r#"<text text-anchor="middle" dy="0.35em" font-size="{:.1}" fill="{}">{}</text>"#,
            mark.font_size,
            escape(&style.label_color),
            escape(&mark.label)
        );
        svg.push_str("</g>\n");
    }
    svg.push_str("</g>\n</svg>\n");

    svg
}

/// Escape text for use in XML content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_attr() {
        let t = ViewportTransform::new(-120.5, 0.0, 2.0);
        assert_eq!(transform_attr(&t), "translate(-120.5,0) scale(2)");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"A&B <"x">"#), "A&amp;B &lt;&quot;x&quot;&gt;");
    }

    #[test]
    fn test_empty_scene_is_well_formed() {
        let svg = render_svg(
            &ViewportSize::from_width(960.0),
            &ViewportTransform::identity(),
            &BaseMapLayer::default(),
            &MarkLayer::new(),
            &SceneStyle::default(),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 960 595""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(!svg.contains("class=\"cluster\""));
    }
}
