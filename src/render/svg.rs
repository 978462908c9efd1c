//! SVG export.

use std::fmt::Write;

use super::scene::{Scene, SceneLink, SceneNode};
use crate::config::NodeShape;

/// Render `scene` as a standalone SVG document
pub fn render_svg(scene: &Scene) -> String {
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" "#,
            r#"viewBox="0 0 {:.0} {:.0}" font-family="sans-serif" font-size="{}">"#
        ),
        scene.width, scene.height, scene.width, scene.height, scene.font_size
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="100%" height="100%" fill="{}" />"#,
        escape(&scene.background)
    );

    svg.push_str("  <g class=\"links\">\n");
    for link in &scene.links {
        write_link(&mut svg, link);
    }
    svg.push_str("  </g>\n");

    svg.push_str("  <g class=\"nodes\">\n");
    for node in &scene.nodes {
        write_node(&mut svg, node, scene.font_size);
    }
    svg.push_str("  </g>\n");

    svg.push_str("</svg>\n");
    svg
}

fn write_link(svg: &mut String, link: &SceneLink) {
    match link.control {
        Some(c) => {
            let _ = writeln!(
                svg,
                concat!(
                    r#"    <path d="M {:.1} {:.1} Q {:.1} {:.1} {:.1} {:.1}" "#,
                    r#"fill="none" stroke="{}" stroke-width="{:.2}" />"#
                ),
                link.start.x, link.start.y, c.x, c.y, link.end.x, link.end.y,
                escape(&link.color),
                link.width
            );
        }
        None => {
            let _ = writeln!(
                svg,
                concat!(
                    r#"    <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" "#,
                    r#"stroke="{}" stroke-width="{:.2}" />"#
                ),
                link.start.x, link.start.y, link.end.x, link.end.y,
                escape(&link.color),
                link.width
            );
        }
    }

    if let Some(label) = &link.label {
        let mid = link.midpoint();
        let _ = writeln!(
            svg,
            r#"    <text x="{:.1}" y="{:.1}" text-anchor="middle" fill="{}">{}</text>"#,
            mid.x,
            mid.y - 4.0,
            escape(&link.color),
            escape(label)
        );
    }
}

fn write_node(svg: &mut String, node: &SceneNode, font_size: f64) {
    let (x, y, r) = (node.center.x, node.center.y, node.radius);
    let _ = writeln!(
        svg,
        r#"    <g class="node {}" id="{}">"#,
        escape(&node.kind),
        escape(&node.id)
    );

    let mut title = format!("{} ({})", node.id, node.kind);
    for (key, value) in &node.attributes {
        let _ = write!(title, "\n{}: {}", key, value);
    }
    let _ = writeln!(svg, "      <title>{}</title>", escape(&title));

    let fill = escape(&node.fill);
    match node.shape {
        NodeShape::Circle => {
            let _ = writeln!(
                svg,
                r##"      <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" stroke="#333333" />"##,
                x, y, r, fill
            );
        }
        NodeShape::Square => {
            let _ = writeln!(
                svg,
                concat!(
                    r#"      <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" "#,
                    r##"fill="{}" stroke="#333333" />"##
                ),
                x - r, y - r, 2.0 * r, 2.0 * r, fill
            );
        }
        NodeShape::Diamond => {
            let _ = writeln!(
                svg,
                concat!(
                    r#"      <polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" "#,
                    r##"fill="{}" stroke="#333333" />"##
                ),
                x, y - r, x + r, y, x, y + r, x - r, y, fill
            );
        }
    }

    let _ = writeln!(
        svg,
        r#"      <text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        x,
        y + r + font_size,
        escape(&node.label)
    );
    svg.push_str("    </g>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
