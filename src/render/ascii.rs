//! Character-grid rendering.
//!
//! Used for the `txt` export format and redrawn on every step of the
//! interactive session. Node markers encode the shape: `(circle)`,
//! `[square]`, `<diamond>`.

use std::fmt::Write;

use super::scene::{Scene, SceneNode};
use crate::config::NodeShape;
use crate::graph::GraphSummary;
use crate::layout::Point;

/// Longest label drawn on the grid; longer ones are cut
const MAX_LABEL: usize = 12;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 8.0;
const ZOOM_STEP: f64 = 1.25;

/// Which part of the scene is visible on the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    /// Offset of the view center from the canvas center, in canvas units
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ORIGIN,
        }
    }
}

impl Viewport {
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Pan by a fraction of the visible width/height
    pub fn pan_by(&mut self, scene: &Scene, fx: f64, fy: f64) {
        self.pan += Point::new(fx * scene.width / self.zoom, fy * scene.height / self.zoom);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<Vec<char>>,
}

impl Grid {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![vec![' '; columns]; rows],
        }
    }

    fn put(&mut self, col: i64, row: i64, ch: char) {
        if col >= 0 && row >= 0 && (col as usize) < self.columns && (row as usize) < self.rows {
            self.cells[row as usize][col as usize] = ch;
        }
    }

    fn text(&mut self, col: i64, row: i64, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i64, row, ch);
        }
    }

    /// Bresenham line, drawn with a character matching its slope
    fn line(&mut self, (c0, r0): (i64, i64), (c1, r1): (i64, i64)) {
        let (dx, dy) = (c1 - c0, r1 - r0);
        let ch = if dx.abs() > 2 * dy.abs() {
            '-'
        } else if dy.abs() > 2 * dx.abs() {
            '|'
        } else if (dx > 0) == (dy > 0) {
            '\\'
        } else {
            '/'
        };

        let (sx, sy) = (dx.signum(), dy.signum());
        let (adx, ady) = (dx.abs(), -dy.abs());
        let mut err = adx + ady;
        let (mut c, mut r) = (c0, r0);
        loop {
            self.put(c, r, ch);
            if c == c1 && r == r1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= ady {
                err += ady;
                c += sx;
            }
            if e2 <= adx {
                err += adx;
                r += sy;
            }
        }
    }

    fn finish(self) -> String {
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut out = String::with_capacity((self.columns + 3) * (self.rows + 2));
        out.push_str(&border);
        out.push('\n');
        for row in self.cells {
            out.push('|');
            out.extend(row);
            out.push_str("|\n");
        }
        out.push_str(&border);
        out.push('\n');
        out
    }
}

/// Draw `scene` on a `columns` x `rows` character grid, framed by a border
pub fn render_ascii(scene: &Scene, viewport: &Viewport, columns: usize, rows: usize) -> String {
    let mut grid = Grid::new(columns, rows);
    let center = Point::new(scene.width / 2.0, scene.height / 2.0) + viewport.pan;

    let project = |p: Point| -> (i64, i64) {
        let u = (p.x - center.x) * viewport.zoom / scene.width + 0.5;
        let v = (p.y - center.y) * viewport.zoom / scene.height + 0.5;
        (
            (u * (columns as f64 - 1.0)).round() as i64,
            (v * (rows as f64 - 1.0)).round() as i64,
        )
    };

    for link in &scene.links {
        let (start, end) = (project(link.start), project(link.end));
        if link.control.is_some() {
            let mid = project(link.midpoint());
            grid.line(start, mid);
            grid.line(mid, end);
        } else {
            grid.line(start, end);
        }
    }

    for node in &scene.nodes {
        let (col, row) = project(node.center);
        let marker = marker(node);
        let width = marker.chars().count() as i64;
        let mut start = col - width / 2;
        // Visible nodes keep their whole marker on the grid
        if (0..columns as i64).contains(&col) {
            start = start.clamp(0, (columns as i64 - width).max(0));
        }
        grid.text(start, row, &marker);
    }

    grid.finish()
}

fn marker(node: &SceneNode) -> String {
    let label: String = if node.label.chars().count() > MAX_LABEL {
        let cut: String = node.label.chars().take(MAX_LABEL - 1).collect();
        format!("{}~", cut)
    } else {
        node.label.clone()
    };
    match node.shape {
        NodeShape::Circle => format!("({})", label),
        NodeShape::Square => format!("[{}]", label),
        NodeShape::Diamond => format!("<{}>", label),
    }
}

/// Full text artifact: the grid followed by a summary and node/link listing
pub fn render_text(scene: &Scene, summary: &GraphSummary, columns: usize, rows: usize) -> String {
    let mut out = render_ascii(scene, &Viewport::default(), columns, rows);
    out.push('\n');
    out.push_str(&summary.report());

    if !scene.nodes.is_empty() {
        out.push_str("\nNodes:\n");
        for node in &scene.nodes {
            let _ = write!(out, "  {} [{}]", node.id, node.kind);
            if node.label != node.id {
                let _ = write!(out, " \"{}\"", node.label);
            }
            for (key, value) in &node.attributes {
                let _ = write!(out, " {}={}", key, value);
            }
            out.push('\n');
        }
    }

    if !scene.links.is_empty() {
        out.push_str("\nLinks:\n");
        for link in &scene.links {
            let _ = write!(out, "  {} -- {}", link.from, link.to);
            if let Some(label) = &link.label {
                let _ = write!(out, " \"{}\"", label);
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::graph::{parse_topology, summarize};
    use crate::layout::LayoutEngine;
    use serde_json::json;

    fn scene_for(config: serde_json::Value) -> (Scene, GraphSummary) {
        let graph = parse_topology(&config).unwrap();
        let layout = LayoutEngine::default().compute(&graph);
        (Scene::build(&graph, &layout, &StyleConfig::default()), summarize(&graph))
    }

    fn interior(canvas: &str) -> String {
        canvas
            .lines()
            .filter(|line| line.starts_with('|'))
            .map(|line| &line[1..line.len() - 1])
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_two_linked_nodes() {
        let (scene, _) = scene_for(json!({
            "nodes": [ { "id": "A" }, { "id": "B", "kind": "switch" } ],
            "links": [ { "from": "A", "to": "B" } ]
        }));

        let canvas = render_ascii(&scene, &Viewport::default(), 60, 20);
        assert_eq!(canvas.lines().count(), 22);
        assert!(canvas.lines().all(|line| line.chars().count() == 62));

        let inside = interior(&canvas);
        assert!(inside.contains("(A)"));
        assert!(inside.contains("[B]"));
        assert!(inside.chars().any(|c| matches!(c, '-' | '|' | '/' | '\\')));
    }

    #[test]
    fn test_empty_scene_draws_frame_only() {
        let (scene, summary) = scene_for(json!({ "nodes": [], "links": [] }));
        let text = render_text(&scene, &summary, 20, 5);

        assert!(text.starts_with("+--------------------+\n"));
        assert!(interior(&text).chars().all(|c| c == ' ' || c == '\n'));
        assert!(text.contains("0 nodes, 0 links"));
        assert!(!text.contains("Nodes:"));
    }

    #[test]
    fn test_viewport_pans_content_out_of_view() {
        let (scene, _) = scene_for(json!({ "nodes": [ { "id": "A" } ] }));
        let mut viewport = Viewport::default();
        viewport.pan_by(&scene, 2.0, 0.0);

        let canvas = render_ascii(&scene, &viewport, 40, 10);
        assert!(!canvas.contains("(A)"));

        viewport.reset();
        assert!(render_ascii(&scene, &viewport, 40, 10).contains("(A)"));
    }

    #[test]
    fn test_edge_markers_stay_on_grid() {
        let (scene, _) = scene_for(json!({
            "nodes": [ { "id": "left-edge-node" }, { "id": "right-edge-node" } ],
            "links": [ { "from": "left-edge-node", "to": "right-edge-node" } ]
        }));

        for columns in [40, 80] {
            let inside = interior(&render_ascii(&scene, &Viewport::default(), columns, 10));
            assert!(inside.contains("(left-edge-n~)"), "{}", inside);
            assert!(inside.contains("(right-edge-~)"), "{}", inside);
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        for _ in 0..100 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_long_labels_cut_and_listing() {
        let (scene, summary) = scene_for(json!({
            "nodes": [
                {
                    "id": "core",
                    "kind": "router",
                    "label": "core-router-frankfurt-01",
                    "asn": 65001
                },
                { "id": "edge" }
            ],
            "links": [ { "from": "core", "to": "edge", "label": "transit" } ]
        }));

        let text = render_text(&scene, &summary, 80, 24);
        assert!(text.contains("<core-router~>"));
        assert!(text.contains("  core [router] \"core-router-frankfurt-01\" asn=65001"));
        assert!(text.contains("  core -- edge \"transit\""));
        assert!(text.contains("2 nodes, 1 links, 1 component(s)"));
    }
}
