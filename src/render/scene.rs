//! Backend-independent drawing description.
//!
//! A [`Scene`] is the laid-out graph fitted into the canvas with all styling
//! resolved: every backend (SVG, DOT, text, JSON, interactive) draws from it.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::Serialize;

use crate::config::{NodeShape, StyleConfig};
use crate::graph::{AttrValue, GraphModel};
use crate::layout::{Layout, Point};

/// A node ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub center: Point,
    pub radius: f64,
    pub fill: String,
    pub shape: NodeShape,
    /// Attributes rendered as text, for tooltips and the info command
    pub attributes: BTreeMap<String, String>,
}

/// A link ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLink {
    pub from: String,
    pub to: String,
    pub start: Point,
    pub end: Point,
    /// Quadratic curve control point; `None` for a straight line
    pub control: Option<Point>,
    pub width: f64,
    pub color: String,
    pub label: Option<String>,
}

impl SceneLink {
    /// Point halfway along the line or curve
    pub fn midpoint(&self) -> Point {
        match self.control {
            Some(c) => self.start * 0.25 + c * 0.5 + self.end * 0.25,
            None => (self.start + self.end) * 0.5,
        }
    }
}

/// Fully styled, canvas-space description of a topology view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub font_size: f64,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
}

impl Scene {
    /// Fit `layout` into the canvas described by `style` and resolve styling
    pub fn build(graph: &GraphModel, layout: &Layout, style: &StyleConfig) -> Scene {
        let transform = Transform::fit(layout, style);

        let nodes: Vec<SceneNode> = graph
            .nodes()
            .filter_map(|node| {
                let position = layout.position(&node.id)?;
                let kind_style = style.kind_style(&node.kind);
                Some(SceneNode {
                    id: node.id.clone(),
                    label: node.display_label().to_string(),
                    kind: node.kind.clone(),
                    center: transform.apply(position),
                    radius: style.node_radius,
                    fill: kind_style.fill.clone(),
                    shape: kind_style.shape,
                    attributes: node
                        .attributes
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_string()))
                        .collect(),
                })
            })
            .collect();

        let centers: HashMap<&str, Point> =
            nodes.iter().map(|n| (n.id.as_str(), n.center)).collect();
        let widths = LineWidths::new(graph, style);

        // Parallel links fan out around the straight line between their endpoints
        let mut parallel_total: HashMap<(&str, &str), usize> = HashMap::new();
        for link in graph.links() {
            *parallel_total.entry(link.key()).or_insert(0) += 1;
        }
        let mut parallel_seen: HashMap<(&str, &str), usize> = HashMap::new();

        let mut links = Vec::with_capacity(graph.link_count());
        for link in graph.links() {
            let key = link.key();
            let (Some(&start), Some(&end)) =
                (centers.get(link.from.as_str()), centers.get(link.to.as_str()))
            else {
                continue;
            };

            let seen = parallel_seen.entry(key).or_insert(0);
            let slot = *seen;
            *seen += 1;
            let total = parallel_total[&key];
            let offset = (slot as f64 - (total as f64 - 1.0) / 2.0) * style.node_radius * 2.0;

            let control = if offset == 0.0 {
                None
            } else {
                // Normal taken from the key order so A->B and B->A fan the same way
                let (a, b) = (centers[key.0], centers[key.1]);
                let dir = b - a;
                let len = dir.length();
                if len > f64::EPSILON {
                    let normal = Point::new(-dir.y / len, dir.x / len);
                    // Control point at twice the offset puts the curve's apex at the offset
                    Some((start + end) * 0.5 + normal * (offset * 2.0))
                } else {
                    None
                }
            };

            links.push(SceneLink {
                from: link.from.clone(),
                to: link.to.clone(),
                start,
                end,
                control,
                width: widths.width_for(link.attributes.get(&style.weight_attribute)),
                color: style.link_color.clone(),
                label: link.label(),
            });
        }

        Scene {
            width: style.width,
            height: style.height,
            background: style.background.clone(),
            font_size: style.font_size,
            nodes,
            links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Uniform scale plus translation from layout space into the canvas
#[derive(Debug, Clone, Copy)]
struct Transform {
    scale: f64,
    source_center: Point,
    target_center: Point,
}

impl Transform {
    fn fit(layout: &Layout, style: &StyleConfig) -> Self {
        let target_center = Point::new(style.width / 2.0, style.height / 2.0);
        let Some(bounds) = layout.bounds() else {
            return Self {
                scale: 1.0,
                source_center: Point::ORIGIN,
                target_center,
            };
        };

        let usable_w = style.width - 2.0 * style.margin;
        let usable_h = style.height - 2.0 * style.margin;
        let fit = |usable: f64, extent: f64| {
            if extent > f64::EPSILON {
                usable / extent
            } else {
                f64::INFINITY
            }
        };
        let sx = fit(usable_w, bounds.width());
        let sy = fit(usable_h, bounds.height());
        let scale = sx.min(sy);

        Self {
            scale: if scale.is_finite() { scale } else { 1.0 },
            source_center: bounds.center(),
            target_center,
        }
    }

    fn apply(&self, p: Point) -> Point {
        (p - self.source_center) * self.scale + self.target_center
    }
}

/// Maps link weights onto line widths on a log scale
struct LineWidths {
    min_width: f64,
    max_width: f64,
    range: Option<(f64, f64)>,
}

impl LineWidths {
    fn new(graph: &GraphModel, style: &StyleConfig) -> Self {
        let weights: Vec<f64> = graph
            .links()
            .iter()
            .filter_map(|link| {
                let value = link.attributes.get(&style.weight_attribute)?;
                let weight = parse_rate(value);
                if weight.is_none() {
                    warn!(
                        "Link {} -- {}: '{}' value '{}' is not a usable weight",
                        link.from, link.to, style.weight_attribute, value
                    );
                }
                weight
            })
            .collect();

        let range = weights.iter().copied().fold(None, |acc: Option<(f64, f64)>, w| match acc {
            None => Some((w, w)),
            Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
        });

        Self {
            min_width: style.min_line_width,
            max_width: style.max_line_width,
            range,
        }
    }

    fn width_for(&self, value: Option<&AttrValue>) -> f64 {
        let (Some(weight), Some((lo, hi))) = (value.and_then(parse_rate), self.range) else {
            return self.min_width;
        };
        if hi / lo <= 1.0 + f64::EPSILON {
            return (self.min_width + self.max_width) / 2.0;
        }
        let t = (weight.ln() - lo.ln()) / (hi.ln() - lo.ln());
        self.min_width + t.clamp(0.0, 1.0) * (self.max_width - self.min_width)
    }
}

/// Parse a positive link rate such as `1000`, `"100Mbit"`, `"10 Gbps"` or `"1.5k"`
///
/// Returns the value in base units (bits per second for rate strings).
pub fn parse_rate(value: &AttrValue) -> Option<f64> {
    let rate = match value {
        AttrValue::Number(n) => *n,
        AttrValue::Bool(_) => return None,
        AttrValue::Text(text) => {
            let text = text.trim();
            let split = text
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(text.len());
            let (number, unit) = text.split_at(split);
            let number: f64 = number.parse().ok()?;

            let unit = unit.trim().to_ascii_lowercase();
            let prefix = unit
                .strip_suffix("bps")
                .or_else(|| unit.strip_suffix("bit"))
                .or_else(|| unit.strip_suffix("b/s"))
                .unwrap_or(&unit);
            let multiplier = match prefix {
                "" => 1.0,
                "k" => 1e3,
                "m" => 1e6,
                "g" => 1e9,
                "t" => 1e12,
                _ => return None,
            };
            number * multiplier
        }
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}
