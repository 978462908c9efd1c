//! GraphViz DOT export.
//!
//! Positions are pinned (`pos="x,y!"`) so `neato -n` reproduces the computed
//! layout instead of running its own.

use super::scene::Scene;
use crate::config::NodeShape;

/// Generate an undirected GraphViz graph with fixed node positions
pub fn generate_dot(scene: &Scene) -> String {
    let mut dot = String::new();
    dot.push_str("graph Topology {\n");
    dot.push_str("    layout=neato;\n");
    dot.push_str(&format!("    bgcolor=\"{}\";\n", quote(&scene.background)));
    dot.push_str("    node [style=filled, fontsize=10];\n\n");

    for node in &scene.nodes {
        let shape = match node.shape {
            NodeShape::Circle => "circle",
            NodeShape::Square => "box",
            NodeShape::Diamond => "diamond",
        };
        // DOT's y axis points up
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\", shape={}, fillcolor=\"{}\", pos=\"{:.1},{:.1}!\"];\n",
            quote(&node.id),
            quote(&node.label),
            shape,
            quote(&node.fill),
            node.center.x,
            scene.height - node.center.y
        ));
    }

    if !scene.links.is_empty() {
        dot.push('\n');
    }

    for link in &scene.links {
        let mut attrs = vec![
            format!("penwidth={:.2}", link.width),
            format!("color=\"{}\"", quote(&link.color)),
        ];
        if let Some(label) = &link.label {
            attrs.push(format!("label=\"{}\"", quote(label)));
        }
        dot.push_str(&format!(
            "    \"{}\" -- \"{}\" [{}];\n",
            quote(&link.from),
            quote(&link.to),
            attrs.join(", ")
        ));
    }

    dot.push_str("}\n");
    dot
}

fn quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
