//! Force-directed layout engine.
//!
//! Nodes start evenly spaced on a circle (sorted by identifier, plus a
//! seeded jitter) and are then moved by an inverse-square repulsion between
//! every pair and a spring attraction along every link. The step size cools
//! geometrically, and the loop stops at the iteration cap or once the
//! largest move of an iteration drops below the convergence threshold.
//!
//! Disconnected components are not pulled together; each settles on its own
//! and the repulsion between them keeps them apart.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Layout, Point};
use crate::config::LayoutConfig;
use crate::graph::GraphModel;

/// Golden angle, used to pick a stable direction for coincident nodes
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute coordinates for every node of `graph`
    ///
    /// Graphs with zero or one node get a trivial layout and the solver is
    /// never run (`Layout::iterations() == 0`).
    pub fn compute(&self, graph: &GraphModel) -> Layout {
        let ids = graph.sorted_ids();

        match ids.as_slice() {
            [] => return Layout::default(),
            [only] => {
                let positions = BTreeMap::from([(only.to_string(), Point::ORIGIN)]);
                return Layout::new(positions, 0, true);
            }
            _ => {}
        }

        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        // Normalized and sorted so link declaration order cannot change the result
        let mut edges: Vec<(usize, usize)> = graph
            .links()
            .iter()
            .filter_map(|link| {
                let (a, b) = (*index.get(link.from.as_str())?, *index.get(link.to.as_str())?);
                Some((a.min(b), a.max(b)))
            })
            .collect();
        edges.sort_unstable();

        let mut positions = self.initial_positions(ids.len());
        let (iterations, converged) = self.solve(&mut positions, &edges);

        if converged {
            info!("Layout converged after {} iterations ({} nodes)", iterations, ids.len());
        } else {
            info!(
                "Layout stopped at iteration cap {} without converging ({} nodes)",
                iterations,
                ids.len()
            );
        }

        let positions = ids
            .iter()
            .map(|id| id.to_string())
            .zip(positions)
            .collect();
        Layout::new(positions, iterations, converged)
    }

    /// Evenly spaced circle, perturbed by a jitter drawn from the seeded RNG
    fn initial_positions(&self, n: usize) -> Vec<Point> {
        let radius = self.config.ideal_length.max(self.config.ideal_length * n as f64 / (2.0 * PI));
        let jitter = self.config.jitter;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        (0..n)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n as f64;
                let mut point = Point::new(radius * angle.cos(), radius * angle.sin());
                if jitter > 0.0 {
                    let dx = rng.gen_range(-jitter..=jitter);
                    let dy = rng.gen_range(-jitter..=jitter);
                    point += Point::new(dx, dy);
                }
                point
            })
            .collect()
    }

    /// Run the physics loop in place, returning (iterations run, converged)
    fn solve(&self, positions: &mut [Point], edges: &[(usize, usize)]) -> (usize, bool) {
        let n = positions.len();
        let repulsion = self.config.repulsion();
        let mut temperature = self.config.initial_temperature;

        for iteration in 1..=self.config.max_iterations {
            // Forces are fully accumulated before any position moves
            let mut forces = vec![Point::ORIGIN; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = positions[i] - positions[j];
                    let dist = delta.length();
                    let direction = if dist > f64::EPSILON {
                        delta * (1.0 / dist)
                    } else {
                        fallback_direction(i, j)
                    };
                    let clamped = dist.max(self.config.min_distance);
                    let push = direction * (repulsion / (clamped * clamped));
                    forces[i] += push;
                    forces[j] -= push;
                }
            }

            for &(a, b) in edges {
                // Spring force k * d along the unit vector is k * delta
                let pull = (positions[b] - positions[a]) * self.config.spring;
                forces[a] += pull;
                forces[b] -= pull;
            }

            let mut max_move: f64 = 0.0;
            for (position, force) in positions.iter_mut().zip(&forces) {
                let mut step = *force * temperature;
                let len = step.length();
                if len > self.config.max_displacement {
                    step = step * (self.config.max_displacement / len);
                }
                *position += step;
                max_move = max_move.max(step.length());
            }

            temperature *= self.config.cooling_factor;

            if max_move < self.config.convergence_threshold {
                debug!("Layout max displacement {:.5} at iteration {}", max_move, iteration);
                return (iteration, true);
            }
        }

        (self.config.max_iterations, false)
    }
}

fn fallback_direction(i: usize, j: usize) -> Point {
    let angle = (i * 31 + j) as f64 * GOLDEN_ANGLE;
    Point::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_topology;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn graph(nodes: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let nodes: Vec<_> = nodes.iter().map(|id| json!({ "id": id })).collect();
        let links: Vec<_> = links.iter().map(|(a, b)| json!({ "from": a, "to": b })).collect();
        parse_topology(&json!({ "nodes": nodes, "links": links })).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let layout = LayoutEngine::default().compute(&GraphModel::new());
        assert!(layout.is_empty());
        assert_eq!(layout.iterations(), 0);
    }

    #[test]
    fn test_single_node_skips_solver() {
        let layout = LayoutEngine::default().compute(&graph(&["solo"], &[]));
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.position("solo"), Some(Point::ORIGIN));
        assert_eq!(layout.iterations(), 0);
    }

    #[test]
    fn test_linked_pair_settles_at_ideal_length() {
        let engine = LayoutEngine::default();
        let layout = engine.compute(&graph(&["a", "b"], &[("a", "b")]));

        assert!(layout.converged());
        assert!(layout.iterations() > 0);
        let dist = layout.position("a").unwrap().distance(layout.position("b").unwrap());
        assert_relative_eq!(dist, engine.config().ideal_length, max_relative = 0.01);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let g = graph(
            &["h1", "h2", "h3", "s1", "s2", "r1"],
            &[("h1", "s1"), ("h2", "s1"), ("h3", "s2"), ("s1", "r1"), ("s2", "r1")],
        );
        let engine = LayoutEngine::default();

        assert_eq!(engine.compute(&g), engine.compute(&g));

        let other_seed = LayoutEngine::new(LayoutConfig {
            seed: 1234,
            ..LayoutConfig::default()
        });
        assert_ne!(engine.compute(&g), other_seed.compute(&g));
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let forward = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let reversed = graph(&["c", "b", "a"], &[("b", "c"), ("a", "b")]);
        let engine = LayoutEngine::default();

        assert_eq!(engine.compute(&forward), engine.compute(&reversed));
    }

    #[test]
    fn test_linked_nodes_closer_than_unlinked() {
        let layout = LayoutEngine::default().compute(&graph(&["a", "b", "c"], &[("a", "b")]));
        let (a, b, c) = (
            layout.position("a").unwrap(),
            layout.position("b").unwrap(),
            layout.position("c").unwrap(),
        );

        assert!(a.distance(b) < a.distance(c));
        assert!(a.distance(b) < b.distance(c));
    }

    #[test]
    fn test_ring_has_no_overlaps() {
        let ids = ["n0", "n1", "n2", "n3", "n4", "n5"];
        let links: Vec<(&str, &str)> = (0..ids.len())
            .map(|i| (ids[i], ids[(i + 1) % ids.len()]))
            .collect();
        let layout = LayoutEngine::default().compute(&graph(&ids, &links));

        let points: Vec<Point> = layout.positions().map(|(_, p)| p).collect();
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert!(points[i].distance(points[j]) > 30.0, "nodes {} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn test_iteration_cap_bounds_work() {
        let engine = LayoutEngine::new(LayoutConfig {
            max_iterations: 3,
            ..LayoutConfig::default()
        });
        let layout = engine.compute(&graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]));

        assert_eq!(layout.iterations(), 3);
        assert!(!layout.converged());
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn test_coincident_nodes_are_separated() {
        let engine = LayoutEngine::default();
        let mut moved = vec![Point::ORIGIN; 3];
        engine.solve(&mut moved, &[]);

        assert!(moved.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert_ne!(moved[0], moved[1]);
        assert_ne!(moved[1], moved[2]);
    }
}
