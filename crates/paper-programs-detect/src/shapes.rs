//! Dot chains as simple paths in the neighbor graph.
//!
//! A printed corner chain is an L of `chain_len` dots. Its two ends are the
//! only dots with a single neighbor, so every chain is found by a depth-first
//! search from a degree-1 node. Nodes of an accepted chain are consumed for
//! the rest of the frame.

use nalgebra::Point2;
#[cfg(feature = "tracing")]
use tracing::instrument;

use paper_programs_core::cross;

use crate::neighbors::NeighborGraph;
use crate::params::ShapeParams;

/// Find all chains of exactly `chain_len` nodes, oriented head to tail.
///
/// `positions` is indexed like the graph. A chain is reversed when its arms
/// turn the wrong way around the anchor dot: with `a = p[0] - p[anchor]` and
/// `b = p[last] - p[anchor]`, the sine of the angle from `a` to `b` must not
/// exceed `min_turn_sine`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(graph, positions, params), fields(nodes = graph.len()))
)]
pub fn find_shapes(
    graph: &NeighborGraph,
    positions: &[Point2<f64>],
    chain_len: usize,
    anchor_index: usize,
    params: &ShapeParams,
) -> Vec<Vec<usize>> {
    let n = graph.len().min(positions.len());
    let mut shapes = Vec::new();
    if chain_len < 2 || anchor_index >= chain_len {
        return shapes;
    }

    let mut search = PathSearch {
        graph,
        chain_len,
        require_terminal: params.require_terminal_endpoint,
        consumed: vec![false; n],
        on_path: vec![false; n],
        path: Vec::with_capacity(chain_len),
    };

    for seed in 0..n {
        if search.consumed[seed] || graph.degree(seed) != 1 {
            continue;
        }
        if let Some(mut path) = search.run(seed) {
            for &node in &path {
                search.consumed[node] = true;
            }
            orient(&mut path, positions, anchor_index, params.min_turn_sine);
            shapes.push(path);
        }
    }
    shapes
}

struct PathSearch<'a> {
    graph: &'a NeighborGraph,
    chain_len: usize,
    require_terminal: bool,
    consumed: Vec<bool>,
    on_path: Vec<bool>,
    path: Vec<usize>,
}

impl PathSearch<'_> {
    fn run(&mut self, seed: usize) -> Option<Vec<usize>> {
        self.path.clear();
        self.path.push(seed);
        self.on_path[seed] = true;
        let found = self.extend();
        for &node in &self.path {
            self.on_path[node] = false;
        }
        found.then(|| self.path.clone())
    }

    fn extend(&mut self) -> bool {
        let Some(&last) = self.path.last() else {
            return false;
        };
        let graph = self.graph;
        if self.path.len() == self.chain_len {
            return !self.require_terminal || graph.degree(last) == 1;
        }
        for &next in graph.neighbors(last) {
            if next >= self.consumed.len() || self.on_path[next] || self.consumed[next] {
                continue;
            }
            self.path.push(next);
            self.on_path[next] = true;
            if self.extend() {
                return true;
            }
            self.on_path[next] = false;
            self.path.pop();
        }
        false
    }
}

fn orient(path: &mut [usize], positions: &[Point2<f64>], anchor_index: usize, min_turn_sine: f64) {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return;
    };
    let anchor = positions[path[anchor_index]];
    let a = positions[first] - anchor;
    let b = positions[last] - anchor;
    let norms = a.norm() * b.norm();
    if norms <= f64::EPSILON {
        return;
    }
    if cross(&a, &b) / norms > min_turn_sine {
        path.reverse();
    }
}
