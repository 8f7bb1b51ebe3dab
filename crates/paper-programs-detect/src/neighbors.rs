//! Dot adjacency from blob positions.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::NeighborParams;
use crate::types::Blob;

/// Undirected adjacency list over blob indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborGraph {
    adjacency: Vec<Vec<usize>>,
}

impl NeighborGraph {
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    /// Every edge once, as `(low, high)`.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, ns)| ns.iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
            .collect()
    }
}

/// Sort blobs ascending by x, the order [`build_neighbor_graph`] expects.
pub fn sort_blobs_by_x(blobs: &mut [Blob]) {
    blobs.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
}

/// Connect blobs whose footprints nearly touch.
///
/// `blobs` must be sorted by x: the scan for blob `i` stops at the first
/// later blob more than `x_window_factor * size_i` to the right.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(blobs, params), fields(blobs = blobs.len()))
)]
pub fn build_neighbor_graph(blobs: &[Blob], params: &NeighborParams) -> NeighborGraph {
    let mut adjacency = vec![Vec::new(); blobs.len()];
    for (i, a) in blobs.iter().enumerate() {
        let window = a.size * params.x_window_factor;
        for (j, b) in blobs.iter().enumerate().skip(i + 1) {
            if b.position.x - a.position.x > window {
                break;
            }
            let dist = (b.position - a.position).norm();
            if dist < params.touch_factor * (a.size + b.size) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }
    NeighborGraph { adjacency }
}
