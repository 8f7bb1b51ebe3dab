//! Per-shape color re-indexing.
//!
//! Lighting shifts all dots of one chain in a similar way, so digits are
//! assigned relative to the other dots of the same chain instead of by the
//! global palette classification.

use paper_programs_core::{closest_color_index, Rgb8};

/// Assign a palette digit to every dot color of one chain.
///
/// For each palette color in order the closest not yet taken chain color is
/// picked as that digit's local reference. Every chain color then gets the
/// digit of its closest reference. Returns `None` when the chain has fewer
/// dots than the palette has colors.
pub fn reindex_shape_colors(shape_colors: &[Rgb8], palette: &[Rgb8]) -> Option<Vec<u8>> {
    if palette.is_empty() || palette.len() > shape_colors.len() {
        return None;
    }

    let mut remaining = shape_colors.to_vec();
    let mut references = Vec::with_capacity(palette.len());
    for &main in palette {
        let idx = closest_color_index(main, &remaining)?;
        references.push(remaining.remove(idx));
    }

    shape_colors
        .iter()
        .map(|&c| closest_color_index(c, &references).map(|i| i as u8))
        .collect()
}
