use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use paper_programs_core::{full_frame_knob_points, ColorRgba};
use paper_programs_dotcode::CodeScheme;

use crate::blob::SimpleBlobParams;

/// Neighbor graph thresholds, in multiples of blob size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborParams {
    /// Stop scanning once the x gap exceeds this many sizes of the left blob.
    pub x_window_factor: f64,
    /// Connect when the center distance is below this times the summed sizes.
    pub touch_factor: f64,
}

impl Default for NeighborParams {
    fn default() -> Self {
        Self {
            x_window_factor: 3.0,
            touch_factor: 0.9,
        }
    }
}

/// Shape finder settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Minimum sine of the bend angle for the orientation to count; flatter
    /// chains keep their scan order.
    pub min_turn_sine: f64,
    /// Require the last dot of a chain to be a graph endpoint too.
    pub require_terminal_endpoint: bool,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            min_turn_sine: 0.1,
            require_terminal_endpoint: true,
        }
    }
}

/// The printed four-color palette.
pub fn default_colors_rgb() -> Vec<ColorRgba> {
    vec![
        ColorRgba([119.0, 43.0, 24.0, 255.0]),
        ColorRgba([155.0, 108.0, 35.0, 255.0]),
        ColorRgba([94.0, 104.0, 48.0, 255.0]),
        ColorRgba([65.0, 80.0, 84.0, 255.0]),
    ]
}

/// The five-color palette of the legacy 5-chain markers.
pub fn legacy_colors_rgb() -> Vec<ColorRgba> {
    let mut colors = default_colors_rgb();
    colors.push(ColorRgba([92.0, 36.0, 42.0, 255.0]));
    colors
}

/// Parameters of one detection session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Palette, one entry per code digit.
    pub colors_rgb: Vec<ColorRgba>,
    /// Unit square corners in frame-normalized coordinates (TL, TR, BR, BL).
    pub knob_points: [Point2<f64>; 4],
    pub blob: SimpleBlobParams,
    /// Return the previous result without processing.
    pub freeze_detection: bool,
    pub scheme: CodeScheme,
    pub neighbors: NeighborParams,
    pub shapes: ShapeParams,
    /// Inward shrink of the corner quad, in average dot sizes.
    pub shrink_factor: f64,
    /// Forget programs unseen for more than this many frames. `None` keeps
    /// learned corner relations for the whole session.
    pub program_max_age: Option<u64>,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            colors_rgb: default_colors_rgb(),
            knob_points: full_frame_knob_points(),
            blob: SimpleBlobParams::default(),
            freeze_detection: false,
            scheme: CodeScheme::Chain7,
            neighbors: NeighborParams::default(),
            shapes: ShapeParams::default(),
            shrink_factor: 0.75,
            program_max_age: None,
        }
    }
}

impl DetectorParams {
    /// Defaults for the legacy 5-chain markers.
    pub fn legacy() -> Self {
        Self {
            colors_rgb: legacy_colors_rgb(),
            scheme: CodeScheme::Chain5,
            ..Self::default()
        }
    }
}
