use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use paper_programs_core::{FrameSize, Rgb8};
use paper_programs_dotcode::PaperCorner;

/// One circular blob reported by a blob detector, in camera pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub position: Point2<f64>,
    /// Diameter-like size.
    pub size: f64,
}

impl Blob {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            size,
        }
    }
}

/// A blob with its sampled color and classification diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub position: Point2<f64>,
    pub size: f64,
    /// Mean color inside the dot, if any pixel could be sampled.
    pub color: Option<Rgb8>,
    /// Nearest palette entry by global classification.
    pub color_index: Option<usize>,
    /// Digit assigned when the dot belongs to a decoded chain.
    pub local_color_index: Option<u8>,
}

impl KeyPoint {
    pub fn from_blob(blob: Blob, color: Option<Rgb8>) -> Self {
        Self {
            position: blob.position,
            size: blob.size,
            color,
            color_index: None,
            local_color_index: None,
        }
    }

    pub fn blob(&self) -> Blob {
        Blob {
            position: self.position,
            size: self.size,
        }
    }
}

/// A chain that decoded to a program corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedShape {
    pub program: u32,
    pub corner: PaperCorner,
    /// Key point indices, head to tail.
    pub key_points: Vec<usize>,
    pub digits: Vec<u8>,
    /// Midpoint of the first and last dot, for overlay labels.
    pub label_position: Point2<f64>,
}

/// One fully located paper program, corners in TL, TR, BR, BL order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramToRender {
    pub number: u32,
    /// Corners in the calibrated unit square.
    pub points: [Point2<f64>; 4],
    /// Corners after shrinking, in camera pixels.
    pub points_px: [Point2<f64>; 4],
    /// Which corners were predicted instead of observed this frame.
    pub predicted: [bool; 4],
}

/// Everything one frame produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub frame: Option<FrameSize>,
    pub programs_to_render: Vec<ProgramToRender>,
    /// Key points sorted by x; shape and edge indices refer to this order.
    pub key_points: Vec<KeyPoint>,
    pub shapes: Vec<DecodedShape>,
    pub neighbor_edges: Vec<(usize, usize)>,
    /// `1000 / elapsed_ms` of the processing call.
    pub framerate: u32,
}
