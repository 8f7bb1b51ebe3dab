//! Paper-program detection pipeline.
//!
//! Per frame:
//! 1. blobs from a [`BlobDetector`] (native [`SimpleBlobDetector`] by default),
//! 2. mean color per blob,
//! 3. neighbor graph over x-sorted blobs ([`build_neighbor_graph`]),
//! 4. dot chains of the scheme's length ([`find_shapes`]),
//! 5. chain decoding into program corners,
//! 6. corner aggregation and prediction across frames ([`CornerTracker`]),
//! 7. shrink and projection into the calibrated unit square.
//!
//! [`ProgramDetector`] owns one session; [`run_detection_loop`] drives it
//! from a [`FrameSource`] and keeps going past failed frames.

mod blob;
mod detector;
mod error;
mod neighbors;
mod params;
mod session;
mod shapes;
mod tracker;
mod types;

pub use blob::{check_frame, BlobDetector, SimpleBlobDetector, SimpleBlobParams};
pub use detector::{sample_key_points, ProgramDetector};
pub use error::DetectError;
pub use neighbors::{build_neighbor_graph, sort_blobs_by_x, NeighborGraph};
pub use params::{
    default_colors_rgb, legacy_colors_rgb, DetectorParams, NeighborParams, ShapeParams,
};
pub use session::{run_detection_loop, FrameSource, IterFrames, LoopStats};
pub use shapes::find_shapes;
pub use tracker::{CornerObservation, CornerRelation, CornerTracker, TrackedQuad};
pub use types::{Blob, DecodedShape, FrameResult, KeyPoint, ProgramToRender};
