//! High-level facade crate for the `paper-programs-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry, dot-code and detection crates
//! - JSON configuration and report helpers ([`io`])
//! - (feature-gated) frame loading with the `image` crate ([`frames`])
//! - the `paper-programs` command line tool (feature `cli`)
//!
//! ## Quickstart
//!
//! ```no_run
//! use paper_programs::{frames, DetectorParams, ProgramDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut detector = ProgramDetector::new(DetectorParams::default())?;
//! let result = frames::detect_image(&mut detector, "camera.png")?;
//! for program in &result.programs_to_render {
//!     println!("program {} at {:?}", program.number, program.points);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `paper_programs::core`: homographies, calibration, colors, image views.
//! - `paper_programs::dotcode`: the dot-code table, legacy codes, color reading.
//! - `paper_programs::detect`: blobs, neighbor graph, shapes, tracker, sessions.
//! - `paper_programs::io`: JSON configs and reports.
//! - `paper_programs::frames` (feature `image`): frame files as a [`FrameSource`].

pub use paper_programs_core as core;
pub use paper_programs_detect as detect;
pub use paper_programs_dotcode as dotcode;

pub use paper_programs_core::{FrameSize, UnitSquareCalibration};
pub use paper_programs_detect::{
    run_detection_loop, DetectError, DetectorParams, FrameResult, FrameSource, ProgramDetector,
    ProgramToRender,
};
pub use paper_programs_dotcode::{CodeMatch, CodeScheme, DotCodeDecoder, PaperCorner};

pub mod io;

#[cfg(feature = "image")]
pub mod frames;
