//! Core types and utilities for paper-program marker detection.
//!
//! This crate is intentionally small and purely numeric: planar projective
//! geometry, color classification and lightweight image views. It knows
//! nothing about dot codes or detector state.

mod calibration;
mod color;
mod geometry;
mod homography;
mod image;
mod logger;

pub use calibration::{full_frame_knob_points, FrameSize, UnitSquareCalibration};
pub use color::{ciede2000, closest_color_index, ColorRgba, Lab, Palette, Rgb8};
pub use geometry::{cross, move_along_vector, polar_angle, shrink_quad};
pub use homography::{forward_projection_for_points, project_point, Homography};
pub use image::{
    downscale_gray, mean_color_in_disk, sample_bilinear, sample_bilinear_u8, GrayImage,
    GrayImageView, RgbImage, RgbImageView,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, verbosity_level};
