//! Camera-pixel <-> unit-square mapping defined by the four knob points.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::homography::{forward_projection_for_points, project_point, Homography};

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Default knob points: the whole frame.
pub fn full_frame_knob_points() -> [Point2<f64>; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ]
}

/// Calibrated mapping between camera pixels and the projector unit square.
///
/// `knob_points` are in frame-normalized coordinates (0..1 on both axes) in
/// TL, TR, BR, BL order. Collinear knob points give non-finite output.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSquareCalibration {
    knob_points: [Point2<f64>; 4],
    frame: FrameSize,
    unit_to_frame: Homography,
    frame_to_unit: Homography,
}

impl UnitSquareCalibration {
    pub fn new(knob_points: [Point2<f64>; 4], frame: FrameSize) -> Self {
        let unit_to_frame = forward_projection_for_points(&knob_points);
        let frame_to_unit = unit_to_frame.adjugate();
        Self {
            knob_points,
            frame,
            unit_to_frame,
            frame_to_unit,
        }
    }

    /// Whether this mapping was built for the given inputs.
    pub fn is_for(&self, knob_points: &[Point2<f64>; 4], frame: FrameSize) -> bool {
        self.frame == frame && &self.knob_points == knob_points
    }

    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    pub fn knob_points(&self) -> &[Point2<f64>; 4] {
        &self.knob_points
    }

    /// Map a camera pixel position into the unit square.
    pub fn camera_to_unit(&self, p: Point2<f64>) -> Point2<f64> {
        let normalized = Point2::new(
            p.x / self.frame.width as f64,
            p.y / self.frame.height as f64,
        );
        project_point(normalized, &self.frame_to_unit)
    }

    /// Map a unit-square position back into camera pixels.
    pub fn unit_to_camera(&self, p: Point2<f64>) -> Point2<f64> {
        let q = project_point(p, &self.unit_to_frame);
        Point2::new(
            q.x * self.frame.width as f64,
            q.y * self.frame.height as f64,
        )
    }

    /// The calibrated square outline in camera pixels (TL, TR, BR, BL).
    pub fn outline_px(&self) -> [Point2<f64>; 4] {
        full_frame_knob_points().map(|p| self.unit_to_camera(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn inset_knobs() -> [Point2<f64>; 4] {
        [
            Point2::new(0.1, 0.1),
            Point2::new(0.9, 0.12),
            Point2::new(0.85, 0.9),
            Point2::new(0.12, 0.88),
        ]
    }

    #[test]
    fn knob_corners_map_to_unit_corners() {
        let frame = FrameSize::new(1280, 720);
        let cal = UnitSquareCalibration::new(inset_knobs(), frame);
        for (knob, unit) in inset_knobs().iter().zip(full_frame_knob_points().iter()) {
            let px = Point2::new(knob.x * 1280.0, knob.y * 720.0);
            let q = cal.camera_to_unit(px);
            assert_abs_diff_eq!(q.x, unit.x, epsilon = 1e-9);
            assert_abs_diff_eq!(q.y, unit.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn outline_matches_knob_points_in_pixels() {
        let frame = FrameSize::new(640, 480);
        let cal = UnitSquareCalibration::new(inset_knobs(), frame);
        let outline = cal.outline_px();
        assert_abs_diff_eq!(outline[1].x, 0.9 * 640.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outline[1].y, 0.12 * 480.0, epsilon = 1e-9);
        assert!(cal.is_for(&inset_knobs(), frame));
        assert!(!cal.is_for(&inset_knobs(), FrameSize::new(640, 481)));
    }

    #[test]
    fn camera_and_unit_mappings_are_inverse() {
        let cal = UnitSquareCalibration::new(inset_knobs(), FrameSize::new(800, 600));
        let p = Point2::new(0.37, 0.61);
        let back = cal.camera_to_unit(cal.unit_to_camera(p));
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
    }
}
