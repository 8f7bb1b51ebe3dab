//! Blob detection backends.
//!
//! The pipeline only needs `{position, size}` records; [`BlobDetector`] is
//! the seam where a GPU or third-party detector plugs in. The native
//! [`SimpleBlobDetector`] finds dark, roughly circular regions that persist
//! over a sweep of binarization thresholds.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tracing")]
use tracing::instrument;

use paper_programs_core::{downscale_gray, GrayImageView, RgbImageView};

use crate::error::DetectError;
use crate::types::Blob;

/// Source of per-frame blobs.
pub trait BlobDetector {
    fn detect(&self, image: &RgbImageView<'_>) -> Result<Vec<Blob>, DetectError>;
}

/// Threshold-sweep blob detector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleBlobParams {
    /// Downscale factor applied before detection (>= 1).
    pub scale_factor: f32,
    pub min_threshold: u8,
    pub max_threshold: u8,
    pub threshold_step: u8,
    /// Area bounds in full-resolution pixels.
    pub min_area: f64,
    pub max_area: f64,
    pub min_inertia_ratio: f64,
    /// Detections closer than this (downscaled pixels) are merged.
    pub min_dist_between_blobs: f64,
    /// Number of thresholds a blob must appear at.
    pub min_repeatability: usize,
}

impl Default for SimpleBlobParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            min_threshold: 50,
            max_threshold: 220,
            threshold_step: 10,
            min_area: 25.0,
            max_area: 5000.0,
            min_inertia_ratio: 0.1,
            min_dist_between_blobs: 10.0,
            min_repeatability: 2,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SimpleBlobDetector {
    params: SimpleBlobParams,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    center: Point2<f64>,
    radius: f64,
    confidence: f64,
}

impl SimpleBlobDetector {
    pub fn new(params: SimpleBlobParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SimpleBlobParams {
        &self.params
    }

    /// Detect dark blobs in a grayscale image at its own resolution.
    pub fn detect_gray(&self, gray: &GrayImageView<'_>) -> Vec<Blob> {
        let p = &self.params;
        let scale = p.scale_factor.max(1.0) as f64;
        let area_scale = scale * scale;
        let min_area = p.min_area / area_scale;
        let max_area = p.max_area / area_scale;
        let step = p.threshold_step.max(1);

        let mut groups: Vec<Vec<Candidate>> = Vec::new();
        let mut labels = vec![0u32; gray.width * gray.height];
        let mut threshold = p.min_threshold;
        while threshold < p.max_threshold {
            let found = find_dark_regions(gray, threshold, &mut labels, min_area, max_area, p);
            merge_into_groups(&mut groups, found, p.min_dist_between_blobs);
            threshold = match threshold.checked_add(step) {
                Some(t) => t,
                None => break,
            };
        }

        let max_x = gray.width.saturating_sub(1) as f64;
        let max_y = gray.height.saturating_sub(1) as f64;
        groups
            .into_iter()
            .filter(|g| g.len() >= p.min_repeatability.max(1))
            .map(|g| {
                let total: f64 = g.iter().map(|c| c.confidence).sum();
                let center = if total > 0.0 {
                    g.iter()
                        .fold(nalgebra::Vector2::zeros(), |acc, c| acc + c.center.coords * c.confidence)
                        / total
                } else {
                    g.iter()
                        .fold(nalgebra::Vector2::zeros(), |acc, c| acc + c.center.coords)
                        / g.len() as f64
                };
                let radius = g[g.len() / 2].radius;
                Blob::new(
                    center.x.clamp(0.0, max_x),
                    center.y.clamp(0.0, max_y),
                    (2.0 * radius).round(),
                )
            })
            .collect()
    }
}

impl BlobDetector for SimpleBlobDetector {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, image), fields(width = image.width, height = image.height))
    )]
    fn detect(&self, image: &RgbImageView<'_>) -> Result<Vec<Blob>, DetectError> {
        check_frame(image)?;
        let scale = self.params.scale_factor.max(1.0);
        let gray = image.to_gray();
        let small = downscale_gray(&gray.view(), scale);
        let s = scale as f64;
        Ok(self
            .detect_gray(&small.view())
            .into_iter()
            .map(|b| Blob::new(b.position.x * s, b.position.y * s, b.size * s))
            .collect())
    }
}

/// Reject buffers whose length disagrees with the stated dimensions.
pub fn check_frame(image: &RgbImageView<'_>) -> Result<(), DetectError> {
    if image.data.len() != image.width * image.height * 3 {
        return Err(DetectError::InvalidFrame {
            width: image.width,
            height: image.height,
            len: image.data.len(),
        });
    }
    Ok(())
}

/// Label 4-connected pixels darker than `threshold` and keep the components
/// that pass the area and inertia filters. Components touching the border
/// are skipped.
fn find_dark_regions(
    gray: &GrayImageView<'_>,
    threshold: u8,
    labels: &mut [u32],
    min_area: f64,
    max_area: f64,
    params: &SimpleBlobParams,
) -> Vec<Candidate> {
    let (w, h) = (gray.width, gray.height);
    labels.fill(0);
    let mut out = Vec::new();
    let mut stack = Vec::new();
    let mut pixels = Vec::new();
    let mut next_label = 0u32;

    for start in 0..w * h {
        if labels[start] != 0 || gray.data[start] >= threshold {
            continue;
        }
        next_label += 1;
        labels[start] = next_label;
        stack.push(start);
        pixels.clear();
        let mut touches_border = false;

        while let Some(idx) = stack.pop() {
            pixels.push(idx);
            let (x, y) = (idx % w, idx / w);
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                touches_border = true;
            }
            let mut visit = |n: usize| {
                if labels[n] == 0 && gray.data[n] < threshold {
                    labels[n] = next_label;
                    stack.push(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < w {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - w);
            }
            if y + 1 < h {
                visit(idx + w);
            }
        }

        if touches_border {
            continue;
        }
        let area = pixels.len() as f64;
        if area < min_area || area > max_area {
            continue;
        }
        if let Some(candidate) = describe_region(&pixels, w, labels, next_label, params) {
            out.push(candidate);
        }
    }
    out
}

fn describe_region(
    pixels: &[usize],
    w: usize,
    labels: &[u32],
    label: u32,
    params: &SimpleBlobParams,
) -> Option<Candidate> {
    let n = pixels.len() as f64;
    let (mut sx, mut sy) = (0.0, 0.0);
    for &idx in pixels {
        sx += (idx % w) as f64;
        sy += (idx / w) as f64;
    }
    let (cx, cy) = (sx / n, sy / n);

    let (mut mu20, mut mu02, mut mu11) = (0.0, 0.0, 0.0);
    for &idx in pixels {
        let dx = (idx % w) as f64 - cx;
        let dy = (idx / w) as f64 - cy;
        mu20 += dx * dx;
        mu02 += dy * dy;
        mu11 += dx * dy;
    }
    let denom = ((mu20 - mu02).powi(2) + 4.0 * mu11 * mu11).sqrt();
    let i_max = 0.5 * (mu20 + mu02 + denom);
    let i_min = 0.5 * (mu20 + mu02 - denom);
    let ratio = if i_max > f64::EPSILON { i_min / i_max } else { 1.0 };
    if ratio < params.min_inertia_ratio {
        return None;
    }

    // Non-border components have all four neighbors inside the image.
    let mut dists: Vec<f64> = pixels
        .iter()
        .filter(|&&idx| {
            [idx - 1, idx + 1, idx - w, idx + w]
                .iter()
                .any(|&nb| labels[nb] != label)
        })
        .map(|&idx| {
            let dx = (idx % w) as f64 - cx;
            let dy = (idx / w) as f64 - cy;
            (dx * dx + dy * dy).sqrt()
        })
        .collect();
    if dists.is_empty() {
        return None;
    }
    dists.sort_by(f64::total_cmp);
    let radius = dists[dists.len() / 2];

    Some(Candidate {
        center: Point2::new(cx, cy),
        radius,
        confidence: ratio * ratio,
    })
}

/// Attach each detection to the group whose middle member lies within
/// `min_dist` or within either radius; otherwise start a new group. Groups
/// stay sorted by radius.
fn merge_into_groups(groups: &mut Vec<Vec<Candidate>>, found: Vec<Candidate>, min_dist: f64) {
    for candidate in found {
        let existing = groups.iter().position(|g| {
            let mid = g[g.len() / 2];
            let dist = (mid.center - candidate.center).norm();
            dist < min_dist || dist < mid.radius || dist < candidate.radius
        });
        match existing {
            Some(k) => {
                let group = &mut groups[k];
                let at = group.partition_point(|c| c.radius < candidate.radius);
                group.insert(at, candidate);
            }
            None => groups.push(vec![candidate]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use paper_programs_core::RgbImage;

    #[test]
    fn finds_painted_dots() {
        let mut img = RgbImage::filled(120, 80, [255, 255, 255]);
        let centers = [(30.5, 20.5), (80.5, 40.5), (40.5, 60.5)];
        for &(x, y) in &centers {
            img.fill_disk(Point2::new(x, y), 5.0, [65, 80, 84]);
        }

        let detector = SimpleBlobDetector::default();
        let mut blobs = detector.detect(&img.view()).unwrap();
        assert_eq!(blobs.len(), 3);
        blobs.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        let mut expected = centers.to_vec();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (blob, (x, y)) in blobs.iter().zip(expected) {
            assert_abs_diff_eq!(blob.position.x, x - 0.5, epsilon = 0.5);
            assert_abs_diff_eq!(blob.position.y, y - 0.5, epsilon = 0.5);
            assert!((8.0..=11.0).contains(&blob.size), "size {}", blob.size);
        }
    }

    #[test]
    fn ignores_border_regions_and_specks() {
        let mut img = RgbImage::filled(60, 60, [255, 255, 255]);
        img.fill_disk(Point2::new(1.0, 30.0), 6.0, [0, 0, 0]);
        img.fill_disk(Point2::new(30.0, 30.0), 1.5, [0, 0, 0]);
        let blobs = SimpleBlobDetector::default().detect(&img.view()).unwrap();
        assert!(blobs.is_empty());
    }

    #[test]
    fn elongated_bars_fail_the_inertia_filter() {
        let mut img = RgbImage::filled(80, 40, [255, 255, 255]);
        for x in 10..70 {
            for y in 18..21 {
                let idx = (y * 80 + x) * 3;
                img.data[idx..idx + 3].copy_from_slice(&[0, 0, 0]);
            }
        }
        let blobs = SimpleBlobDetector::default().detect(&img.view()).unwrap();
        assert!(blobs.is_empty());
    }

    #[test]
    fn short_buffer_is_an_invalid_frame() {
        let data = vec![0u8; 10];
        let view = RgbImageView {
            width: 4,
            height: 4,
            data: &data,
        };
        let err = SimpleBlobDetector::default().detect(&view).unwrap_err();
        assert!(matches!(err, DetectError::InvalidFrame { len: 10, .. }));
    }

    #[test]
    fn downscaled_detection_reports_full_resolution_coordinates() {
        let mut img = RgbImage::filled(200, 200, [255, 255, 255]);
        img.fill_disk(Point2::new(100.0, 100.0), 12.0, [40, 40, 40]);
        let detector = SimpleBlobDetector::new(SimpleBlobParams {
            scale_factor: 2.0,
            ..SimpleBlobParams::default()
        });
        let blobs = detector.detect(&img.view()).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_abs_diff_eq!(blobs[0].position.x, 100.0, epsilon = 2.0);
        assert_abs_diff_eq!(blobs[0].position.y, 100.0, epsilon = 2.0);
        assert_abs_diff_eq!(blobs[0].size, 24.0, epsilon = 4.0);
    }

    #[test]
    fn small_dot_survives_downscaling() {
        let mut img = RgbImage::filled(200, 200, [255, 255, 255]);
        img.fill_disk(Point2::new(100.5, 100.5), 3.5, [0, 0, 0]);
        for scale_factor in [1.0, 2.0] {
            let detector = SimpleBlobDetector::new(SimpleBlobParams {
                scale_factor,
                ..SimpleBlobParams::default()
            });
            let blobs = detector.detect(&img.view()).unwrap();
            assert_eq!(blobs.len(), 1, "scale {scale_factor}");
            assert_abs_diff_eq!(blobs[0].position.x, 100.0, epsilon = 1.5);
            assert_abs_diff_eq!(blobs[0].position.y, 100.0, epsilon = 1.5);
        }
    }
}
