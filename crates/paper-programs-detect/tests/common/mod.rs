#![allow(dead_code)]

use nalgebra::{Point2, Vector2};
use paper_programs_core::{Rgb8, RgbImage};
use paper_programs_detect::{Blob, KeyPoint};
use paper_programs_dotcode::{DotCodeDecoder, PaperCorner};

pub const DOT_SIZE: f64 = 10.0;
pub const DOT_STEP: f64 = 15.0;

/// Unit arm vectors of a printed corner chain: towards the head, towards the tail.
pub fn arms(corner: PaperCorner) -> (Vector2<f64>, Vector2<f64>) {
    match corner {
        PaperCorner::TopLeft => (Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0)),
        PaperCorner::TopRight => (Vector2::new(-1.0, 0.0), Vector2::new(0.0, 1.0)),
        PaperCorner::BottomRight => (Vector2::new(0.0, -1.0), Vector2::new(-1.0, 0.0)),
        PaperCorner::BottomLeft => (Vector2::new(1.0, 0.0), Vector2::new(0.0, -1.0)),
    }
}

pub fn chain_key_points(
    anchor: Point2<f64>,
    corner: PaperCorner,
    digits: &[u8],
    palette: &[Rgb8],
    step: f64,
    size: f64,
) -> Vec<KeyPoint> {
    let (u, v) = arms(corner);
    let mid = digits.len() / 2;
    digits
        .iter()
        .enumerate()
        .map(|(k, &d)| {
            let p = if k <= mid {
                anchor + u * step * (mid - k) as f64
            } else {
                anchor + v * step * (k - mid) as f64
            };
            KeyPoint::from_blob(Blob::new(p.x, p.y, size), Some(palette[d as usize]))
        })
        .collect()
}

/// Paper corners (TL, TR, BR, BL) inset by `inset` of a square frame.
pub fn inset_square(frame: f64, inset: f64) -> [Point2<f64>; 4] {
    let (lo, hi) = (frame * inset, frame * (1.0 - inset));
    [
        Point2::new(lo, lo),
        Point2::new(hi, lo),
        Point2::new(hi, hi),
        Point2::new(lo, hi),
    ]
}

pub fn inset_knobs(inset: f64) -> [Point2<f64>; 4] {
    inset_square(1.0, inset)
}

/// Key points of the chains on the listed corners of one program.
pub fn program_key_points(
    decoder: &DotCodeDecoder,
    palette: &[Rgb8],
    program: u32,
    anchors: &[Point2<f64>; 4],
    corners: &[PaperCorner],
    step: f64,
) -> Vec<KeyPoint> {
    corners
        .iter()
        .flat_map(|&corner| {
            let digits = decoder.encode(program, corner).expect("encodable program");
            chain_key_points(anchors[corner.index()], corner, &digits, palette, step, DOT_SIZE)
        })
        .collect()
}

/// Paint key points as solid disks on white. Disks are centered on the pixel
/// under each key point so blob centroids land on the key point exactly.
pub fn render(width: usize, height: usize, key_points: &[KeyPoint]) -> RgbImage {
    let mut img = RgbImage::filled(width, height, [255, 255, 255]);
    for kp in key_points {
        let color = kp.color.expect("colored key point");
        let center = kp.position + Vector2::new(0.5, 0.5);
        img.fill_disk(center, kp.size / 2.0, [color.r, color.g, color.b]);
    }
    img
}
