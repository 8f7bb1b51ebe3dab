use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Point2, Vector2};

use paper_programs_core::FrameSize;
use paper_programs_detect::{Blob, DetectorParams, KeyPoint, ProgramDetector};
use paper_programs_dotcode::PaperCorner;

/// A 6x4 grid of papers, all four corner chains visible.
fn synthetic_key_points(det: &ProgramDetector) -> Vec<KeyPoint> {
    let palette = det.palette().colors().to_vec();
    let mut out = Vec::new();
    for row in 0..4 {
        for col in 0..6 {
            let program = (row * 6 + col) as u32;
            let origin = Point2::new(40.0 + col as f64 * 310.0, 40.0 + row as f64 * 260.0);
            let anchors = [
                origin,
                origin + Vector2::new(260.0, 0.0),
                origin + Vector2::new(260.0, 210.0),
                origin + Vector2::new(0.0, 210.0),
            ];
            for corner in PaperCorner::ALL {
                let Ok(digits) = det.decoder().encode(program, corner) else {
                    continue;
                };
                let (u, v) = match corner {
                    PaperCorner::TopLeft => (Vector2::y(), Vector2::x()),
                    PaperCorner::TopRight => (-Vector2::x(), Vector2::y()),
                    PaperCorner::BottomRight => (-Vector2::y(), -Vector2::x()),
                    PaperCorner::BottomLeft => (Vector2::x(), -Vector2::y()),
                };
                let anchor = anchors[corner.index()];
                for (k, &d) in digits.iter().enumerate() {
                    let p = if k <= 3 {
                        anchor + u * 15.0 * (3 - k) as f64
                    } else {
                        anchor + v * 15.0 * (k - 3) as f64
                    };
                    out.push(KeyPoint::from_blob(
                        Blob::new(p.x, p.y, 10.0),
                        Some(palette[d as usize]),
                    ));
                }
            }
        }
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let mut det = ProgramDetector::new(DetectorParams::default()).expect("default params");
    let key_points = synthetic_key_points(&det);
    let frame = FrameSize::new(1920, 1080);

    c.bench_function("key_points_to_programs_24_papers", |b| {
        b.iter(|| {
            let result = det.process_key_points(black_box(key_points.clone()), frame);
            black_box(result.programs_to_render.len())
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
