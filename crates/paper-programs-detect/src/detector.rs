use std::time::Instant;

use nalgebra::Point2;
#[cfg(feature = "tracing")]
use tracing::instrument;

use paper_programs_core::{
    mean_color_in_disk, shrink_quad, FrameSize, Palette, Rgb8, RgbImageView,
    UnitSquareCalibration,
};
use paper_programs_dotcode::DotCodeDecoder;

use crate::blob::{check_frame, BlobDetector, SimpleBlobDetector};
use crate::error::DetectError;
use crate::neighbors::build_neighbor_graph;
use crate::params::DetectorParams;
use crate::shapes::find_shapes;
use crate::tracker::{CornerObservation, CornerTracker};
use crate::types::{Blob, DecodedShape, FrameResult, KeyPoint, ProgramToRender};

/// One detection session: frames in, located paper programs out.
///
/// Owns the only state that survives between frames: the corner tracker,
/// the calibration cache and the previous result.
pub struct ProgramDetector {
    params: DetectorParams,
    palette: Palette,
    decoder: DotCodeDecoder,
    blob_detector: Box<dyn BlobDetector + Send>,
    tracker: CornerTracker,
    calibration: Option<UnitSquareCalibration>,
    previous: Option<FrameResult>,
}

impl ProgramDetector {
    /// Session using the native [`SimpleBlobDetector`].
    pub fn new(params: DetectorParams) -> Result<Self, DetectError> {
        let blob_detector = Box::new(SimpleBlobDetector::new(params.blob.clone()));
        Self::with_blob_detector(params, blob_detector)
    }

    pub fn with_blob_detector(
        params: DetectorParams,
        blob_detector: Box<dyn BlobDetector + Send>,
    ) -> Result<Self, DetectError> {
        let decoder = DotCodeDecoder::new(params.scheme)?;
        let palette = Palette::new(&params.colors_rgb);
        if palette.len() != decoder.alphabet_size() {
            return Err(DetectError::PaletteSizeMismatch {
                palette: palette.len(),
                alphabet: decoder.alphabet_size(),
                scheme: params.scheme,
            });
        }
        Ok(Self {
            params,
            palette,
            decoder,
            blob_detector,
            tracker: CornerTracker::new(),
            calibration: None,
            previous: None,
        })
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn decoder(&self) -> &DotCodeDecoder {
        &self.decoder
    }

    pub fn tracker(&self) -> &CornerTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut CornerTracker {
        &mut self.tracker
    }

    /// Toggle freezing without rebuilding the session.
    pub fn set_freeze_detection(&mut self, freeze: bool) {
        self.params.freeze_detection = freeze;
    }

    /// Calibration for `frame`, rebuilt only when the frame size or knob
    /// points change.
    pub fn calibration(&mut self, frame: FrameSize) -> &UnitSquareCalibration {
        let knobs = self.params.knob_points;
        let stale = !matches!(&self.calibration, Some(c) if c.is_for(&knobs, frame));
        if stale {
            log::debug!("calibration rebuilt for {}x{}", frame.width, frame.height);
        }
        let calibration = match self.calibration.take() {
            Some(c) if !stale => c,
            _ => UnitSquareCalibration::new(knobs, frame),
        };
        self.calibration.insert(calibration)
    }

    /// Run blob detection, color sampling and decoding on one RGB frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width, height = image.height))
    )]
    pub fn process_frame(&mut self, image: &RgbImageView<'_>) -> Result<FrameResult, DetectError> {
        if let Some(frozen) = self.frozen() {
            return Ok(frozen);
        }
        let started = Instant::now();
        check_frame(image)?;
        let blobs = self.blob_detector.detect(image)?;
        let key_points = sample_key_points(image, &blobs);
        let frame = FrameSize::new(image.width as u32, image.height as u32);
        Ok(self.finish(key_points, frame, started))
    }

    /// Run the pipeline on key points whose colors were sampled elsewhere.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, key_points), fields(key_points = key_points.len()))
    )]
    pub fn process_key_points(&mut self, key_points: Vec<KeyPoint>, frame: FrameSize) -> FrameResult {
        if let Some(frozen) = self.frozen() {
            return frozen;
        }
        self.finish(key_points, frame, Instant::now())
    }

    /// Result to return without processing; an empty one when nothing has
    /// been processed yet.
    fn frozen(&self) -> Option<FrameResult> {
        self.params
            .freeze_detection
            .then(|| self.previous.clone().unwrap_or_default())
    }

    fn finish(&mut self, key_points: Vec<KeyPoint>, frame: FrameSize, started: Instant) -> FrameResult {
        let mut result = self.run_pipeline(key_points, frame);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        result.framerate = (1000.0 / elapsed_ms.max(1.0)).round() as u32;
        log::debug!(
            "frame: {} key points, {} shapes, {} programs, {} fps",
            result.key_points.len(),
            result.shapes.len(),
            result.programs_to_render.len(),
            result.framerate
        );
        self.previous = Some(result.clone());
        result
    }

    fn run_pipeline(&mut self, mut key_points: Vec<KeyPoint>, frame: FrameSize) -> FrameResult {
        key_points.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        for kp in &mut key_points {
            kp.color_index = kp.color.and_then(|c| self.palette.classify(c));
            kp.local_color_index = None;
        }

        let blobs: Vec<Blob> = key_points.iter().map(KeyPoint::blob).collect();
        let positions: Vec<Point2<f64>> = blobs.iter().map(|b| b.position).collect();
        let graph = build_neighbor_graph(&blobs, &self.params.neighbors);
        let chain_len = self.decoder.chain_len();
        let anchor = self.decoder.anchor_index();
        let chains = find_shapes(&graph, &positions, chain_len, anchor, &self.params.shapes);

        let mut shapes = Vec::new();
        let mut observations = Vec::new();
        let mut size_sum = 0.0;
        let mut size_count = 0usize;
        for chain in chains {
            let colors: Option<Vec<Rgb8>> = chain.iter().map(|&i| key_points[i].color).collect();
            let Some(read) = colors.and_then(|c| self.decoder.decode_colors(&c, &self.palette))
            else {
                continue;
            };
            for (&i, &digit) in chain.iter().zip(&read.digits) {
                key_points[i].local_color_index = Some(digit);
                size_sum += key_points[i].size;
                size_count += 1;
            }
            let head = positions[chain[0]];
            let tail = positions[chain[chain_len - 1]];
            let anchor_point = positions[chain[anchor]];
            observations.push(CornerObservation {
                program: read.code.program,
                corner: read.code.corner,
                position: anchor_point,
                direction: tail - anchor_point,
            });
            shapes.push(DecodedShape {
                program: read.code.program,
                corner: read.code.corner,
                key_points: chain,
                digits: read.digits,
                label_position: nalgebra::center(&head, &tail),
            });
        }

        let quads = self.tracker.update(&observations);
        if let Some(max_age) = self.params.program_max_age {
            let dropped = self.tracker.prune_unseen(max_age);
            if dropped > 0 {
                log::debug!("forgot {dropped} programs unseen for {max_age} frames");
            }
        }
        let average_size = if size_count > 0 {
            size_sum / size_count as f64
        } else {
            0.0
        };
        let shrink = self.params.shrink_factor * average_size;
        let calibration = self.calibration(frame);
        let programs_to_render = quads
            .into_iter()
            .map(|quad| {
                let points_px = shrink_quad(shrink, &quad.points);
                ProgramToRender {
                    number: quad.program,
                    points: points_px.map(|p| calibration.camera_to_unit(p)),
                    points_px,
                    predicted: quad.predicted,
                }
            })
            .collect();

        FrameResult {
            frame: Some(frame),
            programs_to_render,
            key_points,
            shapes,
            neighbor_edges: graph.edges(),
            framerate: 0,
        }
    }
}

/// Sample the mean color of every blob.
pub fn sample_key_points(image: &RgbImageView<'_>, blobs: &[Blob]) -> Vec<KeyPoint> {
    blobs
        .iter()
        .map(|&blob| {
            let color = mean_color_in_disk(image, blob.position, blob.size).map(Rgb8::from_f64);
            KeyPoint::from_blob(blob, color)
        })
        .collect()
}
