//! Frame loop with per-frame error isolation.

use paper_programs_core::RgbImage;

use crate::detector::ProgramDetector;
use crate::error::DetectError;
use crate::types::FrameResult;

/// Supplier of camera frames. `None` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Result<RgbImage, DetectError>>;
}

/// Adapts any iterator of frames into a [`FrameSource`].
#[derive(Clone, Debug)]
pub struct IterFrames<I>(pub I);

impl<I> FrameSource for IterFrames<I>
where
    I: Iterator<Item = Result<RgbImage, DetectError>>,
{
    fn next_frame(&mut self) -> Option<Result<RgbImage, DetectError>> {
        self.0.next()
    }
}

/// Counters of one [`run_detection_loop`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: usize,
    pub failed: usize,
}

/// Process frames one at a time until the source is exhausted.
///
/// A frame that fails to load or process is logged and skipped; the sink
/// sees only successful frames, with their position in the stream.
pub fn run_detection_loop<S, F>(detector: &mut ProgramDetector, source: &mut S, mut sink: F) -> LoopStats
where
    S: FrameSource + ?Sized,
    F: FnMut(usize, &FrameResult),
{
    let mut stats = LoopStats::default();
    while let Some(next) = source.next_frame() {
        let index = stats.frames;
        stats.frames += 1;
        let outcome = next.and_then(|frame| detector.process_frame(&frame.view()));
        match outcome {
            Ok(result) => sink(index, &result),
            Err(err) => {
                stats.failed += 1;
                log::warn!("frame {index} skipped: {err}");
            }
        }
    }
    log::info!(
        "detection loop finished: {} frames, {} failed",
        stats.frames,
        stats.failed
    );
    stats
}
