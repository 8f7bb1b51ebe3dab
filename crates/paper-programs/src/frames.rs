//! Frame loading with the `image` crate.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

use paper_programs_core::{RgbImage, RgbImageView};
use paper_programs_detect::{DetectError, FrameResult, FrameSource, ProgramDetector};

/// Borrow an `image::RgbImage` as a detector frame view.
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

fn open_rgb8(path: &Path) -> Result<::image::RgbImage, DetectError> {
    Ok(::image::open(path)
        .map_err(|e| DetectError::Backend(format!("{}: {e}", path.display())))?
        .to_rgb8())
}

/// Decode an image file into an RGB frame. Alpha and gray inputs are converted.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, DetectError> {
    let img = open_rgb8(path.as_ref())?;
    Ok(RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    })
}

/// Image files played back in order as a [`FrameSource`].
#[derive(Clone, Debug, Default)]
pub struct FileFrames {
    paths: VecDeque<PathBuf>,
}

impl FileFrames {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for FileFrames {
    fn next_frame(&mut self) -> Option<Result<RgbImage, DetectError>> {
        let path = self.paths.pop_front()?;
        log::debug!("loading frame {}", path.display());
        Some(load_rgb(&path))
    }
}

/// Load one image file and run it through `detector`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(detector, path), fields(path = %path.as_ref().display()))
)]
pub fn detect_image(
    detector: &mut ProgramDetector,
    path: impl AsRef<Path>,
) -> Result<FrameResult, DetectError> {
    let img = open_rgb8(path.as_ref())?;
    detector.process_frame(&rgb_view(&img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matches_image_layout() {
        let img = ::image::RgbImage::from_pixel(3, 2, ::image::Rgb([1, 2, 3]));
        let view = rgb_view(&img);
        assert_eq!((view.width, view.height), (3, 2));
        assert_eq!(view.data.len(), 18);
        assert_eq!(view.pixel(2, 1), [1, 2, 3]);
    }

    #[test]
    fn missing_files_fail_one_frame_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("white.png");
        ::image::RgbImage::from_pixel(8, 8, ::image::Rgb([255, 255, 255]))
            .save(&good)
            .unwrap();

        let mut frames = FileFrames::new([dir.path().join("missing.png"), good]);
        assert_eq!(frames.remaining(), 2);
        match frames.next_frame() {
            Some(Err(DetectError::Backend(msg))) => assert!(msg.contains("missing.png")),
            other => panic!("expected a backend error, got {other:?}"),
        }
        let frame = frames.next_frame().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (8, 8));
        assert!(frames.next_frame().is_none());
    }

    #[test]
    fn detect_image_runs_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        ::image::RgbImage::from_pixel(64, 48, ::image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let mut detector = ProgramDetector::new(Default::default()).unwrap();
        let result = detect_image(&mut detector, &path).unwrap();
        assert!(result.programs_to_render.is_empty());
        assert_eq!(result.frame.map(|f| (f.width, f.height)), Some((64, 48)));

        let missing = detect_image(&mut detector, dir.path().join("nope.png"));
        assert!(matches!(missing, Err(DetectError::Backend(_))));
    }
}
