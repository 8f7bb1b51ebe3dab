use paper_programs_dotcode::{CodeScheme, DotCodeError};

/// Errors surfaced by the detection pipeline.
///
/// Missing or undecodable markers are never errors; they are simply absent
/// from the frame result.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("palette has {palette} colors but the {scheme:?} code needs {alphabet}")]
    PaletteSizeMismatch {
        palette: usize,
        alphabet: usize,
        scheme: CodeScheme,
    },
    #[error("frame buffer of {len} bytes does not match a {width}x{height} RGB image")]
    InvalidFrame {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error(transparent)]
    DotCode(#[from] DotCodeError),
    #[error("blob detector failed: {0}")]
    Backend(String),
}
