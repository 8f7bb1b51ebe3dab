//! Dot-chain codes printed on the corners of paper programs.
//!
//! Each paper corner carries an L-shaped chain of colored dots. The colors,
//! read head to tail, form a digit string that identifies both the program
//! and which of its four corners the chain sits on.
//!
//! Two schemes exist:
//! - [`CodeScheme::Chain7`]: seven dots over four colors, looked up in a
//!   seeded [`DotCodeTable`]; digits are read with per-chain re-indexing.
//! - [`CodeScheme::Chain5`]: five dots over five colors with a positional
//!   code; the middle dot is the corner.
//!
//! A detector session decodes exactly one scheme through a
//! [`DotCodeDecoder`], which owns its table.

mod corner;
mod decoder;
mod error;
mod legacy;
mod reindex;
mod table;

pub use corner::{CodeMatch, PaperCorner};
pub use decoder::{ChainCode, CodeScheme, DotCodeDecoder};
pub use error::DotCodeError;
pub use legacy::{decode_legacy, encode_legacy, LEGACY_ALPHABET, LEGACY_LENGTH, LEGACY_PROGRAMS};
pub use reindex::reindex_shape_colors;
pub use table::{digits_to_string, parse_digits, DotCodeSpec, DotCodeTable, DEFAULT_TABLE_SEED};
