//! Scheme selection and chain decoding.

use paper_programs_core::{Palette, Rgb8};
use serde::{Deserialize, Serialize};

use crate::legacy::{decode_legacy, encode_legacy, LEGACY_ALPHABET, LEGACY_LENGTH, LEGACY_PROGRAMS};
use crate::reindex::reindex_shape_colors;
use crate::{CodeMatch, DotCodeError, DotCodeSpec, DotCodeTable, PaperCorner};

/// Marker generation a detector session decodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeScheme {
    /// Seven dots, four colors, seeded table.
    #[default]
    Chain7,
    /// Five dots, five colors, positional code.
    Chain5,
}

/// Digits read from one chain together with the identity they decode to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainCode {
    pub digits: Vec<u8>,
    pub code: CodeMatch,
}

/// Decoder bound to exactly one scheme.
#[derive(Clone, Debug)]
pub enum DotCodeDecoder {
    Table(DotCodeTable),
    Legacy,
}

impl DotCodeDecoder {
    pub fn new(scheme: CodeScheme) -> Result<Self, DotCodeError> {
        match scheme {
            CodeScheme::Chain7 => Ok(Self::Table(DotCodeTable::new(DotCodeSpec::default())?)),
            CodeScheme::Chain5 => Ok(Self::Legacy),
        }
    }

    /// Palette size the chains are printed with.
    pub fn alphabet_size(&self) -> usize {
        match self {
            Self::Table(t) => t.spec().alphabet as usize,
            Self::Legacy => LEGACY_ALPHABET as usize,
        }
    }

    /// Dots per chain.
    pub fn chain_len(&self) -> usize {
        match self {
            Self::Table(t) => t.spec().length,
            Self::Legacy => LEGACY_LENGTH,
        }
    }

    /// Index of the bend dot, where the two arms of a chain meet.
    #[inline]
    pub fn anchor_index(&self) -> usize {
        self.chain_len() / 2
    }

    pub fn program_count(&self) -> u32 {
        match self {
            Self::Table(t) => t.program_count(),
            Self::Legacy => LEGACY_PROGRAMS,
        }
    }

    pub fn decode_digits(&self, digits: &[u8]) -> Option<CodeMatch> {
        match self {
            Self::Table(t) => t.decode(digits),
            Self::Legacy => decode_legacy(digits),
        }
    }

    pub fn encode(&self, program: u32, corner: PaperCorner) -> Result<Vec<u8>, DotCodeError> {
        match self {
            Self::Table(t) => t.encode(program, corner),
            Self::Legacy => encode_legacy(program, corner),
        }
    }

    /// Read the digits of one oriented chain from its sampled dot colors.
    ///
    /// The table scheme re-indexes colors within the chain; the legacy scheme
    /// repeats colors too often for that and uses the global classification.
    pub fn read_digits(&self, colors: &[Rgb8], palette: &Palette) -> Option<Vec<u8>> {
        if colors.len() != self.chain_len() {
            return None;
        }
        match self {
            Self::Table(_) => reindex_shape_colors(colors, palette.colors()),
            Self::Legacy => colors
                .iter()
                .map(|&c| palette.classify(c).map(|i| i as u8))
                .collect(),
        }
    }

    /// Read and decode one chain. A miss is `None`.
    pub fn decode_colors(&self, colors: &[Rgb8], palette: &Palette) -> Option<ChainCode> {
        let digits = self.read_digits(colors, palette)?;
        let code = self.decode_digits(&digits)?;
        Some(ChainCode { digits, code })
    }
}
