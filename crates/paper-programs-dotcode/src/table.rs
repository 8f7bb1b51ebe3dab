//! Seeded dot-code table for the 7-chain scheme.
//!
//! Every digit string of the configured length over the configured alphabet
//! that uses at least `min_distinct` different digits is a valid code. The
//! valid strings are enumerated in lexicographic order and shuffled with a
//! fixed seed. The position of a string in the shuffled table is its table
//! index; the table is split into four equal quarters, one per corner.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{CodeMatch, DotCodeError, PaperCorner};

/// Seed of the printed tables.
pub const DEFAULT_TABLE_SEED: u64 = 0x0d07_c0de;

/// Parameters that fully determine a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotCodeSpec {
    /// Number of palette colors (digit radix).
    pub alphabet: u8,
    /// Dots per chain.
    pub length: usize,
    /// Minimum number of different digits in a valid code.
    pub min_distinct: usize,
    pub seed: u64,
}

impl Default for DotCodeSpec {
    fn default() -> Self {
        Self {
            alphabet: 4,
            length: 7,
            min_distinct: 4,
            seed: DEFAULT_TABLE_SEED,
        }
    }
}

/// Immutable table of packed codes plus a reverse index.
///
/// Codes are packed most-significant digit first in base `alphabet`.
#[derive(Clone, Debug)]
pub struct DotCodeTable {
    spec: DotCodeSpec,
    codes: Vec<u64>,
    index: HashMap<u64, u32>,
}

impl DotCodeTable {
    /// Enumerate, filter and shuffle all codes of `spec`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", fields(alphabet = spec.alphabet, length = spec.length))
    )]
    pub fn new(spec: DotCodeSpec) -> Result<Self, DotCodeError> {
        if !(2..=10).contains(&spec.alphabet) {
            return Err(DotCodeError::InvalidAlphabet(spec.alphabet));
        }
        if spec.length == 0 || spec.length > 16 {
            return Err(DotCodeError::InvalidLength(spec.length));
        }
        if spec.min_distinct > spec.alphabet as usize {
            return Err(DotCodeError::InvalidDistinct {
                min_distinct: spec.min_distinct,
                alphabet: spec.alphabet,
            });
        }

        let radix = spec.alphabet as u64;
        let total = radix.pow(spec.length as u32);
        let mut codes: Vec<u64> = (0..total)
            .filter(|&code| distinct_digits(code, radix, spec.length) >= spec.min_distinct)
            .collect();

        if codes.is_empty() || codes.len() % 4 != 0 {
            return Err(DotCodeError::UnevenTable { len: codes.len() });
        }

        let mut rng = StdRng::seed_from_u64(spec.seed);
        codes.shuffle(&mut rng);

        let index = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| (code, i as u32))
            .collect();

        log::debug!(
            "built dot-code table: alphabet={} length={} entries={}",
            spec.alphabet,
            spec.length,
            codes.len()
        );

        Ok(Self { spec, codes, index })
    }

    #[inline]
    pub fn spec(&self) -> DotCodeSpec {
        self.spec
    }

    /// Number of entries (all corners).
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of distinct program ids, `len / 4`.
    #[inline]
    pub fn program_count(&self) -> u32 {
        (self.codes.len() / 4) as u32
    }

    /// Digits of the entry at `table_index`.
    pub fn digits_at(&self, table_index: usize) -> Option<Vec<u8>> {
        let code = *self.codes.get(table_index)?;
        Some(unpack(code, self.spec.alphabet as u64, self.spec.length))
    }

    /// Table index of a digit string, `None` on a miss.
    pub fn lookup(&self, digits: &[u8]) -> Option<usize> {
        let code = pack(digits, self.spec.alphabet, self.spec.length)?;
        self.index.get(&code).map(|&i| i as usize)
    }

    /// Program id and corner of a digit string.
    pub fn decode(&self, digits: &[u8]) -> Option<CodeMatch> {
        let table_index = self.lookup(digits)?;
        let per_corner = self.program_count() as usize;
        Some(CodeMatch {
            program: (table_index % per_corner) as u32,
            corner: PaperCorner::from_index(table_index / per_corner)?,
        })
    }

    /// Digit string printed at `corner` of `program`.
    pub fn encode(&self, program: u32, corner: PaperCorner) -> Result<Vec<u8>, DotCodeError> {
        let programs = self.program_count();
        if program >= programs {
            return Err(DotCodeError::ProgramOutOfRange { program, programs });
        }
        let table_index = program as usize + corner.index() * programs as usize;
        Ok(unpack(
            self.codes[table_index],
            self.spec.alphabet as u64,
            self.spec.length,
        ))
    }
}

fn distinct_digits(mut code: u64, radix: u64, length: usize) -> usize {
    let mut seen = 0u16;
    for _ in 0..length {
        seen |= 1 << (code % radix);
        code /= radix;
    }
    seen.count_ones() as usize
}

fn pack(digits: &[u8], alphabet: u8, length: usize) -> Option<u64> {
    if digits.len() != length {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, &d| {
        (d < alphabet).then(|| acc * alphabet as u64 + d as u64)
    })
}

fn unpack(mut code: u64, radix: u64, length: usize) -> Vec<u8> {
    let mut digits = vec![0u8; length];
    for slot in digits.iter_mut().rev() {
        *slot = (code % radix) as u8;
        code /= radix;
    }
    digits
}

/// Render digits as a compact string, e.g. `"0123301"`.
pub fn digits_to_string(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|&d| char::from_digit(d as u32, 10).unwrap_or('?'))
        .collect()
}

/// Parse a digit string such as `"0123301"`.
pub fn parse_digits(text: &str) -> Option<Vec<u8>> {
    text.trim()
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}
