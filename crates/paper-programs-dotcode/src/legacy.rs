//! Positional 5-chain code of the earlier marker generation.
//!
//! Five dots over a five-color palette. The middle dot carries the corner,
//! the other four form the base-5 program id.

use crate::{CodeMatch, DotCodeError, PaperCorner};

pub const LEGACY_ALPHABET: u8 = 5;
pub const LEGACY_LENGTH: usize = 5;
/// `5^4` ids from the four outer dots.
pub const LEGACY_PROGRAMS: u32 = 625;

/// Decode five globally classified digits.
///
/// A middle digit of 4 is not a corner and yields `None`.
pub fn decode_legacy(digits: &[u8]) -> Option<CodeMatch> {
    let &[d0, d1, d2, d3, d4] = digits else {
        return None;
    };
    if digits.iter().any(|&d| d >= LEGACY_ALPHABET) {
        return None;
    }
    let corner = PaperCorner::from_index(d2 as usize)?;
    let program = 125 * d0 as u32 + 25 * d1 as u32 + 5 * d3 as u32 + d4 as u32;
    Some(CodeMatch { program, corner })
}

pub fn encode_legacy(program: u32, corner: PaperCorner) -> Result<Vec<u8>, DotCodeError> {
    if program >= LEGACY_PROGRAMS {
        return Err(DotCodeError::ProgramOutOfRange {
            program,
            programs: LEGACY_PROGRAMS,
        });
    }
    let digit = |place: u32| ((program / place) % 5) as u8;
    Ok(vec![
        digit(125),
        digit(25),
        corner.index() as u8,
        digit(5),
        digit(1),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digits_decode() {
        let m = decode_legacy(&[1, 2, 3, 4, 0]).unwrap();
        assert_eq!(m.program, 125 + 50 + 20);
        assert_eq!(m.corner, PaperCorner::BottomLeft);
    }

    #[test]
    fn middle_digit_four_is_rejected() {
        assert!(decode_legacy(&[0, 0, 4, 0, 0]).is_none());
        assert!(decode_legacy(&[0, 0, 0, 0]).is_none());
        assert!(decode_legacy(&[0, 5, 0, 0, 0]).is_none());
    }

    #[test]
    fn encode_round_trips_all_ids() {
        for program in [0, 1, 124, 311, 624] {
            for corner in PaperCorner::ALL {
                let digits = encode_legacy(program, corner).unwrap();
                assert_eq!(
                    decode_legacy(&digits),
                    Some(CodeMatch { program, corner })
                );
            }
        }
        assert!(encode_legacy(625, PaperCorner::TopLeft).is_err());
    }
}
