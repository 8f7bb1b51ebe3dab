/// Errors raised while building code tables or encoding programs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DotCodeError {
    #[error("alphabet size {0} is outside the supported range 2..=10")]
    InvalidAlphabet(u8),
    #[error("chain length {0} is outside the supported range 1..=16")]
    InvalidLength(usize),
    #[error("minimum distinct digits {min_distinct} exceeds alphabet size {alphabet}")]
    InvalidDistinct { min_distinct: usize, alphabet: u8 },
    #[error("code table has {len} entries, which cannot be split evenly over 4 corners")]
    UnevenTable { len: usize },
    #[error("program {program} is out of range (table holds {programs} programs)")]
    ProgramOutOfRange { program: u32, programs: u32 },
}
