use serde::{Deserialize, Serialize};

/// One of the four corners of a paper, clockwise from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperCorner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl PaperCorner {
    pub const ALL: [PaperCorner; 4] = [
        PaperCorner::TopLeft,
        PaperCorner::TopRight,
        PaperCorner::BottomRight,
        PaperCorner::BottomLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Diagonally opposite corner.
    #[inline]
    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 2) % 4]
    }

    pub fn short_name(self) -> &'static str {
        match self {
            PaperCorner::TopLeft => "TL",
            PaperCorner::TopRight => "TR",
            PaperCorner::BottomRight => "BR",
            PaperCorner::BottomLeft => "BL",
        }
    }
}

/// Decoded identity of one corner chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeMatch {
    pub program: u32,
    pub corner: PaperCorner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for corner in PaperCorner::ALL {
            assert_eq!(corner.opposite().opposite(), corner);
            assert_ne!(corner.opposite(), corner);
        }
        assert_eq!(PaperCorner::TopLeft.opposite(), PaperCorner::BottomRight);
    }

    #[test]
    fn index_round_trips() {
        for (i, corner) in PaperCorner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
            assert_eq!(PaperCorner::from_index(i), Some(*corner));
        }
        assert_eq!(PaperCorner::from_index(4), None);
    }
}
