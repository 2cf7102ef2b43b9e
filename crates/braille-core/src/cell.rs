use crate::CellRegion;
use serde::{Deserialize, Serialize};

/// Number of dot positions in a Braille cell.
pub const SLOT_COUNT: usize = 6;

/// Raised-dot pattern of one cell.
///
/// Bit `n - 1` is set when dot position `n` is raised. Positions follow the
/// usual numbering: 1-2-3 top to bottom in the left column, 4-5-6 in the
/// right column. The value is always within `0..=63`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DotMask(u8);

impl DotMask {
    pub const EMPTY: DotMask = DotMask(0);
    pub const FULL: DotMask = DotMask(0b11_1111);

    /// Returns `None` when bits above position 6 are set.
    pub const fn new(bits: u8) -> Option<Self> {
        if bits <= Self::FULL.0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Build a mask from 1-based dot positions. Positions outside `1..=6`
    /// are ignored.
    pub fn from_positions(positions: &[u8]) -> Self {
        let bits = positions
            .iter()
            .filter(|&&p| (1..=SLOT_COUNT as u8).contains(&p))
            .fold(0u8, |acc, &p| acc | 1 << (p - 1));
        Self(bits)
    }

    /// Mask of the slot at `column` (0 = left) and `row` (0 = top).
    pub fn slot(column: usize, row: usize) -> Self {
        debug_assert!(column < 2 && row < 3);
        Self(1 << (column * 3 + row))
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether 1-based dot `position` is raised.
    pub fn contains(self, position: u8) -> bool {
        (1..=SLOT_COUNT as u8).contains(&position) && self.0 & (1 << (position - 1)) != 0
    }

    /// Raised positions in ascending order.
    pub fn positions(self) -> impl Iterator<Item = u8> {
        (1..=SLOT_COUNT as u8).filter(move |&p| self.contains(p))
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// The equivalent character in the Unicode Braille Patterns block.
    pub fn to_unicode(self) -> char {
        // U+2800..=U+283F covers exactly the 64 six-dot patterns.
        char::from_u32(0x2800 + self.0 as u32).unwrap_or('\u{2800}')
    }
}

impl std::ops::BitOr for DotMask {
    type Output = DotMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        DotMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for DotMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl TryFrom<u8> for DotMask {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        DotMask::new(bits).ok_or_else(|| format!("dot mask {bits} exceeds 63"))
    }
}

impl From<DotMask> for u8 {
    fn from(mask: DotMask) -> u8 {
        mask.0
    }
}

impl std::fmt::Display for DotMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for p in self.positions() {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// A cell with at least one raised dot.
    Glyph,
    /// An inferred word separator.
    Blank,
}

/// One recognized Braille cell, in reading order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Position in the page-wide reading order.
    pub index: usize,
    /// Text line (row band), top to bottom.
    pub line: usize,
    /// Position within the line, left to right, blanks included.
    pub column: usize,
    pub kind: CellKind,
    pub mask: DotMask,
    pub region: CellRegion,
    /// Index of the dot observation assigned to each slot (position 1..=6).
    pub slots: [Option<usize>; SLOT_COUNT],
}

impl Cell {
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.kind == CellKind::Blank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_rejects_out_of_range_bits() {
        assert!(DotMask::new(64).is_none());
        assert_eq!(DotMask::new(63), Some(DotMask::FULL));
    }

    #[test]
    fn positions_round_trip_through_bits() {
        let m = DotMask::from_positions(&[1, 4, 5]);
        assert_eq!(m.bits(), 0b01_1001);
        assert_eq!(m.positions().collect::<Vec<_>>(), vec![1, 4, 5]);
        assert_eq!(m.count(), 3);
        assert_eq!(m.to_string(), "145");
        assert_eq!(DotMask::EMPTY.to_string(), "-");
    }

    #[test]
    fn slot_layout_matches_dot_numbering() {
        assert_eq!(DotMask::slot(0, 0), DotMask::from_positions(&[1]));
        assert_eq!(DotMask::slot(0, 2), DotMask::from_positions(&[3]));
        assert_eq!(DotMask::slot(1, 0), DotMask::from_positions(&[4]));
        assert_eq!(DotMask::slot(1, 2), DotMask::from_positions(&[6]));
    }

    #[test]
    fn unicode_patterns_are_lossless() {
        assert_eq!(DotMask::EMPTY.to_unicode(), '\u{2800}');
        assert_eq!(DotMask::FULL.to_unicode(), '\u{283F}');
        assert_eq!(DotMask::from_positions(&[1, 2]).to_unicode(), '⠃');
    }

    #[test]
    fn mask_deserialization_validates_range() {
        let ok: DotMask = serde_json::from_str("17").expect("valid mask");
        assert_eq!(ok.bits(), 17);
        assert!(serde_json::from_str::<DotMask>("200").is_err());
    }
}
