//! Files, ranks and squares.

use std::fmt;

/// A board column, `a` to `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// 0 for the a-file through 7 for the h-file.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'a' + self.index()) as char)
    }
}

/// A board row, `1` to `8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// 0 for rank 1 through 7 for rank 8.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index() + 1)
    }
}

/// A square on the chess board, indexed 0-63.
///
/// Squares are indexed rank-major from the top of the board:
/// - a8 = 0, b8 = 1, ..., h8 = 7
/// - a7 = 8, ..., a1 = 56, ..., h1 = 63
///
/// Bit `i` of a bitboard therefore corresponds to `Square(i)`, and the
/// file of a square is `index % 8` while its row from the top is `index / 8`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square((7 - rank.index()) * 8 + file.index())
    }

    /// Creates a square from index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Square named by the low six bits of `bits`. Higher bits are ignored,
    /// so every input maps to a square.
    #[inline]
    pub const fn from_low_bits(bits: u32) -> Self {
        Square((bits & 0x3F) as u8)
    }

    /// Parses lowercase algebraic notation such as `"e4"`.
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Some(Square((b'8' - *rank) * 8 + (*file - b'a'))),
            _ => None,
        }
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 % 8) as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(7 - self.0 / 8) as usize]
    }

    /// Returns the square `delta` indices away, if it stays on the board.
    ///
    /// A delta of +8 moves one rank towards rank 1, -8 one rank towards
    /// rank 8. No file wraparound check is made.
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        let target = self.0 as i16 + delta as i16;
        if target >= 0 && target < 64 {
            Some(Square(target as u8))
        } else {
            None
        }
    }

    /// Lowercase algebraic name, e.g. `"e4"`.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    /// Iterates over all squares in index order (a8 to h1).
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    // Named squares, rank 8 first.
    pub const A8: Square = Square(0);
    pub const B8: Square = Square(1);
    pub const C8: Square = Square(2);
    pub const D8: Square = Square(3);
    pub const E8: Square = Square(4);
    pub const F8: Square = Square(5);
    pub const G8: Square = Square(6);
    pub const H8: Square = Square(7);

    pub const A7: Square = Square(8);
    pub const B7: Square = Square(9);
    pub const C7: Square = Square(10);
    pub const D7: Square = Square(11);
    pub const E7: Square = Square(12);
    pub const F7: Square = Square(13);
    pub const G7: Square = Square(14);
    pub const H7: Square = Square(15);

    pub const A6: Square = Square(16);
    pub const B6: Square = Square(17);
    pub const C6: Square = Square(18);
    pub const D6: Square = Square(19);
    pub const E6: Square = Square(20);
    pub const F6: Square = Square(21);
    pub const G6: Square = Square(22);
    pub const H6: Square = Square(23);

    pub const A5: Square = Square(24);
    pub const B5: Square = Square(25);
    pub const C5: Square = Square(26);
    pub const D5: Square = Square(27);
    pub const E5: Square = Square(28);
    pub const F5: Square = Square(29);
    pub const G5: Square = Square(30);
    pub const H5: Square = Square(31);

    pub const A4: Square = Square(32);
    pub const B4: Square = Square(33);
    pub const C4: Square = Square(34);
    pub const D4: Square = Square(35);
    pub const E4: Square = Square(36);
    pub const F4: Square = Square(37);
    pub const G4: Square = Square(38);
    pub const H4: Square = Square(39);

    pub const A3: Square = Square(40);
    pub const B3: Square = Square(41);
    pub const C3: Square = Square(42);
    pub const D3: Square = Square(43);
    pub const E3: Square = Square(44);
    pub const F3: Square = Square(45);
    pub const G3: Square = Square(46);
    pub const H3: Square = Square(47);

    pub const A2: Square = Square(48);
    pub const B2: Square = Square(49);
    pub const C2: Square = Square(50);
    pub const D2: Square = Square(51);
    pub const E2: Square = Square(52);
    pub const F2: Square = Square(53);
    pub const G2: Square = Square(54);
    pub const H2: Square = Square(55);

    pub const A1: Square = Square(56);
    pub const B1: Square = Square(57);
    pub const C1: Square = Square(58);
    pub const D1: Square = Square(59);
    pub const E1: Square = Square(60);
    pub const F1: Square = Square(61);
    pub const G1: Square = Square(62);
    pub const H1: Square = Square(63);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_is_zero() {
        assert_eq!(Square::A8.index(), 0);
        assert_eq!(Square::H8.index(), 7);
        assert_eq!(Square::A1.index(), 56);
        assert_eq!(Square::H1.index(), 63);
        assert_eq!(Square::new(File::E, Rank::R4), Square::E4);
        assert_eq!(Square::E4.index(), 36);
    }

    #[test]
    fn file_and_rank_of_every_square() {
        for sq in Square::all() {
            assert_eq!(sq.file().index(), sq.index() % 8);
            assert_eq!(sq.rank().index(), 7 - sq.index() / 8);
            assert_eq!(Square::new(sq.file(), sq.rank()), sq);
        }
    }

    #[test]
    fn parse_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square::A1));
        assert_eq!(Square::from_algebraic("h8"), Some(Square::H8));
        assert_eq!(Square::from_algebraic("e3"), Some(Square::E3));
        for bad in ["", "e", "i1", "a0", "a9", "E4", "e44"] {
            assert_eq!(Square::from_algebraic(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn algebraic_names_round_trip() {
        for sq in Square::all() {
            assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }
        assert_eq!(format!("{}", Square::G7), "g7");
        assert_eq!(format!("{:?}", Square::G7), "Square(g7)");
    }

    #[test]
    fn offset_checks_index_only() {
        assert_eq!(Square::E2.offset(-8), Some(Square::E3));
        assert_eq!(Square::E7.offset(8), Some(Square::E6));
        assert_eq!(Square::A8.offset(-8), None);
        assert_eq!(Square::H1.offset(8), None);
        // Files wrap; callers guard against that themselves.
        assert_eq!(Square::H8.offset(1), Some(Square::A7));
    }

    #[test]
    fn low_bits_ignore_the_rest() {
        assert_eq!(Square::from_low_bits(63), Square::H1);
        assert_eq!(Square::from_low_bits(64 + 4), Square::E8);
        assert_eq!(Square::from_low_bits(u32::MAX), Square::H1);
        assert_eq!(Square::from_index(64), None);
    }
}
