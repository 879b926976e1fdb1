//! 64-bit square sets.

use chess_types::Square;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A set of squares, one bit per square.
///
/// Bit 0 = a8, bit 7 = h8, bit 56 = a1, bit 63 = h1 (rank 8 first). Shifting
/// right by 8 moves every square one rank towards rank 8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    // Wraparound guards for leaper shifts
    pub const NOT_A_FILE: Bitboard = Bitboard(0xFEFE_FEFE_FEFE_FEFE);
    pub const NOT_H_FILE: Bitboard = Bitboard(0x7F7F_7F7F_7F7F_7F7F);
    pub const NOT_AB_FILE: Bitboard = Bitboard(0xFCFC_FCFC_FCFC_FCFC);
    pub const NOT_GH_FILE: Bitboard = Bitboard(0x3F3F_3F3F_3F3F_3F3F);

    // Rank masks
    pub const RANK_8: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_7: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_2: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_1: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    #[inline]
    pub const fn new(bits: u64) -> Self {
        Bitboard(bits)
    }

    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.index())
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Population count.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 >> sq.index()) & 1 == 1
    }

    /// Returns a copy with the given square set.
    #[inline]
    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1u64 << sq.index()))
    }

    /// Returns a copy with the given square cleared.
    #[inline]
    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1u64 << sq.index()))
    }

    /// In-place form of [`Bitboard::with`].
    #[inline]
    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    /// In-place form of [`Bitboard::without`].
    #[inline]
    pub fn clear(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    /// Lowest-index square in the set, `None` for the empty board.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        // trailing_zeros of the empty board is 64, which has no square.
        Square::from_index(self.0.trailing_zeros() as u8)
    }

    /// Removes and returns the lowest-index square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    // One-step shifts in each compass direction. East/west components are
    // masked so nothing wraps onto the opposite edge file.

    #[inline]
    pub const fn north(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    #[inline]
    pub const fn south(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    #[inline]
    pub const fn east(self) -> Bitboard {
        Bitboard((self.0 << 1) & Self::NOT_A_FILE.0)
    }

    #[inline]
    pub const fn west(self) -> Bitboard {
        Bitboard((self.0 >> 1) & Self::NOT_H_FILE.0)
    }

    #[inline]
    pub const fn north_east(self) -> Bitboard {
        Bitboard((self.0 >> 7) & Self::NOT_A_FILE.0)
    }

    #[inline]
    pub const fn north_west(self) -> Bitboard {
        Bitboard((self.0 >> 9) & Self::NOT_H_FILE.0)
    }

    #[inline]
    pub const fn south_east(self) -> Bitboard {
        Bitboard((self.0 << 9) & Self::NOT_A_FILE.0)
    }

    #[inline]
    pub const fn south_west(self) -> Bitboard {
        Bitboard((self.0 << 7) & Self::NOT_H_FILE.0)
    }

    /// Bitwise union, usable in `const` contexts.
    #[inline]
    pub const fn union(self, other: Bitboard) -> Bitboard {
        Bitboard(self.0 | other.0)
    }
}

macro_rules! impl_bit_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $sym:tt) => {
        impl $op for Bitboard {
            type Output = Self;
            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Bitboard(self.0 $sym rhs.0)
            }
        }

        impl $assign for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $sym rhs;
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for file in 0..8 {
                if (self.0 >> (row * 8 + file)) & 1 == 1 {
                    write!(f, "X ")?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

/// Iterator over set squares in a bitboard, lowest index first.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_types::File;

    fn bb(squares: &[Square]) -> Bitboard {
        squares.iter().fold(Bitboard::EMPTY, |acc, &sq| acc.with(sq))
    }

    #[test]
    fn square_bits_follow_rank_8_first_layout() {
        assert_eq!(Bitboard::from_square(Square::A8).0, 1);
        assert_eq!(Bitboard::from_square(Square::H8).0, 1 << 7);
        assert_eq!(Bitboard::from_square(Square::A1).0, 1 << 56);
        assert_eq!(Bitboard::from_square(Square::H1).0, 1 << 63);
    }

    #[test]
    fn edge_guards() {
        assert_eq!(Bitboard::NOT_A_FILE, !Bitboard::FILE_A);
        assert_eq!(Bitboard::NOT_H_FILE, !Bitboard::FILE_H);
        assert_eq!(Bitboard::NOT_A_FILE.0, 18374403900871474942);
        assert_eq!(Bitboard::NOT_H_FILE.0, 9187201950435737471);
        assert_eq!(Bitboard::NOT_GH_FILE.0, 4557430888798830399);
        assert_eq!(Bitboard::NOT_AB_FILE.0, 18229723555195321596);
        assert_eq!(Bitboard::NOT_AB_FILE.count(), 48);
        assert_eq!(
            (Bitboard::RANK_1 | Bitboard::RANK_2 | Bitboard::RANK_7 | Bitboard::RANK_8).count(),
            32
        );
    }

    #[test]
    fn set_and_clear_agree_with_value_forms() {
        let pair = bb(&[Square::E4, Square::D5]);
        assert_eq!(pair.count(), 2);
        assert!(pair.is_not_empty());

        let mut edited = pair;
        edited.clear(Square::E4);
        assert_eq!(edited, pair.without(Square::E4));
        assert!(pair.contains(Square::E4));
        edited.set(Square::E4);
        assert_eq!(edited, pair);

        // Clearing an absent square is a no-op.
        assert_eq!(pair.without(Square::H1), pair);
    }

    #[test]
    fn shifts_stop_at_the_board_edge() {
        let corner = Bitboard::from_square(Square::A1);
        assert_eq!(corner.north(), Bitboard::from_square(Square::A2));
        assert_eq!(corner.east(), Bitboard::from_square(Square::B1));
        assert_eq!(corner.north_east(), Bitboard::from_square(Square::B2));
        assert!(corner.west().is_empty());
        assert!(corner.south().is_empty());
        assert!(corner.south_west().is_empty());

        let h_file = Bitboard::FILE_H;
        assert!(h_file.east().is_empty());
        assert!(h_file.north_east().is_empty());
        assert!(h_file.south_east().is_empty());
        let g_file: Vec<Square> = Square::all().filter(|s| s.file() == File::G).collect();
        assert_eq!(h_file.west(), bb(&g_file));

        let e4 = Bitboard::from_square(Square::E4);
        assert_eq!(e4.north_west(), Bitboard::from_square(Square::D5));
        assert_eq!(e4.south_east(), Bitboard::from_square(Square::F3));
        assert_eq!(e4.south_west(), Bitboard::from_square(Square::D3));
    }

    #[test]
    fn iteration_is_ascending_by_index() {
        let squares: Vec<Square> = bb(&[Square::H1, Square::C6, Square::A8]).into_iter().collect();
        assert_eq!(squares, vec![Square::A8, Square::C6, Square::H1]);
        assert_eq!(Bitboard::FILE_A.into_iter().len(), 8);
    }

    #[test]
    fn lsb_of_every_single_bit_and_empty() {
        assert_eq!(Bitboard::EMPTY.lsb(), None);
        for i in 0..64u64 {
            // The top bit must never hide a lower one.
            let b = Bitboard::new(1 << i | 1 << 63);
            assert_eq!(b.lsb().map(|s| s.index() as u64), Some(i));
        }
    }

    #[test]
    fn pop_lsb_drains_in_order() {
        let mut b = Bitboard::new(0b1010);
        assert_eq!(b.pop_lsb(), Some(Square::B8));
        assert_eq!(b.pop_lsb(), Some(Square::D8));
        assert_eq!(b.pop_lsb(), None);
        assert!(b.is_empty());
    }

    #[test]
    fn debug_renders_a_grid() {
        let text = format!("{:?}", Bitboard::from_square(Square::A8));
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[1], "8 X . . . . . . . ");
        assert_eq!(rows[9], "  a b c d e f g h");
    }
}
