//! Move representation.

use crate::{Piece, Square};
use std::fmt;
use std::ops::BitOr;

/// Independent boolean markers carried by a move.
///
/// Stored in the low four bits; combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    /// No flags set (a quiet move).
    pub const QUIET: MoveFlags = MoveFlags(0);
    /// The move removes an enemy piece.
    pub const CAPTURE: MoveFlags = MoveFlags(0b0001);
    /// Pawn advance of two squares from its starting rank.
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(0b0010);
    /// En passant capture (always combined with [`MoveFlags::CAPTURE`]).
    pub const EN_PASSANT: MoveFlags = MoveFlags(0b0100);
    /// King move that also relocates a rook.
    pub const CASTLING: MoveFlags = MoveFlags(0b1000);

    /// Returns true if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw flag bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds flags from raw bits, ignoring anything above bit 3.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        MoveFlags(bits & 0b1111)
    }
}

impl BitOr for MoveFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        MoveFlags(self.0 | rhs.0)
    }
}

const TARGET_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const PROMOTION_SHIFT: u32 = 16;
const FLAGS_SHIFT: u32 = 20;

/// A chess move.
///
/// Packed into 24 bits of a `u32`:
///
/// | bits  | field                               |
/// |-------|-------------------------------------|
/// | 0-5   | source square                       |
/// | 6-11  | target square                       |
/// | 12-15 | moving piece (0-11)                 |
/// | 16-19 | promoted piece (0 = no promotion)   |
/// | 20    | capture                             |
/// | 21    | double pawn push                    |
/// | 22    | en passant                          |
/// | 23    | castling                            |
///
/// Index 0 is the white pawn, which is never a promotion target, so zero in
/// the promotion field unambiguously means "none".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// A null move (used as placeholder, not a legal move).
    pub const NULL: Move = Move(0);

    /// Creates a new move.
    #[inline]
    pub const fn new(
        source: Square,
        target: Square,
        piece: Piece,
        promotion: Option<Piece>,
        flags: MoveFlags,
    ) -> Self {
        let promoted = match promotion {
            Some(p) => p as u32,
            None => 0,
        };
        Move(
            source.index() as u32
                | (target.index() as u32) << TARGET_SHIFT
                | (piece as u32) << PIECE_SHIFT
                | promoted << PROMOTION_SHIFT
                | (flags.bits() as u32) << FLAGS_SHIFT,
        )
    }

    /// Creates a move without promotion or flags.
    #[inline]
    pub const fn quiet(source: Square, target: Square, piece: Piece) -> Self {
        Self::new(source, target, piece, None, MoveFlags::QUIET)
    }

    /// Returns the source square.
    #[inline]
    pub const fn source(self) -> Square {
        Square::from_low_bits(self.0)
    }

    /// Returns the target square.
    #[inline]
    pub const fn target(self) -> Square {
        Square::from_low_bits(self.0 >> TARGET_SHIFT)
    }

    /// Returns the moving piece.
    #[inline]
    pub const fn piece(self) -> Piece {
        match Piece::from_index(((self.0 >> PIECE_SHIFT) & 0xF) as u8) {
            Some(p) => p,
            // Only reachable through a corrupted encoding.
            None => Piece::WhitePawn,
        }
    }

    /// Returns the promoted piece, if this is a promotion.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        match ((self.0 >> PROMOTION_SHIFT) & 0xF) as u8 {
            0 => None,
            index => Piece::from_index(index),
        }
    }

    /// Returns the flag bits.
    #[inline]
    pub const fn flags(self) -> MoveFlags {
        MoveFlags::from_bits((self.0 >> FLAGS_SHIFT) as u8)
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flags().contains(MoveFlags::CAPTURE)
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.flags().contains(MoveFlags::DOUBLE_PUSH)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags().contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.flags().contains(MoveFlags::CASTLING)
    }

    /// Returns the packed representation.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(p) => format!("{}{}{}", self.source(), self.target(), p.kind().to_char()),
            None => format!("{}{}", self.source(), self.target()),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {:?}", self.to_uci(), self.piece())?;
        if self.is_capture() {
            write!(f, " capture")?;
        }
        if self.is_double_push() {
            write!(f, " double")?;
        }
        if self.is_en_passant() {
            write!(f, " ep")?;
        }
        if self.is_castling() {
            write!(f, " castle")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
