//! Chess position representation.

use chess_types::{Color, Fen, FenError, Piece, PieceKind, Square};
use thiserror::Error;

use crate::movegen::{is_square_attacked, AttackTables};
use crate::Bitboard;

/// Errors raised when building a position from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

// Rights kept after a move touches each square: the king and rook home
// squares strip their rights, everything else keeps all four.
#[rustfmt::skip]
const CASTLING_UPDATE: [u8; 64] = [
     7, 15, 15, 15,  3, 15, 15, 11,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    13, 15, 15, 15, 12, 15, 15, 14,
];

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Drops whatever rights a move between these squares revokes.
    ///
    /// Any move from or to a king or rook home square clears the rights tied
    /// to it, whatever the moving piece is.
    #[inline]
    pub fn update(&mut self, source: Square, target: Square) {
        self.0 &= CASTLING_UPDATE[source.index() as usize] & CASTLING_UPDATE[target.index() as usize];
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Parses a FEN castling field ("KQkq", "Kq", "-").
    fn from_fen_field(field: &str) -> Self {
        let mut flags = 0u8;
        for c in field.chars() {
            match c {
                'K' => flags |= Self::WHITE_KINGSIDE,
                'Q' => flags |= Self::WHITE_QUEENSIDE,
                'k' => flags |= Self::BLACK_KINGSIDE,
                'q' => flags |= Self::BLACK_QUEENSIDE,
                _ => {}
            }
        }
        CastlingRights(flags)
    }

    fn to_fen_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|&(_, c)| c)
        .collect()
    }
}

/// Index of the combined occupancy in [`Position::occupancies`].
pub const BOTH: usize = 2;

/// Complete board state.
///
/// A plain `Copy` value: taking a snapshot before a move is an assignment and
/// restoring it is another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// One bitboard per piece identity, indexed by [`Piece::index`].
    pub bitboards: [Bitboard; 12],

    /// White, black and combined occupancy. Derived from `bitboards`; call
    /// [`Position::update_occupancies`] after editing pieces directly.
    pub occupancies: [Bitboard; 3],

    /// The side to move.
    pub side_to_move: Color,

    /// En passant target square (if any).
    pub en_passant: Option<Square>,

    /// Castling rights.
    pub castling: CastlingRights,
}

impl Position {
    /// Creates an empty position.
    pub const fn empty() -> Self {
        Position {
            bitboards: [Bitboard::EMPTY; 12],
            occupancies: [Bitboard::EMPTY; 3],
            side_to_move: Color::White,
            en_passant: None,
            castling: CastlingRights::NONE,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string. The clock fields are accepted
    /// but not kept.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = Fen::parse(fen)?;
        Ok(Self::from_parsed_fen(&parsed))
    }

    /// Creates a position from already validated FEN fields.
    pub fn from_parsed_fen(fen: &Fen) -> Self {
        let mut position = Position::empty();

        for (sq, piece) in Square::all().zip(fen.board.iter()) {
            if let Some(piece) = piece {
                position.bitboards[piece.index()].set(sq);
            }
        }

        position.side_to_move = fen.side_to_move;
        position.castling = CastlingRights::from_fen_field(&fen.castling);
        position.en_passant = fen.en_passant;
        position.update_occupancies();
        position
    }

    /// Converts the position to a FEN string with clocks written as "0 1".
    pub fn to_fen(&self) -> String {
        let mut board = [None; 64];
        for sq in Square::all() {
            board[sq.index() as usize] = self.piece_at(sq);
        }

        Fen {
            board,
            side_to_move: self.side_to_move,
            castling: self.castling.to_fen_field(),
            en_passant: self.en_passant,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
        .to_string()
    }

    /// Returns the piece at the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        if !self.occupancies[BOTH].contains(sq) {
            return None;
        }
        Piece::ALL
            .into_iter()
            .find(|piece| self.bitboards[piece.index()].contains(sq))
    }

    /// Returns the bitboard of one piece identity.
    #[inline]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.bitboards[piece.index()]
    }

    /// Returns a bitboard of pieces of the given kind and color.
    #[inline]
    pub fn pieces_of(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.bitboards[Piece::new(kind, color).index()]
    }

    /// Returns the squares occupied by one side.
    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancies[color.index()]
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancies[BOTH]
    }

    /// Recomputes all three occupancies from the piece bitboards.
    pub fn update_occupancies(&mut self) {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        for (i, bb) in self.bitboards.iter().enumerate() {
            if i < 6 {
                white |= *bb;
            } else {
                black |= *bb;
            }
        }
        self.occupancies = [white, black, white | black];
    }

    /// Checks the board invariants: piece bitboards are pairwise disjoint
    /// and every occupancy is the union of the pieces it covers.
    pub fn is_consistent(&self) -> bool {
        let mut seen = Bitboard::EMPTY;
        for bb in self.bitboards {
            if (seen & bb).is_not_empty() {
                return false;
            }
            seen |= bb;
        }

        let mut expected = *self;
        expected.update_occupancies();
        expected.occupancies == self.occupancies
    }

    /// Returns the square of the given side's king, if it has one.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(PieceKind::King, color).lsb()
    }

    /// Returns true if the side to move's king is attacked.
    ///
    /// A side without a king is never in check.
    pub fn in_check(&self, tables: &AttackTables) -> bool {
        let us = self.side_to_move;
        match self.king_square(us) {
            Some(king) => is_square_attacked(self, tables, king, us.opposite()),
            None => false,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), Fen::STARTPOS);
        assert!(pos.is_consistent());
    }

    #[test]
    fn custom_fen_drops_clocks() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(
            pos.to_fen(),
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1"
        );
    }

    #[test]
    fn invalid_fen_is_reported() {
        let err = Position::from_fen("8/8/8 w - -").unwrap_err();
        assert!(matches!(err, PositionError::Fen(FenError::InvalidPiecePlacement(_))));
    }

    #[test]
    fn en_passant_target_on_the_movers_side_is_rejected() {
        // A white pawn on d2 would otherwise "capture" onto the empty e3.
        let err = Position::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - e3 0 1").unwrap_err();
        assert_eq!(
            err,
            PositionError::Fen(FenError::InvalidEnPassantSquare("e3".to_string()))
        );
    }

    #[test]
    fn piece_at() {
        let pos = Position::startpos();
        assert_eq!(pos.piece_at(Square::E1), Some(Piece::WhiteKing));
        assert_eq!(pos.piece_at(Square::E8), Some(Piece::BlackKing));
        assert_eq!(pos.piece_at(Square::D8), Some(Piece::BlackQueen));
        assert_eq!(pos.piece_at(Square::E4), None);
    }

    #[test]
    fn occupancies_after_parse() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.occupancy(Color::White), Bitboard::RANK_1 | Bitboard::RANK_2);
        assert_eq!(
            pos.occupancy(Color::Black),
            Bitboard::RANK_8 | Bitboard::RANK_7
        );
        assert_eq!(pos.pieces(Piece::WhitePawn), Bitboard::RANK_2);
        assert_eq!(pos.pieces_of(PieceKind::Pawn, Color::Black).count(), 8);
    }

    #[test]
    fn update_occupancies_recomputes() {
        let mut pos = Position::empty();
        pos.bitboards[Piece::WhiteRook.index()].set(Square::A1);
        pos.bitboards[Piece::BlackKnight.index()].set(Square::G8);
        assert!(!pos.is_consistent());

        pos.update_occupancies();
        assert!(pos.is_consistent());
        assert_eq!(pos.occupancy(Color::White), Bitboard::from_square(Square::A1));
        assert_eq!(pos.occupancy(Color::Black), Bitboard::from_square(Square::G8));
        assert_eq!(pos.occupied().count(), 2);
    }

    #[test]
    fn overlapping_pieces_are_inconsistent() {
        let mut pos = Position::startpos();
        pos.bitboards[Piece::BlackQueen.index()].set(Square::E1);
        pos.update_occupancies();
        assert!(!pos.is_consistent());
    }

    #[test]
    fn king_square() {
        let pos = Position::startpos();
        assert_eq!(pos.king_square(Color::White), Some(Square::E1));
        assert_eq!(pos.king_square(Color::Black), Some(Square::E8));
        assert_eq!(Position::empty().king_square(Color::White), None);
    }

    #[test]
    fn in_check() {
        let tables = AttackTables::shared();
        assert!(!Position::startpos().in_check(tables));

        let checked = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        assert!(checked.in_check(tables));

        let kingless = Position::from_fen("8/8/8/8/8/8/8/7r w - - 0 1").unwrap();
        assert!(!kingless.in_check(tables));
    }

    #[test]
    fn castling_rights_flags() {
        let rights = CastlingRights::ALL;
        assert!(rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_queenside(Color::Black));
        assert_eq!(CastlingRights::new(0xFF).raw(), 0b1111);

        let none = CastlingRights::NONE;
        assert!(!none.can_castle_kingside(Color::White));
        assert!(!none.can_castle_queenside(Color::Black));
    }

    #[test]
    fn castling_rights_update_table() {
        let cases = [
            (Square::A8, 0b0111),
            (Square::E8, 0b0011),
            (Square::H8, 0b1011),
            (Square::A1, 0b1101),
            (Square::E1, 0b1100),
            (Square::H1, 0b1110),
            (Square::D4, 0b1111),
        ];
        for (sq, expected) in cases {
            let mut from = CastlingRights::ALL;
            from.update(sq, Square::D4);
            assert_eq!(from.raw(), expected, "moving from {}", sq);

            let mut to = CastlingRights::ALL;
            to.update(Square::D4, sq);
            assert_eq!(to.raw(), expected, "moving to {}", sq);
        }

        // Rook takes rook in the corner: both sides lose that wing.
        let mut rights = CastlingRights::ALL;
        rights.update(Square::H1, Square::H8);
        assert_eq!(rights.raw(), CastlingRights::WHITE_QUEENSIDE | CastlingRights::BLACK_QUEENSIDE);
    }

    #[test]
    fn castling_fen_field() {
        for field in ["KQkq", "Kq", "k", "-"] {
            assert_eq!(CastlingRights::from_fen_field(field).to_fen_field(), field);
        }
    }

    #[test]
    fn position_with_en_passant() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.en_passant, Some(Square::E3));
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn position_empty_and_default() {
        let pos = Position::empty();
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.castling.raw(), 0);
        assert_eq!(pos.en_passant, None);
        assert!(pos.occupied().is_empty());
        assert!(pos.is_consistent());

        assert_eq!(Position::default(), Position::startpos());
    }
}
