//! Move generation.
//!
//! Moves are generated pseudo-legally: every move obeys the piece movement
//! rules, but some may leave the mover's own king in check. [`make_move`]
//! rejects those when it applies them.
//!
//! Emission order is fixed. Pieces are visited pawn, knight, bishop, rook,
//! queen, king. Within a piece type, source squares go from a8 to h1, and
//! targets from each source go the same way. A pawn emits its push (four
//! promotions Q, R, B, N, or a single push followed by a double push), then
//! its captures, then en passant. The king emits kingside castling, then
//! queenside castling, then its ordinary moves.

mod attacks;
pub mod magics;
mod make;
pub mod perft;

use crate::{Bitboard, Position};
use chess_types::{Color, Move, MoveFlags, Piece, PieceKind, Square};

pub use attacks::{mask_king_attacks, mask_knight_attacks, mask_pawn_attacks, AttackTables};
pub use magics::{MagicError, MagicNumbers, MagicSearchConfig, Slider};
pub use make::make_move;
pub use perft::{perft, perft_divide, perft_parallel};

/// A list of moves with a fixed maximum capacity.
///
/// No position reachable from the standard start has more than 218 moves, so
/// a fixed-size array avoids heap allocations during move generation. FEN
/// input is not limited to reachable positions; boards with many extra
/// promoted pieces can still exceed [`MoveList::MAX_MOVES`] and are not
/// supported.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Appends a move.
    ///
    /// # Panics
    ///
    /// Panics if the list already holds [`MoveList::MAX_MOVES`] moves.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all pseudo-legal moves for the side to move.
pub fn generate_moves(position: &Position, tables: &AttackTables) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(position, tables, &mut moves);
    generate_piece_moves(position, PieceKind::Knight, &mut moves, |sq, _| {
        tables.knight_attacks(sq)
    });
    generate_piece_moves(position, PieceKind::Bishop, &mut moves, |sq, occ| {
        tables.bishop_attacks(sq, occ)
    });
    generate_piece_moves(position, PieceKind::Rook, &mut moves, |sq, occ| {
        tables.rook_attacks(sq, occ)
    });
    generate_piece_moves(position, PieceKind::Queen, &mut moves, |sq, occ| {
        tables.queen_attacks(sq, occ)
    });
    generate_castling_moves(position, tables, &mut moves);
    generate_piece_moves(position, PieceKind::King, &mut moves, |sq, _| {
        tables.king_attacks(sq)
    });

    moves
}

fn push_promotions(
    moves: &mut MoveList,
    from: Square,
    to: Square,
    color: Color,
    flags: MoveFlags,
) {
    let pawn = Piece::new(PieceKind::Pawn, color);
    for kind in PieceKind::PROMOTIONS {
        moves.push(Move::new(from, to, pawn, Some(Piece::new(kind, color)), flags));
    }
}

/// Generates pseudo-legal pawn moves.
fn generate_pawn_moves(position: &Position, tables: &AttackTables, moves: &mut MoveList) {
    let us = position.side_to_move;
    let pawn = Piece::new(PieceKind::Pawn, us);
    let occupied = position.occupied();
    let their_pieces = position.occupancy(us.opposite());

    let (forward, start_rank, promo_rank) = match us {
        Color::White => (-8i8, Bitboard::RANK_2, Bitboard::RANK_8),
        Color::Black => (8i8, Bitboard::RANK_7, Bitboard::RANK_1),
    };

    for from in position.pieces(pawn) {
        // Quiet pushes
        if let Some(to) = from.offset(forward) {
            if !occupied.contains(to) {
                if promo_rank.contains(to) {
                    push_promotions(moves, from, to, us, MoveFlags::QUIET);
                } else {
                    moves.push(Move::quiet(from, to, pawn));

                    if start_rank.contains(from) {
                        if let Some(double) = to.offset(forward) {
                            if !occupied.contains(double) {
                                moves.push(Move::new(
                                    from,
                                    double,
                                    pawn,
                                    None,
                                    MoveFlags::DOUBLE_PUSH,
                                ));
                            }
                        }
                    }
                }
            }
        }

        // Captures
        let attacks = tables.pawn_attacks(us, from);
        for to in attacks & their_pieces {
            if promo_rank.contains(to) {
                push_promotions(moves, from, to, us, MoveFlags::CAPTURE);
            } else {
                moves.push(Move::new(from, to, pawn, None, MoveFlags::CAPTURE));
            }
        }

        // En passant
        if let Some(ep_square) = position.en_passant {
            if attacks.contains(ep_square) {
                moves.push(Move::new(
                    from,
                    ep_square,
                    pawn,
                    None,
                    MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
                ));
            }
        }
    }
}

/// Generates pseudo-legal moves for a non-pawn piece kind.
///
/// `attacks` maps a source square and the full occupancy to the squares the
/// piece reaches from there.
fn generate_piece_moves<F>(position: &Position, kind: PieceKind, moves: &mut MoveList, attacks: F)
where
    F: Fn(Square, Bitboard) -> Bitboard,
{
    let us = position.side_to_move;
    let piece = Piece::new(kind, us);
    let our_pieces = position.occupancy(us);
    let their_pieces = position.occupancy(us.opposite());
    let occupied = position.occupied();

    for from in position.pieces(piece) {
        for to in attacks(from, occupied) & !our_pieces {
            let flags = if their_pieces.contains(to) {
                MoveFlags::CAPTURE
            } else {
                MoveFlags::QUIET
            };
            moves.push(Move::new(from, to, piece, None, flags));
        }
    }
}

/// Generates castling moves if legal.
///
/// Rights alone are never trusted: the squares between king and rook must be
/// empty, and the king may not start on, pass through, or land on an attacked
/// square.
fn generate_castling_moves(position: &Position, tables: &AttackTables, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    let occupied = position.occupied();
    let king = Piece::new(PieceKind::King, us);

    let (e, f, g, d, c, b) = match us {
        Color::White => (
            Square::E1,
            Square::F1,
            Square::G1,
            Square::D1,
            Square::C1,
            Square::B1,
        ),
        Color::Black => (
            Square::E8,
            Square::F8,
            Square::G8,
            Square::D8,
            Square::C8,
            Square::B8,
        ),
    };
    let attacked = |sq| is_square_attacked(position, tables, sq, them);

    if position.castling.can_castle_kingside(us) {
        let between = Bitboard::EMPTY.with(f).with(g);
        if (occupied & between).is_empty() && !attacked(e) && !attacked(f) && !attacked(g) {
            moves.push(Move::new(e, g, king, None, MoveFlags::CASTLING));
        }
    }

    if position.castling.can_castle_queenside(us) {
        let between = Bitboard::EMPTY.with(b).with(c).with(d);
        if (occupied & between).is_empty() && !attacked(e) && !attacked(d) && !attacked(c) {
            moves.push(Move::new(e, c, king, None, MoveFlags::CASTLING));
        }
    }
}

/// Returns true if the given square is attacked by the given color.
pub fn is_square_attacked(
    position: &Position,
    tables: &AttackTables,
    sq: Square,
    by_color: Color,
) -> bool {
    let occupied = position.occupied();

    // A pawn of `by_color` attacks `sq` exactly when a pawn of the other
    // color on `sq` would attack it.
    let enemy_pawns = position.pieces_of(PieceKind::Pawn, by_color);
    if (tables.pawn_attacks(by_color.opposite(), sq) & enemy_pawns).is_not_empty() {
        return true;
    }

    let enemy_knights = position.pieces_of(PieceKind::Knight, by_color);
    if (tables.knight_attacks(sq) & enemy_knights).is_not_empty() {
        return true;
    }

    let enemy_king = position.pieces_of(PieceKind::King, by_color);
    if (tables.king_attacks(sq) & enemy_king).is_not_empty() {
        return true;
    }

    let enemy_queens = position.pieces_of(PieceKind::Queen, by_color);

    // Bishop/Queen attacks (diagonal)
    let diagonal = position.pieces_of(PieceKind::Bishop, by_color) | enemy_queens;
    if (tables.bishop_attacks(sq, occupied) & diagonal).is_not_empty() {
        return true;
    }

    // Rook/Queen attacks (orthogonal)
    let orthogonal = position.pieces_of(PieceKind::Rook, by_color) | enemy_queens;
    (tables.rook_attacks(sq, occupied) & orthogonal).is_not_empty()
}
