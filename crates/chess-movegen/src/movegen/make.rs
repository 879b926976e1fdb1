//! Applying moves to a position.

use super::{is_square_attacked, AttackTables};
use crate::Position;
use chess_types::{Color, Move, Piece, PieceKind, Square};

/// Applies `m` to `position` and reports whether it was legal.
///
/// On `false` the move left the mover's king attacked and `position` has
/// been restored to exactly what it was before the call. A side without a
/// king never has a move rejected.
#[must_use = "an illegal move is rolled back and reported through the return value"]
pub fn make_move(position: &mut Position, tables: &AttackTables, m: Move) -> bool {
    let snapshot = *position;
    let us = position.side_to_move;
    let them = us.opposite();
    let source = m.source();
    let target = m.target();
    let piece = m.piece();

    position.bitboards[piece.index()].clear(source);
    position.bitboards[piece.index()].set(target);

    if m.is_capture() {
        for kind in PieceKind::ALL {
            let bb = &mut position.bitboards[Piece::new(kind, them).index()];
            if bb.contains(target) {
                bb.clear(target);
                break;
            }
        }
    }

    if let Some(promoted) = m.promotion() {
        position.bitboards[piece.index()].clear(target);
        position.bitboards[promoted.index()].set(target);
    }

    // The pawn passed over the target square; it sits one rank behind it.
    let behind_target = match us {
        Color::White => target.offset(8),
        Color::Black => target.offset(-8),
    };

    if m.is_en_passant() {
        if let Some(captured) = behind_target {
            position.bitboards[Piece::new(PieceKind::Pawn, them).index()].clear(captured);
        }
    }

    position.en_passant = if m.is_double_push() {
        behind_target
    } else {
        None
    };

    if m.is_castling() {
        let rook_squares = match target {
            Square::G1 => Some((Square::H1, Square::F1)),
            Square::C1 => Some((Square::A1, Square::D1)),
            Square::G8 => Some((Square::H8, Square::F8)),
            Square::C8 => Some((Square::A8, Square::D8)),
            _ => None,
        };
        if let Some((rook_from, rook_to)) = rook_squares {
            let rook = &mut position.bitboards[Piece::new(PieceKind::Rook, us).index()];
            rook.clear(rook_from);
            rook.set(rook_to);
        }
    }

    position.castling.update(source, target);
    position.update_occupancies();
    position.side_to_move = them;

    let left_in_check = match position.king_square(us) {
        Some(king) => is_square_attacked(position, tables, king, them),
        None => false,
    };

    if left_in_check {
        *position = snapshot;
        false
    } else {
        true
    }
}
