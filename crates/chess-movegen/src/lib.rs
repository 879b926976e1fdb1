//! Bitboard move generation core.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`AttackTables`] - leaper tables and magic bitboard slider lookups
//! - [`Position`] - piece bitboards, occupancies, side to move, en passant
//!   square and castling rights
//! - Pseudo-legal move generation with [`make_move`] as the legality filter
//! - Perft node counting, sequential and multi-threaded
//!
//! # Architecture
//!
//! Attack tables are built once, either by searching for magic numbers or
//! from previously discovered ones, and are read-only afterwards. A
//! [`Position`] is a small `Copy` value: [`make_move`] snapshots it, applies
//! the move and restores the snapshot if the mover's king ends up attacked.
//!
//! # Example
//!
//! ```
//! use chess_movegen::{generate_moves, make_move, perft, AttackTables, Position};
//!
//! let tables = AttackTables::shared();
//! let mut position = Position::startpos();
//!
//! let moves = generate_moves(&position, tables);
//! println!("Pseudo-legal moves from the starting position: {}", moves.len());
//!
//! let snapshot = position;
//! if make_move(&mut position, tables, moves[0]) {
//!     println!("After {}: {}", moves[0], position.to_fen());
//! }
//! position = snapshot;
//!
//! assert_eq!(perft(&mut position, tables, 2), 400);
//! ```

mod bitboard;
pub mod movegen;
mod position;

pub use bitboard::{Bitboard, BitboardIter};
pub use movegen::{
    generate_moves, is_square_attacked, make_move, perft, perft_divide, perft_parallel,
    AttackTables, MagicError, MagicNumbers, MagicSearchConfig, MoveList, Slider,
};
pub use position::{CastlingRights, Position, PositionError, BOTH};
