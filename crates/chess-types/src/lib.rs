//! Value types for bitboard move generation.
//!
//! This crate provides the plain data shared by the move generator and the
//! code around it:
//! - [`Color`], [`PieceKind`] and the twelve [`Piece`] identities
//! - [`Square`], [`File`], and [`Rank`] for board coordinates (a8 = 0)
//! - [`Move`], a packed 24-bit move encoding with [`MoveFlags`]
//! - FEN tokenizing and validation via [`Fen`]

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveFlags};
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
