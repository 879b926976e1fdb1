//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! The parser only tokenizes and validates text into typed fields; turning
//! those fields into bitboards is the engine's job.

use crate::{Color, Piece, Rank, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// Parsed and validated FEN fields.
///
/// `board` is indexed by [`Square::index`], so `board[0]` is a8 and
/// `board[63]` is h1, matching the order in which FEN lists squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Piece on each square, if any.
    pub board: [Option<Piece>; 64],
    /// Side to move.
    pub side_to_move: Color,
    /// Castling availability as written (e.g. "KQkq", "Kq", "-").
    pub castling: String,
    /// En passant target square, if any.
    pub en_passant: Option<Square>,
    /// Halfmove clock (0 when the field is omitted).
    pub halfmove_clock: u32,
    /// Fullmove number (1 when the field is omitted).
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    ///
    /// The two clock fields are optional; perft suites commonly omit them.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let board = Self::parse_piece_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = parts[2];
        Self::validate_castling(castling)?;

        let en_passant = Self::parse_en_passant(parts[3], side_to_move)?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            board,
            side_to_move,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_piece_placement(placement: &str) -> Result<[Option<Piece>; 64], FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = [None; 64];
        for (row, rank) in ranks.iter().enumerate() {
            let mut file = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file < 8 {
                        board[row * 8 + file] = Some(piece);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - row
                    )));
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - row,
                    file
                )));
            }
        }

        Ok(board)
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }

        for c in castling.chars() {
            if !"KQkq".contains(c) {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}'",
                    c
                )));
            }
        }

        Ok(())
    }

    /// The target sits behind a pawn the opponent just pushed two squares, so
    /// it is on rank 6 when white is to move and rank 3 when black is.
    fn parse_en_passant(ep: &str, side_to_move: Color) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        let expected = match side_to_move {
            Color::White => Rank::R6,
            Color::Black => Rank::R3,
        };
        match Square::from_algebraic(ep) {
            Some(sq) if sq.rank() == expected => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[row * 8 + file] {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.to_fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{}", empty)?;
            }
            if row < 7 {
                write!(f, "/")?;
            }
        }

        write!(f, " {} {} ", self.side_to_move.to_fen_char(), self.castling)?;
        match self.en_passant {
            Some(sq) => write!(f, "{}", sq)?,
            None => write!(f, "-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl Default for Fen {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.board[Square::A8.index() as usize], Some(Piece::BlackRook));
        assert_eq!(fen.board[Square::E1.index() as usize], Some(Piece::WhiteKing));
        assert_eq!(fen.board[Square::E4.index() as usize], None);
    }

    #[test]
    fn parse_without_clocks() {
        let fen =
            Fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -").unwrap();
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.board[Square::E5.index() as usize], Some(Piece::WhiteKnight));
    }

    #[test]
    fn parse_custom_position() {
        let fen = Fen::parse("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.halfmove_clock, 2);
        assert_eq!(fen.fullmove_number, 3);
    }

    #[test]
    fn roundtrip() {
        let original = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = Fen::parse(original).unwrap();
        assert_eq!(parsed.to_string(), original);
        assert_eq!(parsed.en_passant, Some(Square::E3));
    }

    #[test]
    fn invalid_fen() {
        assert!(matches!(
            Fen::parse("invalid"),
            Err(FenError::InvalidPartCount(1))
        ));

        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement_rank_count() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8 w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_piece_placement_invalid_char() {
        assert!(matches!(
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_piece_placement_wrong_squares() {
        assert!(matches!(
            Fen::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("7/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_castling_rights() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_en_passant() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - abc 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - x3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        // Only ranks 3 and 6 can hold an en passant target.
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - e4 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn en_passant_rank_must_match_side_to_move() {
        assert_eq!(
            Fen::parse("4k3/8/8/8/8/8/3P4/4K3 w - e3 0 1"),
            Err(FenError::InvalidEnPassantSquare("e3".to_string()))
        );
        assert_eq!(
            Fen::parse("4k3/3p4/8/8/8/8/8/4K3 b - e6 0 1"),
            Err(FenError::InvalidEnPassantSquare("e6".to_string()))
        );

        let white = Fen::parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(white.en_passant, Some(Square::D6));
        let black = Fen::parse("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        assert_eq!(black.en_passant, Some(Square::D3));
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn fen_default() {
        let fen = Fen::default();
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.to_string(), Fen::STARTPOS);
    }

    #[test]
    fn fen_error_display() {
        let err = FenError::InvalidPartCount(3);
        assert!(format!("{}", err).contains("3"));

        let err = FenError::InvalidEnPassantSquare("z9".to_string());
        assert!(format!("{}", err).contains("z9"));
    }
}
