//! Attack table generation and lookup for all piece types.

use super::magics::{MagicError, MagicNumbers, MagicSearchConfig, Slider, SliderTable};
use crate::Bitboard;
use chess_types::{Color, Square};
use std::sync::OnceLock;
use std::time::Instant;

/// Squares attacked by a pawn of `color` on `sq`.
pub const fn mask_pawn_attacks(color: Color, sq: Square) -> Bitboard {
    let b = Bitboard::from_square(sq);
    match color {
        Color::White => b.north_east().union(b.north_west()),
        Color::Black => b.south_east().union(b.south_west()),
    }
}

/// Squares attacked by a knight on `sq`.
pub const fn mask_knight_attacks(sq: Square) -> Bitboard {
    let b = 1u64 << sq.index();
    let mut attacks = 0u64;

    // Two ranks up or down, one file over.
    attacks |= (b >> 17) & Bitboard::NOT_H_FILE.0;
    attacks |= (b >> 15) & Bitboard::NOT_A_FILE.0;
    attacks |= (b << 15) & Bitboard::NOT_H_FILE.0;
    attacks |= (b << 17) & Bitboard::NOT_A_FILE.0;

    // One rank up or down, two files over.
    attacks |= (b >> 10) & Bitboard::NOT_GH_FILE.0;
    attacks |= (b >> 6) & Bitboard::NOT_AB_FILE.0;
    attacks |= (b << 6) & Bitboard::NOT_GH_FILE.0;
    attacks |= (b << 10) & Bitboard::NOT_AB_FILE.0;

    Bitboard(attacks)
}

/// Squares attacked by a king on `sq`.
pub const fn mask_king_attacks(sq: Square) -> Bitboard {
    let b = Bitboard::from_square(sq);
    let sideways = b.east().union(b.west());
    let row = b.union(sideways);
    sideways.union(row.north()).union(row.south())
}

/// Every precomputed attack table the move generator reads.
///
/// Built once and then only read, so a single instance can be shared by any
/// number of threads.
pub struct AttackTables {
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    bishop: SliderTable,
    rook: SliderTable,
    magics: MagicNumbers,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

impl AttackTables {
    /// Discovers magic numbers with `config` and builds every table.
    pub fn build(config: &MagicSearchConfig) -> Result<Self, MagicError> {
        let start = Instant::now();
        let magics = MagicNumbers::discover(config)?;
        tracing::info!(
            "Discovered 128 magic numbers in {:.2?} (seed {})",
            start.elapsed(),
            config.seed
        );
        Self::with_magics(magics)
    }

    /// Builds every table from known magic numbers.
    ///
    /// Each number is checked while its table is filled; a colliding one is
    /// reported as [`MagicError::Collision`].
    pub fn with_magics(magics: MagicNumbers) -> Result<Self, MagicError> {
        let start = Instant::now();

        let mut pawn = [[Bitboard::EMPTY; 64]; 2];
        let mut knight = [Bitboard::EMPTY; 64];
        let mut king = [Bitboard::EMPTY; 64];
        for sq in Square::all() {
            let i = sq.index() as usize;
            pawn[Color::White.index()][i] = mask_pawn_attacks(Color::White, sq);
            pawn[Color::Black.index()][i] = mask_pawn_attacks(Color::Black, sq);
            knight[i] = mask_knight_attacks(sq);
            king[i] = mask_king_attacks(sq);
        }

        let bishop = SliderTable::build(Slider::Bishop, &magics.bishop)?;
        let rook = SliderTable::build(Slider::Rook, &magics.rook)?;
        tracing::debug!("Filled attack tables in {:.2?}", start.elapsed());

        Ok(AttackTables {
            pawn,
            knight,
            king,
            bishop,
            rook,
            magics,
        })
    }

    /// Returns the process-wide tables, building them on first use with the
    /// default search configuration.
    ///
    /// # Panics
    ///
    /// Panics if the default magic search fails, which a correct table
    /// builder never does.
    pub fn shared() -> &'static AttackTables {
        ATTACK_TABLES.get_or_init(|| {
            AttackTables::build(&MagicSearchConfig::default())
                .expect("default magic search always succeeds")
        })
    }

    /// Returns the magic numbers these tables were built from.
    pub fn magics(&self) -> &MagicNumbers {
        &self.magics
    }

    /// Returns pawn attacks from the given square for the given color.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index() as usize]
    }

    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.index() as usize]
    }

    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.index() as usize]
    }

    /// Returns bishop attacks from `sq` given the board occupancy.
    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop.attacks(sq, occupancy)
    }

    /// Returns rook attacks from `sq` given the board occupancy.
    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.rook.attacks(sq, occupancy)
    }

    /// Returns queen attacks (bishop | rook) from `sq`.
    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupancy) | self.rook_attacks(sq, occupancy)
    }
}

impl std::fmt::Debug for AttackTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackTables").finish_non_exhaustive()
    }
}
