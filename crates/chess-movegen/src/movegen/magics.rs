//! Magic bitboard tables for sliding piece attack generation.
//!
//! Magic bitboards use a perfect hashing technique to map blocker configurations
//! to precomputed attack bitboards in O(1) time. The magic numbers themselves
//! are discovered by trial: random sparse candidates are tested against every
//! occupancy subset of a square's relevant mask until one hashes them without
//! a harmful collision.

use crate::Bitboard;
use chess_types::Square;
use std::fmt;
use thiserror::Error;

/// Attack table slots reserved per rook square (2^12).
pub const ROOK_TABLE_SIZE: usize = 4096;

/// Attack table slots reserved per bishop square (2^9).
pub const BISHOP_TABLE_SIZE: usize = 512;

/// The two sliding move patterns. Queens combine both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Slider::Bishop => [(1, 1), (1, -1), (-1, 1), (-1, -1)],
            Slider::Rook => [(1, 0), (-1, 0), (0, 1), (0, -1)],
        }
    }

    /// Slots reserved per square in this slider's attack table.
    pub const fn table_size(self) -> usize {
        match self {
            Slider::Bishop => BISHOP_TABLE_SIZE,
            Slider::Rook => ROOK_TABLE_SIZE,
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slider::Bishop => write!(f, "bishop"),
            Slider::Rook => write!(f, "rook"),
        }
    }
}

/// Errors raised while discovering magic numbers or filling attack tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MagicError {
    /// No collision-free candidate turned up within the attempt budget.
    #[error("no {slider} magic number found for {square} after {attempts} attempts")]
    SearchExhausted {
        slider: Slider,
        square: Square,
        attempts: u64,
    },

    /// The xorshift state would stay zero forever and never yield a candidate.
    #[error("magic search seed must be non-zero")]
    ZeroSeed,

    /// A supplied magic number maps two different attack sets to one slot.
    #[error("{slider} magic number for {square} is not collision-free")]
    Collision { slider: Slider, square: Square },
}

/// Parameters for the magic number search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicSearchConfig {
    /// Initial xorshift state. Zero is rejected with [`MagicError::ZeroSeed`].
    pub seed: u32,
    /// Candidates tried per square before giving up.
    pub max_attempts: u64,
}

impl Default for MagicSearchConfig {
    fn default() -> Self {
        MagicSearchConfig {
            seed: 1_804_289_383,
            max_attempts: 100_000_000,
        }
    }
}

/// Deterministic 32-bit xorshift generator feeding the magic search.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub const fn new(seed: u32) -> Self {
        XorShift32 { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Assembles a 64-bit value from the low 16 bits of four draws.
    pub fn next_u64(&mut self) -> u64 {
        let n1 = u64::from(self.next_u32() & 0xFFFF);
        let n2 = u64::from(self.next_u32() & 0xFFFF);
        let n3 = u64::from(self.next_u32() & 0xFFFF);
        let n4 = u64::from(self.next_u32() & 0xFFFF);
        n1 | (n2 << 16) | (n3 << 32) | (n4 << 48)
    }

    /// A sparse candidate: the AND of three draws.
    pub fn next_magic_candidate(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }
}

/// Returns the squares whose occupancy can change a slider's attacks from `sq`.
///
/// Each ray stops one short of the board edge: an edge square ends the ray
/// whether or not it is occupied, so it never needs its own index bit.
pub fn relevant_occupancy_mask(sq: Square, slider: Slider) -> Bitboard {
    let mut mask = 0u64;
    let row = (sq.index() / 8) as i8;
    let file = (sq.index() % 8) as i8;

    for (dr, df) in slider.directions() {
        let mut r = row + dr;
        let mut f = file + df;
        loop {
            let next_r = r + dr;
            let next_f = f + df;
            if !(0..8).contains(&r) || !(0..8).contains(&f) {
                break;
            }
            if !(0..8).contains(&next_r) || !(0..8).contains(&next_f) {
                break;
            }
            mask |= 1u64 << (r * 8 + f);
            r = next_r;
            f = next_f;
        }
    }

    Bitboard(mask)
}

/// Slow ray walk used to build tables: each ray includes the first blocker
/// it meets and stops there.
pub fn attacks_on_the_fly(sq: Square, slider: Slider, occupancy: Bitboard) -> Bitboard {
    let mut attacks = 0u64;
    let row = (sq.index() / 8) as i8;
    let file = (sq.index() % 8) as i8;

    for (dr, df) in slider.directions() {
        let mut r = row + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupancy.0 & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }

    Bitboard(attacks)
}

/// Maps `index` to an occupancy subset of `mask`.
///
/// Bit `k` of `index` decides whether the k-th lowest square of `mask` is
/// occupied, so `0..2^bits` enumerates every subset exactly once.
pub fn set_occupancy(index: usize, bits: u32, mask: Bitboard) -> Bitboard {
    let mut occupancy = Bitboard::EMPTY;
    let mut remaining = mask;

    for count in 0..bits {
        let Some(sq) = remaining.pop_lsb() else {
            break;
        };
        if index & (1 << count) != 0 {
            occupancy.set(sq);
        }
    }

    occupancy
}

#[inline]
fn magic_index(occupancy: Bitboard, magic: u64, bits: u32) -> usize {
    (occupancy.0.wrapping_mul(magic) >> (64 - bits)) as usize
}

/// Searches for a magic number for `slider` on `sq`.
///
/// Two subsets may share a slot only when their attack sets are identical.
/// Slider attacks are never empty on an 8x8 board, so an empty slot marks it
/// as unused.
pub fn find_magic_number(
    sq: Square,
    slider: Slider,
    rng: &mut XorShift32,
    max_attempts: u64,
) -> Result<u64, MagicError> {
    let mask = relevant_occupancy_mask(sq, slider);
    let bits = mask.count();
    let size = 1usize << bits;

    let occupancies: Vec<Bitboard> = (0..size).map(|i| set_occupancy(i, bits, mask)).collect();
    let attacks: Vec<Bitboard> = occupancies
        .iter()
        .map(|&occ| attacks_on_the_fly(sq, slider, occ))
        .collect();
    let mut used = vec![Bitboard::EMPTY; size];

    for attempt in 0..max_attempts {
        let magic = rng.next_magic_candidate();

        // Too few high bits rarely spreads the index well.
        if (mask.0.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        used.fill(Bitboard::EMPTY);
        let collision_free = occupancies.iter().zip(&attacks).all(|(&occ, &attack)| {
            let slot = &mut used[magic_index(occ, magic, bits)];
            if slot.is_empty() {
                *slot = attack;
                true
            } else {
                *slot == attack
            }
        });

        if collision_free {
            tracing::debug!(
                "{} magic for {} found after {} attempts: {:#018x}",
                slider,
                sq,
                attempt + 1,
                magic
            );
            return Ok(magic);
        }
    }

    tracing::error!(
        "{} magic search for {} exhausted after {} attempts",
        slider,
        sq,
        max_attempts
    );
    Err(MagicError::SearchExhausted {
        slider,
        square: sq,
        attempts: max_attempts,
    })
}

/// One magic number per square for each slider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicNumbers {
    pub bishop: [u64; 64],
    pub rook: [u64; 64],
}

impl MagicNumbers {
    /// Discovers all 128 magic numbers from one random stream, rooks first.
    pub fn discover(config: &MagicSearchConfig) -> Result<Self, MagicError> {
        if config.seed == 0 {
            tracing::error!("Refusing to search for magic numbers with a zero seed");
            return Err(MagicError::ZeroSeed);
        }
        let mut rng = XorShift32::new(config.seed);
        let mut rook = [0u64; 64];
        let mut bishop = [0u64; 64];

        for sq in Square::all() {
            rook[sq.index() as usize] =
                find_magic_number(sq, Slider::Rook, &mut rng, config.max_attempts)?;
        }
        for sq in Square::all() {
            bishop[sq.index() as usize] =
                find_magic_number(sq, Slider::Bishop, &mut rng, config.max_attempts)?;
        }

        Ok(MagicNumbers { bishop, rook })
    }

    /// Returns the numbers for one slider.
    pub fn for_slider(&self, slider: Slider) -> &[u64; 64] {
        match slider {
            Slider::Bishop => &self.bishop,
            Slider::Rook => &self.rook,
        }
    }
}

/// Magic entry for a single square.
#[derive(Debug, Clone, Copy, Default)]
pub struct Magic {
    /// Mask of relevant blocker squares (excludes edges).
    pub mask: Bitboard,
    /// The magic number for this square.
    pub magic: u64,
    /// Right shift amount (64 - number of bits in mask).
    pub shift: u8,
    /// Offset of this square's slots in the attack table.
    pub offset: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occupancy: Bitboard) -> usize {
        let relevant = occupancy & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Attack lookup table for one slider.
pub struct SliderTable {
    magics: [Magic; 64],
    attacks: Box<[Bitboard]>,
}

impl SliderTable {
    /// Fills a table for every occupancy subset of every square.
    ///
    /// Fails with [`MagicError::Collision`] if a supplied magic number hashes
    /// two different attack sets to the same slot; nothing partially built
    /// escapes in that case.
    pub fn build(slider: Slider, numbers: &[u64; 64]) -> Result<Self, MagicError> {
        let size = slider.table_size();
        let mut magics = [Magic::default(); 64];
        let mut attacks = vec![Bitboard::EMPTY; 64 * size].into_boxed_slice();

        for sq in Square::all() {
            let mask = relevant_occupancy_mask(sq, slider);
            let bits = mask.count();
            let entry = Magic {
                mask,
                magic: numbers[sq.index() as usize],
                shift: (64 - bits) as u8,
                offset: sq.index() as usize * size,
            };

            for index in 0..(1usize << bits) {
                let occupancy = set_occupancy(index, bits, mask);
                let attack = attacks_on_the_fly(sq, slider, occupancy);
                let slot = &mut attacks[entry.index(occupancy)];
                if slot.is_empty() {
                    *slot = attack;
                } else if *slot != attack {
                    tracing::error!("{} magic number for {} collides", slider, sq);
                    return Err(MagicError::Collision { slider, square: sq });
                }
            }

            magics[sq.index() as usize] = entry;
        }

        Ok(SliderTable { magics, attacks })
    }

    /// Looks up the attacks from `sq` given the full board occupancy.
    #[inline]
    pub fn attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.attacks[self.magics[sq.index() as usize].index(occupancy)]
    }

}
