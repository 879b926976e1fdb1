//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.

use super::{generate_moves, make_move, AttackTables};
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
///
/// `position` is the same on return as on entry.
pub fn perft(position: &mut Position, tables: &AttackTables, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position, tables);
    let mut nodes = 0u64;

    for &m in &moves {
        let snapshot = *position;
        if make_move(position, tables, m) {
            nodes += perft(position, tables, depth - 1);
        }
        *position = snapshot;
    }

    nodes
}

/// Perft with divide: node count below each legal root move, sorted by UCI.
/// Useful for debugging to identify which moves have incorrect counts.
///
/// Depth 0 is treated as depth 1.
pub fn perft_divide(position: &mut Position, tables: &AttackTables, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(position, tables);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        let snapshot = *position;
        if make_move(position, tables, m) {
            let nodes = perft(position, tables, depth.saturating_sub(1));
            results.push((m.to_uci(), nodes));
        }
        *position = snapshot;
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

/// Perft with the root moves split across `threads` scoped workers.
///
/// Each worker walks its share from a private copy of `position`; the tables
/// are only read. Returns the same count as [`perft`].
pub fn perft_parallel(position: &Position, tables: &AttackTables, depth: u32, threads: usize) -> u64 {
    if depth <= 1 || threads <= 1 {
        let mut position = *position;
        return perft(&mut position, tables, depth);
    }

    let moves = generate_moves(position, tables);
    if moves.is_empty() {
        return 0;
    }
    let chunk_size = moves.len().div_ceil(threads);

    std::thread::scope(|scope| {
        let workers: Vec<_> = moves
            .as_slice()
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut worker_position = *position;
                    let mut nodes = 0u64;
                    for &m in chunk {
                        let snapshot = worker_position;
                        if make_move(&mut worker_position, tables, m) {
                            nodes += perft(&mut worker_position, tables, depth - 1);
                        }
                        worker_position = snapshot;
                    }
                    nodes
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| {
                worker
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .sum()
    })
}
