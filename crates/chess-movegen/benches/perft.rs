use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chess_movegen::{generate_moves, perft, AttackTables, MagicSearchConfig, Position};
use chess_types::Fen;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    expected_nodes: &'static [u64],
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: Fen::STARTPOS,
        expected_nodes: &[20, 400, 8902, 197_281],
    },
    BenchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        expected_nodes: &[48, 2039, 97_862],
    },
    BenchCase {
        name: "position_3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        expected_nodes: &[14, 191, 2812, 43_238],
    },
];

fn bench_perft(c: &mut Criterion) {
    let tables = AttackTables::shared();

    let mut group = c.benchmark_group("perft");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    for case in CASES {
        let position = Position::from_fen(case.fen).expect("benchmark FEN should parse");

        for (depth_idx, expected_nodes) in case.expected_nodes.iter().enumerate() {
            let depth = (depth_idx + 1) as u32;

            // Correctness guard before benchmarking.
            let mut warmup = position;
            assert_eq!(
                perft(&mut warmup, tables, depth),
                *expected_nodes,
                "node mismatch in warmup for {} depth {}",
                case.name,
                depth
            );

            group.throughput(Throughput::Elements(*expected_nodes));
            group.bench_with_input(
                BenchmarkId::new(case.name, format!("d{depth}")),
                expected_nodes,
                |b, expected| {
                    b.iter(|| {
                        let mut bench_position = position;
                        let nodes = perft(black_box(&mut bench_position), tables, black_box(depth));
                        assert_eq!(nodes, *expected);
                        black_box(nodes)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_generate_moves(c: &mut Criterion) {
    let tables = AttackTables::shared();
    let position = Position::from_fen(CASES[1].fen).expect("benchmark FEN should parse");

    c.bench_function("generate_moves_kiwipete", |b| {
        b.iter(|| black_box(generate_moves(black_box(&position), tables).len()))
    });
}

fn bench_table_build(c: &mut Criterion) {
    let magics = AttackTables::shared().magics().clone();

    let mut group = c.benchmark_group("attack_tables");
    group.sample_size(10);
    group.bench_function("with_known_magics", |b| {
        b.iter(|| AttackTables::with_magics(black_box(magics.clone())).expect("known magics"))
    });
    group.bench_function("discover_and_build", |b| {
        b.iter(|| AttackTables::build(black_box(&MagicSearchConfig::default())).expect("default"))
    });
    group.finish();
}

criterion_group!(benches, bench_perft, bench_generate_moves, bench_table_build);
criterion_main!(benches);
