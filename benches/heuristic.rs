use bot_2048::engine::{self as GameEngine, Board, Move};
use bot_2048::expectimax::{base_score, enhanced_score, Weights};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(1337);
    let mut boards = vec![Board::EMPTY];
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    let seq = [Move::Down, Move::Right, Move::Down, Move::Left];
    for i in 0..48 {
        let out = b.apply(seq[i % seq.len()]);
        if out.moved { b = out.board.with_random_tile(&mut rng); }
        boards.push(b);
    }
    boards
}

fn bench_heuristic(c: &mut Criterion) {
    GameEngine::new();
    let boards = corpus();
    let w = Weights::default();
    c.bench_function("heuristic/base", |bch| {
        bch.iter(|| {
            let mut acc = 0f64;
            for &bd in &boards { acc += base_score(bd, &w); }
            black_box(acc)
        })
    });
    c.bench_function("heuristic/enhanced", |bch| {
        bch.iter(|| {
            let mut acc = 0f64;
            for &bd in &boards { acc += enhanced_score(bd, &w); }
            black_box(acc)
        })
    });
}

criterion_group!(heuristic, bench_heuristic);
criterion_main!(heuristic);
