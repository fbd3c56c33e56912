use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use pyrite::ordering::order_moves;
use pyrite::{RulesOracle, SearchParams, SearchSession, ShakmatyOracle, find_best_move};

fn depth_params(depth: u8) -> SearchParams {
    SearchParams {
        max_depth: depth,
        time_budget: Duration::ZERO,
        random_move_prob: 0.0,
    }
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("search_depth_2_startpos", |b| {
        b.iter(|| {
            let mut oracle = ShakmatyOracle::new();
            let mut session = SearchSession::new();
            find_best_move(&mut oracle, &depth_params(2), &mut session)
        })
    });

    let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    c.bench_function("search_depth_2_kiwipete", |b| {
        b.iter(|| {
            let mut oracle = ShakmatyOracle::from_fen(kiwipete).unwrap();
            let mut session = SearchSession::new();
            find_best_move(&mut oracle, &depth_params(2), &mut session)
        })
    });

    c.bench_function("search_depth_3_startpos", |b| {
        b.iter(|| {
            let mut oracle = ShakmatyOracle::new();
            let mut session = SearchSession::new();
            find_best_move(&mut oracle, &depth_params(3), &mut session)
        })
    });
}

fn bench_ordering(c: &mut Criterion) {
    let startpos = ShakmatyOracle::new();
    c.bench_function("order_moves_startpos", |b| {
        b.iter(|| order_moves(startpos.legal_moves(None), true))
    });

    let kiwipete = ShakmatyOracle::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    c.bench_function("order_moves_kiwipete", |b| {
        b.iter(|| order_moves(kiwipete.legal_moves(None), true))
    });
}

criterion_group!(benches, bench_search, bench_ordering);
criterion_main!(benches);
