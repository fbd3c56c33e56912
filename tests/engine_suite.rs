//! End-to-end suite: whole-engine properties that span the oracle, the
//! evaluator, the search and the execution context.

use std::sync::atomic::Ordering;
use std::time::Duration;

use pyrite::{
    Difficulty, Engine, RulesOracle, SearchOutcome, SearchParams, SearchSession, ShakmatyOracle,
    find_best_move,
};

fn depth_params(depth: u8) -> SearchParams {
    SearchParams {
        max_depth: depth,
        time_budget: Duration::ZERO,
        random_move_prob: 0.0,
    }
}

fn legal_ucis(oracle: &ShakmatyOracle) -> Vec<String> {
    oracle.legal_moves(None).iter().map(|m| m.uci()).collect()
}

/// Flip a FEN vertically and swap colors. Only valid for positions without
/// castling rights or an en passant square.
fn mirror_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    assert_eq!(fields[2], "-", "mirror_fen: castling rights not supported");
    assert_eq!(fields[3], "-", "mirror_fen: en passant square not supported");

    let board: String = fields[0]
        .split('/')
        .rev()
        .collect::<Vec<_>>()
        .join("/")
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();
    let side = if fields[1] == "w" { "b" } else { "w" };

    format!("{} {} - - {} {}", board, side, fields[4], fields[5])
}

#[test]
fn test_evaluation_antisymmetric_under_color_mirror() {
    let fens = [
        "r4rk1/ppp2ppp/2n2n2/2bpp3/4P3/2NP1N2/PPP2PPP/R1B2RK1 w - - 0 9",
        "8/5k2/8/3q4/8/2K5/4R3/8 w - - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ];
    for fen in fens {
        let original = ShakmatyOracle::from_fen(fen).unwrap();
        let mirrored = ShakmatyOracle::from_fen(&mirror_fen(fen)).unwrap();
        assert_eq!(
            pyrite::evaluation::evaluate(&original),
            -pyrite::evaluation::evaluate(&mirrored),
            "mirror of {fen} must negate the score"
        );
    }
}

#[test]
fn test_cache_never_changes_the_selected_move() {
    // Positions with a clear best answer, searched with the transposition
    // cache on and off
    let fens = [
        // Mate in one
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        // Hanging queen
        "k7/8/8/3q4/4P3/8/8/K7 w - - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ];
    for fen in fens {
        let mut with_cache = ShakmatyOracle::from_fen(fen).unwrap();
        let mut without_cache = ShakmatyOracle::from_fen(fen).unwrap();

        let mut cached = SearchSession::new();
        let mut uncached = SearchSession::new();
        uncached.cache_enabled = false;

        let a = find_best_move(&mut with_cache, &depth_params(3), &mut cached);
        let b = find_best_move(&mut without_cache, &depth_params(3), &mut uncached);
        assert_eq!(
            a.map(|m| m.uci()),
            b.map(|m| m.uci()),
            "cache changed the move in {fen}"
        );
    }
}

#[test]
fn test_forced_move_answered_without_searching() {
    let mut oracle = ShakmatyOracle::from_fen("6Qk/8/8/8/8/8/8/K7 b - - 0 1").unwrap();
    let mut session = SearchSession::new();
    let mv = find_best_move(&mut oracle, &depth_params(5), &mut session).unwrap();
    assert_eq!(mv.uci(), "h8g8");
    assert_eq!(session.nodes, 0);
}

#[test]
fn test_terminal_positions_yield_no_move() {
    // Fool's mate (checkmate) and a stalemate
    let fens = [
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
    ];
    for fen in fens {
        let mut oracle = ShakmatyOracle::from_fen(fen).unwrap();
        let mut session = SearchSession::new();
        assert!(
            find_best_move(&mut oracle, &depth_params(3), &mut session).is_none(),
            "terminal position {fen} must yield no move"
        );

        let mut engine = Engine::new(Difficulty::Medium);
        let mut oracle = ShakmatyOracle::from_fen(fen).unwrap();
        assert_eq!(engine.select_move(&mut oracle), SearchOutcome::NoLegalMoves);
    }
}

#[test]
fn test_cancellation_leaves_position_untouched() {
    let mut oracle = ShakmatyOracle::new();
    let before = oracle.fingerprint();
    let fen_before = oracle.fen();

    let mut session = SearchSession::new();
    session.cancel_flag().store(true, Ordering::SeqCst);
    let mv = find_best_move(&mut oracle, &depth_params(5), &mut session);

    assert!(mv.is_none());
    assert_eq!(oracle.fingerprint(), before);
    assert_eq!(oracle.fen(), fen_before);
}

#[test]
fn test_expired_budget_still_produces_a_legal_move() {
    let mut oracle = ShakmatyOracle::new();
    let mut session = SearchSession::new();
    let params = SearchParams {
        max_depth: 20,
        time_budget: Duration::from_millis(1),
        random_move_prob: 0.0,
    };
    let mv = find_best_move(&mut oracle, &params, &mut session)
        .expect("non-terminal position must always get a move");
    assert!(legal_ucis(&oracle).contains(&mv.uci()));
}

#[test]
fn test_opening_move_is_not_a_rim_move() {
    // Depth 1 makes the choice a direct read of the positional tables:
    // center pushes and knight development must beat rook-pawn moves
    let mut oracle = ShakmatyOracle::new();
    let mut session = SearchSession::new();
    let mv = find_best_move(&mut oracle, &depth_params(1), &mut session).unwrap();

    let rim = ["a2a3", "a2a4", "h2h3", "h2h4", "b1a3", "g1h3"];
    assert!(
        !rim.contains(&mv.uci().as_str()),
        "opening search picked rim move {}",
        mv
    );
}

#[test]
fn test_spare_time_budget_does_not_change_the_result() {
    // A depth that completes is deterministic; extra wall clock must not
    // alter the selected move
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
    let mut tight = ShakmatyOracle::from_fen(fen).unwrap();
    let mut roomy = ShakmatyOracle::from_fen(fen).unwrap();

    let a = find_best_move(&mut tight, &depth_params(2), &mut SearchSession::new());
    let generous = SearchParams {
        max_depth: 2,
        time_budget: Duration::from_secs(60),
        random_move_prob: 0.0,
    };
    let b = find_best_move(&mut roomy, &generous, &mut SearchSession::new());
    assert_eq!(a.map(|m| m.uci()), b.map(|m| m.uci()));
}

#[test]
fn test_every_tier_selects_a_legal_move() {
    // Midgame position; budgets cap the deeper tiers
    let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 6 5";
    for difficulty in Difficulty::ALL {
        let mut engine = Engine::with_seed(difficulty, 11);
        let mut oracle = ShakmatyOracle::from_fen(fen).unwrap();
        match engine.select_move(&mut oracle) {
            SearchOutcome::Move(mv) => assert!(
                legal_ucis(&oracle).contains(&mv.uci()),
                "{difficulty} selected illegal move {}",
                mv
            ),
            other => panic!("{difficulty} returned {other:?} on a live position"),
        }
    }
}

#[test]
fn test_background_selection_round_trip() {
    let mut engine = Engine::new(Difficulty::Easy);
    let mut game = ShakmatyOracle::new();

    // Engine answers two consecutive positions from snapshots
    for _ in 0..2 {
        let handle = engine.start(Box::new(game.clone()));
        let mv = match handle.wait() {
            SearchOutcome::Move(mv) => mv,
            other => panic!("expected a move, got {other:?}"),
        };
        game.apply(&mv).expect("selected move must be legal");
    }
}

/// Full games are slow; run with `cargo test -- --ignored` when touching the
/// difficulty calibration.
#[test]
#[ignore]
fn test_hard_outscores_beginner_over_a_match() {
    fn play_game(white: &mut Engine, black: &mut Engine) -> f64 {
        let mut game = ShakmatyOracle::new();
        for ply in 0..160 {
            let engine = if ply % 2 == 0 { &mut *white } else { &mut *black };
            match engine.select_move(&mut game) {
                SearchOutcome::Move(mv) => {
                    game.apply(&mv).expect("selected move must be legal")
                }
                SearchOutcome::NoLegalMoves => break,
                SearchOutcome::Cancelled => panic!("nothing cancels in this match"),
            }
        }
        if game.is_checkmate() {
            // The side to move is the loser
            if game.turn() == shakmaty::Color::White {
                0.0
            } else {
                1.0
            }
        } else {
            0.5
        }
    }

    let mut hard_points = 0.0;
    let mut beginner_points = 0.0;
    for round in 0..4 {
        let mut hard = Engine::with_seed(Difficulty::Hard, round);
        let mut beginner = Engine::with_seed(Difficulty::Beginner, round + 100);
        if round % 2 == 0 {
            let w = play_game(&mut hard, &mut beginner);
            hard_points += w;
            beginner_points += 1.0 - w;
        } else {
            let w = play_game(&mut beginner, &mut hard);
            beginner_points += w;
            hard_points += 1.0 - w;
        }
    }

    assert!(
        hard_points > beginner_points,
        "hard scored {hard_points} vs beginner {beginner_points}"
    );
}
