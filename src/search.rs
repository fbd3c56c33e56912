use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, error};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shakmaty::Color;

use crate::evaluation::evaluate;
use crate::oracle::{Move, RulesOracle};
use crate::ordering::order_moves;
use crate::policy::SearchParams;
use crate::tt::{TTFlag, TranspositionTable};
use crate::types::{DEFAULT_CACHE_MB, SCORE_INFINITY, SCORE_MATE, Score, SearchProgress};

pub type ProgressFn = Box<dyn FnMut(SearchProgress) + Send>;

/// Transient state for one "pick a move" invocation. Belongs exclusively to
/// that invocation — never shared between concurrent searches.
pub struct SearchSession {
    pub nodes: u64,
    start_time: Instant,
    time_budget: Duration,
    cancel: Arc<AtomicBool>,
    halted: bool,
    pub cache_enabled: bool,
    tt: TranspositionTable,
    rng: StdRng,
    progress: Option<ProgressFn>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::with_cancel(Arc::new(AtomicBool::new(false)))
    }

    /// Build a session around an externally owned cancellation flag.
    pub fn with_cancel(cancel: Arc<AtomicBool>) -> Self {
        Self {
            nodes: 0,
            start_time: Instant::now(),
            time_budget: Duration::ZERO,
            cancel,
            halted: false,
            cache_enabled: true,
            tt: TranspositionTable::new(DEFAULT_CACHE_MB),
            rng: StdRng::from_entropy(),
            progress: None,
        }
    }

    /// Deterministic random-move rolls, for tests and reproducible games.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn set_progress(&mut self, f: ProgressFn) {
        self.progress = Some(f);
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn begin(&mut self, budget: Duration) {
        self.nodes = 0;
        self.halted = false;
        self.start_time = Instant::now();
        self.time_budget = budget;
        // Conservative staleness guarantee: nothing survives across
        // invocations
        self.tt.clear();
    }

    fn check_time(&mut self) {
        if !self.time_budget.is_zero() && self.start_time.elapsed() >= self.time_budget {
            self.halted = true;
        }
    }

    fn stopped(&self) -> bool {
        self.halted || self.cancelled()
    }

    // Time check every 1024 nodes; the cancel flag is read every node
    fn tick(&mut self) {
        self.nodes += 1;
        if self.nodes & 1023 == 0 {
            self.check_time();
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterative-deepening alpha-beta driver.
///
/// Returns `None` only for a terminal position (no legal moves) or when the
/// session was cancelled. On timeout it degrades: last fully completed
/// depth first, then the 1-ply fallback — a non-terminal position always
/// yields a legal move.
pub fn find_best_move(
    oracle: &mut dyn RulesOracle,
    params: &SearchParams,
    session: &mut SearchSession,
) -> Option<Move> {
    session.begin(params.time_budget);

    let moves = oracle.legal_moves(None);
    if moves.is_empty() {
        // Terminal position; the caller branches on this, it is not an error
        return None;
    }
    if moves.len() == 1 {
        // Forced move: no search work at all
        return moves.into_iter().next();
    }

    // Weak-play dial: one roll per invocation, before any search work,
    // independent of depth
    if params.random_move_prob > 0.0
        && session.rng.gen_range(0.0..1.0) < params.random_move_prob
    {
        return moves.choose(&mut session.rng).cloned();
    }

    let maximizing = oracle.turn() == Color::White;
    let ordered = order_moves(moves, maximizing);

    let mut incumbent: Option<Move> = None;

    'deepening: for depth in 1..=params.max_depth.max(1) {
        let mut best_move: Option<Move> = None;
        let mut best_score: Score = if maximizing { -SCORE_INFINITY } else { SCORE_INFINITY };

        for mv in &ordered {
            session.check_time();
            if session.stopped() {
                break 'deepening;
            }

            if let Err(err) = oracle.apply(mv) {
                // The oracle produced this move itself; refusal means the
                // search's view of the position has diverged. Fatal to this
                // search, degrade below.
                error!("search aborted at depth {depth}: {err}");
                session.halted = true;
                break 'deepening;
            }
            let score = alpha_beta(
                oracle,
                session,
                depth - 1,
                -SCORE_INFINITY,
                SCORE_INFINITY,
                !maximizing,
            );
            oracle.undo();

            if session.stopped() {
                // Partial depth: not all moves were compared, discard it
                break 'deepening;
            }

            // Strict comparisons: the first-explored move wins ties, which
            // makes ordering quality the tie-break policy
            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv.clone());
                }
            } else if score < best_score {
                best_score = score;
                best_move = Some(mv.clone());
            }
        }

        if let Some(mv) = best_move {
            incumbent = Some(mv);
            let elapsed = session.start_time.elapsed();
            let nodes = session.nodes;
            debug!(
                "depth {depth} complete: best {} score {best_score} nodes {nodes} elapsed {elapsed:?}",
                incumbent.as_ref().map(|m| m.san.as_str()).unwrap_or("-"),
            );
            if let Some(cb) = session.progress.as_mut() {
                cb(SearchProgress {
                    depth,
                    best_move: incumbent.clone(),
                    score: best_score,
                    elapsed,
                    nodes,
                });
            }

            // A completed depth proving forced mate cannot be improved on
            if (maximizing && best_score >= SCORE_MATE)
                || (!maximizing && best_score <= -SCORE_MATE)
            {
                break;
            }
        }
    }

    if session.cancelled() {
        // Cancelled yields no move; the caller must not assume anything
        // changed
        return None;
    }

    incumbent.or_else(|| {
        // Budget expired before depth 1 ever completed
        debug!("no completed depth within budget, using 1-ply fallback");
        shallow_best_move(oracle, maximizing)
    })
}

/// Plain alpha-beta over the oracle's move tree, maximizing at White's turn
/// and minimizing at Black's, with the transposition cache consulted and
/// updated at every node.
fn alpha_beta(
    oracle: &mut dyn RulesOracle,
    session: &mut SearchSession,
    depth: u8,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
) -> Score {
    session.tick();
    if session.stopped() {
        return 0; // Result is discarded by the driver anyway
    }

    let key = oracle.fingerprint();
    let alpha0 = alpha;
    let beta0 = beta;

    if session.cache_enabled
        && let Some(entry) = session.tt.probe(key)
        && entry.depth >= depth
    {
        match entry.flag {
            TTFlag::Exact => return entry.score,
            TTFlag::LowerBound => alpha = alpha.max(entry.score),
            TTFlag::UpperBound => beta = beta.min(entry.score),
        }
        if alpha >= beta {
            return entry.score;
        }
    }

    if depth == 0 || oracle.is_game_over() {
        let score = evaluate(oracle);
        if session.cache_enabled {
            session.tt.store(key, 0, score, TTFlag::Exact, None);
        }
        return score;
    }

    let moves = order_moves(oracle.legal_moves(None), maximizing);

    let mut best_score: Score = if maximizing { -SCORE_INFINITY } else { SCORE_INFINITY };
    let mut best_move: Option<Move> = None;

    for mv in &moves {
        if let Err(err) = oracle.apply(mv) {
            error!("apply/undo invariant violated: {err}");
            session.halted = true;
            return best_score;
        }
        let score = alpha_beta(oracle, session, depth - 1, alpha, beta, !maximizing);
        oracle.undo();

        if session.stopped() {
            return best_score;
        }

        if maximizing {
            if score > best_score {
                best_score = score;
                best_move = Some(mv.clone());
            }
            alpha = alpha.max(score);
        } else {
            if score < best_score {
                best_score = score;
                best_move = Some(mv.clone());
            }
            beta = beta.min(score);
        }

        if beta <= alpha {
            break; // Sibling bound proves this node cannot matter
        }
    }

    if session.cache_enabled {
        let flag = if best_score <= alpha0 {
            TTFlag::UpperBound
        } else if best_score >= beta0 {
            TTFlag::LowerBound
        } else {
            TTFlag::Exact
        };
        session.tt.store(key, depth, best_score, flag, best_move);
    }

    best_score
}

/// 1-ply fallback: evaluate every legal move once, no recursion. Used when
/// the main search cannot produce a result in time, so the caller still
/// gets a legal move on a non-terminal position.
pub fn shallow_best_move(oracle: &mut dyn RulesOracle, maximizing: bool) -> Option<Move> {
    let moves = oracle.legal_moves(None);
    let mut best: Option<(Score, Move)> = None;

    for mv in moves {
        if oracle.apply(&mv).is_err() {
            continue;
        }
        let score = evaluate(oracle);
        oracle.undo();

        let better = match &best {
            None => true,
            Some((b, _)) => {
                if maximizing {
                    score > *b
                } else {
                    score < *b
                }
            }
        };
        if better {
            best = Some((score, mv));
        }
    }

    best.map(|(_, mv)| mv)
}


// One synchronous core algorithm, invoked inline or from a worker thread by
// the execution context; there are no parallel implementations to keep in
// sync. Scores are White-positive throughout, so the recursion alternates
// maximizing/minimizing instead of negating (this matches the evaluator's
// fixed sign convention and keeps cached scores side-independent).
