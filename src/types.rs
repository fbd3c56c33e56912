use std::time::Duration;

use crate::oracle::Move;

pub type Score = i32;

pub const SCORE_INFINITY: Score = 30_000;
pub const SCORE_MATE: Score = 29_000;
/// Static evaluation is clamped to this bound so material + positional +
/// mobility sums can never drift into the mate range.
pub const SCORE_EVAL_MAX: Score = 28_000;

pub const DEFAULT_CACHE_MB: usize = 16;

/// Emitted once per fully completed deepening iteration. Observation only;
/// consumers must never feed this back into the search.
#[derive(Clone, Debug)]
pub struct SearchProgress {
    pub depth: u8,
    pub best_move: Option<Move>,
    pub score: Score,
    pub elapsed: Duration,
    pub nodes: u64,
}
