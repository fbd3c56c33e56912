use arrayvec::ArrayVec;

use crate::evaluation::piece_value;
use crate::oracle::Move;
use crate::pst::CENTER_SQUARES;
use crate::types::Score;

/// Heuristic rank of a single move:
/// MVV-LVA for captures (take the big piece with the small piece), a flat
/// bonus for checks, the promoted piece's value for promotions, and a small
/// bonus for landing on a central square.
pub fn rate_move(mv: &Move) -> Score {
    let mut score: Score = 0;

    if let Some(victim) = mv.captured {
        score += 10 * piece_value(victim) - piece_value(mv.role);
    }
    if mv.gives_check {
        score += 50;
    }
    if let Some(promo) = mv.promotion {
        score += piece_value(promo);
    }
    if CENTER_SQUARES.contains(&mv.to) {
        score += 5;
    }

    score
}

/// Orders moves so alpha-beta explores the most promising first: descending
/// by heuristic for the maximizing side, ascending for the minimizing side.
///
/// Performance heuristic only — it must never change which move the search
/// picks, except through the documented first-among-equals tie-break. The
/// sort is stable so equal-scoring moves keep the oracle's order.
pub fn order_moves(moves: Vec<Move>, maximizing: bool) -> Vec<Move> {
    let mut scored: ArrayVec<(Score, Move), 256> = ArrayVec::new();
    for mv in moves {
        let score = rate_move(&mv);
        scored.push((score, mv));
    }

    if maximizing {
        scored.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        scored.sort_by(|a, b| a.0.cmp(&b.0));
    }

    scored.into_iter().map(|(_, mv)| mv).collect()
}
