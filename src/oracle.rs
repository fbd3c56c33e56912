use std::fmt;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Piece, Position, Role, Square};

use crate::error::EngineError;

/// A single ply, as produced by the rules oracle.
///
/// The search core never constructs these itself; it only ranks and selects
/// among the moves the oracle returned for the current position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    /// Destination square. For castling this is the rook's square (the
    /// king-takes-rook encoding); [`uci`](Self::uci) renders the king path.
    pub to: Square,
    pub role: Role,
    pub promotion: Option<Role>,
    pub captured: Option<Role>,
    pub gives_check: bool,
    pub san: String,
    inner: shakmaty::Move,
}

impl Move {
    pub(crate) fn inner(&self) -> &shakmaty::Move {
        &self.inner
    }

    /// Long algebraic form, e.g. "e2e4" or "a7a8q". Castling renders as the
    /// king's path ("e1g1"), not the internal king-takes-rook encoding.
    pub fn uci(&self) -> String {
        self.inner.to_uci(CastlingMode::Standard).to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.san)
    }
}

/// The move-legality oracle the search core is built against.
///
/// `shakmaty` satisfies this in production ([`ShakmatyOracle`]); tests may
/// substitute their own. Every `apply` must be paired with an `undo` on all
/// exit paths — the search relies on that to leave the position untouched
/// even when it aborts mid-branch.
pub trait RulesOracle {
    /// All legal moves, optionally filtered to one origin square.
    fn legal_moves(&self, from: Option<Square>) -> Vec<Move>;

    /// Mutates the position in place. Fails with [`EngineError::IllegalMove`]
    /// if the move is not legal in the current position.
    fn apply(&mut self, mv: &Move) -> Result<(), EngineError>;

    /// Reverts the most recent `apply`, returning the move that was undone.
    fn undo(&mut self) -> Option<Move>;

    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    /// Insufficient material, fifty-move rule, or threefold repetition.
    fn is_draw(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw()
    }

    fn turn(&self) -> Color;

    /// Canonical position key covering placement, side to move, castling
    /// rights and en passant. Identical logical positions hash identically;
    /// a board-only key would corrupt the transposition cache.
    fn fingerprint(&self) -> u64;

    /// Read-only board view for the evaluator.
    fn occupied(&self) -> Vec<(Square, Piece)>;
}

/// Production oracle: a `shakmaty` position plus an undo stack and a
/// fingerprint history for repetition detection.
#[derive(Clone, Debug)]
pub struct ShakmatyOracle {
    pos: Chess,
    undo_stack: Vec<(Chess, Move)>,
    history: Vec<u64>,
}

fn hash_of(pos: &Chess) -> u64 {
    let z: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
    z.0
}

impl ShakmatyOracle {
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    fn from_position(pos: Chess) -> Self {
        let fp = hash_of(&pos);
        Self {
            pos,
            undo_stack: Vec::new(),
            history: vec![fp],
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| EngineError::InvalidPosition(format!("{e}: {fen}")))?;
        let pos = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::InvalidPosition(e.to_string()))?;
        Ok(Self::from_position(pos))
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = self.fingerprint();
        self.history.iter().filter(|&&h| h == current).count() >= 3
    }
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesOracle for ShakmatyOracle {
    fn legal_moves(&self, from: Option<Square>) -> Vec<Move> {
        let mut out = Vec::new();
        for m in self.pos.legal_moves() {
            let Some(origin) = m.from() else { continue };
            if let Some(filter) = from {
                if origin != filter {
                    continue;
                }
            }
            let san = SanPlus::from_move(self.pos.clone(), &m).to_string();
            let mut next = self.pos.clone();
            next.play_unchecked(&m);
            out.push(Move {
                from: origin,
                to: m.to(),
                role: m.role(),
                promotion: m.promotion(),
                captured: m.capture(),
                gives_check: next.is_check(),
                san,
                inner: m,
            });
        }
        out
    }

    fn apply(&mut self, mv: &Move) -> Result<(), EngineError> {
        if !self.pos.is_legal(mv.inner()) {
            return Err(EngineError::IllegalMove {
                san: mv.san.clone(),
            });
        }
        self.undo_stack.push((self.pos.clone(), mv.clone()));
        self.pos.play_unchecked(mv.inner());
        self.history.push(hash_of(&self.pos));
        Ok(())
    }

    fn undo(&mut self) -> Option<Move> {
        let (prev, mv) = self.undo_stack.pop()?;
        self.pos = prev;
        self.history.pop();
        Some(mv)
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    fn is_draw(&self) -> bool {
        self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= 100
            || self.is_threefold_repetition()
    }

    fn turn(&self) -> Color {
        self.pos.turn()
    }

    fn fingerprint(&self) -> u64 {
        self.history.last().copied().unwrap_or_else(|| hash_of(&self.pos))
    }

    fn occupied(&self) -> Vec<(Square, Piece)> {
        let board = self.pos.board();
        board
            .occupied()
            .into_iter()
            .filter_map(|sq| board.piece_at(sq).map(|p| (sq, p)))
            .collect()
    }
}


// The undo stack stores full prior positions rather than reversing moves:
// shakmaty positions are a few hundred bytes and Copy-cheap, which keeps the
// apply/undo pairing trivially correct on every abort path. The fingerprint
// history doubles as the repetition detector (three occurrences of the same
// Zobrist key = draw).
