use thiserror::Error;

/// Errors surfaced by the engine core.
///
/// Absence of a move is never an error here: a terminal position reports
/// `None`/`SearchOutcome::NoLegalMoves`, timeout degrades to the best
/// completed depth, and cancellation resolves to `SearchOutcome::Cancelled`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The oracle refused a move the search tried to apply. The search only
    /// ever applies moves the oracle itself produced, so this is an internal
    /// invariant violation; the running search halts and degrades to the
    /// shallow fallback.
    #[error("oracle rejected move {san}: not legal in the current position")]
    IllegalMove { san: String },

    /// Bad FEN or an unreachable position at oracle construction.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("unknown difficulty tier: {0}")]
    UnknownDifficulty(String),
}
