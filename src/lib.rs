//! Chess AI opponent core.
//!
//! Move legality is delegated to a pluggable rules oracle (production:
//! [`ShakmatyOracle`] over `shakmaty`); this crate layers on top of it a
//! White-positive static evaluator, heuristic move ordering, a per-selection
//! transposition cache, an iterative-deepening alpha-beta search, difficulty
//! tiers, and an execution context that runs selections on a worker thread
//! with cancellation.
//!
//! ```no_run
//! use pyrite::{Difficulty, Engine, SearchOutcome, ShakmatyOracle};
//!
//! let mut engine = Engine::new(Difficulty::Medium);
//! let handle = engine.start(Box::new(ShakmatyOracle::new()));
//! match handle.wait() {
//!     SearchOutcome::Move(mv) => println!("engine plays {mv}"),
//!     SearchOutcome::NoLegalMoves => println!("game over"),
//!     SearchOutcome::Cancelled => println!("selection cancelled"),
//! }
//! ```

pub mod context;
pub mod error;
pub mod evaluation;
pub mod oracle;
pub mod ordering;
pub mod policy;
pub mod pst;
pub mod search;
pub mod tt;
pub mod types;

pub use context::{Engine, SearchHandle, SearchOutcome};
pub use error::EngineError;
pub use oracle::{Move, RulesOracle, ShakmatyOracle};
pub use policy::{Difficulty, SearchParams};
pub use search::{ProgressFn, SearchSession, find_best_move};
pub use types::{Score, SearchProgress};
