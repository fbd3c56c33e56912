use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::oracle::{Move, RulesOracle};
use crate::policy::{Difficulty, SearchParams};
use crate::search::{ProgressFn, SearchSession, find_best_move};

/// Result of one move selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A legal move for the side to move in the searched position.
    Move(Move),
    /// The position was terminal: checkmate, stalemate, or a dead draw.
    NoLegalMoves,
    /// The selection was cancelled before it produced a result. The caller
    /// must treat the game state as untouched.
    Cancelled,
}

impl SearchOutcome {
    pub fn into_move(self) -> Option<Move> {
        match self {
            SearchOutcome::Move(mv) => Some(mv),
            _ => None,
        }
    }
}

/// Everything a worker needs to run one selection, bundled so ownership can
/// be handed back if the thread never starts.
struct Job {
    snapshot: Box<dyn RulesOracle + Send>,
    params: SearchParams,
    session: SearchSession,
}

impl Job {
    fn run(mut self) -> SearchOutcome {
        run_search(self.snapshot.as_mut(), &self.params, &mut self.session)
    }
}

/// Handle to an in-flight (or already finished) move selection.
///
/// Dropping the handle without calling [`wait`](Self::wait) detaches the
/// worker; it finishes on its own and the outcome is discarded.
pub struct SearchHandle {
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<SearchOutcome>>,
    inline: Option<SearchOutcome>,
}

impl SearchHandle {
    /// Request cancellation. Idempotent; the worker observes the flag at its
    /// next node visit.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        match &self.worker {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Block until the selection finishes and return its outcome.
    pub fn wait(self) -> SearchOutcome {
        match self.worker {
            Some(handle) => match handle.join() {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("search worker panicked; reporting cancellation");
                    SearchOutcome::Cancelled
                }
            },
            None => self.inline.unwrap_or(SearchOutcome::Cancelled),
        }
    }
}

/// The computer opponent: a difficulty tier plus the machinery to run one
/// move selection at a time, on a worker thread when possible.
///
/// Starting a new selection cancels any selection still in flight, so at
/// most one search is ever running per engine.
pub struct Engine {
    difficulty: Difficulty,
    seed: Option<u64>,
    active: Option<Arc<AtomicBool>>,
}

impl Engine {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            seed: None,
            active: None,
        }
    }

    /// Seeded variant: random-move rolls become reproducible. Each selection
    /// reseeds from the same value.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            seed: Some(seed),
            active: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Takes effect from the next selection; an in-flight one is unaffected.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Run a selection synchronously on the calling thread.
    pub fn select_move(&mut self, oracle: &mut dyn RulesOracle) -> SearchOutcome {
        self.cancel_selection();
        let mut session = self.new_session(Arc::new(AtomicBool::new(false)), None);
        run_search(oracle, &self.difficulty.params(), &mut session)
    }

    /// Start a selection on a background thread. The engine does not keep a
    /// reference to the caller's board; `snapshot` is the worker's private
    /// copy of the position.
    pub fn start(&mut self, snapshot: Box<dyn RulesOracle + Send>) -> SearchHandle {
        self.start_inner(snapshot, None)
    }

    /// Like [`start`](Self::start), with a callback invoked after each
    /// completed depth.
    pub fn start_with_progress(
        &mut self,
        snapshot: Box<dyn RulesOracle + Send>,
        progress: ProgressFn,
    ) -> SearchHandle {
        self.start_inner(snapshot, Some(progress))
    }

    /// Cancel the in-flight selection, if any.
    pub fn cancel_selection(&mut self) {
        if let Some(flag) = self.active.take() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    fn new_session(&self, cancel: Arc<AtomicBool>, progress: Option<ProgressFn>) -> SearchSession {
        let mut session = SearchSession::with_cancel(cancel);
        if let Some(seed) = self.seed {
            session.seed_rng(seed);
        }
        if let Some(cb) = progress {
            session.set_progress(cb);
        }
        session
    }

    fn start_inner(
        &mut self,
        snapshot: Box<dyn RulesOracle + Send>,
        progress: Option<ProgressFn>,
    ) -> SearchHandle {
        self.cancel_selection();

        let cancel = Arc::new(AtomicBool::new(false));
        self.active = Some(cancel.clone());

        let job = Job {
            snapshot,
            params: self.difficulty.params(),
            session: self.new_session(cancel.clone(), progress),
        };

        // The job sits in a shared slot so it can be reclaimed if the OS
        // refuses to give us a thread
        let slot = Arc::new(Mutex::new(Some(job)));
        let worker_slot = slot.clone();

        let spawned = thread::Builder::new()
            .name("move-search".to_string())
            .spawn(move || {
                let job = worker_slot.lock().ok().and_then(|mut guard| guard.take());
                match job {
                    Some(job) => job.run(),
                    None => SearchOutcome::Cancelled,
                }
            });

        match spawned {
            Ok(handle) => SearchHandle {
                cancel,
                worker: Some(handle),
                inline: None,
            },
            Err(err) => {
                warn!("no worker thread available ({err}), searching on the calling thread");
                let outcome = slot
                    .lock()
                    .ok()
                    .and_then(|mut guard| guard.take())
                    .map(Job::run)
                    .unwrap_or(SearchOutcome::Cancelled);
                SearchHandle {
                    cancel,
                    worker: None,
                    inline: Some(outcome),
                }
            }
        }
    }
}

fn run_search(
    oracle: &mut dyn RulesOracle,
    params: &SearchParams,
    session: &mut SearchSession,
) -> SearchOutcome {
    let outcome = match find_best_move(oracle, params, session) {
        Some(mv) => SearchOutcome::Move(mv),
        None if session.cancelled() => SearchOutcome::Cancelled,
        None => SearchOutcome::NoLegalMoves,
    };
    match &outcome {
        SearchOutcome::Move(mv) => info!(
            "selected {} after {} nodes in {:?}",
            mv,
            session.nodes,
            session.elapsed()
        ),
        SearchOutcome::NoLegalMoves => info!("position is terminal, no move to select"),
        SearchOutcome::Cancelled => info!("selection cancelled after {} nodes", session.nodes),
    }
    outcome
}


// Thread-per-selection rather than a pooled worker: a human game produces a
// move request every few seconds at most, and a fresh thread keeps the
// cancel/ownership story simple (the snapshot and session die with the
// worker). If the spawn itself fails the selection degrades to the calling
// thread instead of failing the move.
