use crate::oracle::Move;
use crate::types::Score;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    LowerBound, // Beta cutoff (score >= beta)
    UpperBound, // Failed low (score <= original alpha)
}

#[derive(Clone)]
pub struct TTEntry {
    pub key: u64, // Full fingerprint, for collision detection
    pub depth: u8,
    pub score: Score,
    pub flag: TTFlag,
    pub best_move: Option<Move>,
}

impl Default for TTEntry {
    fn default() -> Self {
        Self {
            key: 0,
            depth: 0,
            score: 0,
            flag: TTFlag::Exact,
            best_move: None,
        }
    }
}

/// Per-invocation transposition cache, indexed by `fingerprint & mask`.
///
/// An entry is only trusted when its stored depth covers the depth currently
/// required; shallower entries must never short-circuit a deeper search.
/// Cleared at the start of every top-level move selection — nothing here
/// survives across invocations.
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table with the given size in megabytes (rounded down to a
    /// power of two entries, minimum 1024).
    pub fn new(mb: usize) -> Self {
        let entry_size = std::mem::size_of::<TTEntry>();
        let num_entries = (mb * 1024 * 1024) / entry_size;
        let size = num_entries.next_power_of_two() / 2;
        let size = size.max(1024);

        Self {
            entries: vec![TTEntry::default(); size],
            mask: size - 1,
        }
    }

    pub fn probe(&self, key: u64) -> Option<&TTEntry> {
        let idx = key as usize & self.mask;
        let entry = &self.entries[idx];

        if entry.key == key { Some(entry) } else { None }
    }

    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        score: Score,
        flag: TTFlag,
        best_move: Option<Move>,
    ) {
        let idx = key as usize & self.mask;
        let entry = &self.entries[idx];

        // Depth-preferred replacement: keep the deeper of two colliding
        // entries, always overwrite our own key
        let should_replace = entry.key == 0 || entry.key == key || depth >= entry.depth;
        if !should_replace {
            return;
        }

        self.entries[idx] = TTEntry {
            key,
            depth,
            score,
            flag,
            best_move,
        };
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = TTEntry::default();
        }
    }
}


// Collisions are detected by storing the full fingerprint alongside the
// payload; an index collision at worst evicts (depth-preferred), never
// returns a wrong score. No generation/aging bookkeeping: the table is
// cleared wholesale at the start of every move selection, which is this
// engine's deliberate staleness guarantee.
