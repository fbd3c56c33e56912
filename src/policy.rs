use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::EngineError;

/// Difficulty tier of the computer opponent. Selected once per game and
/// changed only by explicit user action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
}

/// What one move selection is allowed to spend: how deep, how long, and how
/// often to play a uniformly random legal move instead of searching.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchParams {
    pub max_depth: u8,
    /// Wall-clock budget; `Duration::ZERO` means depth-limited only.
    pub time_budget: Duration,
    /// Probability of short-circuiting to a random legal move, rolled once
    /// per invocation before any search work.
    pub random_move_prob: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
    ];

    /// The tier calibration defines the observable difficulty curve; these
    /// triples are load-bearing, not tuning suggestions.
    pub fn params(self) -> SearchParams {
        match self {
            Difficulty::Beginner => SearchParams {
                max_depth: 2,
                time_budget: Duration::from_millis(1000),
                random_move_prob: 0.30,
            },
            Difficulty::Easy => SearchParams {
                max_depth: 3,
                time_budget: Duration::from_millis(2000),
                random_move_prob: 0.15,
            },
            Difficulty::Medium => SearchParams {
                max_depth: 4,
                time_budget: Duration::from_millis(3000),
                random_move_prob: 0.05,
            },
            Difficulty::Hard => SearchParams {
                max_depth: 5,
                time_budget: Duration::from_millis(5000),
                random_move_prob: 0.0,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(EngineError::UnknownDifficulty(other.to_string())),
        }
    }
}
