//! Candidate scoring for the greedy engine.
//!
//! Each [`ScoringRule`] rates one candidate group for one student from an
//! immutable snapshot ([`ScoringContext`]). The [`ScoreEngine`] combines
//! rule scores and picks the best candidate.
//!
//! # Score Convention
//! **Higher score = better candidate.** Ties go to the candidate seen
//! first; no randomness is involved at selection time.
//!
//! # Usage
//!
//! ```
//! use lab_roster::config::{EvaluationMode, ScoreWeights};
//! use lab_roster::scoring::ScoreEngine;
//!
//! let engine = ScoreEngine::from_weights(&ScoreWeights::default(), EvaluationMode::Weighted);
//! assert_eq!(engine.rule_names().len(), 5);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::ScoringContext;
pub use engine::ScoreEngine;

use crate::models::SessionGroup;
use std::fmt::Debug;

/// Score returned by a scoring rule. Higher = better.
pub type FactorScore = f64;

/// A side-effect-free rating of a candidate group.
pub trait ScoringRule: Send + Sync + Debug {
    /// Short rule name.
    fn name(&self) -> &'static str;

    /// Rates `group` for the student described by `context`.
    fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
