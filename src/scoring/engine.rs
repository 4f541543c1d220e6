//! Score engine: combines weighted rules and selects the best candidate.
//!
//! # Modes
//! - `Weighted`: `score = Σ weight_i · rule_i` (default).
//! - `Lexicographic`: compare weighted rule scores one rule at a time,
//!   in registration order; later rules only break ties.
//!
//! In both modes equal candidates resolve to the one listed first.

use std::cmp::Ordering;
use std::sync::Arc;

use log::trace;

use super::rules::{CapacityBalance, ClassAggregation, Heterogeneity, SlotConsistency, WeekDispersion};
use super::{FactorScore, ScoringContext, ScoringRule};
use crate::config::{EvaluationMode, ScoreWeights};
use crate::models::{SessionGroup, SessionIdx};

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn ScoringRule>,
    weight: f64,
}

/// A composable scorer for candidate groups.
///
/// # Example
/// ```
/// use lab_roster::config::EvaluationMode;
/// use lab_roster::scoring::{rules, ScoreEngine};
///
/// let engine = ScoreEngine::new()
///     .with_weighted_rule(rules::CapacityBalance, 1.0)
///     .with_weighted_rule(rules::ClassAggregation, 0.5)
///     .with_mode(EvaluationMode::Weighted);
/// assert_eq!(engine.rule_names(), vec!["capacity_balance", "class_aggregation"]);
/// ```
#[derive(Clone)]
pub struct ScoreEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    epsilon: f64,
}

impl ScoreEngine {
    /// Creates an engine with no rules (every candidate scores 0).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Weighted,
            epsilon: 1e-9,
        }
    }

    /// Creates the standard five-factor engine.
    ///
    /// Rule order (relevant for `Lexicographic`): capacity balance, class
    /// aggregation, heterogeneity, week dispersion, slot consistency.
    pub fn from_weights(weights: &ScoreWeights, mode: EvaluationMode) -> Self {
        Self::new()
            .with_weighted_rule(CapacityBalance, weights.capacity_balance)
            .with_weighted_rule(ClassAggregation, weights.class_aggregation)
            .with_weighted_rule(Heterogeneity, weights.heterogeneity)
            .with_weighted_rule(WeekDispersion, weights.week_dispersion)
            .with_weighted_rule(SlotConsistency, weights.slot_consistency)
            .with_mode(mode)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: ScoringRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: ScoringRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Names of registered rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    /// Weighted score of each rule for one candidate.
    pub fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> Vec<FactorScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(group, context) * wr.weight)
            .collect()
    }

    /// Total weighted score of one candidate.
    pub fn score(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore {
        self.evaluate(group, context).iter().sum()
    }

    /// Picks the best candidate. Returns `None` for an empty list.
    ///
    /// A later candidate replaces the current best only if it is strictly
    /// better (beyond epsilon), so ties keep the earlier one.
    pub fn select_best(
        &self,
        candidates: &[SessionIdx],
        context: &ScoringContext<'_>,
    ) -> Option<SessionIdx> {
        let mut best: Option<(SessionIdx, Vec<FactorScore>)> = None;
        for &idx in candidates {
            let scores = self.evaluate(context.registry.get(idx), context);
            trace!(
                "score {} for {}: {:?}",
                context.registry.get(idx).id,
                context.student.id,
                scores
            );
            let better = match &best {
                None => true,
                Some((_, best_scores)) => self.compare(&scores, best_scores) == Ordering::Greater,
            };
            if better {
                best = Some((idx, scores));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn compare(&self, a: &[FactorScore], b: &[FactorScore]) -> Ordering {
        match self.mode {
            EvaluationMode::Weighted => {
                let (sa, sb): (f64, f64) = (a.iter().sum(), b.iter().sum());
                if (sa - sb).abs() > self.epsilon {
                    sa.partial_cmp(&sb).unwrap_or(Ordering::Equal)
                } else {
                    Ordering::Equal
                }
            }
            EvaluationMode::Lexicographic => {
                for (x, y) in a.iter().zip(b) {
                    if (x - y).abs() > self.epsilon {
                        return x.partial_cmp(y).unwrap_or(Ordering::Equal);
                    }
                }
                Ordering::Equal
            }
        }
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
