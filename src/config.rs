//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How scoring factors are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Sum of weighted factors.
    #[default]
    Weighted,
    /// Compare weighted factors in rule order; later factors only break ties.
    Lexicographic,
}

/// Weights of the scoring factors. Higher weight = stronger preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Favour groups with more open seats.
    pub capacity_balance: f64,
    /// Favour groups already holding classmates.
    pub class_aggregation: f64,
    /// Penalise groups that mix many classes/majors.
    pub heterogeneity: f64,
    /// Favour groups far (in weeks) from the student's other labs.
    pub week_dispersion: f64,
    /// Favour groups at the same weekday/periods as the student's other labs.
    pub slot_consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            capacity_balance: 1.0,
            class_aggregation: 1.0,
            heterogeneity: 0.5,
            week_dispersion: 0.2,
            slot_consistency: 0.1,
        }
    }
}

impl ScoreWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("capacity_balance", self.capacity_balance),
            ("class_aggregation", self.class_aggregation),
            ("heterogeneity", self.heterogeneity),
            ("week_dispersion", self.week_dispersion),
            ("slot_consistency", self.slot_consistency),
        ]
    }
}

/// Parameters of one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Hours every student must reach unless the student record overrides it.
    pub required_hours: u32,
    /// Seed for the cohort shuffle and the swap pass.
    pub seed: u64,
    /// Scoring factor weights.
    pub weights: ScoreWeights,
    /// Factor combination mode.
    pub mode: EvaluationMode,
    /// Forbid holding two groups of the same experiment.
    pub distinct_experiments: bool,
    /// Random swap attempts after the greedy pass (0 disables).
    pub swap_iterations: usize,
    /// Maximum number of shortfall entries in the report preview.
    pub shortfall_preview: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            required_hours: 30,
            seed: 42,
            weights: ScoreWeights::default(),
            mode: EvaluationMode::Weighted,
            distinct_experiments: true,
            swap_iterations: 200,
            shortfall_preview: 20,
        }
    }
}

impl AllocationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the required hours.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = hours;
        self
    }

    /// Sets the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the scoring weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables the distinct-experiment rule.
    pub fn with_distinct_experiments(mut self, enabled: bool) -> Self {
        self.distinct_experiments = enabled;
        self
    }

    /// Sets the number of swap attempts.
    pub fn with_swap_iterations(mut self, iterations: usize) -> Self {
        self.swap_iterations = iterations;
        self
    }

    /// Sets the shortfall preview length.
    pub fn with_shortfall_preview(mut self, limit: usize) -> Self {
        self.shortfall_preview = limit;
        self
    }

    /// Rejects unusable parameters.
    pub fn validate(&self) -> Result<()> {
        if self.required_hours == 0 {
            return Err(Error::InvalidConfig(
                "required_hours must be positive".into(),
            ));
        }
        for (name, weight) in self.weights.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight {name} must be a finite non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }
}
