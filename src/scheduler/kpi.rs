//! Allocation quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Demand hours | Σ required hours over students |
//! | Supply hours | Σ capacity × credit hours over groups |
//! | Assigned hours | Σ assigned hours over students |
//! | Satisfaction rate | students meeting their hours / students |
//! | Total shortfall | Σ max(0, required - assigned) |
//! | Avg fill rate | mean(enrolled / capacity) over groups |

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::StudentRoster;
use crate::registry::SessionRegistry;

/// Allocation performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationKpi {
    /// Number of students.
    pub student_count: usize,
    /// Number of groups.
    pub session_count: usize,
    /// Total required hours.
    pub demand_hours: u64,
    /// Total hours the groups could grant if full.
    pub supply_hours: u64,
    /// Total hours granted.
    pub assigned_hours: u64,
    /// Students meeting their required hours.
    pub satisfied_count: usize,
    /// Students below their required hours.
    pub shortfall_count: usize,
    /// Σ missing hours.
    pub total_shortfall_hours: u64,
    /// Fraction of satisfied students (0.0..1.0, 1.0 when no students).
    pub satisfaction_rate: f64,
    /// Mean seat fill rate over groups (0.0 when no groups).
    pub avg_fill_rate: f64,
    /// Fill rate per group id.
    pub fill_rate_by_session: BTreeMap<String, f64>,
}

impl AllocationKpi {
    /// Computes KPIs from the current roster and registry state.
    pub fn calculate(roster: &StudentRoster, registry: &SessionRegistry) -> Self {
        let mut demand_hours: u64 = 0;
        let mut assigned_hours: u64 = 0;
        let mut satisfied_count = 0;
        let mut total_shortfall_hours: u64 = 0;

        for student in roster.students() {
            demand_hours += u64::from(student.required_hours);
            assigned_hours += u64::from(student.assigned_hours());
            if student.is_satisfied() {
                satisfied_count += 1;
            } else {
                total_shortfall_hours += u64::from(student.shortfall());
            }
        }

        let supply_hours = supply_hours(registry);
        let fill_rate_by_session: BTreeMap<String, f64> = registry
            .sessions()
            .iter()
            .map(|g| (g.id.clone(), g.fill_rate()))
            .collect();
        let avg_fill_rate = if registry.is_empty() {
            0.0
        } else {
            registry.sessions().iter().map(|g| g.fill_rate()).sum::<f64>() / registry.len() as f64
        };

        let student_count = roster.len();
        let satisfaction_rate = if student_count == 0 {
            1.0
        } else {
            satisfied_count as f64 / student_count as f64
        };

        Self {
            student_count,
            session_count: registry.len(),
            demand_hours,
            supply_hours,
            assigned_hours,
            satisfied_count,
            shortfall_count: student_count - satisfied_count,
            total_shortfall_hours,
            satisfaction_rate,
            avg_fill_rate,
            fill_rate_by_session,
        }
    }

    /// Whether total supply could in principle cover total demand.
    pub fn supply_covers_demand(&self) -> bool {
        self.supply_hours >= self.demand_hours
    }

    /// Whether every student reached their hours.
    pub fn all_satisfied(&self) -> bool {
        self.shortfall_count == 0
    }
}

/// Σ capacity × credit hours.
pub fn supply_hours(registry: &SessionRegistry) -> u64 {
    registry
        .sessions()
        .iter()
        .map(|g| u64::from(g.capacity) * u64::from(g.credit_hours))
        .sum()
}

/// Σ required hours.
pub fn demand_hours(roster: &StudentRoster) -> u64 {
    roster
        .students()
        .iter()
        .map(|s| u64::from(s.required_hours))
        .sum()
}
