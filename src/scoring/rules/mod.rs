//! Built-in scoring rules.
//!
//! # Factors
//!
//! | Rule | Rewards | Range |
//! |------|---------|-------|
//! | `CapacityBalance` | open seats | 0..=1 |
//! | `ClassAggregation` | classmates already enrolled | 0..1 |
//! | `Heterogeneity` | homogeneous groups (penalty) | -1..0 |
//! | `WeekDispersion` | distance in weeks from held labs | 0..1 |
//! | `SlotConsistency` | same weekday/periods as held labs | 0..=1 |
//!
//! All rules return higher scores for better candidates.

use std::collections::HashSet;

use super::{FactorScore, ScoringContext, ScoringRule};
use crate::models::{SessionGroup, Student};

// ======================== Load ========================

/// Share of seats still open: `(capacity - enrolled) / capacity`.
///
/// Spreads students across groups instead of filling the first ones.
#[derive(Debug, Clone, Copy)]
pub struct CapacityBalance;

impl ScoringRule for CapacityBalance {
    fn name(&self) -> &'static str {
        "capacity_balance"
    }

    fn evaluate(&self, group: &SessionGroup, _context: &ScoringContext<'_>) -> FactorScore {
        if group.capacity == 0 {
            return 0.0;
        }
        group.remaining() as f64 / group.capacity as f64
    }

    fn description(&self) -> &'static str {
        "Capacity Balance"
    }
}

// ======================== Cohort ========================

/// Classmates already in the group, relative to the group size after
/// joining: `same_class / (enrolled + 1)`.
#[derive(Debug, Clone, Copy)]
pub struct ClassAggregation;

impl ScoringRule for ClassAggregation {
    fn name(&self) -> &'static str {
        "class_aggregation"
    }

    fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore {
        let class = context.student.class_name.as_str();
        if class.is_empty() {
            return 0.0;
        }
        let same = context
            .members(group)
            .filter(|peer| peer.class_name == class)
            .count();
        same as f64 / (group.headcount() as f64 + 1.0)
    }

    fn description(&self) -> &'static str {
        "Class Aggregation"
    }
}

/// Negated mix level of the group once the student joins.
///
/// See [`heterogeneity`].
#[derive(Debug, Clone, Copy)]
pub struct Heterogeneity;

impl ScoringRule for Heterogeneity {
    fn name(&self) -> &'static str {
        "heterogeneity"
    }

    fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore {
        let members = context
            .members(group)
            .chain(std::iter::once(context.student));
        -heterogeneity(members)
    }

    fn description(&self) -> &'static str {
        "Group Heterogeneity Penalty"
    }
}

/// Mix level of a set of students:
/// `max(distinct classes, distinct majors) / size`, 0 for an empty set.
///
/// Empty class or major names are not counted as distinct values.
pub fn heterogeneity<'a>(members: impl IntoIterator<Item = &'a Student>) -> f64 {
    let mut classes = HashSet::new();
    let mut majors = HashSet::new();
    let mut size = 0usize;
    for m in members {
        size += 1;
        if !m.class_name.is_empty() {
            classes.insert(m.class_name.as_str());
        }
        if !m.major.is_empty() {
            majors.insert(m.major.as_str());
        }
    }
    if size == 0 {
        return 0.0;
    }
    classes.len().max(majors.len()) as f64 / size as f64
}

// ======================== Personal schedule ========================

/// Distance in weeks to the closest held lab, squashed to `d / (d + 1)`.
///
/// 0 when the student holds nothing yet, so it never biases the first pick.
#[derive(Debug, Clone, Copy)]
pub struct WeekDispersion;

impl ScoringRule for WeekDispersion {
    fn name(&self) -> &'static str {
        "week_dispersion"
    }

    fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore {
        let target = group.occupation.main_week();
        let closest = context
            .held_groups()
            .map(|held| held.occupation.main_week().abs_diff(target))
            .min();
        match closest {
            Some(d) => d as f64 / (d as f64 + 1.0),
            None => 0.0,
        }
    }

    fn description(&self) -> &'static str {
        "Week Dispersion"
    }
}

/// Share of held labs at the same weekday and period range.
#[derive(Debug, Clone, Copy)]
pub struct SlotConsistency;

impl ScoringRule for SlotConsistency {
    fn name(&self) -> &'static str {
        "slot_consistency"
    }

    fn evaluate(&self, group: &SessionGroup, context: &ScoringContext<'_>) -> FactorScore {
        let (mut held, mut same) = (0usize, 0usize);
        for g in context.held_groups() {
            held += 1;
            if g.occupation.same_pattern(&group.occupation) {
                same += 1;
            }
        }
        if held == 0 {
            0.0
        } else {
            same as f64 / held as f64
        }
    }

    fn description(&self) -> &'static str {
        "Time-Slot Consistency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionIdx, StudentIdx, StudentRoster, TimeSlot};
    use crate::registry::SessionRegistry;

    fn slot(week: u32, weekday: u8, start: u32, end: u32) -> TimeSlot {
        TimeSlot::new(vec![week], weekday, start, end).unwrap()
    }

    fn group(id: &str, occupation: TimeSlot, capacity: u32) -> crate::models::SessionGroup {
        crate::models::SessionGroup::new(id, occupation)
            .with_capacity(capacity)
            .with_credit_hours(2)
    }

    fn student(id: &str, major: &str, class: &str) -> Student {
        Student::new(id)
            .with_affiliation("F", major, class)
            .with_required_hours(10)
    }

    fn world() -> (StudentRoster, SessionRegistry) {
        let roster = StudentRoster::new(vec![
            student("me", "Physics", "P1"),
            student("mate", "Physics", "P1"),
            student("other", "Chemistry", "C1"),
        ]);
        let registry = SessionRegistry::new(vec![
            group("G0", slot(1, 1, 1, 2), 4),
            group("G1", slot(5, 1, 1, 2), 4),
            group("G2", slot(9, 3, 3, 4), 4),
        ]);
        (roster, registry)
    }

    #[test]
    fn test_capacity_balance() {
        let (mut roster, mut registry) = world();
        registry
            .commit(&mut roster, StudentIdx(1), SessionIdx(0))
            .unwrap();
        let ctx = ScoringContext::new(StudentIdx(0), &roster, &registry);
        let g0 = registry.get(SessionIdx(0));
        let g1 = registry.get(SessionIdx(1));
        assert!((CapacityBalance.evaluate(g0, &ctx) - 0.75).abs() < 1e-10);
        assert!((CapacityBalance.evaluate(g1, &ctx) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_class_aggregation() {
        let (mut roster, mut registry) = world();
        registry
            .commit(&mut roster, StudentIdx(1), SessionIdx(0))
            .unwrap();
        registry
            .commit(&mut roster, StudentIdx(2), SessionIdx(1))
            .unwrap();
        let ctx = ScoringContext::new(StudentIdx(0), &roster, &registry);
        // One classmate out of 1 enrolled → 1 / (1 + 1)
        assert!((ClassAggregation.evaluate(registry.get(SessionIdx(0)), &ctx) - 0.5).abs() < 1e-10);
        assert!(ClassAggregation.evaluate(registry.get(SessionIdx(1)), &ctx).abs() < 1e-10);
        assert!(ClassAggregation.evaluate(registry.get(SessionIdx(2)), &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_heterogeneity() {
        let (mut roster, mut registry) = world();
        registry
            .commit(&mut roster, StudentIdx(1), SessionIdx(0))
            .unwrap();
        registry
            .commit(&mut roster, StudentIdx(2), SessionIdx(1))
            .unwrap();
        let ctx = ScoringContext::new(StudentIdx(0), &roster, &registry);
        // {mate, me}: 1 class / 2 members
        let same = Heterogeneity.evaluate(registry.get(SessionIdx(0)), &ctx);
        // {other, me}: 2 classes / 2 members
        let mixed = Heterogeneity.evaluate(registry.get(SessionIdx(1)), &ctx);
        assert!((same + 0.5).abs() < 1e-10);
        assert!((mixed + 1.0).abs() < 1e-10);
        assert!(same > mixed);

        assert!(heterogeneity(std::iter::empty()).abs() < 1e-10);
    }

    #[test]
    fn test_week_dispersion() {
        let (mut roster, mut registry) = world();
        let me = StudentIdx(0);
        {
            let ctx = ScoringContext::new(me, &roster, &registry);
            assert!(WeekDispersion.evaluate(registry.get(SessionIdx(1)), &ctx).abs() < 1e-10);
        }
        registry.commit(&mut roster, me, SessionIdx(0)).unwrap();
        let ctx = ScoringContext::new(me, &roster, &registry);
        let near = WeekDispersion.evaluate(registry.get(SessionIdx(1)), &ctx); // 4 weeks
        let far = WeekDispersion.evaluate(registry.get(SessionIdx(2)), &ctx); // 8 weeks
        assert!((near - 0.8).abs() < 1e-10);
        assert!(far > near);
    }

    #[test]
    fn test_slot_consistency() {
        let (mut roster, mut registry) = world();
        let me = StudentIdx(0);
        registry.commit(&mut roster, me, SessionIdx(0)).unwrap();
        let ctx = ScoringContext::new(me, &roster, &registry);
        // G1 shares Monday periods 1-2 with G0, G2 does not
        assert!((SlotConsistency.evaluate(registry.get(SessionIdx(1)), &ctx) - 1.0).abs() < 1e-10);
        assert!(SlotConsistency.evaluate(registry.get(SessionIdx(2)), &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(CapacityBalance.name(), "capacity_balance");
        assert_eq!(SlotConsistency.description(), "Time-Slot Consistency");
    }
}
