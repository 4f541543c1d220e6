//! Pairwise swap improvement after the greedy pass.
//!
//! Randomly samples pairs of assignments `(a, g_a)`, `(b, g_b)` and lets
//! the two students trade groups when the trade keeps every hard
//! constraint and makes the two groups strictly less mixed (see
//! [`heterogeneity`](crate::scoring::rules::heterogeneity)).
//!
//! A trade is accepted only if:
//! - `g_a != g_b` and neither student already sits in the other group,
//! - the distinct-experiment rule still holds (when enabled),
//! - neither student gets a conflict with lecture slots or remaining labs,
//! - neither student drops below their required hours.
//!
//! Headcounts never change, so capacity stays respected.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AllocationConfig;
use crate::conflict::ConflictIndex;
use crate::models::{SessionIdx, StudentIdx, StudentRoster};
use crate::registry::SessionRegistry;
use crate::scoring::rules::heterogeneity;

/// Seeded random pairwise swapper.
#[derive(Debug, Clone)]
pub struct SwapImprover {
    iterations: usize,
    seed: u64,
    distinct_experiments: bool,
    epsilon: f64,
}

impl SwapImprover {
    /// Creates a swapper from run parameters.
    pub fn new(config: &AllocationConfig) -> Self {
        Self {
            iterations: config.swap_iterations,
            seed: config.seed,
            distinct_experiments: config.distinct_experiments,
            epsilon: 1e-9,
        }
    }

    /// Runs the sampled trades. Returns the number of accepted swaps.
    pub fn improve(
        &self,
        roster: &mut StudentRoster,
        registry: &mut SessionRegistry,
        conflicts: &ConflictIndex,
    ) -> usize {
        let holders: Vec<StudentIdx> = roster
            .iter()
            .filter(|(_, s)| !s.assigned_sessions().is_empty())
            .map(|(idx, _)| idx)
            .collect();
        if holders.len() < 2 || self.iterations == 0 {
            return 0;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut swaps = 0;
        for _ in 0..self.iterations {
            let i = rng.random_range(0..holders.len());
            let mut j = rng.random_range(0..holders.len() - 1);
            if j >= i {
                j += 1;
            }
            let (a, b) = (holders[i], holders[j]);

            let held_a = roster.get(a).assigned_sessions();
            let held_b = roster.get(b).assigned_sessions();
            let group_a = held_a[rng.random_range(0..held_a.len())];
            let group_b = held_b[rng.random_range(0..held_b.len())];

            if !self.can_swap(roster, registry, conflicts, (a, group_a), (b, group_b)) {
                continue;
            }
            let before = mix(roster, registry, group_a, None) + mix(roster, registry, group_b, None);
            let after = mix(roster, registry, group_a, Some((a, b)))
                + mix(roster, registry, group_b, Some((b, a)));
            if after < before - self.epsilon && registry.swap(roster, a, group_a, b, group_b) {
                swaps += 1;
            }
        }

        info!("swap pass: {} of {} attempts accepted", swaps, self.iterations);
        swaps
    }

    /// Whether `a` and `b` may trade `group_a` and `group_b`.
    pub fn can_swap(
        &self,
        roster: &StudentRoster,
        registry: &SessionRegistry,
        conflicts: &ConflictIndex,
        (a, group_a): (StudentIdx, SessionIdx),
        (b, group_b): (StudentIdx, SessionIdx),
    ) -> bool {
        if a == b || group_a == group_b {
            return false;
        }
        let (sa, sb) = (roster.get(a), roster.get(b));
        if !sa.holds(group_a) || !sb.holds(group_b) || sa.holds(group_b) || sb.holds(group_a) {
            return false;
        }
        let (ga, gb) = (registry.get(group_a), registry.get(group_b));

        if self.distinct_experiments
            && (holds_experiment(roster, registry, a, &gb.experiment_name, group_a)
                || holds_experiment(roster, registry, b, &ga.experiment_name, group_b))
        {
            return false;
        }

        if conflicts.has_conflict_excluding(a, roster, registry, &gb.occupation, Some(group_a))
            || conflicts.has_conflict_excluding(b, roster, registry, &ga.occupation, Some(group_b))
        {
            debug!("swap {}:{} <-> {}:{} rejected: conflict", sa.id, ga.id, sb.id, gb.id);
            return false;
        }

        let hours_a = sa.assigned_hours() - ga.credit_hours + gb.credit_hours;
        let hours_b = sb.assigned_hours() - gb.credit_hours + ga.credit_hours;
        hours_a >= sa.required_hours && hours_b >= sb.required_hours
    }
}

/// Whether `student` holds a group of `experiment` other than `except`.
/// An empty name matches nothing.
fn holds_experiment(
    roster: &StudentRoster,
    registry: &SessionRegistry,
    student: StudentIdx,
    experiment: &str,
    except: SessionIdx,
) -> bool {
    !experiment.is_empty()
        && roster
            .get(student)
            .assigned_sessions()
            .iter()
            .filter(|held| **held != except)
            .any(|held| registry.get(*held).experiment_name == experiment)
}

/// Heterogeneity of `group`, optionally with `(out, in)` applied.
fn mix(
    roster: &StudentRoster,
    registry: &SessionRegistry,
    group: SessionIdx,
    exchange: Option<(StudentIdx, StudentIdx)>,
) -> f64 {
    let members = registry.get(group).enrolled().iter().copied();
    match exchange {
        None => heterogeneity(members.map(|idx| roster.get(idx))),
        Some((out, incoming)) => heterogeneity(
            members
                .filter(|idx| *idx != out)
                .chain(std::iter::once(incoming))
                .map(|idx| roster.get(idx)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionGroup, Student, TimeSlot};

    fn slot(week: u32, weekday: u8) -> TimeSlot {
        TimeSlot::new(vec![week], weekday, 1, 2).unwrap()
    }

    fn make_group(id: &str, experiment: &str, occupation: TimeSlot, hours: u32) -> SessionGroup {
        SessionGroup::new(id, occupation)
            .with_experiment(experiment)
            .with_capacity(4)
            .with_credit_hours(hours)
    }

    fn make_student(id: &str, class: &str) -> Student {
        Student::new(id)
            .with_affiliation("F", class, class)
            .with_required_hours(4)
    }

    /// G0 = {x1, y1}, G1 = {y2, x2}: one swap makes both groups pure.
    fn mixed_world() -> (StudentRoster, SessionRegistry, ConflictIndex) {
        let mut roster = StudentRoster::new(vec![
            make_student("x1", "X"),
            make_student("y1", "Y"),
            make_student("y2", "Y"),
            make_student("x2", "X"),
        ]);
        let mut registry = SessionRegistry::new(vec![
            make_group("G0", "Optics", slot(1, 1), 4),
            make_group("G1", "Optics", slot(2, 1), 4),
        ]);
        for (s, g) in [(0, 0), (1, 0), (2, 1), (3, 1)] {
            registry
                .commit(&mut roster, StudentIdx(s), SessionIdx(g))
                .unwrap();
        }
        let conflicts = ConflictIndex::build(&roster);
        (roster, registry, conflicts)
    }

    #[test]
    fn test_swap_reduces_mixing() {
        let (mut roster, mut registry, conflicts) = mixed_world();
        let config = AllocationConfig::default().with_swap_iterations(200);
        let swaps = SwapImprover::new(&config).improve(&mut roster, &mut registry, &conflicts);
        assert!(swaps >= 1);

        for (_, group) in registry.iter() {
            let members: Vec<&Student> = group.enrolled().iter().map(|i| roster.get(*i)).collect();
            assert_eq!(members.len(), 2);
            assert_eq!(members[0].class_name, members[1].class_name);
        }
        for (_, s) in roster.iter() {
            assert_eq!(s.assigned_hours(), 4);
        }
    }

    #[test]
    fn test_swap_is_deterministic() {
        let config = AllocationConfig::default().with_swap_iterations(50);
        let (mut r1, mut g1, c1) = mixed_world();
        let (mut r2, mut g2, c2) = mixed_world();
        let n1 = SwapImprover::new(&config).improve(&mut r1, &mut g1, &c1);
        let n2 = SwapImprover::new(&config).improve(&mut r2, &mut g2, &c2);
        assert_eq!(n1, n2);
        for ((_, a), (_, b)) in g1.iter().zip(g2.iter()) {
            assert_eq!(a.enrolled(), b.enrolled());
        }
    }

    #[test]
    fn test_can_swap_rejects_conflict_and_hours() {
        let (roster, registry, _) = mixed_world();
        // x1 is busy in week 2 on Monday: cannot move into G1
        let busy_roster = StudentRoster::new(
            roster
                .students()
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let mut s = s.clone();
                    if i == 0 {
                        s.busy_slots.push(slot(2, 1));
                    }
                    s
                })
                .collect(),
        );
        let conflicts = ConflictIndex::build(&busy_roster);
        let swapper = SwapImprover::new(&AllocationConfig::default());
        let pair_a = (StudentIdx(0), SessionIdx(0));
        let pair_b = (StudentIdx(2), SessionIdx(1));
        assert!(!swapper.can_swap(&roster, &registry, &conflicts, pair_a, pair_b));

        // Without the lecture clash the swap is fine
        let clean = ConflictIndex::build(&roster);
        assert!(swapper.can_swap(&roster, &registry, &clean, pair_a, pair_b));

        // Same group / same student
        assert!(!swapper.can_swap(&roster, &registry, &clean, pair_a, (StudentIdx(1), SessionIdx(0))));
        assert!(!swapper.can_swap(&roster, &registry, &clean, pair_a, pair_a));

        // A group worth fewer hours would leave the student short
        let mut cheap = SessionRegistry::new(vec![
            make_group("G0", "Optics", slot(1, 1), 4),
            make_group("G1", "Optics", slot(2, 1), 2),
        ]);
        let mut r = StudentRoster::new(vec![make_student("p", "X"), make_student("q", "Y")]);
        cheap.commit(&mut r, StudentIdx(0), SessionIdx(0)).unwrap();
        cheap.commit(&mut r, StudentIdx(1), SessionIdx(1)).unwrap();
        let c = ConflictIndex::build(&r);
        assert!(!swapper.can_swap(
            &r,
            &cheap,
            &c,
            (StudentIdx(0), SessionIdx(0)),
            (StudentIdx(1), SessionIdx(1))
        ));
    }

    #[test]
    fn test_can_swap_allows_unnamed_experiments() {
        // p already holds another unnamed group besides the one traded away
        let mut registry = SessionRegistry::new(vec![
            make_group("G0", "", slot(1, 1), 4),
            make_group("G1", "", slot(2, 1), 4),
            make_group("G2", "", slot(3, 1), 4),
        ]);
        let mut roster = StudentRoster::new(vec![make_student("p", "X"), make_student("q", "Y")]);
        registry.commit(&mut roster, StudentIdx(0), SessionIdx(0)).unwrap();
        registry.commit(&mut roster, StudentIdx(0), SessionIdx(2)).unwrap();
        registry.commit(&mut roster, StudentIdx(1), SessionIdx(1)).unwrap();
        let conflicts = ConflictIndex::build(&roster);
        let swapper = SwapImprover::new(&AllocationConfig::default());
        assert!(swapper.can_swap(
            &roster,
            &registry,
            &conflicts,
            (StudentIdx(0), SessionIdx(0)),
            (StudentIdx(1), SessionIdx(1))
        ));

        // Named experiments still block the same trade
        let mut named = SessionRegistry::new(vec![
            make_group("G0", "Optics", slot(1, 1), 4),
            make_group("G1", "Heat", slot(2, 1), 4),
            make_group("G2", "Heat", slot(3, 1), 4),
        ]);
        let mut r = StudentRoster::new(vec![make_student("p", "X"), make_student("q", "Y")]);
        named.commit(&mut r, StudentIdx(0), SessionIdx(0)).unwrap();
        named.commit(&mut r, StudentIdx(0), SessionIdx(2)).unwrap();
        named.commit(&mut r, StudentIdx(1), SessionIdx(1)).unwrap();
        let c = ConflictIndex::build(&r);
        assert!(!swapper.can_swap(
            &r,
            &named,
            &c,
            (StudentIdx(0), SessionIdx(0)),
            (StudentIdx(1), SessionIdx(1))
        ));
    }

    #[test]
    fn test_no_holders_no_swaps() {
        let mut roster = StudentRoster::new(vec![make_student("a", "X")]);
        let mut registry = SessionRegistry::new(vec![]);
        let conflicts = ConflictIndex::build(&roster);
        let swaps = SwapImprover::new(&AllocationConfig::default()).improve(
            &mut roster,
            &mut registry,
            &conflicts,
        );
        assert_eq!(swaps, 0);
    }
}
