//! Per-student conflict index.
//!
//! Built once per run from each student's lecture commitments. Slots are
//! bucketed by weekday so a check only scans same-day commitments.
//!
//! The check is dynamic: besides the fixed lecture slots, a check also
//! compares against the occupation of every group the student holds *at
//! the time of the check*. A student can therefore never be placed in two
//! overlapping lab groups within one run.

use std::collections::BTreeMap;

use crate::models::{SessionIdx, StudentIdx, StudentRoster, TimeSlot};
use crate::registry::SessionRegistry;

/// Busy slots per student, bucketed by weekday.
#[derive(Debug, Clone, Default)]
pub struct ConflictIndex {
    busy: Vec<BTreeMap<u8, Vec<TimeSlot>>>,
}

impl ConflictIndex {
    /// Indexes every student's `busy_slots`. Duplicate slots are stored once.
    pub fn build(roster: &StudentRoster) -> Self {
        let busy = roster
            .students()
            .iter()
            .map(|student| {
                let mut by_day: BTreeMap<u8, Vec<TimeSlot>> = BTreeMap::new();
                for slot in &student.busy_slots {
                    let bucket = by_day.entry(slot.weekday()).or_default();
                    if !bucket.contains(slot) {
                        bucket.push(slot.clone());
                    }
                }
                by_day
            })
            .collect();
        Self { busy }
    }

    /// Number of indexed students.
    pub fn len(&self) -> usize {
        self.busy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.busy.is_empty()
    }

    /// Number of distinct busy slots recorded for a student.
    pub fn busy_count(&self, student: StudentIdx) -> usize {
        self.busy
            .get(student.0)
            .map(|days| days.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Whether `candidate` overlaps a lecture commitment of `student`.
    pub fn clashes_with_busy(&self, student: StudentIdx, candidate: &TimeSlot) -> bool {
        self.busy
            .get(student.0)
            .and_then(|days| days.get(&candidate.weekday()))
            .is_some_and(|slots| slots.iter().any(|s| s.overlaps(candidate)))
    }

    /// Whether placing `student` at `candidate` creates a conflict with
    /// lecture commitments or with any group the student already holds.
    pub fn has_conflict(
        &self,
        student: StudentIdx,
        roster: &StudentRoster,
        registry: &SessionRegistry,
        candidate: &TimeSlot,
    ) -> bool {
        self.has_conflict_excluding(student, roster, registry, candidate, None)
    }

    /// Like [`has_conflict`](Self::has_conflict), ignoring one held group.
    ///
    /// Used when evaluating a replacement of `excluded`.
    pub fn has_conflict_excluding(
        &self,
        student: StudentIdx,
        roster: &StudentRoster,
        registry: &SessionRegistry,
        candidate: &TimeSlot,
        excluded: Option<SessionIdx>,
    ) -> bool {
        if self.clashes_with_busy(student, candidate) {
            return true;
        }
        roster
            .get(student)
            .assigned_sessions()
            .iter()
            .filter(|held| Some(**held) != excluded)
            .any(|held| registry.get(*held).occupation.overlaps(candidate))
    }

    /// The student's effective busy set: lecture slots plus the occupation
    /// of every held group.
    pub fn effective_busy<'a>(
        &'a self,
        student: StudentIdx,
        roster: &StudentRoster,
        registry: &'a SessionRegistry,
    ) -> Vec<&'a TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self
            .busy
            .get(student.0)
            .map(|days| days.values().flatten().collect())
            .unwrap_or_default();
        slots.extend(
            roster
                .get(student)
                .assigned_sessions()
                .iter()
                .map(|held| &registry.get(*held).occupation),
        );
        slots
    }
}
