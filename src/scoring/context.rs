//! Read-only snapshot passed to scoring rules.

use crate::models::{SessionGroup, Student, StudentIdx, StudentRoster};
use crate::registry::SessionRegistry;

/// The state a scoring rule may look at: the student being placed, the
/// roster (for classmates) and the registry (for held groups).
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// Index of the student being placed.
    pub student_idx: StudentIdx,
    /// The student being placed.
    pub student: &'a Student,
    /// All students.
    pub roster: &'a StudentRoster,
    /// All groups.
    pub registry: &'a SessionRegistry,
}

impl<'a> ScoringContext<'a> {
    /// Creates a snapshot for `student_idx`.
    pub fn new(
        student_idx: StudentIdx,
        roster: &'a StudentRoster,
        registry: &'a SessionRegistry,
    ) -> Self {
        Self {
            student_idx,
            student: roster.get(student_idx),
            roster,
            registry,
        }
    }

    /// Groups the student already holds, in assignment order.
    pub fn held_groups(&self) -> impl Iterator<Item = &'a SessionGroup> {
        let (student, registry) = (self.student, self.registry);
        student
            .assigned_sessions()
            .iter()
            .map(move |idx| registry.get(*idx))
    }

    /// Members of `group` (excluding the student being placed).
    pub fn members<'g>(&self, group: &'g SessionGroup) -> impl Iterator<Item = &'a Student> + 'g
    where
        'a: 'g,
    {
        let roster = self.roster;
        let me = self.student_idx;
        group
            .enrolled()
            .iter()
            .filter(move |idx| **idx != me)
            .map(move |idx| roster.get(*idx))
    }
}
