//! Student model and the owning roster.
//!
//! Students live in a [`StudentRoster`] arena and are referenced by
//! [`StudentIdx`]. Assignment state (`assigned_hours`,
//! `assigned_sessions`) is only mutated through the session registry's
//! commit and swap operations, which keep it in lockstep with group
//! enrollment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{SessionIdx, TimeSlot};

/// Stable index of a student within its roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentIdx(pub usize);

/// A student who needs lab hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Display name (not unique).
    pub name: String,
    /// Faculty / department.
    pub faculty: String,
    /// Major.
    pub major: String,
    /// Administrative class.
    pub class_name: String,
    /// Hours this student must accumulate.
    pub required_hours: u32,
    /// Occupations from existing lecture commitments.
    pub busy_slots: Vec<TimeSlot>,
    #[serde(skip_deserializing)]
    assigned_hours: u32,
    #[serde(skip_deserializing)]
    assigned_sessions: Vec<SessionIdx>,
}

impl Student {
    /// Creates a student with no commitments and nothing assigned.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            faculty: String::new(),
            major: String::new(),
            class_name: String::new(),
            required_hours: 0,
            busy_slots: Vec::new(),
            assigned_hours: 0,
            assigned_sessions: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets faculty, major and class in one go.
    pub fn with_affiliation(
        mut self,
        faculty: impl Into<String>,
        major: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        self.faculty = faculty.into();
        self.major = major.into();
        self.class_name = class_name.into();
        self
    }

    /// Sets the required hours.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = hours;
        self
    }

    /// Adds an existing commitment.
    pub fn with_busy_slot(mut self, slot: TimeSlot) -> Self {
        self.busy_slots.push(slot);
        self
    }

    /// Hours granted by committed sessions so far.
    #[inline]
    pub fn assigned_hours(&self) -> u32 {
        self.assigned_hours
    }

    /// Committed sessions in assignment order.
    pub fn assigned_sessions(&self) -> &[SessionIdx] {
        &self.assigned_sessions
    }

    /// Whether the student already holds `session`.
    pub fn holds(&self, session: SessionIdx) -> bool {
        self.assigned_sessions.contains(&session)
    }

    /// Hours still missing (0 once satisfied).
    pub fn shortfall(&self) -> u32 {
        self.required_hours.saturating_sub(self.assigned_hours)
    }

    /// Whether required hours are met.
    pub fn is_satisfied(&self) -> bool {
        self.assigned_hours >= self.required_hours
    }

    /// Cohort key used to group students for processing.
    pub fn cohort_key(&self) -> (&str, &str, &str) {
        (&self.faculty, &self.major, &self.class_name)
    }

    pub(crate) fn record_assignment(&mut self, session: SessionIdx, hours: u32) {
        self.assigned_sessions.push(session);
        self.assigned_hours += hours;
    }

    /// Replaces `old` by `new` in place, keeping the hour total consistent.
    pub(crate) fn replace_assignment(
        &mut self,
        old: SessionIdx,
        old_hours: u32,
        new: SessionIdx,
        new_hours: u32,
    ) -> bool {
        match self.assigned_sessions.iter().position(|s| *s == old) {
            Some(pos) => {
                self.assigned_sessions[pos] = new;
                self.assigned_hours = self.assigned_hours - old_hours + new_hours;
                true
            }
            None => false,
        }
    }
}

/// Arena of students with id lookup.
#[derive(Debug, Clone, Default)]
pub struct StudentRoster {
    students: Vec<Student>,
    by_id: HashMap<String, StudentIdx>,
}

impl StudentRoster {
    /// Builds a roster. Later duplicates of an id are not indexed by id
    /// (validation reports them).
    pub fn new(students: Vec<Student>) -> Self {
        let mut by_id = HashMap::with_capacity(students.len());
        for (i, s) in students.iter().enumerate() {
            by_id.entry(s.id.clone()).or_insert(StudentIdx(i));
        }
        Self { students, by_id }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, idx: StudentIdx) -> &Student {
        &self.students[idx.0]
    }

    pub(crate) fn get_mut(&mut self, idx: StudentIdx) -> &mut Student {
        &mut self.students[idx.0]
    }

    /// Mutable access to two distinct students.
    pub(crate) fn pair_mut(
        &mut self,
        a: StudentIdx,
        b: StudentIdx,
    ) -> (&mut Student, &mut Student) {
        assert_ne!(a, b, "pair_mut requires distinct students");
        if a.0 < b.0 {
            let (left, right) = self.students.split_at_mut(b.0);
            (&mut left[a.0], &mut right[0])
        } else {
            let (left, right) = self.students.split_at_mut(a.0);
            (&mut right[0], &mut left[b.0])
        }
    }

    /// Finds a student by id.
    pub fn find(&self, id: &str) -> Option<StudentIdx> {
        self.by_id.get(id).copied()
    }

    /// Iterates students with their indices, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (StudentIdx, &Student)> {
        self.students
            .iter()
            .enumerate()
            .map(|(i, s)| (StudentIdx(i), s))
    }

    /// All students, in input order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Consumes the roster.
    pub fn into_students(self) -> Vec<Student> {
        self.students
    }
}
