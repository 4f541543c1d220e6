//! Lab session group model.
//!
//! A session group is one offered, capacity-bounded lab occurrence at a
//! fixed time slot. Enrollment is kept as non-owning [`StudentIdx`]
//! references and is only changed through the registry.

use serde::{Deserialize, Serialize};

use super::{StudentIdx, TimeSlot};

/// Stable index of a session group within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionIdx(pub usize);

/// One offered lab group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGroup {
    /// Unique session identifier.
    pub id: String,
    /// Experiment (project) taught in this group.
    pub experiment_name: String,
    /// Instructor in charge.
    pub instructor: String,
    /// Nominal maximum headcount.
    pub capacity: u32,
    /// Hours granted per assignment.
    pub credit_hours: u32,
    /// When the group meets.
    pub occupation: TimeSlot,
    #[serde(skip_deserializing)]
    enrolled: Vec<StudentIdx>,
}

impl SessionGroup {
    /// Creates an empty group with capacity 1 and 0 credit hours.
    pub fn new(id: impl Into<String>, occupation: TimeSlot) -> Self {
        Self {
            id: id.into(),
            experiment_name: String::new(),
            instructor: String::new(),
            capacity: 1,
            credit_hours: 0,
            occupation,
            enrolled: Vec::new(),
        }
    }

    /// Sets the experiment name.
    pub fn with_experiment(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = name.into();
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the credit hours.
    pub fn with_credit_hours(mut self, hours: u32) -> Self {
        self.credit_hours = hours;
        self
    }

    /// Enrolled students in commit order.
    pub fn enrolled(&self) -> &[StudentIdx] {
        &self.enrolled
    }

    /// Current headcount.
    #[inline]
    pub fn headcount(&self) -> u32 {
        self.enrolled.len() as u32
    }

    /// Open seats.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.headcount())
    }

    /// Whether no seat is left.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Fraction of seats taken (1.0 for a zero-capacity group).
    pub fn fill_rate(&self) -> f64 {
        if self.capacity == 0 {
            1.0
        } else {
            self.headcount() as f64 / self.capacity as f64
        }
    }

    pub(crate) fn enroll(&mut self, student: StudentIdx) {
        self.enrolled.push(student);
    }

    /// Swaps `old` out for `new`, keeping `new` at the end of the list.
    pub(crate) fn replace_member(&mut self, old: StudentIdx, new: StudentIdx) -> bool {
        match self.enrolled.iter().position(|s| *s == old) {
            Some(pos) => {
                self.enrolled.remove(pos);
                self.enrolled.push(new);
                true
            }
            None => false,
        }
    }
}
