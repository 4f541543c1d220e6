//! Flattens committed assignments into output rows.
//!
//! One row per `(student, group)` commit. Rows are ordered by group
//! (registry order), then by enrollment order within the group, and carry
//! the group's final headcount rather than its nominal capacity.

use serde::Serialize;

use crate::models::{format_weeks, weekday_label, StudentRoster};
use crate::registry::SessionRegistry;

/// One flat assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRow {
    /// 1-based sequence number.
    pub index: usize,
    pub faculty: String,
    pub major: String,
    pub class_name: String,
    pub student_id: String,
    pub student_name: String,
    pub experiment_name: String,
    /// Compact week list, e.g. `1-6,8`.
    pub weeks: String,
    /// Weekday label, e.g. `星期三`.
    pub weekday: String,
    pub period_start: u32,
    pub period_end: u32,
    pub instructor: String,
    /// Final number of students in the group.
    pub enrolled_count: u32,
    pub credit_hours: u32,
}

/// Builds output rows from the final allocation state.
pub fn assemble_rows(roster: &StudentRoster, registry: &SessionRegistry) -> Vec<AssignmentRow> {
    let mut rows = Vec::new();
    for (_, group) in registry.iter() {
        let slot = &group.occupation;
        let weeks = format_weeks(slot.weeks());
        let weekday = weekday_label(slot.weekday());
        for &member in group.enrolled() {
            let student = roster.get(member);
            rows.push(AssignmentRow {
                index: rows.len() + 1,
                faculty: student.faculty.clone(),
                major: student.major.clone(),
                class_name: student.class_name.clone(),
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                experiment_name: group.experiment_name.clone(),
                weeks: weeks.clone(),
                weekday: weekday.clone(),
                period_start: slot.period_start(),
                period_end: slot.period_end(),
                instructor: group.instructor.clone(),
                enrolled_count: group.headcount(),
                credit_hours: group.credit_hours,
            });
        }
    }
    rows
}

/// A student left below their required hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortfallEntry {
    pub student_id: String,
    pub name: String,
    /// Missing hours.
    pub shortfall: u32,
}

/// Under-served students: the full count plus a bounded preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShortfallReport {
    /// Number of students short of their hours.
    pub total: usize,
    /// Largest shortfalls first; equal shortfalls keep input order.
    pub preview: Vec<ShortfallEntry>,
}

impl ShortfallReport {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Collects students below their hours, keeping at most `limit` in the preview.
pub fn shortfall_report(roster: &StudentRoster, limit: usize) -> ShortfallReport {
    let mut short: Vec<ShortfallEntry> = roster
        .students()
        .iter()
        .filter(|s| !s.is_satisfied())
        .map(|s| ShortfallEntry {
            student_id: s.id.clone(),
            name: s.name.clone(),
            shortfall: s.shortfall(),
        })
        .collect();
    // stable: ties stay in input order
    short.sort_by(|a, b| b.shortfall.cmp(&a.shortfall));

    let total = short.len();
    short.truncate(limit);
    ShortfallReport {
        total,
        preview: short,
    }
}
