//! Session group registry.
//!
//! Owns the catalog of offered groups and is the only place where
//! enrollment changes. Each mutation updates both sides of the
//! student ↔ group relation in one step:
//!
//! - [`SessionRegistry::commit`]: `group.enrolled += student`,
//!   `student.assigned_sessions += group`,
//!   `student.assigned_hours += group.credit_hours`.
//! - [`SessionRegistry::swap`]: two students exchange one group each.
//!
//! No partial update is ever observable.

use log::{debug, error};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{SessionGroup, SessionIdx, StudentIdx, StudentRoster};

/// Arena of session groups with id lookup.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Vec<SessionGroup>,
    by_id: HashMap<String, SessionIdx>,
}

impl SessionRegistry {
    /// Builds a registry. Groups keep their input order.
    pub fn new(sessions: Vec<SessionGroup>) -> Self {
        let mut by_id = HashMap::with_capacity(sessions.len());
        for (i, s) in sessions.iter().enumerate() {
            by_id.entry(s.id.clone()).or_insert(SessionIdx(i));
        }
        Self { sessions, by_id }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, idx: SessionIdx) -> &SessionGroup {
        &self.sessions[idx.0]
    }

    /// Finds a group by id.
    pub fn find(&self, id: &str) -> Option<SessionIdx> {
        self.by_id.get(id).copied()
    }

    /// Iterates groups with their indices, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (SessionIdx, &SessionGroup)> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(i, s)| (SessionIdx(i), s))
    }

    /// All groups, in input order.
    pub fn sessions(&self) -> &[SessionGroup] {
        &self.sessions
    }

    /// Groups that still have an open seat, in input order.
    ///
    /// `hours_remaining` is the requesting student's outstanding need.
    /// Groups are never filtered on it: a group granting more hours than
    /// needed still closes the gap.
    pub fn available_groups(&self, hours_remaining: u32) -> Vec<SessionIdx> {
        if hours_remaining == 0 {
            return Vec::new();
        }
        self.iter()
            .filter(|(_, g)| !g.is_full())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Enrolls `student` in `session`.
    ///
    /// # Errors
    /// `CapacityExceeded` if the group is already full. The engine checks
    /// capacity right before committing, so this signals a logic bug.
    pub fn commit(
        &mut self,
        roster: &mut StudentRoster,
        student: StudentIdx,
        session: SessionIdx,
    ) -> Result<()> {
        let group = &mut self.sessions[session.0];
        if group.is_full() {
            error!(
                "commit of student {} into full session {} (capacity {})",
                roster.get(student).id,
                group.id,
                group.capacity
            );
            return Err(Error::CapacityExceeded {
                session_id: group.id.clone(),
                capacity: group.capacity,
            });
        }

        group.enroll(student);
        let s = roster.get_mut(student);
        s.record_assignment(session, group.credit_hours);
        debug!(
            "assigned {} to {} ({}h, {}/{} seats, student at {}h)",
            s.id,
            group.id,
            group.credit_hours,
            group.headcount(),
            group.capacity,
            s.assigned_hours()
        );
        Ok(())
    }

    /// Exchanges `session_a` (held by `a`) with `session_b` (held by `b`).
    ///
    /// Headcounts of both groups stay the same. Returns `false` and changes
    /// nothing if either student does not hold the stated group, if the
    /// groups are equal, or if the students are the same.
    pub fn swap(
        &mut self,
        roster: &mut StudentRoster,
        a: StudentIdx,
        session_a: SessionIdx,
        b: StudentIdx,
        session_b: SessionIdx,
    ) -> bool {
        if a == b || session_a == session_b {
            return false;
        }
        {
            let (sa, sb) = (roster.get(a), roster.get(b));
            if !sa.holds(session_a) || !sb.holds(session_b) {
                return false;
            }
            if !self.sessions[session_a.0].enrolled().contains(&a)
                || !self.sessions[session_b.0].enrolled().contains(&b)
            {
                return false;
            }
        }

        let hours_a = self.sessions[session_a.0].credit_hours;
        let hours_b = self.sessions[session_b.0].credit_hours;

        self.sessions[session_a.0].replace_member(a, b);
        self.sessions[session_b.0].replace_member(b, a);

        let (stu_a, stu_b) = roster.pair_mut(a, b);
        stu_a.replace_assignment(session_a, hours_a, session_b, hours_b);
        stu_b.replace_assignment(session_b, hours_b, session_a, hours_a);

        debug!(
            "swapped {}:{} <-> {}:{}",
            stu_a.id, self.sessions[session_a.0].id, stu_b.id, self.sessions[session_b.0].id
        );
        true
    }
}
