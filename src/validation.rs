//! Input validation for allocation runs.
//!
//! Checks structural integrity of already-built students and groups
//! before the conflict index is built. Detects:
//! - Duplicate student or session IDs
//! - Groups with zero capacity or zero credit hours
//! - Students with zero required hours

use crate::models::{SessionGroup, Student};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A group has no seats.
    ZeroCapacity,
    /// A group grants no hours.
    ZeroCreditHours,
    /// A student needs no hours.
    ZeroRequiredHours,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for an allocation run.
///
/// Checks:
/// 1. No duplicate student IDs
/// 2. No duplicate session IDs
/// 3. Every group has positive capacity and credit hours
/// 4. Every student requires a positive number of hours
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(students: &[Student], sessions: &[SessionGroup]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
        if s.required_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroRequiredHours,
                format!("Student '{}' requires zero hours", s.id),
            ));
        }
    }

    let mut session_ids = HashSet::new();
    for g in sessions {
        if !session_ids.insert(g.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate session ID: {}", g.id),
            ));
        }
        if g.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Session '{}' has zero capacity", g.id),
            ));
        }
        if g.credit_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCreditHours,
                format!("Session '{}' grants zero credit hours", g.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
