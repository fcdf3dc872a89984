//! Error type for shift scheduling.

use thiserror::Error;

use crate::domain::{Day, EmployeeId, Shift};

/// Errors raised while validating input, managing the roster or persisting
/// assignments.
///
/// Understaffing is not an error; it is reported on the allocation result.
#[derive(Error, Debug)]
pub enum SchedulingError {
    // ===== Preference validation =====
    #[error("employee {employee} ranks two shifts at rank {rank} on {day}")]
    DuplicateRank {
        employee: EmployeeId,
        day: Day,
        rank: u32,
    },

    #[error("employee {employee} ranks {shift} more than once on {day}")]
    DuplicateShift {
        employee: EmployeeId,
        day: Day,
        shift: Shift,
    },

    #[error("invalid rank {rank} for employee {employee} on {day}: ranks start at 1")]
    InvalidRank {
        employee: EmployeeId,
        day: Day,
        rank: u32,
    },

    #[error("unknown day: {0}")]
    UnknownDay(String),

    #[error("{0} is ranked more than once")]
    DuplicateDay(Day),

    #[error("unknown shift: {0}")]
    UnknownShift(String),

    #[error("expected {expected} ranked shifts for {day}, got {actual}")]
    IncompletePreferences {
        day: Day,
        expected: usize,
        actual: usize,
    },

    // ===== Roster =====
    #[error("unknown employee: {0}")]
    UnknownEmployee(EmployeeId),

    #[error("employee name must not be empty")]
    EmptyName,

    #[error("employee already exists: {0}")]
    DuplicateEmployee(String),

    // ===== Persistence =====
    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchedulingError {
    /// True for malformed caller input, as opposed to store failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SchedulingError::DuplicateRank { .. }
                | SchedulingError::DuplicateShift { .. }
                | SchedulingError::InvalidRank { .. }
                | SchedulingError::UnknownDay(_)
                | SchedulingError::DuplicateDay(_)
                | SchedulingError::UnknownShift(_)
                | SchedulingError::IncompletePreferences { .. }
                | SchedulingError::EmptyName
        )
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
