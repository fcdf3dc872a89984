//! Domain model for weekly shift allocation.
//!
//! The week grid is fixed: seven [`Day`]s times three [`Shift`]s. Both are
//! closed enums whose declaration order is the canonical order used for
//! iteration, preference completion and forward spillover.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulingError;

/// Identity of an employee, unique within a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An employee who can be assigned to shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
}

impl Employee {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EmployeeId(id),
            name: name.into(),
        }
    }
}

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// All days in canonical order.
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// Position of this day in [`Day::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Days strictly after this one, in canonical order.
    ///
    /// ```
    /// use shift_scheduling::domain::Day;
    ///
    /// assert_eq!(Day::Fri.following().collect::<Vec<_>>(), vec![Day::Sat, Day::Sun]);
    /// assert_eq!(Day::Sun.following().count(), 0);
    /// ```
    pub fn following(self) -> impl Iterator<Item = Day> {
        Day::ALL.into_iter().skip(self.index() + 1)
    }

    /// Short display label ("Mon", "Tue", ...).
    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl FromStr for Day {
    type Err = SchedulingError;

    /// Accepts "MON", "Mon", "monday" and the other weekday spellings chrono knows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Weekday>()
            .map(Day::from)
            .map_err(|_| SchedulingError::UnknownDay(s.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shift within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    /// All shifts in canonical order.
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Evening];

    /// Position of this shift in [`Shift::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Afternoon => "Afternoon",
            Shift::Evening => "Evening",
        }
    }
}

impl FromStr for Shift {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MORNING" => Ok(Shift::Morning),
            "AFTERNOON" => Ok(Shift::Afternoon),
            "EVENING" => Ok(Shift::Evening),
            _ => Err(SchedulingError::UnknownShift(s.to_string())),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One explicit ranked choice: `employee` ranks `shift` at `rank` on `day`.
///
/// Rank 1 is the most preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPreference {
    pub employee_id: EmployeeId,
    pub day: Day,
    pub rank: u32,
    pub shift: Shift,
}

impl ShiftPreference {
    pub fn new(employee_id: EmployeeId, day: Day, rank: u32, shift: Shift) -> Self {
        Self {
            employee_id,
            day,
            rank,
            shift,
        }
    }
}

/// An employee placed on a shift for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub employee_id: EmployeeId,
    pub day: Day,
    pub shift: Shift,
}

impl ShiftAssignment {
    pub fn new(employee_id: EmployeeId, day: Day, shift: Shift) -> Self {
        Self {
            employee_id,
            day,
            shift,
        }
    }
}
