//! DTOs for REST API requests/responses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::allocator::Allocation;
use crate::config::AllocationConfig;
use crate::demo_data::DemoRoster;
use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftPreference};
use crate::error::{Result, SchedulingError};
use crate::view::{ScheduleRow, ScheduleView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: u64,
    pub name: String,
}

impl From<&Employee> for EmployeeDto {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id.0,
            name: e.name.clone(),
        }
    }
}

impl EmployeeDto {
    pub fn to_employee(&self) -> Employee {
        Employee::new(self.id, self.name.clone())
    }
}

/// Body of `POST /employees`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployeeDto {
    pub name: String,
}

/// Body of `PUT /employees/{id}/preferences`.
///
/// Day tokens map to shift tokens in rank order, e.g.
/// `{"MON": ["EVENING", "MORNING", "AFTERNOON"]}`. Blank tokens are dropped,
/// so a day of blanks is left unranked. Two tokens naming the same day
/// (`"MON"` and `"monday"`) are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PreferencesDto(pub BTreeMap<String, Vec<String>>);

impl PreferencesDto {
    pub fn to_ranking(&self) -> Result<BTreeMap<Day, Vec<Shift>>> {
        let mut ranking = BTreeMap::new();
        for (day, shifts) in &self.0 {
            let day: Day = day.parse()?;
            let shifts = shifts
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Shift>())
                .collect::<Result<Vec<_>>>()?;
            if ranking.insert(day, shifts).is_some() {
                return Err(SchedulingError::DuplicateDay(day));
            }
        }
        Ok(ranking)
    }
}

/// Stored schedule, one row per day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    pub rows: Vec<ScheduleRow>,
    pub assignment_count: usize,
}

impl From<&ScheduleView> for ScheduleDto {
    fn from(view: &ScheduleView) -> Self {
        Self {
            rows: view.rows(),
            assignment_count: view.assignment_count(),
        }
    }
}

/// A self-contained roster: used by the demo endpoints and `POST /schedule/preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDto {
    pub employees: Vec<EmployeeDto>,
    #[serde(default)]
    pub preferences: Vec<ShiftPreference>,
    /// Overrides the server's allocation limits for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AllocationConfig>,
    /// Seed for the backfill pass, for reproducible previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl From<&DemoRoster> for RosterDto {
    fn from(roster: &DemoRoster) -> Self {
        Self {
            employees: roster.employees.iter().map(EmployeeDto::from).collect(),
            preferences: roster.preferences.clone(),
            config: None,
            seed: None,
        }
    }
}

impl RosterDto {
    /// Employees in ascending id order. Duplicate ids are rejected.
    pub fn to_employees(&self) -> Result<Vec<Employee>> {
        let mut employees: Vec<Employee> = self.employees.iter().map(EmployeeDto::to_employee).collect();
        employees.sort_by_key(|e| e.id);
        if let Some(pair) = employees.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(SchedulingError::DuplicateEmployee(pair[1].name.clone()));
        }
        Ok(employees)
    }
}

/// Response of `POST /schedule/preview`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub allocation: Allocation,
    pub rows: Vec<ScheduleRow>,
}

/// Ranked preferences keyed by employee id, then day, then rank.
pub type PreferencesByEmployee = BTreeMap<EmployeeId, BTreeMap<Day, BTreeMap<u32, Shift>>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
