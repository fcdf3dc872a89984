//! Roster, preference and assignment storage.
//!
//! The allocator only sees the two traits: [`RosterSource`] (read-only input)
//! and [`AssignmentSink`] (replaced wholesale on every run).
//! [`ScheduleStore`] implements both, in memory or backed by a JSON snapshot.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftAssignment, ShiftPreference};
use crate::error::{Result, SchedulingError};

/// Supplies the roster and the ranked preferences.
pub trait RosterSource: Send + Sync {
    /// Employees in the order the allocator should visit them.
    fn employees(&self) -> Result<Vec<Employee>>;

    fn preferences(&self) -> Result<Vec<ShiftPreference>>;
}

/// Computes a new assignment set from a roster and its preferences.
pub type Plan<'a> =
    dyn FnMut(&[Employee], &[ShiftPreference]) -> Result<Vec<ShiftAssignment>> + 'a;

/// Receives the output of a run.
pub trait AssignmentSink: Send + Sync {
    /// Runs `plan` against the current roster and preferences and replaces
    /// the whole assignment set with its result, as one step.
    ///
    /// Roster and preference changes cannot land between the read and the
    /// write. Readers see either the old or the new set, never a mix. When
    /// `plan` fails nothing is written.
    fn regenerate(&self, plan: &mut Plan<'_>) -> Result<()>;

    fn assignments(&self) -> Result<Vec<ShiftAssignment>>;
}

/// Everything the store holds. Also the on-disk snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreState {
    next_id: u64,
    employees: Vec<Employee>,
    preferences: Vec<ShiftPreference>,
    assignments: Vec<ShiftAssignment>,
}

impl StoreState {
    fn contains(&self, id: EmployeeId) -> bool {
        self.employees.iter().any(|e| e.id == id)
    }

    fn add_employee(&mut self, name: &str) -> Result<Employee> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchedulingError::EmptyName);
        }
        let lowered = name.to_lowercase();
        if self.employees.iter().any(|e| e.name.to_lowercase() == lowered) {
            return Err(SchedulingError::DuplicateEmployee(name.to_string()));
        }

        self.next_id = self.next_id.max(self.employees.iter().map(|e| e.id.0).max().unwrap_or(0)) + 1;
        let employee = Employee::new(self.next_id, name);
        self.employees.push(employee.clone());
        Ok(employee)
    }

    fn remove_employee(&mut self, id: EmployeeId) -> Result<()> {
        if !self.contains(id) {
            return Err(SchedulingError::UnknownEmployee(id));
        }
        self.employees.retain(|e| e.id != id);
        self.preferences.retain(|p| p.employee_id != id);
        self.assignments.retain(|a| a.employee_id != id);
        Ok(())
    }

    fn save_preferences(&mut self, id: EmployeeId, ranking: &BTreeMap<Day, Vec<Shift>>) -> Result<()> {
        if !self.contains(id) {
            return Err(SchedulingError::UnknownEmployee(id));
        }

        let mut records = Vec::new();
        for (&day, choices) in ranking {
            if choices.is_empty() {
                continue;
            }
            if choices.len() != Shift::ALL.len() {
                return Err(SchedulingError::IncompletePreferences {
                    day,
                    expected: Shift::ALL.len(),
                    actual: choices.len(),
                });
            }
            for (i, &shift) in choices.iter().enumerate() {
                if choices[..i].contains(&shift) {
                    return Err(SchedulingError::DuplicateShift {
                        employee: id,
                        day,
                        shift,
                    });
                }
                records.push(ShiftPreference::new(id, day, i as u32 + 1, shift));
            }
        }

        self.preferences.retain(|p| p.employee_id != id);
        self.preferences.extend(records);
        Ok(())
    }
}

/// Store for employees, preferences and assignments.
///
/// Employees are returned in ascending id order. Ids are handed out
/// incrementally, so this is also insertion order, and it is the order the
/// allocator visits them in.
///
/// # Examples
///
/// ```
/// use shift_scheduling::store::{RosterSource, ScheduleStore};
///
/// let store = ScheduleStore::in_memory();
/// let alice = store.add_employee("Alice").unwrap();
/// assert!(store.add_employee("alice").is_err());
/// assert_eq!(store.employees().unwrap(), vec![alice]);
/// ```
pub struct ScheduleStore {
    state: RwLock<StoreState>,
    snapshot: Option<PathBuf>,
}

impl ScheduleStore {
    /// Store without persistence.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            snapshot: None,
        }
    }

    /// Store persisted as a JSON snapshot at `path`, loaded if it exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let state: StoreState = serde_json::from_str(&raw)?;
            info!(
                path = %path.display(),
                employees = state.employees.len(),
                assignments = state.assignments.len(),
                "Loaded schedule snapshot"
            );
            state
        } else {
            StoreState::default()
        };

        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
        })
    }

    /// File the store persists to, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Trims `name` and adds a new employee. Names are unique ignoring case.
    pub fn add_employee(&self, name: &str) -> Result<Employee> {
        self.mutate(|state| state.add_employee(name))
    }

    /// Removes an employee together with their preferences and assignments.
    pub fn remove_employee(&self, id: EmployeeId) -> Result<()> {
        self.mutate(|state| state.remove_employee(id))
    }

    /// Replaces all of an employee's ranked preferences.
    ///
    /// Each day maps to the shifts in rank order and must name all three
    /// shifts once; days with no choices are left unranked.
    pub fn save_preferences(&self, id: EmployeeId, ranking: &BTreeMap<Day, Vec<Shift>>) -> Result<()> {
        self.mutate(|state| state.save_preferences(id, ranking))
    }

    /// Applies `op` to a copy of the state, persists it, then swaps it in.
    ///
    /// A failed operation or a failed write leaves the store untouched.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let out = op(&mut next)?;
        if let Some(path) = &self.snapshot {
            write_snapshot(path, &next)?;
        }
        *guard = next;
        Ok(out)
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StoreState {
    fn sorted_employees(&self) -> Vec<Employee> {
        let mut employees = self.employees.clone();
        employees.sort_by_key(|e| e.id);
        employees
    }
}

impl RosterSource for ScheduleStore {
    fn employees(&self) -> Result<Vec<Employee>> {
        Ok(self.state.read().sorted_employees())
    }

    fn preferences(&self) -> Result<Vec<ShiftPreference>> {
        Ok(self.state.read().preferences.clone())
    }
}

impl AssignmentSink for ScheduleStore {
    /// Holds the write lock from reading the roster until the new set is
    /// stored, so a removal either cascades over the new set or is seen by
    /// the plan.
    fn regenerate(&self, plan: &mut Plan<'_>) -> Result<()> {
        self.mutate(|state| {
            let roster = state.sorted_employees();
            state.assignments = plan(&roster, &state.preferences)?;
            Ok(())
        })
    }

    fn assignments(&self) -> Result<Vec<ShiftAssignment>> {
        Ok(self.state.read().assignments.clone())
    }
}

/// Writes through a sibling temp file and renames it over `path`.
fn write_snapshot(path: &Path, state: &StoreState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "Wrote schedule snapshot");
    Ok(())
}
