//! Read model: the week grid with employee names, for display.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftAssignment};

/// Names per (day, shift), in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleView {
    grid: [[Vec<String>; 3]; 7],
}

/// One day of the view, with each cell's names joined by ", ".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub day: Day,
    pub cells: BTreeMap<Shift, String>,
}

impl ScheduleView {
    /// Groups `assignments` by slot. Assignments of employees missing from
    /// `roster` are skipped.
    pub fn build(roster: &[Employee], assignments: &[ShiftAssignment]) -> Self {
        let names: HashMap<EmployeeId, &str> =
            roster.iter().map(|e| (e.id, e.name.as_str())).collect();

        let mut view = Self::default();
        for a in assignments {
            if let Some(name) = names.get(&a.employee_id) {
                view.grid[a.day.index()][a.shift.index()].push((*name).to_string());
            }
        }
        view
    }

    pub fn names(&self, day: Day, shift: Shift) -> &[String] {
        &self.grid[day.index()][shift.index()]
    }

    /// Seven rows, Monday first. Empty cells are empty strings.
    pub fn rows(&self) -> Vec<ScheduleRow> {
        Day::ALL
            .iter()
            .map(|&day| ScheduleRow {
                day,
                cells: Shift::ALL
                    .iter()
                    .map(|&shift| (shift, self.names(day, shift).join(", ")))
                    .collect(),
            })
            .collect()
    }

    pub fn assignment_count(&self) -> usize {
        self.grid.iter().flatten().map(Vec::len).sum()
    }
}

/// Renders the view as plain text, one block per day.
pub fn format_schedule(view: &ScheduleView) -> String {
    let rule = "=".repeat(70);
    let mut lines = vec![rule.clone(), "WEEKLY EMPLOYEE SCHEDULE".to_string(), rule.clone()];

    for day in Day::ALL {
        lines.push(format!("\n{}", day));
        lines.push("-".repeat(40));
        for shift in Shift::ALL {
            let names = view.names(day, shift);
            let cell = if names.is_empty() {
                "(none)".to_string()
            } else {
                names.join(", ")
            };
            lines.push(format!("  {:12} : {}", shift.label(), cell));
        }
    }
    lines.push(format!("\n{}", rule));
    lines.join("\n")
}
