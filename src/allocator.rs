//! Two-pass greedy shift allocator.
//!
//! Pass 1 walks the roster in the order given and places each employee on the
//! best-ranked shift that still has room, spilling forward to later days when
//! a day is full. Employees earlier in the roster get first pick.
//!
//! Pass 2 tops up every slot below the staffing minimum with employees picked
//! uniformly at random among those still free that day.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::config::AllocationConfig;
use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftAssignment};
use crate::preferences::PreferenceTable;

/// A (day, shift) slot left below the staffing minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstaffedSlot {
    pub day: Day,
    pub shift: Shift,
    pub assigned: usize,
    pub required: usize,
}

/// Bookkeeping for a single allocation run.
///
/// Built fresh for every run and dropped once the assignments are extracted.
#[derive(Debug, Clone)]
pub struct AllocationState {
    config: AllocationConfig,
    /// Occupants per slot, indexed `[day][shift]`, in assignment order.
    slots: [[Vec<EmployeeId>; 3]; 7],
    /// Assigned shift per employee per day, indexed by `Day::index()`.
    assigned: HashMap<EmployeeId, [Option<Shift>; 7]>,
}

impl AllocationState {
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config,
            slots: Default::default(),
            assigned: HashMap::new(),
        }
    }

    /// Number of distinct days `employee` is assigned.
    pub fn days_worked(&self, employee: EmployeeId) -> usize {
        self.assigned
            .get(&employee)
            .map(|week| week.iter().filter(|s| s.is_some()).count())
            .unwrap_or(0)
    }

    /// Shift `employee` holds on `day`, if any.
    pub fn shift_on(&self, employee: EmployeeId, day: Day) -> Option<Shift> {
        self.assigned
            .get(&employee)
            .and_then(|week| week[day.index()])
    }

    /// Free on `day` and under the weekly day cap.
    pub fn is_available(&self, employee: EmployeeId, day: Day) -> bool {
        self.shift_on(employee, day).is_none()
            && self.days_worked(employee) < self.config.max_days_per_employee
    }

    pub fn occupants(&self, day: Day, shift: Shift) -> &[EmployeeId] {
        &self.slots[day.index()][shift.index()]
    }

    /// Places `employee` on the slot if they are available and it has room.
    pub fn try_assign(&mut self, employee: EmployeeId, day: Day, shift: Shift) -> bool {
        if !self.is_available(employee, day) {
            return false;
        }
        let slot = &mut self.slots[day.index()][shift.index()];
        if slot.len() >= self.config.shift_capacity {
            return false;
        }
        slot.push(employee);
        self.assigned.entry(employee).or_insert([None; 7])[day.index()] = Some(shift);
        true
    }

    /// All assignments, ordered by day, then shift, then assignment order.
    pub fn assignments(&self) -> Vec<ShiftAssignment> {
        let mut out = Vec::new();
        for day in Day::ALL {
            for shift in Shift::ALL {
                for &employee in self.occupants(day, shift) {
                    out.push(ShiftAssignment::new(employee, day, shift));
                }
            }
        }
        out
    }

    /// Slots currently below the staffing minimum.
    pub fn understaffed(&self) -> Vec<UnderstaffedSlot> {
        let required = self.config.min_employees_per_shift;
        let mut out = Vec::new();
        for day in Day::ALL {
            for shift in Shift::ALL {
                let assigned = self.occupants(day, shift).len();
                if assigned < required {
                    out.push(UnderstaffedSlot {
                        day,
                        shift,
                        assigned,
                        required,
                    });
                }
            }
        }
        out
    }
}

/// Output of one allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub assignments: Vec<ShiftAssignment>,
    pub understaffed: Vec<UnderstaffedSlot>,
}

impl Allocation {
    /// Employees on a slot, in assignment order.
    pub fn slot(&self, day: Day, shift: Shift) -> Vec<EmployeeId> {
        self.assignments
            .iter()
            .filter(|a| a.day == day && a.shift == shift)
            .map(|a| a.employee_id)
            .collect()
    }

    /// Distinct days worked by `employee`.
    pub fn days_worked(&self, employee: EmployeeId) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee)
            .map(|a| a.day)
            .collect::<HashSet<Day>>()
            .len()
    }
}

/// The allocation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator {
    config: AllocationConfig,
}

impl Allocator {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> AllocationConfig {
        self.config
    }

    /// Runs both passes over `roster` (iterated in the given order).
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        roster: &[Employee],
        table: &PreferenceTable,
        rng: &mut R,
    ) -> Allocation {
        let mut state = AllocationState::new(self.config);
        self.assign_by_preference(&mut state, roster, table);
        self.ensure_minimum_staffing(&mut state, roster, rng);

        Allocation {
            assignments: state.assignments(),
            understaffed: state.understaffed(),
        }
    }

    /// Pass 1: preference-driven placement with forward spillover.
    pub fn assign_by_preference(
        &self,
        state: &mut AllocationState,
        roster: &[Employee],
        table: &PreferenceTable,
    ) {
        for employee in roster {
            for day in Day::ALL {
                if state.days_worked(employee.id) >= self.config.max_days_per_employee {
                    break;
                }
                self.attempt_assign(state, employee.id, day, table);
            }
        }
    }

    /// Tries `day` in preference order, then each later day once.
    ///
    /// Returns where the employee was placed.
    fn attempt_assign(
        &self,
        state: &mut AllocationState,
        employee: EmployeeId,
        day: Day,
        table: &PreferenceTable,
    ) -> Option<(Day, Shift)> {
        if !state.is_available(employee, day) {
            return None;
        }

        for &shift in table.effective(employee, day) {
            if state.try_assign(employee, day, shift) {
                return Some((day, shift));
            }
        }

        for next in day.following() {
            if !state.is_available(employee, next) {
                continue;
            }
            for &shift in table.effective(employee, next) {
                if state.try_assign(employee, next, shift) {
                    debug!(
                        employee = %employee,
                        from = %day,
                        to = %next,
                        shift = %shift,
                        "Spilled over to a later day"
                    );
                    return Some((next, shift));
                }
            }
        }

        None
    }

    /// Pass 2: random backfill up to the staffing minimum.
    ///
    /// Bounded by slot capacity even when the minimum is larger.
    pub fn ensure_minimum_staffing<R: Rng + ?Sized>(
        &self,
        state: &mut AllocationState,
        roster: &[Employee],
        rng: &mut R,
    ) {
        for day in Day::ALL {
            for shift in Shift::ALL {
                while state.occupants(day, shift).len() < self.config.min_employees_per_shift
                    && state.occupants(day, shift).len() < self.config.shift_capacity
                {
                    let candidates: Vec<EmployeeId> = roster
                        .iter()
                        .map(|e| e.id)
                        .filter(|&id| state.is_available(id, day))
                        .collect();

                    let Some(&chosen) = candidates.choose(rng) else {
                        warn!(
                            day = %day,
                            shift = %shift,
                            assigned = state.occupants(day, shift).len(),
                            "No candidates left to reach minimum staffing"
                        );
                        break;
                    };

                    if !state.try_assign(chosen, day, shift) {
                        break;
                    }
                    debug!(employee = %chosen, day = %day, shift = %shift, "Backfilled slot");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShiftPreference;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(names: &[&str]) -> Vec<Employee> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Employee::new(i as u64 + 1, *name))
            .collect()
    }

    fn same_every_day(roster: &[Employee], order: [Shift; 3]) -> Vec<ShiftPreference> {
        let mut records = Vec::new();
        for employee in roster {
            for day in Day::ALL {
                for (rank, shift) in order.iter().enumerate() {
                    records.push(ShiftPreference::new(employee.id, day, rank as u32 + 1, *shift));
                }
            }
        }
        records
    }

    fn run(roster: &[Employee], records: &[ShiftPreference], seed: u64) -> Allocation {
        let table = PreferenceTable::build(roster, records).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        Allocator::default().allocate(roster, &table, &mut rng)
    }

    fn assert_invariants(allocation: &Allocation) {
        let mut per_day = HashSet::new();
        let mut days: HashMap<EmployeeId, HashSet<Day>> = HashMap::new();
        for a in &allocation.assignments {
            assert!(per_day.insert((a.employee_id, a.day)), "two shifts on one day: {:?}", a);
            days.entry(a.employee_id).or_default().insert(a.day);
        }
        for (employee, worked) in days {
            assert!(worked.len() <= 5, "employee {} works {} days", employee, worked.len());
        }
        for day in Day::ALL {
            for shift in Shift::ALL {
                assert!(allocation.slot(day, shift).len() <= 2);
            }
        }
    }

    #[test]
    fn test_empty_roster() {
        let allocation = run(&[], &[], 0);
        assert!(allocation.assignments.is_empty());
        assert_eq!(allocation.understaffed.len(), 21);
    }

    #[test]
    fn test_two_people_capped_before_weekend() {
        let people = roster(&["A", "B"]);
        let records = same_every_day(&people, [Shift::Morning, Shift::Afternoon, Shift::Evening]);
        let allocation = run(&people, &records, 7);

        assert_invariants(&allocation);
        for day in [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri] {
            assert_eq!(
                allocation.slot(day, Shift::Morning),
                vec![EmployeeId(1), EmployeeId(2)]
            );
            assert!(allocation.slot(day, Shift::Afternoon).is_empty());
            assert!(allocation.slot(day, Shift::Evening).is_empty());
        }
        for day in [Day::Sat, Day::Sun] {
            for shift in Shift::ALL {
                assert!(allocation.slot(day, shift).is_empty());
            }
        }
        assert_eq!(allocation.days_worked(EmployeeId(1)), 5);
        assert_eq!(allocation.days_worked(EmployeeId(2)), 5);
    }

    #[test]
    fn test_four_people_identical_ranking() {
        let people = roster(&["A", "B", "C", "D"]);
        let records = same_every_day(&people, [Shift::Morning, Shift::Afternoon, Shift::Evening]);
        let allocation = run(&people, &records, 11);

        assert_invariants(&allocation);
        for day in [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri] {
            assert_eq!(allocation.slot(day, Shift::Morning), vec![EmployeeId(1), EmployeeId(2)]);
            assert_eq!(allocation.slot(day, Shift::Afternoon), vec![EmployeeId(3), EmployeeId(4)]);
            // Everyone already works that day, nobody is left to backfill.
            assert!(allocation.slot(day, Shift::Evening).is_empty());
        }
        for day in [Day::Sat, Day::Sun] {
            for shift in Shift::ALL {
                assert!(allocation.slot(day, shift).is_empty(), "{} {} not empty", day, shift);
            }
        }
        for employee in &people {
            assert_eq!(allocation.days_worked(employee.id), 5);
        }
    }

    #[test]
    fn test_spillover_moves_to_next_day() {
        let config = AllocationConfig {
            shift_capacity: 1,
            min_employees_per_shift: 0,
            max_days_per_employee: 1,
        };
        let people = roster(&["A", "B", "C", "D"]);
        let table = PreferenceTable::build(&people, &[]).unwrap();
        let mut state = AllocationState::new(config);
        Allocator::new(config).assign_by_preference(&mut state, &people, &table);

        // Monday fills up after three people; the fourth spills to Tuesday.
        assert_eq!(state.shift_on(EmployeeId(1), Day::Mon), Some(Shift::Morning));
        assert_eq!(state.shift_on(EmployeeId(2), Day::Mon), Some(Shift::Afternoon));
        assert_eq!(state.shift_on(EmployeeId(3), Day::Mon), Some(Shift::Evening));
        assert_eq!(state.shift_on(EmployeeId(4), Day::Mon), None);
        assert_eq!(state.shift_on(EmployeeId(4), Day::Tue), Some(Shift::Morning));
    }

    #[test]
    fn test_spillover_uses_that_days_ranking() {
        let config = AllocationConfig {
            shift_capacity: 1,
            min_employees_per_shift: 0,
            max_days_per_employee: 1,
        };
        let people = roster(&["A", "B", "C", "D"]);
        let records = vec![ShiftPreference::new(EmployeeId(4), Day::Tue, 1, Shift::Evening)];
        let table = PreferenceTable::build(&people, &records).unwrap();
        let mut state = AllocationState::new(config);
        Allocator::new(config).assign_by_preference(&mut state, &people, &table);

        assert_eq!(state.shift_on(EmployeeId(4), Day::Tue), Some(Shift::Evening));
    }

    #[test]
    fn test_weekend_filled_by_spillover() {
        let people: Vec<Employee> = (1..=12).map(|i| Employee::new(i, format!("E{}", i))).collect();
        let allocation = run(&people, &[], 3);

        assert_invariants(&allocation);
        for day in Day::ALL {
            for shift in Shift::ALL {
                assert_eq!(allocation.slot(day, shift).len(), 2, "{} {}", day, shift);
            }
        }
        // The seventh employee finds Monday to Friday full and lands on the weekend.
        assert_eq!(allocation.slot(Day::Sat, Shift::Morning), vec![EmployeeId(7), EmployeeId(8)]);
        assert!(allocation.understaffed.is_empty());
    }

    #[test]
    fn test_backfill_reaches_minimum() {
        let people: Vec<Employee> = (1..=14).map(|i| Employee::new(i, format!("E{}", i))).collect();
        let allocator = Allocator::default();
        let mut state = AllocationState::new(allocator.config());
        let mut rng = StdRng::seed_from_u64(21);

        // Skip pass 1 so every seat is filled at random.
        allocator.ensure_minimum_staffing(&mut state, &people, &mut rng);

        for day in Day::ALL {
            for shift in Shift::ALL {
                assert_eq!(state.occupants(day, shift).len(), 2, "{} {}", day, shift);
            }
        }
        for employee in &people {
            assert!(state.days_worked(employee.id) <= 5);
        }
        assert!(state.understaffed().is_empty());
    }

    #[test]
    fn test_backfill_is_seeded() {
        let people = roster(&["A", "B", "C", "D", "E", "F", "G"]);
        let first = run(&people, &[], 99);
        let second = run(&people, &[], 99);
        assert_eq!(first, second);
    }

    #[test]
    fn test_backfill_bounded_by_capacity() {
        let config = AllocationConfig {
            shift_capacity: 1,
            min_employees_per_shift: 3,
            max_days_per_employee: 7,
        };
        let people = roster(&["A", "B", "C", "D", "E", "F"]);
        let table = PreferenceTable::build(&people, &[]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let allocation = Allocator::new(config).allocate(&people, &table, &mut rng);

        for day in Day::ALL {
            for shift in Shift::ALL {
                assert_eq!(allocation.slot(day, shift).len(), 1);
            }
        }
        assert_eq!(allocation.understaffed.len(), 21);
    }

    #[test]
    fn test_understaffed_reported() {
        let people = roster(&["Solo"]);
        let allocation = run(&people, &[], 1);

        assert_eq!(allocation.assignments.len(), 5);
        assert_eq!(allocation.understaffed.len(), 21);
        assert!(allocation
            .understaffed
            .iter()
            .all(|slot| slot.required == 2 && slot.assigned <= 1));
    }

    #[test]
    fn test_days_worked_counts_distinct_days() {
        let allocation = Allocation {
            assignments: vec![
                ShiftAssignment::new(EmployeeId(1), Day::Mon, Shift::Morning),
                ShiftAssignment::new(EmployeeId(1), Day::Mon, Shift::Evening),
                ShiftAssignment::new(EmployeeId(1), Day::Wed, Shift::Morning),
                ShiftAssignment::new(EmployeeId(2), Day::Mon, Shift::Morning),
            ],
            understaffed: vec![],
        };

        assert_eq!(allocation.days_worked(EmployeeId(1)), 2);
        assert_eq!(allocation.days_worked(EmployeeId(2)), 1);
        assert_eq!(allocation.days_worked(EmployeeId(3)), 0);
    }
}
