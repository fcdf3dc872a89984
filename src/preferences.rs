//! Preference table: complete ranked shift order per employee and day.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftPreference};
use crate::error::{Result, SchedulingError};

/// Ranked shift order for one employee, indexed by `Day::index()`.
type WeekOrder = [[Shift; 3]; 7];

/// Effective preference lists for every roster employee and every day.
///
/// Each list holds every shift exactly once: the explicitly ranked shifts in
/// rank order, then the unranked ones in canonical order.
#[derive(Debug, Clone, Default)]
pub struct PreferenceTable {
    lists: HashMap<EmployeeId, WeekOrder>,
}

impl PreferenceTable {
    /// Builds the table from raw records.
    ///
    /// Records for employees outside `roster` are ignored. Duplicate ranks,
    /// shifts ranked twice and rank 0 are rejected.
    pub fn build(roster: &[Employee], records: &[ShiftPreference]) -> Result<Self> {
        let known: HashSet<EmployeeId> = roster.iter().map(|e| e.id).collect();

        let mut ranked: HashMap<(EmployeeId, Day), BTreeMap<u32, Shift>> = HashMap::new();
        let mut ignored = 0usize;

        for record in records {
            if !known.contains(&record.employee_id) {
                ignored += 1;
                continue;
            }
            if record.rank == 0 {
                return Err(SchedulingError::InvalidRank {
                    employee: record.employee_id,
                    day: record.day,
                    rank: record.rank,
                });
            }

            let day_ranks = ranked.entry((record.employee_id, record.day)).or_default();
            if day_ranks.values().any(|&s| s == record.shift) {
                return Err(SchedulingError::DuplicateShift {
                    employee: record.employee_id,
                    day: record.day,
                    shift: record.shift,
                });
            }
            if day_ranks.insert(record.rank, record.shift).is_some() {
                return Err(SchedulingError::DuplicateRank {
                    employee: record.employee_id,
                    day: record.day,
                    rank: record.rank,
                });
            }
        }

        if ignored > 0 {
            debug!(ignored, "Dropped preferences of employees not in the roster");
        }

        let mut lists = HashMap::with_capacity(roster.len());
        for employee in roster {
            let mut week: WeekOrder = [Shift::ALL; 7];
            for day in Day::ALL {
                let explicit: Vec<Shift> = ranked
                    .get(&(employee.id, day))
                    .map(|ranks| ranks.values().copied().collect())
                    .unwrap_or_default();
                week[day.index()] = complete_order(&explicit);
            }
            lists.insert(employee.id, week);
        }

        Ok(Self { lists })
    }

    /// Effective list for `employee` on `day`.
    ///
    /// Employees the table does not know get the canonical shift order.
    pub fn effective(&self, employee: EmployeeId, day: Day) -> &[Shift] {
        match self.lists.get(&employee) {
            Some(week) => &week[day.index()],
            None => &Shift::ALL,
        }
    }

    /// Number of employees in the table.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Appends the shifts missing from `ranked` in canonical order.
///
/// ```
/// use shift_scheduling::domain::Shift;
/// use shift_scheduling::preferences::complete_order;
///
/// assert_eq!(
///     complete_order(&[Shift::Evening]),
///     [Shift::Evening, Shift::Morning, Shift::Afternoon]
/// );
/// ```
pub fn complete_order(ranked: &[Shift]) -> [Shift; 3] {
    let mut order = Shift::ALL;
    let mut filled = 0;
    for &shift in ranked.iter().chain(Shift::ALL.iter()) {
        if filled == order.len() {
            break;
        }
        if !order[..filled].contains(&shift) {
            order[filled] = shift;
            filled += 1;
        }
    }
    order
}

/// Explicit records grouped as employee → day → rank → shift.
///
/// Every roster employee is present, with an empty map when they have not
/// ranked anything.
pub fn preferences_by_employee(
    roster: &[Employee],
    records: &[ShiftPreference],
) -> BTreeMap<EmployeeId, BTreeMap<Day, BTreeMap<u32, Shift>>> {
    let mut grouped: BTreeMap<EmployeeId, BTreeMap<Day, BTreeMap<u32, Shift>>> = roster
        .iter()
        .map(|e| (e.id, BTreeMap::new()))
        .collect();

    for record in records {
        if let Some(days) = grouped.get_mut(&record.employee_id) {
            days.entry(record.day)
                .or_default()
                .insert(record.rank, record.shift);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(employee: u64, day: Day, rank: u32, shift: Shift) -> ShiftPreference {
        ShiftPreference::new(EmployeeId(employee), day, rank, shift)
    }

    #[test]
    fn test_missing_days_use_canonical_order() {
        let roster = vec![Employee::new(1, "Alice")];
        let table = PreferenceTable::build(&roster, &[]).unwrap();

        for day in Day::ALL {
            assert_eq!(table.effective(EmployeeId(1), day), &Shift::ALL);
        }
    }

    #[test]
    fn test_ranked_shifts_come_first() {
        let roster = vec![Employee::new(1, "Alice")];
        // Supplied out of rank order on purpose.
        let records = vec![
            pref(1, Day::Tue, 2, Shift::Morning),
            pref(1, Day::Tue, 1, Shift::Evening),
        ];
        let table = PreferenceTable::build(&roster, &records).unwrap();

        assert_eq!(
            table.effective(EmployeeId(1), Day::Tue),
            &[Shift::Evening, Shift::Morning, Shift::Afternoon]
        );
        assert_eq!(table.effective(EmployeeId(1), Day::Mon), &Shift::ALL);
    }

    #[test]
    fn test_rank_gaps_keep_relative_order() {
        let roster = vec![Employee::new(1, "Alice")];
        let records = vec![
            pref(1, Day::Wed, 7, Shift::Morning),
            pref(1, Day::Wed, 3, Shift::Afternoon),
        ];
        let table = PreferenceTable::build(&roster, &records).unwrap();

        assert_eq!(
            table.effective(EmployeeId(1), Day::Wed),
            &[Shift::Afternoon, Shift::Morning, Shift::Evening]
        );
    }

    #[test]
    fn test_every_list_is_complete() {
        let roster: Vec<Employee> = (1..=3).map(|i| Employee::new(i, format!("E{}", i))).collect();
        let records = vec![
            pref(1, Day::Mon, 1, Shift::Afternoon),
            pref(2, Day::Sun, 1, Shift::Evening),
            pref(2, Day::Sun, 2, Shift::Afternoon),
            pref(3, Day::Fri, 1, Shift::Morning),
            pref(3, Day::Fri, 2, Shift::Evening),
            pref(3, Day::Fri, 3, Shift::Afternoon),
        ];
        let table = PreferenceTable::build(&roster, &records).unwrap();

        for employee in &roster {
            for day in Day::ALL {
                let list = table.effective(employee.id, day);
                assert_eq!(list.len(), Shift::ALL.len());
                let unique: HashSet<_> = list.iter().collect();
                assert_eq!(unique.len(), list.len());
            }
        }
    }

    #[test]
    fn test_duplicate_rank_rejected() {
        let roster = vec![Employee::new(1, "Alice")];
        let records = vec![
            pref(1, Day::Mon, 1, Shift::Morning),
            pref(1, Day::Mon, 1, Shift::Evening),
        ];
        let err = PreferenceTable::build(&roster, &records).unwrap_err();
        assert!(matches!(err, SchedulingError::DuplicateRank { rank: 1, .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_duplicate_shift_rejected() {
        let roster = vec![Employee::new(1, "Alice")];
        let records = vec![
            pref(1, Day::Mon, 1, Shift::Morning),
            pref(1, Day::Mon, 2, Shift::Morning),
        ];
        assert!(matches!(
            PreferenceTable::build(&roster, &records),
            Err(SchedulingError::DuplicateShift { shift: Shift::Morning, .. })
        ));
    }

    #[test]
    fn test_rank_zero_rejected() {
        let roster = vec![Employee::new(1, "Alice")];
        let records = vec![pref(1, Day::Mon, 0, Shift::Morning)];
        assert!(matches!(
            PreferenceTable::build(&roster, &records),
            Err(SchedulingError::InvalidRank { .. })
        ));
    }

    #[test]
    fn test_unknown_employee_ignored() {
        let roster = vec![Employee::new(1, "Alice")];
        // Malformed too, but belongs to nobody in the roster.
        let records = vec![
            pref(9, Day::Mon, 1, Shift::Morning),
            pref(9, Day::Mon, 1, Shift::Evening),
        ];
        let table = PreferenceTable::build(&roster, &records).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_preferences_by_employee() {
        let roster = vec![Employee::new(1, "Alice"), Employee::new(2, "Bob")];
        let records = vec![
            pref(1, Day::Mon, 1, Shift::Morning),
            pref(1, Day::Mon, 2, Shift::Afternoon),
            pref(1, Day::Mon, 3, Shift::Evening),
            pref(5, Day::Mon, 1, Shift::Evening),
        ];
        let grouped = preferences_by_employee(&roster, &records);

        assert_eq!(grouped.len(), 2);
        assert!(grouped[&EmployeeId(2)].is_empty());
        assert_eq!(grouped[&EmployeeId(1)][&Day::Mon][&1], Shift::Morning);
        assert_eq!(grouped[&EmployeeId(1)][&Day::Mon][&3], Shift::Evening);
    }
}
