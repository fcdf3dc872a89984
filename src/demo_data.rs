//! Demo rosters for Shift Scheduling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{Day, Employee, EmployeeId, Shift, ShiftPreference};
use Shift::{Afternoon as A, Evening as E, Morning as M};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }
}

/// A roster with its ranked preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoRoster {
    pub employees: Vec<Employee>,
    pub preferences: Vec<ShiftPreference>,
}

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    [DemoData::Small, DemoData::Large]
        .iter()
        .map(DemoData::as_str)
        .collect()
}

/// Generates a demo roster.
pub fn generate(demo: DemoData) -> DemoRoster {
    match demo {
        DemoData::Small => small(),
        DemoData::Large => large(30),
    }
}

/// Six people with hand-written rankings; Alice and Bob vary day by day.
fn small() -> DemoRoster {
    let alice = [
        [M, A, E],
        [M, E, A],
        [A, M, E],
        [E, M, A],
        [M, A, E],
        [A, E, M],
        [E, A, M],
    ];
    let bob = [
        [A, M, E],
        [E, A, M],
        [M, E, A],
        [M, A, E],
        [A, E, M],
        [M, A, E],
        [A, M, E],
    ];
    let rankings: [(&str, [[Shift; 3]; 7]); 6] = [
        ("Alice", alice),
        ("Bob", bob),
        ("Carol", [[M, A, E]; 7]),
        ("Dave", [[E, A, M]; 7]),
        ("Eve", [[A, M, E]; 7]),
        ("Frank", [[M, E, A]; 7]),
    ];

    let mut employees = Vec::new();
    let mut preferences = Vec::new();
    for (i, (name, week)) in rankings.iter().enumerate() {
        let employee = Employee::new(i as u64 + 1, *name);
        for day in Day::ALL {
            push_ranking(&mut preferences, employee.id, day, &week[day.index()]);
        }
        employees.push(employee);
    }

    DemoRoster {
        employees,
        preferences,
    }
}

/// Seeded random roster. Roughly one day in five is left unranked.
fn large(employee_count: usize) -> DemoRoster {
    let mut rng = StdRng::seed_from_u64(0);
    let names = generate_name_permutations(&mut rng);

    let mut employees = Vec::with_capacity(employee_count);
    let mut preferences = Vec::new();
    for i in 0..employee_count {
        let employee = Employee::new(i as u64 + 1, names[i % names.len()].clone());
        for day in Day::ALL {
            if rng.gen_bool(0.2) {
                continue;
            }
            let mut order = Shift::ALL;
            order.shuffle(&mut rng);
            // Sometimes only a first choice is given.
            let ranked = if rng.gen_bool(0.25) { &order[..1] } else { &order[..] };
            push_ranking(&mut preferences, employee.id, day, ranked);
        }
        employees.push(employee);
    }

    DemoRoster {
        employees,
        preferences,
    }
}

fn push_ranking(out: &mut Vec<ShiftPreference>, employee: EmployeeId, day: Day, ranked: &[Shift]) {
    for (rank, shift) in ranked.iter().enumerate() {
        out.push(ShiftPreference::new(employee, day, rank as u32 + 1, *shift));
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay",
];
const LAST_NAMES: &[&str] = &[
    "Cole", "Fox", "Green", "Jones", "King", "Li", "Poe", "Rye", "Smith", "Watt",
];

fn generate_name_permutations(rng: &mut StdRng) -> Vec<String> {
    let mut names = Vec::with_capacity(FIRST_NAMES.len() * LAST_NAMES.len());
    for first in FIRST_NAMES {
        for last in LAST_NAMES {
            names.push(format!("{} {}", first, last));
        }
    }
    names.shuffle(rng);
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceTable;
    use std::collections::HashSet;

    #[test]
    fn test_generate_small() {
        let roster = generate(DemoData::Small);

        assert_eq!(roster.employees.len(), 6);
        // Every employee ranks all three shifts on every day.
        assert_eq!(roster.preferences.len(), 6 * 7 * 3);
        assert!(PreferenceTable::build(&roster.employees, &roster.preferences).is_ok());
    }

    #[test]
    fn test_generate_large() {
        let roster = generate(DemoData::Large);

        assert_eq!(roster.employees.len(), 30);
        let names: HashSet<_> = roster.employees.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), 30, "Demo names should be unique");
        assert!(PreferenceTable::build(&roster.employees, &roster.preferences).is_ok());
    }

    #[test]
    fn test_large_is_deterministic() {
        assert_eq!(generate(DemoData::Large), generate(DemoData::Large));
    }

    #[test]
    fn test_demo_data_from_str() {
        assert_eq!("SMALL".parse::<DemoData>(), Ok(DemoData::Small));
        assert_eq!("small".parse::<DemoData>(), Ok(DemoData::Small));
        assert_eq!("LARGE".parse::<DemoData>(), Ok(DemoData::Large));
        assert!("invalid".parse::<DemoData>().is_err());
    }

    #[test]
    fn test_listed_names_parse_back() {
        for name in list_demo_data() {
            assert_eq!(name.parse::<DemoData>().map(|d| d.as_str()), Ok(name));
        }
    }
}
