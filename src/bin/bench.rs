//! Benchmark for allocation throughput.
//!
//! Run with: cargo run --release --bin bench

use rand::rngs::StdRng;
use rand::SeedableRng;
use shift_scheduling::allocator::Allocator;
use shift_scheduling::demo_data;
use shift_scheduling::preferences::PreferenceTable;
use std::time::Instant;

const RUNS: u64 = 10_000;

fn main() {
    let roster = demo_data::generate(demo_data::DemoData::Large);

    println!("Benchmark: Weekly Allocation");
    println!("  Employees: {}", roster.employees.len());
    println!("  Preference records: {}", roster.preferences.len());
    println!();

    let build_start = Instant::now();
    let table = match PreferenceTable::build(&roster.employees, &roster.preferences) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Invalid demo preferences: {}", e);
            std::process::exit(1);
        }
    };
    println!("Preference table: {} lists in {:?}", table.len(), build_start.elapsed());
    println!();

    let allocator = Allocator::default();
    let reference = allocator.allocate(&roster.employees, &table, &mut StdRng::seed_from_u64(0));

    let bench_start = Instant::now();
    let mut assignments: u64 = 0;
    for seed in 0..RUNS {
        let allocation = allocator.allocate(&roster.employees, &table, &mut StdRng::seed_from_u64(seed));
        assignments += allocation.assignments.len() as u64;
    }

    let elapsed = bench_start.elapsed();
    let runs_per_sec = RUNS as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Runs: {}", RUNS);
    println!("  Time: {:.2?}", elapsed);
    println!("  Runs/sec: {:.0}", runs_per_sec);
    println!("  Mean assignments: {:.1}", assignments as f64 / RUNS as f64);

    // Same seed, same schedule.
    let again = allocator.allocate(&roster.employees, &table, &mut StdRng::seed_from_u64(0));
    assert_eq!(reference, again, "Allocation is not deterministic!");
    println!("  Understaffed (seed 0): {} (verified)", reference.understaffed.len());

    let busiest = roster
        .employees
        .iter()
        .map(|e| reference.days_worked(e.id))
        .max()
        .unwrap_or(0);
    assert!(
        busiest <= allocator.config().max_days_per_employee,
        "Day cap exceeded!"
    );
    println!("  Busiest employee (seed 0): {} days (verified)", busiest);
}
