//! Schedule regeneration.
//!
//! A generation reads the roster and preferences, builds the preference
//! table, runs the allocator and replaces the stored assignments. All of it
//! runs inside one [`AssignmentSink::regenerate`] call, so roster edits never
//! interleave with a run.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::allocator::{Allocator, UnderstaffedSlot};
use crate::config::AllocationConfig;
use crate::domain::{Day, EmployeeId, Shift};
use crate::error::Result;
use crate::preferences::{preferences_by_employee, PreferenceTable};
use crate::store::{AssignmentSink, RosterSource};
use crate::view::ScheduleView;

/// Summary of one `generate` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub employee_count: usize,
    pub assignment_count: usize,
    pub understaffed: Vec<UnderstaffedSlot>,
}

/// Runs generations against a store.
///
/// Generations are serialized: a second `generate` waits for the first to
/// finish writing.
pub struct SchedulingService<S> {
    store: Arc<S>,
    allocator: Allocator,
    generation: Mutex<()>,
}

impl<S> SchedulingService<S>
where
    S: RosterSource + AssignmentSink,
{
    pub fn new(store: Arc<S>, config: AllocationConfig) -> Self {
        Self {
            store,
            allocator: Allocator::new(config),
            generation: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Regenerates the schedule with a thread-local entropy source.
    pub fn generate(&self) -> Result<GenerationReport> {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    /// Regenerates the schedule, drawing backfill choices from `rng`.
    ///
    /// On a validation error nothing is written and the previous assignments
    /// stay in place.
    #[instrument(skip_all)]
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GenerationReport> {
        let _guard = self.generation.lock();

        let mut employee_count = 0;
        let mut assignment_count = 0;
        let mut understaffed = Vec::new();
        self.store.regenerate(&mut |roster, records| {
            let table = PreferenceTable::build(roster, records)?;
            let allocation = self.allocator.allocate(roster, &table, &mut *rng);

            employee_count = roster.len();
            assignment_count = allocation.assignments.len();
            understaffed = allocation.understaffed;
            Ok(allocation.assignments)
        })?;

        let report = GenerationReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            employee_count,
            assignment_count,
            understaffed,
        };

        info!(
            run_id = %report.run_id,
            employees = report.employee_count,
            assignments = report.assignment_count,
            understaffed = report.understaffed.len(),
            "Schedule generated"
        );
        Ok(report)
    }

    /// Current assignments as a day/shift grid of names.
    pub fn schedule_view(&self) -> Result<ScheduleView> {
        let roster = self.store.employees()?;
        let assignments = self.store.assignments()?;
        Ok(ScheduleView::build(&roster, &assignments))
    }

    /// Explicit ranked preferences grouped per employee.
    pub fn preferences_by_employee(
        &self,
    ) -> Result<BTreeMap<EmployeeId, BTreeMap<Day, BTreeMap<u32, Shift>>>> {
        let roster = self.store.employees()?;
        let records = self.store.preferences()?;
        Ok(preferences_by_employee(&roster, &records))
    }
}
