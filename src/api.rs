//! REST API handlers for Shift Scheduling.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::allocator::Allocator;
use crate::config::AllocationConfig;
use crate::demo_data::{self, DemoData};
use crate::domain::EmployeeId;
use crate::dto::{
    EmployeeDto, ErrorResponse, NewEmployeeDto, PreferencesByEmployee, PreferencesDto,
    PreviewResponse, RosterDto, ScheduleDto,
};
use crate::error::{Result, SchedulingError};
use crate::preferences::PreferenceTable;
use crate::service::{GenerationReport, SchedulingService};
use crate::store::{RosterSource, ScheduleStore};
use crate::view::{format_schedule, ScheduleView};

/// Application state shared across handlers.
pub struct AppState {
    service: SchedulingService<ScheduleStore>,
    config: AllocationConfig,
    /// Fixed backfill RNG when the server runs with a seed.
    rng: Option<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(store: Arc<ScheduleStore>, config: AllocationConfig, seed: Option<u64>) -> Self {
        Self {
            service: SchedulingService::new(store, config),
            config,
            rng: seed.map(|seed| Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn store(&self) -> &ScheduleStore {
        self.service.store()
    }

    fn generate(&self) -> Result<GenerationReport> {
        match &self.rng {
            Some(rng) => self.service.generate_with_rng(&mut *rng.lock()),
            None => self.service.generate(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(ScheduleStore::in_memory()), AllocationConfig::default(), None)
    }
}

// ============================================================================
// Errors
// ============================================================================

impl IntoResponse for SchedulingError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            SchedulingError::UnknownEmployee(_) => StatusCode::NOT_FOUND,
            SchedulingError::DuplicateEmployee(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

// ============================================================================
// Router and Handlers
// ============================================================================

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & Info
        .route("/health", get(health))
        .route("/info", get(info))
        // Demo data
        .route("/demo-data", get(list_demo_data))
        .route("/demo-data/{id}", get(get_demo_data))
        // Roster
        .route("/employees", get(list_employees))
        .route("/employees", post(create_employee))
        .route("/employees/{id}", delete(delete_employee))
        .route("/employees/{id}/preferences", put(save_preferences))
        .route("/preferences", get(get_preferences))
        // Schedule
        .route("/schedule", get(get_schedule))
        .route("/schedule/text", get(get_schedule_text))
        .route("/schedule/generate", post(generate_schedule))
        .route("/schedule/preview", post(preview_schedule))
        .with_state(state)
}

// ============================================================================
// Health & Info
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health - Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub allocation: AllocationConfig,
}

/// GET /info - Application info endpoint.
async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Shift Scheduling",
        version: env!("CARGO_PKG_VERSION"),
        allocation: state.config,
    })
}

/// GET /demo-data - List available demo data sets.
async fn list_demo_data() -> Json<Vec<&'static str>> {
    Json(demo_data::list_demo_data())
}

/// GET /demo-data/{id} - Get a specific demo roster.
async fn get_demo_data(Path(id): Path<String>) -> std::result::Result<Json<RosterDto>, StatusCode> {
    match id.parse::<DemoData>() {
        Ok(demo) => Ok(Json(RosterDto::from(&demo_data::generate(demo)))),
        Err(_) => Err(StatusCode::NOT_FOUND),
    }
}

// ============================================================================
// Roster
// ============================================================================

/// GET /employees - List employees in allocation order.
async fn list_employees(State(state): State<Arc<AppState>>) -> Result<Json<Vec<EmployeeDto>>> {
    let employees = state.store().employees()?;
    Ok(Json(employees.iter().map(EmployeeDto::from).collect()))
}

/// POST /employees - Add an employee.
async fn create_employee(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewEmployeeDto>,
) -> Result<(StatusCode, Json<EmployeeDto>)> {
    let employee = state.store().add_employee(&body.name)?;
    Ok((StatusCode::CREATED, Json(EmployeeDto::from(&employee))))
}

/// DELETE /employees/{id} - Remove an employee with their preferences and assignments.
async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.store().remove_employee(EmployeeId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /employees/{id}/preferences - Replace an employee's ranked preferences.
async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<PreferencesDto>,
) -> Result<StatusCode> {
    let ranking = body.to_ranking()?;
    state.store().save_preferences(EmployeeId(id), &ranking)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /preferences - Ranked preferences per employee, day and rank.
async fn get_preferences(State(state): State<Arc<AppState>>) -> Result<Json<PreferencesByEmployee>> {
    Ok(Json(state.service.preferences_by_employee()?))
}

// ============================================================================
// Schedule
// ============================================================================

/// GET /schedule - Stored schedule as day rows.
async fn get_schedule(State(state): State<Arc<AppState>>) -> Result<Json<ScheduleDto>> {
    let view = state.service.schedule_view()?;
    Ok(Json(ScheduleDto::from(&view)))
}

/// GET /schedule/text - Stored schedule as plain text.
async fn get_schedule_text(State(state): State<Arc<AppState>>) -> Result<String> {
    Ok(format_schedule(&state.service.schedule_view()?))
}

/// POST /schedule/generate - Regenerate and replace the stored schedule.
async fn generate_schedule(State(state): State<Arc<AppState>>) -> Result<Json<GenerationReport>> {
    let report = tokio::task::spawn_blocking(move || state.generate())
        .await
        .map_err(|e| SchedulingError::Store(format!("generation task failed: {}", e)))??;
    Ok(Json(report))
}

/// POST /schedule/preview - Allocate a posted roster without touching the store.
async fn preview_schedule(Json(dto): Json<RosterDto>) -> Result<Json<PreviewResponse>> {
    let roster = dto.to_employees()?;
    let table = PreferenceTable::build(&roster, &dto.preferences)?;
    let allocator = Allocator::new(dto.config.unwrap_or_default());

    let allocation = match dto.seed {
        Some(seed) => allocator.allocate(&roster, &table, &mut StdRng::seed_from_u64(seed)),
        None => allocator.allocate(&roster, &table, &mut rand::thread_rng()),
    };
    let rows = ScheduleView::build(&roster, &allocation.assignments).rows();

    Ok(Json(PreviewResponse { allocation, rows }))
}
