//! Shift Scheduling - Axum Server
//!
//! Run with: cargo run
//! Then open: http://localhost:7860
//!
//! `cargo run -- demo` prints a schedule for the small demo roster and exits.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use shift_scheduling::allocator::Allocator;
use shift_scheduling::config::{AllocationConfig, ServerConfig};
use shift_scheduling::demo_data::{self, DemoData};
use shift_scheduling::preferences::PreferenceTable;
use shift_scheduling::store::ScheduleStore;
use shift_scheduling::view::{format_schedule, ScheduleView};
use shift_scheduling::{api, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let config = ServerConfig::from_env();

    if std::env::args().nth(1).as_deref() == Some("demo") {
        return print_demo(config.seed);
    }

    let store = match &config.data_file {
        Some(path) => ScheduleStore::open(path)?,
        None => ScheduleStore::in_memory(),
    };
    match store.snapshot_path() {
        Some(path) => info!(path = %path.display(), "Persisting schedule to snapshot"),
        None => info!("Schedule kept in memory only"),
    }
    let state = Arc::new(api::AppState::new(
        Arc::new(store),
        AllocationConfig::default(),
        config.seed,
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");

    let app = api::router(state)
        .fallback_service(ServeDir::new(static_path))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn print_demo(seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let roster = demo_data::generate(DemoData::Small);
    let table = PreferenceTable::build(&roster.employees, &roster.preferences)?;
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(0));

    let allocation = Allocator::default().allocate(&roster.employees, &table, &mut rng);
    let view = ScheduleView::build(&roster.employees, &allocation.assignments);
    println!("{}", format_schedule(&view));

    for slot in &allocation.understaffed {
        println!(
            "Understaffed: {} {} ({}/{})",
            slot.day, slot.shift, slot.assigned, slot.required
        );
    }
    Ok(())
}
