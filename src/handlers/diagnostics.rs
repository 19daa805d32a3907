use crate::{models::DiagnosticsResponse, state::AppState};
use axum::{extract::State, Json};
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Connection, document and host statistics
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let admission = state.coordinator.admission();
    let n_conn = admission.total_connections() as u32;
    let n_rooms = admission.tracked_rooms() as u32;
    let room_capacity = admission.capacity() as u32;
    let n_open_docs = state.hub.open_documents().await as u32;
    let n_pending_syncs = state.hub.pending_syncs().await as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {}, Docs: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_rooms,
        n_open_docs
    );

    Json(DiagnosticsResponse {
        n_conn,
        n_rooms,
        n_open_docs,
        n_pending_syncs,
        room_capacity,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
