use axum::{extract::{Path, State}, Json};
use crate::models::RoomCapacityResponse;
use crate::state::AppState;

/// Read-only occupancy of a room, for room listings
pub async fn room_capacity(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Json<RoomCapacityResponse> {
    let admission = state.coordinator.admission();
    Json(RoomCapacityResponse {
        connections: admission.count(&room_id),
        capacity: admission.capacity(),
        has_space: admission.has_capacity(&room_id),
        room_id,
    })
}
