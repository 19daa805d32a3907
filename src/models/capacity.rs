use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Live occupancy of a room, as seen by the admission controller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomCapacityResponse {
    pub room_id: String,
    pub connections: usize,
    pub capacity: usize,
    pub has_space: bool,
}
