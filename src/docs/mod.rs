use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Store is reachable", body = ReadyResponse),
        (status = 503, description = "Store is unreachable", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Live occupancy of a room
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/capacity",
    params(
        ("room_id" = String, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Current connections against capacity", body = RoomCapacityResponse)
    )
)]
#[allow(dead_code)]
pub async fn room_capacity_doc() {}

/// Server diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Connection and host statistics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Collaboration WebSocket
#[utoipa::path(
    get,
    path = "/collab/{document_name}",
    params(
        ("document_name" = String, Path, description = "Session identifier `roomId::filePath`")
    ),
    responses(
        (status = 101, description = "Upgraded to the collaboration socket"),
        (status = 400, description = "Malformed session identifier", body = ErrorResponse),
        (status = 404, description = "Room missing or inactive", body = ErrorResponse),
        (status = 409, description = "Room is full", body = ErrorResponse),
        (status = 503, description = "Room store unavailable", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn collab_socket_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        room_capacity_doc,
        diagnostics_doc,
        collab_socket_doc,
    ),
    components(
        schemas(HealthResponse, ReadyResponse, RoomCapacityResponse, DiagnosticsResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
