use crate::calls;
use crate::docs;
use crate::error::AppError;
use crate::types::{AppState, OutboundCallRequest, OutboundCallResponse};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

pub fn router(app_state: Arc<AppState>) -> Router {
    let mut app: Router<Arc<AppState>> = Router::new()
        .route("/health", get(health))
        .route("/calls/outbound", post(launch_outbound_call));
    if app_state.config.environment.shows_docs() {
        app = app
            .route("/openapi.json", get(docs::openapi_json))
            .route("/docs", get(docs::swagger_ui));
    }
    app.layer(TraceLayer::new_for_http()).with_state(app_state)
}

/// Container / load balancer health check.  Never looks at LiveKit.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Launch an outbound voice call.
///
/// Creates a new LiveKit room, dispatches the requested agent into it, then dials the phone
/// number over SIP and bridges the call into the room.
#[utoipa::path(
    post,
    path = "/calls/outbound",
    request_body = OutboundCallRequest,
    responses(
        (status = 201, description = "Call placed", body = OutboundCallResponse),
        (status = 422, description = "Invalid request"),
        (status = 502, description = "LiveKit failed to set up the call")
    ),
    tag = "Calls"
)]
pub async fn launch_outbound_call(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<OutboundCallRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OutboundCallResponse>), AppError> {
    let Json(request) = payload?;
    debug!(request=?request, "outbound call request");
    request.validate()?;

    let response =
        calls::launch_outbound_call(app_state.platform.as_ref(), &app_state.config, &request)
            .await?;
    info!(room=%response.room_name, "outbound call launched");
    Ok((StatusCode::CREATED, Json(response)))
}
