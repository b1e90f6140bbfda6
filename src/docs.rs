use crate::handlers::{self, HealthResponse};
use crate::types::{OutboundCallRequest, OutboundCallResponse};

use axum::{response::Html, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Outbound Calls API", version = "1.0.0"),
    paths(handlers::health, handlers::launch_outbound_call),
    components(schemas(OutboundCallRequest, OutboundCallResponse, HealthResponse))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

const SWAGGER_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Outbound Calls API - Swagger UI</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>"##;
