use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use paperstock_core::RequestId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, pages};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_requests))
        .route("/:id/decide", post(decide_request))
}

pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::APPROVALS) {
        return resp;
    }

    let requests: Vec<_> = services
        .workflow()
        .store()
        .change_requests()
        .iter()
        .map(dto::change_request_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(requests))).into_response()
}

pub async fn decide_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DecisionRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::APPROVALS) {
        return resp;
    }

    let request_id: RequestId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .workflow()
        .decide_change(&principal.actor(), request_id, body.decision)
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": request_id.to_string(),
                "decision": body.decision,
            })),
        )
            .into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
