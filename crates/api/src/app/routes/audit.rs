use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, pages};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_entries))
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::AUDIT) {
        return resp;
    }

    match services.workflow().audit_trail(&principal.actor()) {
        Ok(entries) => {
            let entries: Vec<_> = entries.iter().map(dto::audit_entry_to_json).collect();
            (StatusCode::OK, Json(serde_json::Value::Array(entries))).into_response()
        }
        Err(e) => errors::workflow_error_to_response(e),
    }
}
