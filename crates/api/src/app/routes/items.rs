use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use paperstock_approvals::ChangeAction;
use paperstock_core::ItemId;
use paperstock_store::ChangeOutcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, pages};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/reorder-alerts", get(reorder_alerts))
        .route(
            "/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let items: Vec<_> = services
        .workflow()
        .store()
        .items()
        .iter()
        .map(dto::item_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .workflow()
        .store()
        .items()
        .iter()
        .find(|i| i.id == item_id)
    {
        Some(item) => (StatusCode::OK, Json(dto::item_to_json(item))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
    }
}

pub async fn reorder_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let alerts: Vec<_> = services
        .workflow()
        .reorder_alerts()
        .iter()
        .map(dto::item_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(alerts))).into_response()
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let (draft, note) = body.into_draft();
    let action = ChangeAction::Add {
        item_id: ItemId::new(),
        draft,
    };

    submit_change(&services, &principal, action, note, StatusCode::CREATED)
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let (patch, note) = body.into_patch();
    let action = ChangeAction::Update { item_id, patch };

    submit_change(&services, &principal, action, note, StatusCode::OK)
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::DeleteItemRequest>>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::INVENTORY) {
        return resp;
    }

    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let note = body.and_then(|Json(b)| b.note);
    let action = ChangeAction::Delete { item_id };

    submit_change(&services, &principal, action, note, StatusCode::OK)
}

/// Shared tail for the three change endpoints: admins see `applied_status`,
/// staff submissions come back 202 with the queued request id.
fn submit_change(
    services: &AppServices,
    principal: &PrincipalContext,
    action: ChangeAction,
    note: Option<String>,
    applied_status: StatusCode,
) -> axum::response::Response {
    let outcome = match services
        .workflow()
        .submit_item_change(&principal.actor(), action, note)
    {
        Ok(outcome) => outcome,
        Err(e) => return errors::workflow_error_to_response(e),
    };

    let status = match &outcome {
        ChangeOutcome::Applied { .. } => applied_status,
        ChangeOutcome::Queued { .. } => StatusCode::ACCEPTED,
    };
    (status, Json(dto::outcome_to_json(&outcome))).into_response()
}
