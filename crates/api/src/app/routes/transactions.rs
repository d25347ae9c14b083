use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use paperstock_core::{ItemId, TransactionId};
use paperstock_inventory::NewTransaction;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, pages};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transactions).post(record_movement))
        .route("/reorders", get(pending_reorders))
        .route("/:id/complete", post(complete_reorder))
        .route("/:id/cancel", post(cancel_reorder))
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::TRANSACTIONS) {
        return resp;
    }

    let txns: Vec<_> = services
        .workflow()
        .store()
        .transactions()
        .iter()
        .map(dto::transaction_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(txns))).into_response()
}

pub async fn pending_reorders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::TRANSACTIONS) {
        return resp;
    }

    let reorders: Vec<_> = services
        .workflow()
        .pending_reorders()
        .iter()
        .map(dto::transaction_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(reorders))).into_response()
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RecordMovementRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::TRANSACTIONS) {
        return resp;
    }

    let item_id: ItemId = match body.item_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let new = NewTransaction {
        item_id,
        movement: body.movement,
        quantity: body.quantity,
        priority: body.priority,
        vehicle: body.vehicle,
        note: body.note,
    };

    match services.workflow().record_movement(&principal.actor(), new) {
        Ok(txn) => (StatusCode::CREATED, Json(dto::transaction_to_json(&txn))).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}

pub async fn complete_reorder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    resolve_reorder(&services, &principal, &id, true)
}

pub async fn cancel_reorder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    resolve_reorder(&services, &principal, &id, false)
}

fn resolve_reorder(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
    completed: bool,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(principal, pages::TRANSACTIONS) {
        return resp;
    }

    let transaction_id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let actor = principal.actor();
    let res = if completed {
        services.workflow().complete_reorder(&actor, transaction_id)
    } else {
        services.workflow().cancel_reorder(&actor, transaction_id)
    };

    match res {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": transaction_id.to_string(),
                "status": if completed { "completed" } else { "cancelled" },
            })),
        )
            .into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
