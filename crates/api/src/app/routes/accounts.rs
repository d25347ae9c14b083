use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use paperstock_approvals::Decision;
use paperstock_core::AccountId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, pages};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts))
        .route("/:id/review", post(review_account))
}

/// Public: self-registration. The account stays Pending until reviewed.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services
        .workflow()
        .register_account(&body.username, &body.password, body.allowed_pages)
    {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::workflow_error_to_response(e),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::ACCOUNTS) {
        return resp;
    }

    let accounts: Vec<_> = services
        .workflow()
        .store()
        .accounts()
        .iter()
        .map(dto::account_to_json)
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(accounts))).into_response()
}

pub async fn review_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DecisionRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_page(&principal, pages::ACCOUNTS) {
        return resp;
    }

    let account_id: AccountId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let reviewed = match services
        .workflow()
        .review_account(&principal.actor(), account_id, body.decision)
    {
        Ok(account) => account,
        Err(e) => return errors::workflow_error_to_response(e),
    };

    // A denied account loses any live sessions immediately.
    if body.decision == Decision::Denied {
        services.sessions().revoke_account(account_id);
    }

    (StatusCode::OK, Json(dto::account_to_json(&reviewed))).into_response()
}
