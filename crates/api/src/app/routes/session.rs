use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let account = match services.workflow().authenticate(&body.username, &body.password) {
        Ok(account) => account,
        Err(e) => return errors::workflow_error_to_response(e),
    };

    let token = services.sessions().issue(account.clone());
    tracing::info!(username = %account.username, "signed in");

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "account": dto::account_to_json(&account),
        })),
    )
        .into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> StatusCode {
    // The auth middleware already validated the token; re-read it to revoke.
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        services.sessions().revoke(token.trim());
    }
    StatusCode::NO_CONTENT
}
