use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod approvals;
pub mod audit;
pub mod items;
pub mod session;
pub mod system;
pub mod transactions;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/logout", post(session::logout))
        .nest("/items", items::router())
        .nest("/transactions", transactions::router())
        .nest("/approvals", approvals::router())
        .nest("/accounts", accounts::router())
        .nest("/audit", audit::router())
}
