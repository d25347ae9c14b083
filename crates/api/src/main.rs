#[tokio::main]
async fn main() {
    paperstock_observability::init();

    let config = paperstock_api::config::Config::from_env();
    let bind = config.bind.clone();

    let app = paperstock_api::app::build_app(config).await;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
