#[tokio::main]
async fn main() {
    doorkeep_observability::init();

    let config = doorkeep_api::config::AppConfig::from_env();
    tracing::info!(environment = %config.environment, "starting doorkeep-api");

    let services = doorkeep_api::app::build_services(&config)
        .await
        .expect("failed to build the service graph");

    let app = doorkeep_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str())
        .await
        .unwrap_or_else(|err| panic!("failed to bind {}: {err}", config.listen_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
