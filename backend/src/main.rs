use std::sync::Arc;
use std::time::Duration;

use backend::app_service::GraphQlAppService;
use backend::config::Config;
use backend::connection::{self, AppState};
use backend::registry::SessionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    tracing::info!(host = %config.host, port = config.port, app_service_url = %config.app_service_url, "starting chess server");

    let app_service = Arc::new(GraphQlAppService::new(
        config.app_service_url.clone(),
        Duration::from_secs(config.app_service_timeout_secs),
    ));
    let registry = Arc::new(SessionRegistry::new(app_service));
    let state = AppState { registry };

    let app = connection::router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening for game connections");
    axum::serve(listener, app).await?;

    Ok(())
}
