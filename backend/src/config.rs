//! Process configuration: listen address and external app-service settings,
//! loaded from a `.env` file (via `dotenvy`, as the teacher's `main.rs` did)
//! and overridable by CLI flags (`clap`). Env var names and defaults follow
//! `original_source/game_server/config.py`.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "chess-server", about = "Real-time two-player chess game server")]
pub struct Config {
    /// Listen address for the client WebSocket server.
    #[arg(long, env = "CHESS_SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port for the client WebSocket server.
    #[arg(long, env = "CHESS_SERVER_PORT", default_value_t = 5050)]
    pub port: u16,

    /// Base URL of the External App Service's GraphQL endpoint.
    #[arg(long, env = "CHESS_APP_SERVICE_URL", default_value = "http://app:8000/graphql")]
    pub app_service_url: String,

    /// Per-request timeout for the app-service adapter, in seconds.
    #[arg(long, env = "CHESS_APP_SERVICE_TIMEOUT_SECS", default_value_t = 5)]
    pub app_service_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Config {
        dotenvy::dotenv().ok();
        Config::parse()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
