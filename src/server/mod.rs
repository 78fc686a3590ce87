pub mod config;
pub mod handlers;

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use axum::{
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::config::{
    DeploymentMode,
    ServerConfig,
};
use crate::{
    config::CapabilityFile,
    core::DashboardError,
    websocket::{
        connection::HEARTBEAT_INTERVAL,
        ConnectionTracker,
        SharedTracker,
    },
};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub tracker: SharedTracker,
    pub capabilities: CapabilityFile,
    pub mode: DeploymentMode,
    pub heartbeat: Duration,
}

impl AppState {
    pub fn new(capabilities: CapabilityFile, mode: DeploymentMode) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(ConnectionTracker::default())),
            capabilities,
            mode,
            heartbeat: HEARTBEAT_INTERVAL,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/stats", get(handlers::stats))
        .route("/api/health", get(handlers::health))
        .route("/api/config", get(handlers::get_config))
        .route("/ws", get(handlers::websocket));

    if state.mode.admin_enabled() {
        router = router.route(
            "/api/admin/config",
            get(handlers::get_config).post(handlers::update_config),
        );
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Seeds the capability file if needed and serves until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), DashboardError> {
    let capabilities = CapabilityFile::new(&config.config_path);
    capabilities.ensure_exists()?;

    let state = AppState::new(capabilities, config.mode);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(port = config.port, "F1 Dashboard server running");
    tracing::info!("websocket: ws://localhost:{}/ws", config.port);
    tracing::info!("stats:     http://localhost:{}/api/stats", config.port);
    tracing::info!("health:    http://localhost:{}/api/health", config.port);
    tracing::info!("config:    http://localhost:{}/api/config", config.port);
    if config.mode.admin_enabled() {
        tracing::info!("admin:     http://localhost:{}/api/admin/config (development only)", config.port);
    }

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
    };

    use futures_util::{
        SinkExt,
        StreamExt,
    };
    use serde_json::{
        json,
        Value,
    };
    use tokio_tungstenite::{
        connect_async,
        tungstenite::protocol::Message,
    };

    use super::*;
    use crate::{
        config::CapabilityDocument,
        websocket::tracker::lock_tracker,
    };

    struct TestServer {
        base: String,
        tracker: SharedTracker,
        config_path: PathBuf,
        _dir: tempfile::TempDir,
    }

    async fn start(mode: DeploymentMode, heartbeat: Duration) -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dashboard.json");
        let capabilities = CapabilityFile::new(&config_path);
        capabilities.ensure_exists().unwrap();

        let mut state = AppState::new(capabilities, mode);
        state.heartbeat = heartbeat;
        let tracker = state.tracker.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestServer { base: format!("127.0.0.1:{}", addr.port()), tracker, config_path, _dir: dir }
    }

    impl TestServer {
        fn http(&self, path: &str) -> String {
            format!("http://{}{}", self.base, path)
        }

        fn ws(&self) -> String {
            format!("ws://{}/ws", self.base)
        }

        async fn wait_for_connections(&self, expected: usize) {
            tokio::time::timeout(Duration::from_secs(5), async {
                while lock_tracker(&self.tracker).current() != expected {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();
        }
    }

    async fn next_json<S>(stream: &mut S) -> Value
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn health_and_stats() {
        let server = start(DeploymentMode::Development, HEARTBEAT_INTERVAL).await;

        let health: Value = reqwest::get(server.http("/api/health")).await.unwrap().json().await.unwrap();
        assert_eq!(health["status"], "ok");
        assert!(health["timestamp"].is_string());

        let stats: Value = reqwest::get(server.http("/api/stats")).await.unwrap().json().await.unwrap();
        assert_eq!(stats["app"], "f1-dashboard");
        assert_eq!(stats["connections"]["current"], 0);
        assert!(stats["uptime"]["formatted"].is_string());
    }

    #[tokio::test]
    async fn config_is_served_from_file() {
        let server = start(DeploymentMode::Production, HEARTBEAT_INTERVAL).await;

        let caps: CapabilityDocument =
            reqwest::get(server.http("/api/config")).await.unwrap().json().await.unwrap();
        assert_eq!(caps, CapabilityDocument::default());

        fs::write(&server.config_path, "{ not json").unwrap();
        let response = reqwest::get(server.http("/api/config")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to load config");
    }

    #[tokio::test]
    async fn admin_routes_hidden_in_production() {
        let server = start(DeploymentMode::Production, HEARTBEAT_INTERVAL).await;
        let response = reqwest::get(server.http("/api/admin/config")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_update_validates_and_stores() {
        let server = start(DeploymentMode::Development, HEARTBEAT_INTERVAL).await;
        let client = reqwest::Client::new();

        let mut caps = CapabilityDocument::default();
        caps.available_cards.truncate(2);
        caps.interval_range.default = 20_000;

        let response =
            client.post(server.http("/api/admin/config")).json(&caps).send().await.unwrap();
        assert!(response.status().is_success());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "success": true }));

        let stored: CapabilityDocument =
            client.get(server.http("/api/admin/config")).send().await.unwrap().json().await.unwrap();
        assert_eq!(stored, caps);

        let mut invalid = caps.clone();
        invalid.interval_range.min = 90_000;
        let response =
            client.post(server.http("/api/admin/config")).json(&invalid).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let response = client
            .post(server.http("/api/admin/config"))
            .json(&json!({ "availableCards": "everything" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let on_disk: CapabilityDocument =
            serde_json::from_str(&fs::read_to_string(&server.config_path).unwrap()).unwrap();
        assert_eq!(on_disk, caps);
    }

    #[tokio::test]
    async fn channel_welcomes_and_answers_pings() {
        let server = start(DeploymentMode::Development, HEARTBEAT_INTERVAL).await;
        let (mut ws, _) = connect_async(server.ws()).await.unwrap();

        let welcome = next_json(&mut ws).await;
        assert_eq!(welcome["type"], "connected");
        assert_eq!(welcome["message"], "Welcome to F1 Dashboard");
        server.wait_for_connections(1).await;

        ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
        let pong = next_json(&mut ws).await;
        assert_eq!(pong["type"], "pong");

        ws.send(Message::text("not json")).await.unwrap();
        ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
        assert_eq!(next_json(&mut ws).await["type"], "pong");

        let stats: Value = reqwest::get(server.http("/api/stats")).await.unwrap().json().await.unwrap();
        assert_eq!(stats["connections"]["current"], 1);
        assert_eq!(stats["connections"]["peak"], 1);

        ws.close(None).await.unwrap();
        server.wait_for_connections(0).await;
    }

    #[tokio::test]
    async fn unresponsive_peer_is_dropped() {
        let server = start(DeploymentMode::Development, Duration::from_millis(50)).await;
        let (_ws, _) = connect_async(server.ws()).await.unwrap();

        server.wait_for_connections(1).await;
        server.wait_for_connections(0).await;
    }
}
