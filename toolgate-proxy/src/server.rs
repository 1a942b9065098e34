use crate::handlers;
use axum::Router;
use axum::routing::{get, post};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use toolgate_core::ProxyConfig;
use toolgate_plugin::PluginInstance;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for the proxy API.
///
/// Everything here is built once at startup and read-only afterwards, so
/// concurrent requests share it without locks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub plugins: Arc<HashMap<String, Arc<dyn PluginInstance>>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: ProxyConfig,
        plugins: HashMap<String, Arc<dyn PluginInstance>>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            plugins: Arc::new(plugins),
            http,
        }
    }
}

/// Build the axum router: the core endpoints plus every plugin-contributed
/// route (e.g. the git smart-HTTP proxy).
pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/cli", post(handlers::cli::handle_cli))
        .route("/health", get(handlers::health::health_check))
        .route("/auth/status", get(handlers::auth::auth_status))
        .with_state(state.clone());

    for plugin in state.plugins.values() {
        if let Some(routes) = Arc::clone(plugin).routes(state.http.clone()) {
            app = app.merge(routes);
        }
    }

    app.layer(TraceLayer::new_for_http())
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Toolgate listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
