use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trip_server::backend::{Backend, BackendConfig, HttpBackend, MockBackend};
use trip_server::cache::{CacheConfig, CachedBackend};
use trip_server::schedule::ScheduleConfig;
use trip_server::web::{AppState, create_router};

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trip_server=info")),
        )
        .init();

    let mut backend_config = BackendConfig::default();
    if let Ok(url) = std::env::var("TRIP_BACKEND_URL") {
        backend_config = backend_config.with_base_url(url);
    }
    if let Ok(token) = std::env::var("TRIP_BACKEND_TOKEN") {
        backend_config = backend_config.with_token(token);
    }
    let paging = backend_config.paging();

    // Mock data takes precedence over the HTTP backend
    let backend: Backend = match std::env::var("TRIP_MOCK_DATA") {
        Ok(dir) => {
            info!(dir = %dir, "using mock backend");
            MockBackend::new(&dir)
                .expect("Failed to load mock data")
                .into()
        }
        Err(_) => {
            info!(url = %backend_config.base_url, "using HTTP backend");
            HttpBackend::new(backend_config)
                .expect("Failed to create backend client")
                .into()
        }
    };

    let cached = CachedBackend::new(backend, &CacheConfig::default());
    let state = AppState::new(cached, ScheduleConfig::default(), paging);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("TRIP_LISTEN_ADDR")
        .ok()
        .and_then(|s| {
            s.parse()
                .inspect_err(|e| warn!(addr = %s, error = %e, "invalid TRIP_LISTEN_ADDR"))
                .ok()
        })
        .unwrap_or_else(|| {
            DEFAULT_LISTEN_ADDR
                .parse()
                .expect("default listen address is valid")
        });

    info!(%addr, "Trip planner listening");
    info!("API Endpoints:");
    info!("  GET  /health                         - Health check");
    info!("  POST /trips/:id/open                 - Load a trip into a session");
    info!("  GET  /trips/:id/search?q=            - Search places");
    info!("  POST /trips/:id/optimize             - Run an optimization strategy");
    info!("  POST /trips/:id/save                 - Save the trip");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
