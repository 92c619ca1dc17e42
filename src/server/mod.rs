//! HTTP surface of the chat memory service.
//!
//! [`app`] wires the routes from [`routes`] with CORS and request tracing;
//! [`serve`] binds it on all interfaces until a shutdown future resolves.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Routes plus the middleware every deployment runs with.
pub fn app(state: Arc<AppState>) -> Router {
    create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve [`app`] on `0.0.0.0:port` until `shutdown` completes.
///
/// In-flight requests are drained before returning.
///
/// # Errors
/// Returns an error if the port cannot be bound or the accept loop fails.
pub async fn serve<F>(state: Arc<AppState>, port: u16, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await?;
    info!("Chat memory server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Chat memory server shutting down");
        })
        .await
}

/// Resolve on Ctrl-C.
///
/// If the signal handler cannot be installed the future never resolves and
/// the server runs until the process is killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::memory::core::config::MemoryConfig;
    use crate::memory::storage::InMemoryListBackend;
    use crate::memory::store::ChatMemoryStore;

    fn state() -> Arc<AppState> {
        let store = ChatMemoryStore::new(Arc::new(InMemoryListBackend::new()));
        AppState::with_memory(&MemoryConfig::default(), Arc::new(store)).unwrap()
    }

    #[tokio::test]
    async fn test_app_allows_cross_origin_requests() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app(state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        serve(state(), 0, async {}).await.unwrap();
    }
}
