use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::TodoService;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: TodoService,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self {
            service: TodoService::new(store),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::welcome))
        .route("/health", get(routes::health))
        .route("/todos", get(routes::list_todos).post(routes::create_todo))
        .route("/todos/search/all", get(routes::search_todos))
        .route(
            "/todos/{id}",
            get(routes::get_todo)
                .put(routes::update_todo)
                .delete(routes::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(host: &str, port: u16, database_path: PathBuf) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::open(&database_path));

    // Open eagerly so an unreadable image fails startup instead of the first request
    let todos = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || store.count()).await??
    };

    let app = router(Arc::new(AppState::new(store.clone())));

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Starting server on {}", addr);
    crate::ui::serving(&addr, &database_path, todos);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing database");
    tokio::task::spawn_blocking(move || store.close()).await??;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
