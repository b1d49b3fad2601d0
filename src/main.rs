use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use hr_roster_backend::core::config::AppPaths;
use hr_roster_backend::core::logging;
use hr_roster_backend::server;
use hr_roster_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths).await?;

    // Build roster, embeddings and index before accepting traffic.
    let pipeline = state
        .rag
        .pipeline()
        .await
        .context("Failed to initialize RAG pipeline")?;
    tracing::info!(
        "RAG pipeline ready: {} employees, top_k={}",
        pipeline.employee_count(),
        pipeline.top_k()
    );

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(state.settings.server.port);
    let bind_addr = format!("{}:{}", state.settings.server.host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
