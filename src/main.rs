use std::net::SocketAddr;

use todo_api::{
    application::todo_service::TodoServiceImpl,
    config::{self, Config, StoreKind},
    domain::repository::TodoRepository,
    http::routing::{self, todos},
    infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    match config.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory store");
            serve(InMemoryTodoRepository::new(), config.bind_addr).await
        }
        StoreKind::Sqlite(database_url) => {
            tracing::info!(%database_url, "using sqlite store");
            config::prepare_sqlite_file(&database_url)?;
            serve(SqliteTodoRepository::connect(&database_url).await?, config.bind_addr).await
        }
    }
}

async fn serve<R: TodoRepository + Clone>(repo: R, addr: SocketAddr) -> anyhow::Result<()> {
    repo.init().await?;
    let service = TodoServiceImpl::new(repo);
    let router = routing::app(todos::router(todos::AppState { service }));

    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
