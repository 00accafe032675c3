//! HTTP boundary over the service

pub mod dto;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

pub use handlers::AppState;

use crate::shared::errors::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/pools", get(handlers::list_pools).post(handlers::create_pool))
        .route("/pools/add-liquidity", post(handlers::add_liquidity))
        .route("/pools/remove-liquidity", post(handlers::remove_liquidity))
        .route("/pools/{id}", get(handlers::get_pool))
        .route("/swap", post(handlers::swap))
        .route("/swap/quote", post(handlers::quote))
        .route("/farms", get(handlers::list_farms).post(handlers::create_farm))
        .route("/farms/stake", post(handlers::stake))
        .route("/farms/unstake", post(handlers::unstake))
        .route("/farms/{id}", get(handlers::get_farm))
        .route("/farms/{id}/pending/{owner}", get(handlers::pending_reward))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(router: Router, addr: SocketAddr, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;
    info!("HTTP listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
