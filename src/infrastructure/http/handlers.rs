//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use super::dto::*;
use super::error::ApiError;
use crate::application::requests::{AddLiquidity, CreateFarm, RemoveLiquidity, StakeRequest, SwapRequest};
use crate::application::services::DefiService;
use crate::domain::pool::Pool;

pub type AppState = Arc<DefiService>;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        block: service.current_block(),
        submitter: service.submitter_name(),
    })
}

pub async fn list_pools(State(service): State<AppState>) -> Json<Vec<Pool>> {
    Json(service.list_pools().await)
}

pub async fn get_pool(State(service): State<AppState>, Path(id): Path<String>) -> ApiResult<Pool> {
    Ok(Json(service.get_pool(&id).await?))
}

pub async fn create_pool(
    State(service): State<AppState>,
    body: Result<Json<CreatePoolBody>, JsonRejection>,
) -> ApiResult<Pool> {
    let Json(body) = body?;
    Ok(Json(service.create_pool(body.into()).await?))
}

pub async fn add_liquidity(
    State(service): State<AppState>,
    body: Result<Json<AddLiquidityBody>, JsonRejection>,
) -> ApiResult<LiquidityResponse> {
    let Json(body) = body?;
    let receipt = service.add_liquidity(AddLiquidity::try_from(body)?).await?;
    Ok(Json(receipt.into()))
}

pub async fn remove_liquidity(
    State(service): State<AppState>,
    body: Result<Json<RemoveLiquidityBody>, JsonRejection>,
) -> ApiResult<LiquidityResponse> {
    let Json(body) = body?;
    let receipt = service.remove_liquidity(RemoveLiquidity::try_from(body)?).await?;
    Ok(Json(receipt.into()))
}

pub async fn quote(
    State(service): State<AppState>,
    body: Result<Json<QuoteBody>, JsonRejection>,
) -> ApiResult<QuoteResponse> {
    let Json(body) = body?;
    let outcome = service
        .quote(&body.token_in, &body.token_out, &body.amount_in()?)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn swap(
    State(service): State<AppState>,
    body: Result<Json<SwapBody>, JsonRejection>,
) -> ApiResult<SwapResponse> {
    let Json(body) = body?;
    let receipt = service.swap(SwapRequest::try_from(body)?).await?;
    Ok(Json(receipt.into()))
}

pub async fn list_farms(State(service): State<AppState>) -> Json<Vec<FarmResponse>> {
    let farms = service.list_farms().await;
    Json(farms.into_iter().map(FarmResponse::from).collect())
}

pub async fn get_farm(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FarmResponse> {
    Ok(Json(service.get_farm(&id).await?.into()))
}

pub async fn create_farm(
    State(service): State<AppState>,
    body: Result<Json<CreateFarmBody>, JsonRejection>,
) -> ApiResult<FarmResponse> {
    let Json(body) = body?;
    let view = service.create_farm(CreateFarm::try_from(body)?).await?;
    Ok(Json(view.into()))
}

pub async fn stake(
    State(service): State<AppState>,
    body: Result<Json<StakeBody>, JsonRejection>,
) -> ApiResult<StakeResponse> {
    let Json(body) = body?;
    let receipt = service.stake(StakeRequest::try_from(body)?).await?;
    Ok(Json(receipt.into()))
}

pub async fn unstake(
    State(service): State<AppState>,
    body: Result<Json<StakeBody>, JsonRejection>,
) -> ApiResult<StakeResponse> {
    let Json(body) = body?;
    let receipt = service.unstake(StakeRequest::try_from(body)?).await?;
    Ok(Json(receipt.into()))
}

pub async fn pending_reward(
    State(service): State<AppState>,
    Path((id, owner)): Path<(String, String)>,
) -> ApiResult<PendingResponse> {
    Ok(Json(service.pending_reward(&id, &owner).await?.into()))
}
