use anifin_core::error::ApiError;
use anifin_core::types::{NormalizedMetadata, RawQuery, RemoteImage};
use anifin_metadata::provider::{MetadataProvider, ProviderMatch, SearchHit};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/normalize", get(normalize))
        .route("/metadata", post(first_match))
        .route("/providers", get(list_providers))
        .route("/providers/{name}/metadata", post(provider_metadata))
        .route("/providers/{name}/search", post(provider_search))
        .route("/providers/{name}/images/{id}", get(provider_images))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NormalizeParams {
    title: Option<String>,
}

#[derive(Serialize)]
struct NormalizeResponse {
    title: String,
    normalized: String,
}

async fn normalize(
    Query(params): Query<NormalizeParams>,
) -> Result<Json<NormalizeResponse>, AppError> {
    let title = params
        .title
        .ok_or_else(|| ApiError::BadRequest("title is required".into()))?;
    let normalized = anifin_scanner::normalize(&title);
    Ok(Json(NormalizeResponse { title, normalized }))
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProviderInfo {
    name: String,
    order: i32,
}

async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    Json(
        state
            .registry
            .iter()
            .map(|p| ProviderInfo {
                name: p.name().to_string(),
                order: p.order(),
            })
            .collect(),
    )
}

fn provider<'a>(state: &'a AppState, name: &str) -> Result<&'a MetadataProvider, AppError> {
    state
        .registry
        .get(name)
        .ok_or_else(|| AppError(ApiError::NotFound(format!("unknown provider: {name}"))))
}

async fn first_match(
    State(state): State<AppState>,
    Json(query): Json<RawQuery>,
) -> Result<Json<ProviderMatch>, AppError> {
    info!(title = %query.title, year = ?query.year, "metadata lookup across providers");
    let found = state
        .registry
        .first_match(&query)
        .await
        .ok_or_else(|| ApiError::NotFound("no provider matched".into()))?;
    Ok(Json(found))
}

async fn provider_metadata(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(query): Json<RawQuery>,
) -> Result<Json<NormalizedMetadata>, AppError> {
    let metadata = provider(&state, &name)?
        .metadata(&query)
        .await?
        .ok_or_else(|| ApiError::NotFound("no matching entry".into()))?;
    Ok(Json(metadata))
}

async fn provider_search(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(query): Json<RawQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let hits = provider(&state, &name)?.search(&query).await?;
    Ok(Json(hits))
}

async fn provider_images(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Vec<RemoteImage>>, AppError> {
    let images = provider(&state, &name)?.images(&id).await?;
    Ok(Json(images))
}
