use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use super::error::ApiError;
use crate::server::AppState;
use crate::util::QueryParams;

/// TMDB pages are 1-based and stop at 500.
fn page_param(params: &QueryParams) -> u32 {
    params
        .get_number("page")
        .map(|p| p.trunc().clamp(1.0, 500.0) as u32)
        .unwrap_or(1)
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, ApiError> {
    let movies = state
        .tmdb
        .discover(page_param(&params), params.get("genre"))
        .await?;
    Ok(Json(movies))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params
        .get("query")
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation("query is required"))?;
    Ok(Json(state.tmdb.search(query, page_param(&params)).await?))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let details = state.tmdb.movie(&id).await?;
    Ok((
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        Json(details),
    ))
}

pub async fn movie_videos(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.tmdb.videos(&id).await?))
}
