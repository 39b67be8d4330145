use axum::{
    extract::{Path, Query, State},
    Json,
};
use nf_core::{Article, ArticleId, Batch, Error, FeedQuery};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{ApiError, AppState};

const MAX_COUNT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub count: Option<usize>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteBody {
    pub url: String,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticlesParams>,
) -> Result<Json<Batch>, ApiError> {
    if params.count.map_or(false, |c| c > MAX_COUNT) {
        return Err(Error::InvalidRequest(format!("count must be at most {}", MAX_COUNT)).into());
    }
    let query = FeedQuery::from_parts(params.category.as_deref(), params.q.as_deref());
    let batch = state.service.refresh_at(query, params.count, params.page).await?;
    Ok(Json(batch))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let id: ArticleId = id.parse()?;
    Ok(Json(state.service.lookup(id).await?))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.favorites().await?))
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FavoriteBody>,
) -> Result<Json<Value>, ApiError> {
    if body.url.trim().is_empty() {
        return Err(Error::InvalidRequest("url is required".to_string()).into());
    }
    let favorite = state.service.toggle_favorite(&body.url).await?;
    Ok(Json(json!({ "url": body.url, "favorite": favorite })))
}
