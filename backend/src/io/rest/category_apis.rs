//! # REST API for Categories
//!
//! A list filtered by `?type=` echoes the type back; a replace that carries
//! it leaves categories of other types alone.

use super::error::ApiResult;
use super::session::CurrentSession;
use crate::storage::Version;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::{
    CategoryListResponse, CategoryNamesResponse, ReplaceCategoriesRequest, TransactionType,
};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).put(replace_categories))
        .route("/names", get(category_names))
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub category_type: Option<TransactionType>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<CategoryListResponse>> {
    info!("GET /api/categories - query: {:?}", query);
    let snapshot = match query.category_type {
        Some(kind) => state.category_service.list_for_type(kind).await?,
        None => state.category_service.list().await?,
    };
    Ok(Json(CategoryListResponse {
        categories: snapshot.records,
        version: snapshot.version.0,
        category_type: query.category_type,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CategoryNamesQuery {
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// Names for the transaction entry form, with fallbacks when none fit
pub async fn category_names(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<CategoryNamesQuery>,
) -> ApiResult<Json<CategoryNamesResponse>> {
    info!("GET /api/categories/names - query: {:?}", query);
    let names = state.category_service.names_for(query.category_type).await?;
    Ok(Json(CategoryNamesResponse {
        category_type: query.category_type,
        names,
    }))
}

pub async fn replace_categories(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<ReplaceCategoriesRequest>,
) -> ApiResult<Json<CategoryListResponse>> {
    info!(
        "PUT /api/categories - {} categories, type {:?}",
        request.categories.len(),
        request.category_type
    );
    state
        .category_service
        .replace_all(
            &session.ctx,
            request.categories,
            request.version.map(Version),
            request.category_type,
        )
        .await?;
    let snapshot = match request.category_type {
        Some(kind) => state.category_service.list_for_type(kind).await?,
        None => state.category_service.list().await?,
    };
    Ok(Json(CategoryListResponse {
        categories: snapshot.records,
        version: snapshot.version.0,
        category_type: request.category_type,
    }))
}
