use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::listings::model::Listing;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListingsQuery {
    pub user_id: Uuid,
    pub industry: Option<String>,
    #[serde(default)]
    pub page: usize,
}

/// GET /api/v1/listings
pub async fn handle_get_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingsQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .listings
        .get_listings(
            params.user_id,
            params.industry.as_deref(),
            params.page,
            state.config.cache_page_size,
            state.config.job_portal_count,
        )
        .await?;
    Ok(Json(listings))
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/listings/preview
/// Trimmed first page for the dashboard: smaller size, no industry filter.
pub async fn handle_get_listings_preview(
    State(state): State<AppState>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .listings
        .get_listings(
            params.user_id,
            None,
            0,
            state.config.preview_page_size,
            state.config.job_portal_count,
        )
        .await?;
    Ok(Json(listings))
}

#[derive(Deserialize)]
pub struct PreferenceUpsert {
    pub user_id: Uuid,
    pub preference: String,
}

/// PUT /api/v1/preferences
/// Written by the résumé pipeline after parsing; listings reads always see
/// the latest stored preference.
pub async fn handle_put_preference(
    State(state): State<AppState>,
    Json(req): Json<PreferenceUpsert>,
) -> Result<StatusCode, AppError> {
    state
        .prefs
        .set_preference(req.user_id, &req.preference)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
