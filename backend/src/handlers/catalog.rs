//! HTTP handlers for catalog read endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CatalogService;
use crate::AppState;
use crate::models::{Location, Place, PlaceKind};

#[derive(Debug, Default, Deserialize)]
pub struct LocationListQuery {
    pub active_only: Option<bool>,
}

/// List locations
pub async fn list_locations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<LocationListQuery>,
) -> AppResult<Json<Vec<Location>>> {
    let service = CatalogService::new(state.db);
    let locations = service
        .list_locations(query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(locations))
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceListQuery {
    pub location_id: Option<i32>,
    pub kind: Option<PlaceKind>,
}

/// List places, optionally filtered by location and kind
pub async fn list_places(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PlaceListQuery>,
) -> AppResult<Json<Vec<Place>>> {
    let service = CatalogService::new(state.db);
    let places = service.list_places(query.location_id, query.kind).await?;
    Ok(Json(places))
}
