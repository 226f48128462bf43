//! HTTP handlers for movement endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::movement::{
    AdjustmentInput, EntryInput, ExitInput, MovementFilter, TransferInput,
};
use crate::services::MovementService;
use crate::AppState;
use crate::models::{Movement, MovementKind, MovementKindCount, MovementView};
use shared::types::{PaginatedResponse, Pagination};

/// Record a stock entry
pub async fn record_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<EntryInput>,
) -> AppResult<Json<Movement>> {
    check_permission(&current_user.0, "movimientos", "crear")?;
    let service = MovementService::new(state.db);
    let movement = service
        .record_entry(current_user.0.user_id, current_user.0.location_id, input)
        .await?;
    Ok(Json(movement))
}

/// Record a stock exit
pub async fn record_exit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ExitInput>,
) -> AppResult<Json<Movement>> {
    check_permission(&current_user.0, "movimientos", "crear")?;
    let service = MovementService::new(state.db);
    let movement = service
        .record_exit(current_user.0.user_id, current_user.0.location_id, input)
        .await?;
    Ok(Json(movement))
}

/// Record a transfer between two places of the same location
pub async fn record_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<Movement>> {
    check_permission(&current_user.0, "movimientos", "crear")?;
    let service = MovementService::new(state.db);
    let movement = service
        .record_transfer(current_user.0.user_id, current_user.0.location_id, input)
        .await?;
    Ok(Json(movement))
}

/// Reconcile stock at a place against a physical count
pub async fn record_adjustment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustmentInput>,
) -> AppResult<Json<Movement>> {
    check_permission(&current_user.0, "movimientos", "ajustar")?;
    let service = MovementService::new(state.db);
    let movement = service
        .record_adjustment(current_user.0.user_id, current_user.0.location_id, input)
        .await?;
    Ok(Json(movement))
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    pub kind: Option<MovementKind>,
    pub product_id: Option<i32>,
    pub user_id: Option<i32>,
    pub location_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginated movement history with optional filters
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<MovementView>>> {
    check_permission(&current_user.0, "movimientos", "ver")?;
    let filter = MovementFilter {
        kind: query.kind,
        product_id: query.product_id,
        user_id: query.user_id,
        location_id: query.location_id,
        from: query.from,
        until: query.until,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).clamp(1, 100),
    };
    let service = MovementService::new(state.db);
    let page = service.list(filter, pagination).await?;
    Ok(Json(page))
}

/// A single movement with display names
pub async fn get_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MovementView>> {
    check_permission(&current_user.0, "movimientos", "ver")?;
    let service = MovementService::new(state.db);
    let movement = service.get(id).await?;
    Ok(Json(movement))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Most recent movements, for dashboards
pub async fn recent_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<MovementView>>> {
    check_permission(&current_user.0, "movimientos", "ver")?;
    let service = MovementService::new(state.db);
    let movements = service.recent(query.limit.unwrap_or(10).clamp(1, 100)).await?;
    Ok(Json(movements))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Movement counts grouped by kind
pub async fn movement_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<MovementKindCount>>> {
    check_permission(&current_user.0, "movimientos", "ver")?;
    let service = MovementService::new(state.db);
    let counts = service.count_by_kind(query.from, query.until).await?;
    Ok(Json(counts))
}
