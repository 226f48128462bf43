//! HTTP handlers for shipment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::shipment::{CreateShipmentInput, ReceiveShipmentInput, ShipmentFilter};
use crate::services::ShipmentService;
use crate::AppState;
use crate::models::{Shipment, ShipmentStatus, ShipmentView};
use shared::types::{PaginatedResponse, Pagination};

/// Dispatch a shipment to another location
pub async fn create_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<Json<Shipment>> {
    check_permission(&current_user.0, "envios", "crear")?;
    let service = ShipmentService::new(state.db);
    let shipment = service.create(current_user.0.user_id, input).await?;
    Ok(Json(shipment))
}

/// Receive a pending shipment into a place of the destination location
pub async fn receive_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<ReceiveShipmentInput>,
) -> AppResult<Json<Shipment>> {
    check_permission(&current_user.0, "envios", "recibir")?;
    let service = ShipmentService::new(state.db);
    let shipment = service.receive(id, current_user.0.user_id, input).await?;
    Ok(Json(shipment))
}

#[derive(Debug, Deserialize)]
pub struct CancelShipmentRequest {
    pub notes: Option<String>,
}

/// Cancel a pending shipment, returning stock to the origin place
pub async fn cancel_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<CancelShipmentRequest>,
) -> AppResult<Json<Shipment>> {
    check_permission(&current_user.0, "envios", "cancelar")?;
    let service = ShipmentService::new(state.db);
    let shipment = service
        .cancel(id, current_user.0.user_id, input.notes)
        .await?;
    Ok(Json(shipment))
}

#[derive(Debug, Default, Deserialize)]
pub struct ShipmentListQuery {
    pub status: Option<ShipmentStatus>,
    pub origin_location_id: Option<i32>,
    pub destination_location_id: Option<i32>,
    pub product_id: Option<i32>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginated shipment listing with optional filters
pub async fn list_shipments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ShipmentListQuery>,
) -> AppResult<Json<PaginatedResponse<ShipmentView>>> {
    check_permission(&current_user.0, "envios", "ver")?;
    let filter = ShipmentFilter {
        status: query.status,
        origin_location_id: query.origin_location_id,
        destination_location_id: query.destination_location_id,
        product_id: query.product_id,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).clamp(1, 100),
    };
    let service = ShipmentService::new(state.db);
    let page = service.list(filter, pagination).await?;
    Ok(Json(page))
}

/// A single shipment with display names
pub async fn get_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ShipmentView>> {
    check_permission(&current_user.0, "envios", "ver")?;
    let service = ShipmentService::new(state.db);
    let shipment = service.get(id).await?;
    Ok(Json(shipment))
}

/// Shipments pending reception at the current user's location
pub async fn pending_reception(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ShipmentView>>> {
    check_permission(&current_user.0, "envios", "ver")?;
    let service = ShipmentService::new(state.db);
    let shipments = service
        .pending_reception(current_user.0.location_id)
        .await?;
    Ok(Json(shipments))
}

/// Shipments dispatched by the current user
pub async fn sent_by_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ShipmentView>>> {
    check_permission(&current_user.0, "envios", "ver")?;
    let service = ShipmentService::new(state.db);
    let shipments = service.sent_by(current_user.0.user_id).await?;
    Ok(Json(shipments))
}

/// Shipments received by the current user
pub async fn received_by_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ShipmentView>>> {
    check_permission(&current_user.0, "envios", "ver")?;
    let service = ShipmentService::new(state.db);
    let shipments = service.received_by(current_user.0.user_id).await?;
    Ok(Json(shipments))
}
