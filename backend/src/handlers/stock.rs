//! HTTP handlers for stock queries

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::StockService;
use crate::AppState;
use crate::models::{LocationStockView, LowStockView, ProductStockView};

/// Stock of a product broken down by place
pub async fn product_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<i32>,
) -> AppResult<Json<Vec<ProductStockView>>> {
    check_permission(&current_user.0, "stock", "ver")?;
    let service = StockService::new(state.db);
    let stock = service.stock_by_product(product_id).await?;
    Ok(Json(stock))
}

#[derive(Debug, Serialize)]
pub struct ProductTotalResponse {
    pub product_id: i32,
    pub total_quantity: i64,
}

/// Aggregate stock of a product across all places
pub async fn product_total(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<i32>,
) -> AppResult<Json<ProductTotalResponse>> {
    check_permission(&current_user.0, "stock", "ver")?;
    let service = StockService::new(state.db);
    let total_quantity = service.total_for_product(product_id).await?;
    Ok(Json(ProductTotalResponse {
        product_id,
        total_quantity,
    }))
}

/// Stock held within a location, nonzero rows only
pub async fn location_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(location_id): Path<i32>,
) -> AppResult<Json<Vec<LocationStockView>>> {
    check_permission(&current_user.0, "stock", "ver")?;
    let service = StockService::new(state.db);
    let stock = service.stock_by_location(location_id).await?;
    Ok(Json(stock))
}

/// Products whose aggregate stock is at or below their minimum
pub async fn low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockView>>> {
    check_permission(&current_user.0, "stock", "ver")?;
    let service = StockService::new(state.db);
    let low = service.low_stock().await?;
    Ok(Json(low))
}
