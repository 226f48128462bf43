//! Stock ledger models
//!
//! Quantity-on-hand is keyed by (product, location, place). The
//! location id is derivable from the place and is denormalized for
//! query convenience; it must stay consistent with the place's owning
//! location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A quantity-on-hand record. Invariant: `quantity >= 0` always.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockEntry {
    pub product_id: i32,
    pub location_id: i32,
    pub place_id: i32,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Stock of one product at one place, with display names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductStockView {
    pub product_id: i32,
    pub location_id: i32,
    pub place_id: i32,
    pub quantity: i32,
    pub location_name: String,
    pub place_name: String,
}

/// Stock of one product at one place within a location listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LocationStockView {
    pub product_id: i32,
    pub place_id: i32,
    pub quantity: i32,
    pub product_name: String,
    pub product_code: String,
    pub place_name: String,
}

/// A product whose aggregate stock is at or below its minimum
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LowStockView {
    pub product_id: i32,
    pub product_name: String,
    pub product_code: String,
    pub minimum_stock: i32,
    pub total_quantity: i64,
}
