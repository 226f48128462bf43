//! Movement models
//!
//! A movement ("movimiento") is an immutable record of a single-step
//! stock change at one location. Movements are never updated or
//! deleted; corrections are new records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The four movement kinds. Wire values keep the original Spanish
/// vocabulary used by existing consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_kind")]
pub enum MovementKind {
    #[serde(rename = "entrada")]
    #[sqlx(rename = "entrada")]
    Entry,
    #[serde(rename = "salida")]
    #[sqlx(rename = "salida")]
    Exit,
    #[serde(rename = "transferencia")]
    #[sqlx(rename = "transferencia")]
    Transfer,
    #[serde(rename = "ajuste")]
    #[sqlx(rename = "ajuste")]
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entrada",
            MovementKind::Exit => "salida",
            MovementKind::Transfer => "transferencia",
            MovementKind::Adjustment => "ajuste",
        }
    }
}

/// An immutable movement record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movement {
    pub id: i32,
    pub kind: MovementKind,
    /// Positive; for adjustments, the absolute magnitude of the delta
    pub quantity: i32,
    pub product_id: i32,
    /// User who performed the movement
    pub user_id: i32,
    /// Location where the movement happened
    pub location_id: i32,
    pub origin_place_id: Option<i32>,
    pub destination_place_id: Option<i32>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A movement joined with display names for history listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementView {
    pub id: i32,
    pub kind: MovementKind,
    pub quantity: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub location_id: i32,
    pub origin_place_id: Option<i32>,
    pub destination_place_id: Option<i32>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_code: String,
    pub user_name: String,
    pub location_name: String,
    pub origin_place_name: Option<String>,
    pub destination_place_name: Option<String>,
}

/// Per-kind movement counts over a date range
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementKindCount {
    pub kind: MovementKind,
    pub count: i64,
    pub total_quantity: i64,
}
