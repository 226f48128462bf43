//! Catalog models: categories, products, locations and places
//!
//! A location ("localidad") is a site where the utility operates; a
//! place ("lugar") is a physical sub-unit within it where stock is
//! actually counted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub kind: String,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked product
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unique product code, e.g. "CLORO001"
    pub code: String,
    pub description: Option<String>,
    pub category_id: i32,
    /// Unit cost, optional
    pub unit_cost: Option<Decimal>,
    /// Unit of measure: kg, lt, unidad, ...
    pub unit_of_measure: Option<String>,
    /// Threshold below which stock is considered low
    pub minimum_stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A site/city where the utility operates ("localidad")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of places within a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "place_kind")]
pub enum PlaceKind {
    #[serde(rename = "servicio")]
    #[sqlx(rename = "servicio")]
    Service,
    #[serde(rename = "planta")]
    #[sqlx(rename = "planta")]
    Plant,
    #[serde(rename = "almacen")]
    #[sqlx(rename = "almacen")]
    Warehouse,
    #[serde(rename = "deposito")]
    #[sqlx(rename = "deposito")]
    Depot,
    #[serde(rename = "otro")]
    #[sqlx(rename = "otro")]
    Other,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Service => "servicio",
            PlaceKind::Plant => "planta",
            PlaceKind::Warehouse => "almacen",
            PlaceKind::Depot => "deposito",
            PlaceKind::Other => "otro",
        }
    }
}

/// A physical sub-unit within a location ("lugar"): warehouse, plant,
/// depot, service point. Stock is tracked against places, not
/// locations directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: PlaceKind,
    /// Owning location
    pub location_id: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
