//! Catalog lookups consumed by the movement and shipment engines
//!
//! Products, locations and places are managed elsewhere; the engines
//! only need existence and validity checks plus a few read endpoints.

use sqlx::{FromRow, PgPool};

use crate::error::AppResult;
use shared::models::{Location, Place, PlaceKind};

/// Read-only catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Product reference as the engines see it
#[derive(Debug, Clone, FromRow)]
pub struct ProductRef {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub active: bool,
}

/// Place reference with its owning location
#[derive(Debug, Clone, FromRow)]
pub struct PlaceRef {
    pub id: i32,
    pub name: String,
    pub location_id: i32,
    pub active: bool,
}

/// Location reference
#[derive(Debug, Clone, FromRow)]
pub struct LocationRef {
    pub id: i32,
    pub name: String,
    pub active: bool,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Look up a product by id
    pub async fn product(&self, product_id: i32) -> AppResult<Option<ProductRef>> {
        let product = sqlx::query_as::<_, ProductRef>(
            "SELECT id, name, code, active FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    /// Look up a place by id, with its owning location
    pub async fn place(&self, place_id: i32) -> AppResult<Option<PlaceRef>> {
        let place = sqlx::query_as::<_, PlaceRef>(
            "SELECT id, name, location_id, active FROM places WHERE id = $1",
        )
        .bind(place_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(place)
    }

    /// Look up a location by id
    pub async fn location(&self, location_id: i32) -> AppResult<Option<LocationRef>> {
        let location = sqlx::query_as::<_, LocationRef>(
            "SELECT id, name, active FROM locations WHERE id = $1",
        )
        .bind(location_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(location)
    }

    /// List locations, optionally restricted to active ones
    pub async fn list_locations(&self, active_only: bool) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, description, address, city, postal_code, active,
                   created_at, updated_at
            FROM locations
            WHERE (NOT $1 OR active)
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(locations)
    }

    /// List places, optionally filtered by owning location and kind
    pub async fn list_places(
        &self,
        location_id: Option<i32>,
        kind: Option<PlaceKind>,
    ) -> AppResult<Vec<Place>> {
        let places = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, name, description, kind, location_id, active,
                   created_at, updated_at
            FROM places
            WHERE ($1::INT IS NULL OR location_id = $1)
              AND ($2::place_kind IS NULL OR kind = $2)
            ORDER BY name
            "#,
        )
        .bind(location_id)
        .bind(kind)
        .fetch_all(&self.db)
        .await?;

        Ok(places)
    }
}
