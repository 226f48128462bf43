//! Movement engine
//!
//! Records single-step, within-location stock changes: entries,
//! exits, transfers and physical-count adjustments. Each operation
//! commits the ledger mutation, the movement row and its audit record
//! in one transaction, so a failure at any step leaves no partial
//! history behind.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::audit::{AuditService, NewAuditRecord};
use crate::services::catalog::CatalogService;
use crate::services::stock::StockService;
use shared::models::{AuditAction, Movement, MovementKind, MovementKindCount, MovementView};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{
    adjustment_outcome, annotate_adjustment_notes, validate_positive,
};

/// Input for recording a stock entry
#[derive(Debug, Deserialize)]
pub struct EntryInput {
    pub product_id: i32,
    pub quantity: i32,
    pub destination_place_id: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Input for recording a stock exit
#[derive(Debug, Deserialize)]
pub struct ExitInput {
    pub product_id: i32,
    pub quantity: i32,
    pub origin_place_id: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Input for recording a within-location transfer
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub product_id: i32,
    pub quantity: i32,
    pub origin_place_id: i32,
    pub destination_place_id: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Input for reconciling stock against a physical count
#[derive(Debug, Deserialize)]
pub struct AdjustmentInput {
    pub product_id: i32,
    pub place_id: i32,
    pub new_quantity: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Optional filters for movement history queries
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub kind: Option<MovementKind>,
    pub product_id: Option<i32>,
    pub user_id: Option<i32>,
    pub location_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Movement engine service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
    catalog: CatalogService,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        let catalog = CatalogService::new(db.clone());
        Self { db, catalog }
    }

    /// Record an entry: stock arriving into a place
    pub async fn record_entry(
        &self,
        user_id: i32,
        location_id: i32,
        input: EntryInput,
    ) -> AppResult<Movement> {
        validate_positive(input.quantity).map_err(AppError::from)?;
        let product = self
            .catalog
            .product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let place = self
            .catalog
            .place(input.destination_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;

        let mut tx = self.db.begin().await?;

        StockService::credit_in_tx(&mut tx, input.product_id, place.id, input.quantity).await?;

        let movement = Self::insert_movement(
            &mut tx,
            MovementKind::Entry,
            input.quantity,
            input.product_id,
            user_id,
            location_id,
            None,
            Some(place.id),
            input.reason.as_deref(),
            input.notes.as_deref(),
        )
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Movimiento".to_string(),
                entity_id: movement.id,
                action: AuditAction::Create,
                description: format!(
                    "Entrada de {} unidades de {} en {}",
                    input.quantity, product.name, place.name
                ),
                data_before: None,
                data_after: Some(json!(movement)),
                user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(movement)
    }

    /// Record an exit: stock leaving a place
    pub async fn record_exit(
        &self,
        user_id: i32,
        location_id: i32,
        input: ExitInput,
    ) -> AppResult<Movement> {
        validate_positive(input.quantity).map_err(AppError::from)?;
        let product = self
            .catalog
            .product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let place = self
            .catalog
            .place(input.origin_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;

        let mut tx = self.db.begin().await?;

        StockService::debit_in_tx(&mut tx, input.product_id, place.id, input.quantity).await?;

        let movement = Self::insert_movement(
            &mut tx,
            MovementKind::Exit,
            input.quantity,
            input.product_id,
            user_id,
            location_id,
            Some(place.id),
            None,
            input.reason.as_deref(),
            input.notes.as_deref(),
        )
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Movimiento".to_string(),
                entity_id: movement.id,
                action: AuditAction::Create,
                description: format!(
                    "Salida de {} unidades de {} desde {}",
                    input.quantity, product.name, place.name
                ),
                data_before: None,
                data_after: Some(json!(movement)),
                user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(movement)
    }

    /// Record a transfer between two places of the same location
    pub async fn record_transfer(
        &self,
        user_id: i32,
        location_id: i32,
        input: TransferInput,
    ) -> AppResult<Movement> {
        validate_positive(input.quantity).map_err(AppError::from)?;
        if input.origin_place_id == input.destination_place_id {
            return Err(AppError::Validation {
                field: "destination_place_id".to_string(),
                message: "Origin and destination place cannot be the same".to_string(),
                message_es: "El lugar origen y destino no pueden ser el mismo".to_string(),
            });
        }
        let product = self
            .catalog
            .product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let origin = self
            .catalog
            .place(input.origin_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;
        let destination = self
            .catalog
            .place(input.destination_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;

        let mut tx = self.db.begin().await?;

        StockService::transfer_in_tx(
            &mut tx,
            input.product_id,
            origin.id,
            destination.id,
            input.quantity,
        )
        .await?;

        let movement = Self::insert_movement(
            &mut tx,
            MovementKind::Transfer,
            input.quantity,
            input.product_id,
            user_id,
            location_id,
            Some(origin.id),
            Some(destination.id),
            input.reason.as_deref(),
            input.notes.as_deref(),
        )
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Movimiento".to_string(),
                entity_id: movement.id,
                action: AuditAction::Create,
                description: format!(
                    "Transferencia de {} unidades de {} de {} a {}",
                    input.quantity, product.name, origin.name, destination.name
                ),
                data_before: None,
                data_after: Some(json!(movement)),
                user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(movement)
    }

    /// Reconcile stock at a place against a physical count. The
    /// movement records the absolute delta; a zero delta is still
    /// recorded so the count itself leaves a trace.
    pub async fn record_adjustment(
        &self,
        user_id: i32,
        location_id: i32,
        input: AdjustmentInput,
    ) -> AppResult<Movement> {
        let product = self
            .catalog
            .product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let place = self
            .catalog
            .place(input.place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;

        let mut tx = self.db.begin().await?;

        let prior =
            StockService::set_exact_in_tx(&mut tx, input.product_id, place.id, input.new_quantity)
                .await?;
        let outcome = adjustment_outcome(prior, input.new_quantity, place.id)?;
        let notes = annotate_adjustment_notes(prior, input.new_quantity, input.notes.as_deref());

        let movement = Self::insert_movement(
            &mut tx,
            MovementKind::Adjustment,
            outcome.magnitude,
            input.product_id,
            user_id,
            location_id,
            outcome.origin_place_id,
            outcome.destination_place_id,
            input.reason.as_deref(),
            Some(&notes),
        )
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Movimiento".to_string(),
                entity_id: movement.id,
                action: AuditAction::Adjust,
                description: format!(
                    "Ajuste de inventario de {} en {}: {} \u{2192} {} ({:+})",
                    product.name, place.name, prior, input.new_quantity, outcome.delta
                ),
                data_before: Some(json!({ "stock": prior })),
                data_after: Some(json!({ "stock": input.new_quantity })),
                user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(movement)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_movement(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: MovementKind,
        quantity: i32,
        product_id: i32,
        user_id: i32,
        location_id: i32,
        origin_place_id: Option<i32>,
        destination_place_id: Option<i32>,
        reason: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<Movement> {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements
                (kind, quantity, product_id, user_id, location_id,
                 origin_place_id, destination_place_id, reason, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, kind, quantity, product_id, user_id, location_id,
                      origin_place_id, destination_place_id, reason, notes, created_at
            "#,
        )
        .bind(kind)
        .bind(quantity)
        .bind(product_id)
        .bind(user_id)
        .bind(location_id)
        .bind(origin_place_id)
        .bind(destination_place_id)
        .bind(reason)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(movement)
    }

    /// Paginated movement history with optional filters
    pub async fn list(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MovementView>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM movements m
            WHERE ($1::movement_kind IS NULL OR m.kind = $1)
              AND ($2::INT IS NULL OR m.product_id = $2)
              AND ($3::INT IS NULL OR m.user_id = $3)
              AND ($4::INT IS NULL OR m.location_id = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR m.created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR m.created_at <= $6)
            "#,
        )
        .bind(filter.kind)
        .bind(filter.product_id)
        .bind(filter.user_id)
        .bind(filter.location_id)
        .bind(filter.from)
        .bind(filter.until)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, MovementView>(
            r#"
            SELECT m.id, m.kind, m.quantity, m.product_id, m.user_id, m.location_id,
                   m.origin_place_id, m.destination_place_id, m.reason, m.notes,
                   m.created_at,
                   p.name AS product_name, p.code AS product_code,
                   u.first_name || ' ' || u.last_name AS user_name,
                   loc.name AS location_name,
                   po.name AS origin_place_name,
                   pd.name AS destination_place_name
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN users u ON u.id = m.user_id
            JOIN locations loc ON loc.id = m.location_id
            LEFT JOIN places po ON po.id = m.origin_place_id
            LEFT JOIN places pd ON pd.id = m.destination_place_id
            WHERE ($1::movement_kind IS NULL OR m.kind = $1)
              AND ($2::INT IS NULL OR m.product_id = $2)
              AND ($3::INT IS NULL OR m.user_id = $3)
              AND ($4::INT IS NULL OR m.location_id = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR m.created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR m.created_at <= $6)
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(filter.kind)
        .bind(filter.product_id)
        .bind(filter.user_id)
        .bind(filter.location_id)
        .bind(filter.from)
        .bind(filter.until)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movements,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// A single movement with display names
    pub async fn get(&self, id: i32) -> AppResult<MovementView> {
        sqlx::query_as::<_, MovementView>(
            r#"
            SELECT m.id, m.kind, m.quantity, m.product_id, m.user_id, m.location_id,
                   m.origin_place_id, m.destination_place_id, m.reason, m.notes,
                   m.created_at,
                   p.name AS product_name, p.code AS product_code,
                   u.first_name || ' ' || u.last_name AS user_name,
                   loc.name AS location_name,
                   po.name AS origin_place_name,
                   pd.name AS destination_place_name
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN users u ON u.id = m.user_id
            JOIN locations loc ON loc.id = m.location_id
            LEFT JOIN places po ON po.id = m.origin_place_id
            LEFT JOIN places pd ON pd.id = m.destination_place_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    /// Most recent movements, for dashboards
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<MovementView>> {
        let movements = sqlx::query_as::<_, MovementView>(
            r#"
            SELECT m.id, m.kind, m.quantity, m.product_id, m.user_id, m.location_id,
                   m.origin_place_id, m.destination_place_id, m.reason, m.notes,
                   m.created_at,
                   p.name AS product_name, p.code AS product_code,
                   u.first_name || ' ' || u.last_name AS user_name,
                   loc.name AS location_name,
                   po.name AS origin_place_name,
                   pd.name AS destination_place_name
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN users u ON u.id = m.user_id
            JOIN locations loc ON loc.id = m.location_id
            LEFT JOIN places po ON po.id = m.origin_place_id
            LEFT JOIN places pd ON pd.id = m.destination_place_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Movement counts grouped by kind over an optional date range
    pub async fn count_by_kind(
        &self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<MovementKindCount>> {
        let counts = sqlx::query_as::<_, MovementKindCount>(
            r#"
            SELECT kind, COUNT(*) AS count, COALESCE(SUM(quantity), 0) AS total_quantity
            FROM movements
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            GROUP BY kind
            ORDER BY kind
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        Ok(counts)
    }
}
