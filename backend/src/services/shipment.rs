//! Shipment engine
//!
//! Moves stock between locations. Sending debits the origin place
//! immediately, so in-transit stock is held by no place; receiving
//! credits the destination and cancelling credits the origin back.
//! Receive and cancel lock the shipment row with FOR UPDATE before
//! checking its state, so two concurrent receivers cannot both credit
//! the destination.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::services::audit::{AuditService, NewAuditRecord};
use crate::services::catalog::CatalogService;
use crate::services::stock::StockService;
use shared::models::{AuditAction, Shipment, ShipmentStatus, ShipmentView};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_positive;

/// Input for dispatching a shipment
#[derive(Debug, Deserialize)]
pub struct CreateShipmentInput {
    pub product_id: i32,
    pub quantity: i32,
    pub origin_place_id: i32,
    pub destination_location_id: i32,
    /// Suggested destination place; the receiver decides the final one
    pub destination_place_id: Option<i32>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Input for receiving a pending shipment
#[derive(Debug, Deserialize)]
pub struct ReceiveShipmentInput {
    pub destination_place_id: i32,
    pub notes: Option<String>,
}

/// Optional filters for shipment listings
#[derive(Debug, Default, Deserialize)]
pub struct ShipmentFilter {
    pub status: Option<ShipmentStatus>,
    pub origin_location_id: Option<i32>,
    pub destination_location_id: Option<i32>,
    pub product_id: Option<i32>,
}

/// Shipment engine service
#[derive(Clone)]
pub struct ShipmentService {
    db: PgPool,
    catalog: CatalogService,
}

const SHIPMENT_COLUMNS: &str = r#"id, product_id, quantity, sender_user_id, receiver_user_id,
       origin_location_id, destination_location_id, origin_place_id,
       destination_place_id, status, sent_at, received_at, cancelled_at,
       reason, send_notes, receive_notes, cancel_notes"#;

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(db: PgPool) -> Self {
        let catalog = CatalogService::new(db.clone());
        Self { db, catalog }
    }

    /// Dispatch a shipment: debit the origin place and record the
    /// shipment as sent, atomically.
    pub async fn create(
        &self,
        sender_user_id: i32,
        input: CreateShipmentInput,
    ) -> AppResult<Shipment> {
        validate_positive(input.quantity).map_err(AppError::from)?;
        let product = self
            .catalog
            .product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let origin_place = self
            .catalog
            .place(input.origin_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;
        let destination = self
            .catalog
            .location(input.destination_location_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        if origin_place.location_id == destination.id {
            return Err(AppError::Validation {
                field: "destination_location_id".to_string(),
                message: "Same-location moves must use transfers".to_string(),
                message_es: "No se puede enviar a la misma localidad. Use transferencias."
                    .to_string(),
            });
        }

        if let Some(place_id) = input.destination_place_id {
            self.catalog
                .place(place_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Place".to_string()))?;
        }

        let mut tx = self.db.begin().await?;

        StockService::debit_in_tx(&mut tx, input.product_id, origin_place.id, input.quantity)
            .await?;

        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            r#"
            INSERT INTO shipments
                (product_id, quantity, sender_user_id, origin_location_id,
                 destination_location_id, origin_place_id, destination_place_id,
                 status, reason, send_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'enviado', $8, $9)
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(sender_user_id)
        .bind(origin_place.location_id)
        .bind(destination.id)
        .bind(origin_place.id)
        .bind(input.destination_place_id)
        .bind(input.reason.as_deref())
        .bind(input.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Envio".to_string(),
                entity_id: shipment.id,
                action: AuditAction::Ship,
                description: format!(
                    "Envío de {} unidades de {} desde {} hacia {}",
                    input.quantity, product.name, origin_place.name, destination.name
                ),
                data_before: None,
                data_after: Some(json!(shipment)),
                user_id: sender_user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(shipment)
    }

    /// Receive a pending shipment into a place of the destination
    /// location, crediting its stock.
    pub async fn receive(
        &self,
        shipment_id: i32,
        receiver_user_id: i32,
        input: ReceiveShipmentInput,
    ) -> AppResult<Shipment> {
        let place = self
            .catalog
            .place(input.destination_place_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Place".to_string()))?;

        let mut tx = self.db.begin().await?;

        let shipment = Self::get_for_update(&mut tx, shipment_id).await?;
        if !shipment.status.can_receive() {
            return Err(Self::terminal_state_error(&shipment, "received"));
        }
        if place.location_id != shipment.destination_location_id {
            return Err(AppError::Validation {
                field: "destination_place_id".to_string(),
                message: "Place does not belong to destination location".to_string(),
                message_es: "El lugar no pertenece a la localidad de destino".to_string(),
            });
        }

        let product = self
            .catalog
            .product(shipment.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let updated = sqlx::query_as::<_, Shipment>(&format!(
            r#"
            UPDATE shipments
            SET status = 'recibido', receiver_user_id = $1,
                destination_place_id = $2, received_at = $3, receive_notes = $4
            WHERE id = $5
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(receiver_user_id)
        .bind(place.id)
        .bind(Utc::now())
        .bind(input.notes.as_deref())
        .bind(shipment_id)
        .fetch_one(&mut *tx)
        .await?;

        StockService::credit_in_tx(&mut tx, shipment.product_id, place.id, shipment.quantity)
            .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Envio".to_string(),
                entity_id: shipment.id,
                action: AuditAction::Receive,
                description: format!(
                    "Recepción de {} unidades de {} en {}",
                    shipment.quantity, product.name, place.name
                ),
                data_before: Some(json!({ "status": shipment.status })),
                data_after: Some(json!(updated)),
                user_id: receiver_user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Cancel a pending shipment, crediting the quantity back to the
    /// origin place.
    pub async fn cancel(
        &self,
        shipment_id: i32,
        user_id: i32,
        notes: Option<String>,
    ) -> AppResult<Shipment> {
        let mut tx = self.db.begin().await?;

        let shipment = Self::get_for_update(&mut tx, shipment_id).await?;
        if !shipment.status.can_cancel() {
            return Err(Self::terminal_state_error(&shipment, "cancelled"));
        }

        let product = self
            .catalog
            .product(shipment.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let updated = sqlx::query_as::<_, Shipment>(&format!(
            r#"
            UPDATE shipments
            SET status = 'cancelado', cancelled_at = $1, cancel_notes = $2
            WHERE id = $3
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(Utc::now())
        .bind(notes.as_deref())
        .bind(shipment_id)
        .fetch_one(&mut *tx)
        .await?;

        StockService::credit_in_tx(
            &mut tx,
            shipment.product_id,
            shipment.origin_place_id,
            shipment.quantity,
        )
        .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Envio".to_string(),
                entity_id: shipment.id,
                action: AuditAction::Cancel,
                description: format!(
                    "Cancelación de envío de {} unidades de {}. Motivo: {}",
                    shipment.quantity,
                    product.name,
                    notes.as_deref().unwrap_or("no especificado")
                ),
                data_before: Some(json!({ "status": shipment.status })),
                data_after: Some(json!(updated)),
                user_id,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn get_for_update(
        tx: &mut Transaction<'_, Postgres>,
        shipment_id: i32,
    ) -> AppResult<Shipment> {
        sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 FOR UPDATE"
        ))
        .bind(shipment_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))
    }

    fn terminal_state_error(shipment: &Shipment, attempted: &str) -> AppError {
        let (message, message_es) = match shipment.status {
            ShipmentStatus::Received => (
                format!("The shipment was already received and cannot be {attempted}"),
                "El envío ya fue recibido".to_string(),
            ),
            _ => (
                format!("The shipment is cancelled and cannot be {attempted}"),
                "El envío está cancelado".to_string(),
            ),
        };
        AppError::InvalidState {
            current: shipment.status.as_str().to_string(),
            message,
            message_es,
        }
    }

    /// Paginated shipment listing with optional filters
    pub async fn list(
        &self,
        filter: ShipmentFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<ShipmentView>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM shipments s
            WHERE ($1::shipment_status IS NULL OR s.status = $1)
              AND ($2::INT IS NULL OR s.origin_location_id = $2)
              AND ($3::INT IS NULL OR s.destination_location_id = $3)
              AND ($4::INT IS NULL OR s.product_id = $4)
            "#,
        )
        .bind(filter.status)
        .bind(filter.origin_location_id)
        .bind(filter.destination_location_id)
        .bind(filter.product_id)
        .fetch_one(&self.db)
        .await?;

        let shipments = sqlx::query_as::<_, ShipmentView>(&format!(
            r#"
            {}
            WHERE ($1::shipment_status IS NULL OR s.status = $1)
              AND ($2::INT IS NULL OR s.origin_location_id = $2)
              AND ($3::INT IS NULL OR s.destination_location_id = $3)
              AND ($4::INT IS NULL OR s.product_id = $4)
            ORDER BY s.sent_at DESC, s.id DESC
            LIMIT $5 OFFSET $6
            "#,
            Self::view_select()
        ))
        .bind(filter.status)
        .bind(filter.origin_location_id)
        .bind(filter.destination_location_id)
        .bind(filter.product_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: shipments,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// A single shipment with display names
    pub async fn get(&self, id: i32) -> AppResult<ShipmentView> {
        sqlx::query_as::<_, ShipmentView>(&format!("{} WHERE s.id = $1", Self::view_select()))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipment".to_string()))
    }

    /// Shipments headed to a location that have not yet been received
    /// or cancelled
    pub async fn pending_reception(&self, location_id: i32) -> AppResult<Vec<ShipmentView>> {
        let shipments = sqlx::query_as::<_, ShipmentView>(&format!(
            r#"
            {}
            WHERE s.destination_location_id = $1
              AND s.status IN ('enviado', 'en_transito')
            ORDER BY s.sent_at ASC
            "#,
            Self::view_select()
        ))
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(shipments)
    }

    /// Shipments dispatched by a user
    pub async fn sent_by(&self, user_id: i32) -> AppResult<Vec<ShipmentView>> {
        let shipments = sqlx::query_as::<_, ShipmentView>(&format!(
            "{} WHERE s.sender_user_id = $1 ORDER BY s.sent_at DESC",
            Self::view_select()
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(shipments)
    }

    /// Shipments received by a user
    pub async fn received_by(&self, user_id: i32) -> AppResult<Vec<ShipmentView>> {
        let shipments = sqlx::query_as::<_, ShipmentView>(&format!(
            "{} WHERE s.receiver_user_id = $1 ORDER BY s.received_at DESC",
            Self::view_select()
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(shipments)
    }

    fn view_select() -> &'static str {
        r#"
        SELECT s.id, s.product_id, s.quantity, s.sender_user_id, s.receiver_user_id,
               s.origin_location_id, s.destination_location_id, s.origin_place_id,
               s.destination_place_id, s.status, s.sent_at, s.received_at,
               s.cancelled_at, s.reason, s.send_notes, s.receive_notes, s.cancel_notes,
               p.name AS product_name, p.code AS product_code,
               us.first_name || ' ' || us.last_name AS sender_name,
               ur.first_name || ' ' || ur.last_name AS receiver_name,
               lo.name AS origin_location_name,
               ld.name AS destination_location_name,
               po.name AS origin_place_name,
               pd.name AS destination_place_name
        FROM shipments s
        JOIN products p ON p.id = s.product_id
        JOIN users us ON us.id = s.sender_user_id
        LEFT JOIN users ur ON ur.id = s.receiver_user_id
        JOIN locations lo ON lo.id = s.origin_location_id
        JOIN locations ld ON ld.id = s.destination_location_id
        JOIN places po ON po.id = s.origin_place_id
        LEFT JOIN places pd ON pd.id = s.destination_place_id
        "#
    }
}
