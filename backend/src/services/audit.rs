//! Audit trail service
//!
//! Every mutating engine operation appends exactly one audit record.
//! The write happens inside the caller's transaction, so a movement or
//! shipment and its audit record commit (or roll back) together.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::AppResult;
use shared::models::{AuditAction, AuditActionCount, AuditRecordView};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// Audit trail service
#[derive(Clone)]
pub struct AuditService {
    db: PgPool,
}

/// Payload for a new audit record
#[derive(Debug)]
pub struct NewAuditRecord {
    /// Entity type tag: "Movimiento", "Envio", "Usuario", ...
    pub entity_type: String,
    pub entity_id: i32,
    pub action: AuditAction,
    pub description: String,
    pub data_before: Option<serde_json::Value>,
    pub data_after: Option<serde_json::Value>,
    pub user_id: i32,
}

/// Filters for audit listings
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub action: Option<AuditAction>,
    pub user_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl AuditService {
    /// Create a new AuditService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append an audit record inside the caller's transaction
    pub async fn record_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        record: NewAuditRecord,
    ) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO audit_log
                (entity_type, entity_id, action, description,
                 data_before, data_after, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&record.entity_type)
        .bind(record.entity_id)
        .bind(record.action)
        .bind(&record.description)
        .bind(&record.data_before)
        .bind(&record.data_after)
        .bind(record.user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Paginated audit listing with filters
    pub async fn list(
        &self,
        filter: AuditFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<AuditRecordView>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM audit_log a
            WHERE ($1::VARCHAR IS NULL OR a.entity_type = $1)
              AND ($2::audit_action IS NULL OR a.action = $2)
              AND ($3::INT IS NULL OR a.user_id = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR a.created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR a.created_at <= $5)
            "#,
        )
        .bind(&filter.entity_type)
        .bind(filter.action)
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.until)
        .fetch_one(&self.db)
        .await?;

        let records = sqlx::query_as::<_, AuditRecordView>(
            r#"
            SELECT a.id, a.entity_type, a.entity_id, a.action, a.description,
                   a.data_before, a.data_after, a.user_id, a.ip_address,
                   a.user_agent, a.created_at,
                   u.first_name || ' ' || u.last_name AS user_name
            FROM audit_log a
            JOIN users u ON u.id = a.user_id
            WHERE ($1::VARCHAR IS NULL OR a.entity_type = $1)
              AND ($2::audit_action IS NULL OR a.action = $2)
              AND ($3::INT IS NULL OR a.user_id = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR a.created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR a.created_at <= $5)
            ORDER BY a.created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(&filter.entity_type)
        .bind(filter.action)
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.until)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            pagination: PaginationMeta::new(&pagination, total as u64),
            data: records,
        })
    }

    /// Full history of a single entity
    pub async fn by_entity(
        &self,
        entity_type: &str,
        entity_id: i32,
    ) -> AppResult<Vec<AuditRecordView>> {
        let records = sqlx::query_as::<_, AuditRecordView>(
            r#"
            SELECT a.id, a.entity_type, a.entity_id, a.action, a.description,
                   a.data_before, a.data_after, a.user_id, a.ip_address,
                   a.user_agent, a.created_at,
                   u.first_name || ' ' || u.last_name AS user_name
            FROM audit_log a
            JOIN users u ON u.id = a.user_id
            WHERE a.entity_type = $1 AND a.entity_id = $2
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Most recent system activity
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuditRecordView>> {
        let records = sqlx::query_as::<_, AuditRecordView>(
            r#"
            SELECT a.id, a.entity_type, a.entity_id, a.action, a.description,
                   a.data_before, a.data_after, a.user_id, a.ip_address,
                   a.user_agent, a.created_at,
                   u.first_name || ' ' || u.last_name AS user_name
            FROM audit_log a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Count audit records grouped by action over a date range
    pub async fn count_by_action(
        &self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<AuditActionCount>> {
        let counts = sqlx::query_as::<_, AuditActionCount>(
            r#"
            SELECT action, COUNT(*) AS count
            FROM audit_log
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            GROUP BY action
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        Ok(counts)
    }
}
