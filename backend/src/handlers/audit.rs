//! HTTP handlers for audit trail queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::{check_permission, CurrentUser};
use crate::services::{audit::AuditFilter, AuditService};
use crate::AppState;
use crate::models::{AuditAction, AuditActionCount, AuditRecordView};
use shared::types::{PaginatedResponse, Pagination};

#[derive(Debug, Default, Deserialize)]
pub struct AuditListQuery {
    pub entity_type: Option<String>,
    pub action: Option<AuditAction>,
    pub user_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginated audit trail with optional filters
pub async fn list_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AuditListQuery>,
) -> AppResult<Json<PaginatedResponse<AuditRecordView>>> {
    check_permission(&current_user.0, "auditoria", "ver")?;
    let filter = AuditFilter {
        entity_type: query.entity_type,
        action: query.action,
        user_id: query.user_id,
        from: query.from,
        until: query.until,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).clamp(1, 100),
    };
    let service = AuditService::new(state.db);
    let page = service.list(filter, pagination).await?;
    Ok(Json(page))
}

/// Full audit history of one entity
pub async fn audit_by_entity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((entity_type, entity_id)): Path<(String, i32)>,
) -> AppResult<Json<Vec<AuditRecordView>>> {
    check_permission(&current_user.0, "auditoria", "ver")?;
    let service = AuditService::new(state.db);
    let records = service.by_entity(&entity_type, entity_id).await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Most recent audit records, for dashboards
pub async fn recent_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<AuditRecordView>>> {
    check_permission(&current_user.0, "auditoria", "ver")?;
    let service = AuditService::new(state.db);
    let records = service.recent(query.limit.unwrap_or(10).clamp(1, 100)).await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Audit record counts grouped by action
pub async fn audit_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<AuditActionCount>>> {
    check_permission(&current_user.0, "auditoria", "ver")?;
    let service = AuditService::new(state.db);
    let counts = service.count_by_action(query.from, query.until).await?;
    Ok(Json(counts))
}
