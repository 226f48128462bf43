//! Audit trail models
//!
//! Every mutating operation appends exactly one audit record. Records
//! are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Audit action tags, matching the original vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action")]
pub enum AuditAction {
    #[serde(rename = "create")]
    #[sqlx(rename = "create")]
    Create,
    #[serde(rename = "update")]
    #[sqlx(rename = "update")]
    Update,
    #[serde(rename = "delete")]
    #[sqlx(rename = "delete")]
    Delete,
    #[serde(rename = "login")]
    #[sqlx(rename = "login")]
    Login,
    #[serde(rename = "logout")]
    #[sqlx(rename = "logout")]
    Logout,
    #[serde(rename = "envio")]
    #[sqlx(rename = "envio")]
    Ship,
    #[serde(rename = "recepcion")]
    #[sqlx(rename = "recepcion")]
    Receive,
    #[serde(rename = "cancelacion")]
    #[sqlx(rename = "cancelacion")]
    Cancel,
    #[serde(rename = "ajuste")]
    #[sqlx(rename = "ajuste")]
    Adjust,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Ship => "envio",
            AuditAction::Receive => "recepcion",
            AuditAction::Cancel => "cancelacion",
            AuditAction::Adjust => "ajuste",
        }
    }
}

/// An append-only audit record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditRecord {
    pub id: i32,
    /// Entity type tag: "Movimiento", "Envio", "Usuario", ...
    pub entity_type: String,
    pub entity_id: i32,
    pub action: AuditAction,
    pub description: String,
    /// State before the change, when meaningful
    pub data_before: Option<serde_json::Value>,
    /// State after the change
    pub data_after: Option<serde_json::Value>,
    pub user_id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit record joined with the acting user's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditRecordView {
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub action: AuditAction,
    pub description: String,
    pub data_before: Option<serde_json::Value>,
    pub data_after: Option<serde_json::Value>,
    pub user_id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
}

/// Per-action audit counts
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditActionCount {
    pub action: AuditAction,
    pub count: i64,
}
