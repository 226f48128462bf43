//! Shipment models
//!
//! A shipment ("envio") relocates stock between two different
//! locations and, unlike a movement, spans two user actions in time:
//! send, then receive-or-cancel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Shipment lifecycle states.
///
/// `InTransit` exists in the schema and is accepted by receive/cancel,
/// but no operation currently transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shipment_status")]
pub enum ShipmentStatus {
    #[serde(rename = "enviado")]
    #[sqlx(rename = "enviado")]
    Sent,
    #[serde(rename = "en_transito")]
    #[sqlx(rename = "en_transito")]
    InTransit,
    #[serde(rename = "recibido")]
    #[sqlx(rename = "recibido")]
    Received,
    #[serde(rename = "cancelado")]
    #[sqlx(rename = "cancelado")]
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Sent => "enviado",
            ShipmentStatus::InTransit => "en_transito",
            ShipmentStatus::Received => "recibido",
            ShipmentStatus::Cancelled => "cancelado",
        }
    }

    /// Received and cancelled are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Received | ShipmentStatus::Cancelled)
    }

    /// A shipment can be received while sent or in transit
    pub fn can_receive(&self) -> bool {
        !self.is_terminal()
    }

    /// A shipment can be cancelled while sent or in transit; received
    /// shipments are final
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

/// An inter-location shipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sender_user_id: i32,
    pub receiver_user_id: Option<i32>,
    pub origin_location_id: i32,
    pub destination_location_id: i32,
    pub origin_place_id: i32,
    /// Optional at creation; assigned at receipt time and may differ
    /// from what the sender intended
    pub destination_place_id: Option<i32>,
    pub status: ShipmentStatus,
    pub sent_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub send_notes: Option<String>,
    pub receive_notes: Option<String>,
    pub cancel_notes: Option<String>,
}

/// A shipment joined with display names for listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShipmentView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sender_user_id: i32,
    pub receiver_user_id: Option<i32>,
    pub origin_location_id: i32,
    pub destination_location_id: i32,
    pub origin_place_id: i32,
    pub destination_place_id: Option<i32>,
    pub status: ShipmentStatus,
    pub sent_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub send_notes: Option<String>,
    pub receive_notes: Option<String>,
    pub cancel_notes: Option<String>,
    pub product_name: String,
    pub product_code: String,
    pub sender_name: String,
    pub receiver_name: Option<String>,
    pub origin_location_name: String,
    pub destination_location_name: String,
    pub origin_place_name: String,
    pub destination_place_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ShipmentStatus::Sent.is_terminal());
        assert!(!ShipmentStatus::InTransit.is_terminal());
        assert!(ShipmentStatus::Received.is_terminal());
        assert!(ShipmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_receive_allowed_from_sent_and_in_transit() {
        assert!(ShipmentStatus::Sent.can_receive());
        assert!(ShipmentStatus::InTransit.can_receive());
        assert!(!ShipmentStatus::Received.can_receive());
        assert!(!ShipmentStatus::Cancelled.can_receive());
    }

    #[test]
    fn test_cancel_rejected_once_terminal() {
        assert!(ShipmentStatus::Sent.can_cancel());
        assert!(!ShipmentStatus::Received.can_cancel());
        assert!(!ShipmentStatus::Cancelled.can_cancel());
    }
}
