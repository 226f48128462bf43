//! HTTP request handlers

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod movement;
pub mod shipment;
pub mod stock;

pub use audit::{audit_by_entity, audit_stats, list_audit, recent_audit};
pub use auth::{login, me, refresh};
pub use catalog::{list_locations, list_places};
pub use health::health_check;
pub use movement::{
    get_movement, list_movements, movement_stats, record_adjustment, record_entry, record_exit,
    record_transfer, recent_movements,
};
pub use shipment::{
    cancel_shipment, create_shipment, get_shipment, list_shipments, pending_reception,
    receive_shipment, received_by_me, sent_by_me,
};
pub use stock::{location_stock, low_stock, product_stock, product_total};
