//! Business logic services

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod movement;
pub mod shipment;
pub mod stock;

pub use audit::AuditService;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use movement::MovementService;
pub use shipment::ShipmentService;
pub use stock::StockService;
