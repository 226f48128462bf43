//! Domain models for the water utility inventory platform

mod audit;
mod catalog;
mod movement;
mod shipment;
mod stock;
mod user;

pub use audit::*;
pub use catalog::*;
pub use movement::*;
pub use shipment::*;
pub use stock::*;
pub use user::*;
