//! Shared types and models for the water utility inventory platform
//!
//! This crate contains the domain model (products, locations, places,
//! stock entries, movements, shipments, audit records) together with
//! the pure stock arithmetic and lifecycle rules the backend services
//! are built on.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
