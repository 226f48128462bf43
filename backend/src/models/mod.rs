//! Database models for the water utility inventory backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
