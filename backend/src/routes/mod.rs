//! Route definitions for the water utility inventory API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - catalog reads
        .nest("/catalog", catalog_routes())
        // Protected routes - stock queries
        .nest("/stock", stock_routes())
        // Protected routes - movements
        .nest("/movements", movement_routes())
        // Protected routes - shipments
        .nest("/shipments", shipment_routes())
        // Protected routes - audit trail
        .nest("/audit", audit_routes())
}

/// Authentication routes. Login and refresh are public; the profile
/// endpoint requires a token.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route(
            "/me",
            get(handlers::me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Catalog read routes (protected)
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/locations", get(handlers::list_locations))
        .route("/places", get(handlers::list_places))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock query routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/products/:product_id", get(handlers::product_stock))
        .route("/products/:product_id/total", get(handlers::product_total))
        .route("/locations/:location_id", get(handlers::location_stock))
        .route("/low", get(handlers::low_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Movement routes (protected)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements))
        .route("/entries", post(handlers::record_entry))
        .route("/exits", post(handlers::record_exit))
        .route("/transfers", post(handlers::record_transfer))
        .route("/adjustments", post(handlers::record_adjustment))
        .route("/recent", get(handlers::recent_movements))
        .route("/stats", get(handlers::movement_stats))
        .route("/:movement_id", get(handlers::get_movement))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shipment routes (protected)
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shipments).post(handlers::create_shipment),
        )
        .route("/pending", get(handlers::pending_reception))
        .route("/sent-by-me", get(handlers::sent_by_me))
        .route("/received-by-me", get(handlers::received_by_me))
        .route("/:shipment_id", get(handlers::get_shipment))
        .route("/:shipment_id/receive", post(handlers::receive_shipment))
        .route("/:shipment_id/cancel", post(handlers::cancel_shipment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Audit trail routes (protected)
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_audit))
        .route("/recent", get(handlers::recent_audit))
        .route("/stats", get(handlers::audit_stats))
        .route(
            "/entities/:entity_type/:entity_id",
            get(handlers::audit_by_entity),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
