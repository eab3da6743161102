//! Route definitions for the BPIMS stock ledger

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/branches/:branch_id/stocks", get(handlers::list_branch_stock))
        .nest("/branch-stocks", branch_stock_routes())
        .nest("/warehouse", warehouse_routes())
        .route("/stock-monitor", get(handlers::list_stock_monitor))
        .route("/catalog", get(handlers::list_catalog))
        .nest("/suppliers", supplier_routes())
        .route("/receipts", post(handlers::generate_receipt))
}

/// Branch stock row routes
fn branch_stock_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/history", get(handlers::get_movement_history))
        .route("/:id/receipts", post(handlers::record_branch_receipt))
}

/// Warehouse stock routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(handlers::list_warehouse_stock))
        .route("/stocks/:id/history", get(handlers::get_warehouse_movement_history))
        .route("/stocks/:id/receipts", post(handlers::record_warehouse_receipt))
        .route("/stocks/:id/quantity", put(handlers::edit_warehouse_quantity))
        .route(
            "/stocks/:id/returns",
            get(handlers::get_supplier_return_history).post(handlers::return_to_supplier),
        )
}

/// Supplier directory routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::upsert_supplier))
        .route(
            "/:id",
            get(handlers::get_supplier).delete(handlers::delete_supplier),
        )
        .route("/:id/history", get(handlers::get_supplier_movement_history))
}
