//! HTTP handlers for the supplier directory

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{supplier_ref, ApiResponse, Page};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, AppResult};
use crate::models::{MovementRecord, Supplier, SupplierDeletion};
use crate::services::supplier::SupplierInput;
use crate::services::{StockQueryService, SupplierService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SupplierSearch {
    pub search: Option<String>,
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SupplierSearch>,
) -> AppResult<Json<ApiResponse<Vec<Supplier>>>> {
    let service = SupplierService::new(state.store);
    let suppliers = service.list_suppliers(params.search.as_deref()).await?;
    Ok(Json(ApiResponse::list(
        "Suppliers Successfully Retrieved",
        Page::full(suppliers),
    )))
}

/// Id 0 asks for no supplier and yields `data: null`
pub async fn get_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let id = supplier_ref(Some(id)).map_err(|message| AppError::validation("id", message))?;
    let service = SupplierService::new(state.store);
    let response = match service.get_supplier(id).await? {
        Some(supplier) => ApiResponse::ok("Supplier Successfully Retrieved", supplier),
        None => ApiResponse::empty("No Supplier Requested"),
    };
    Ok(Json(response))
}

/// Create (id 0) or update a supplier
pub async fn upsert_supplier(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let service = SupplierService::new(state.store);
    let supplier = service.upsert_supplier(input).await?;
    Ok(Json(ApiResponse::ok("Supplier Successfully Saved", supplier)))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<SupplierDeletion>>> {
    let service = SupplierService::new(state.store);
    let deletion = service.delete_supplier(id).await?;
    Ok(Json(ApiResponse::ok("Supplier Successfully Deleted", deletion)))
}

/// Warehouse deliveries made by one supplier
pub async fn get_supplier_movement_history(
    State(state): State<AppState>,
    ApiPath(supplier_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<MovementRecord>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.supplier_movement_history(supplier_id).await?;
    Ok(Json(ApiResponse::list("Stock History Successfully Retrieved", page)))
}
