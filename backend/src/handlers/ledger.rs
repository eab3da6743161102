//! HTTP handlers for quantity-changing operations

use axum::{extract::State, Json};
use shared::ApiResponse;

use super::extract::{ApiJson, ApiPath};
use crate::error::AppResult;
use crate::models::{Recorded, StockInput, SupplierReturn, WarehouseStock, WarehouseStockInput};
use crate::services::ledger::{
    BranchReceiptInput, SupplierReturnInput, WarehouseQuantityInput, WarehouseReceiptInput,
};
use crate::services::LedgerService;
use crate::AppState;

/// Record goods received at a branch
pub async fn record_branch_receipt(
    State(state): State<AppState>,
    ApiPath(branch_item_id): ApiPath<i64>,
    ApiJson(input): ApiJson<BranchReceiptInput>,
) -> AppResult<Json<ApiResponse<Recorded<StockInput>>>> {
    let service = LedgerService::new(state.store);
    let recorded = service.record_branch_receipt(branch_item_id, input).await?;
    Ok(Json(ApiResponse::ok("Stock Input Successfully Recorded", recorded)))
}

/// Record goods received at the warehouse
pub async fn record_warehouse_receipt(
    State(state): State<AppState>,
    ApiPath(warehouse_item_id): ApiPath<i64>,
    ApiJson(input): ApiJson<WarehouseReceiptInput>,
) -> AppResult<Json<ApiResponse<Recorded<WarehouseStockInput>>>> {
    let service = LedgerService::new(state.store);
    let recorded = service
        .record_warehouse_receipt(warehouse_item_id, input)
        .await?;
    Ok(Json(ApiResponse::ok("Stock Input Successfully Recorded", recorded)))
}

/// Manually correct a warehouse quantity
pub async fn edit_warehouse_quantity(
    State(state): State<AppState>,
    ApiPath(warehouse_item_id): ApiPath<i64>,
    ApiJson(input): ApiJson<WarehouseQuantityInput>,
) -> AppResult<Json<ApiResponse<WarehouseStock>>> {
    let service = LedgerService::new(state.store);
    let stock = service
        .edit_warehouse_quantity(warehouse_item_id, input)
        .await?;
    Ok(Json(ApiResponse::ok("Quantity Successfully Updated", stock)))
}

/// Return warehouse goods to a supplier
pub async fn return_to_supplier(
    State(state): State<AppState>,
    ApiPath(warehouse_item_id): ApiPath<i64>,
    ApiJson(input): ApiJson<SupplierReturnInput>,
) -> AppResult<Json<ApiResponse<Recorded<SupplierReturn>>>> {
    let service = LedgerService::new(state.store);
    let recorded = service.return_to_supplier(warehouse_item_id, input).await?;
    Ok(Json(ApiResponse::ok("Item Successfully Returned", recorded)))
}
