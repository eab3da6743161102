//! HTTP handlers for stock listings and movement histories

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{normalize_search, ApiResponse, CategoryFilter, Pagination, StockFilter};

use super::extract::{ApiPath, ApiQuery};
use crate::error::{AppError, AppResult};
use crate::models::{
    CatalogItem, CatalogQuery, MovementRecord, StockMonitorRow, StockQuery, StockRow,
    SupplierReturnRecord,
};
use crate::services::StockQueryService;
use crate::AppState;

/// `?filter=&search=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct StockListParams {
    pub filter: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

/// `?branch_id=&category_id=&search=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub branch_id: Option<i64>,
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

/// Pages below 1 read as the first page
fn pagination(page: Option<i64>) -> Pagination {
    Pagination::page(page.map(|p| u32::try_from(p.max(1)).unwrap_or(u32::MAX)))
}

impl StockListParams {
    fn into_query(self) -> AppResult<StockQuery> {
        Ok(StockQuery {
            filter: StockFilter::parse(self.filter.as_deref())
                .map_err(|message| AppError::validation("filter", message))?,
            search: normalize_search(self.search.as_deref()),
            pagination: pagination(self.page),
        })
    }
}

impl CatalogParams {
    fn into_query(self) -> AppResult<CatalogQuery> {
        Ok(CatalogQuery {
            // 0 means no branch scope
            branch_id: self.branch_id.filter(|id| *id > 0),
            category: CategoryFilter::from_raw(self.category_id)
                .map_err(|message| AppError::validation("category_id", message))?,
            search: normalize_search(self.search.as_deref()),
            pagination: pagination(self.page),
        })
    }
}

/// List one branch's stock
pub async fn list_branch_stock(
    State(state): State<AppState>,
    ApiPath(branch_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<StockListParams>,
) -> AppResult<Json<ApiResponse<Vec<StockRow>>>> {
    let service = StockQueryService::new(state.store);
    let page = service
        .list_branch_stock(branch_id, &params.into_query()?)
        .await?;
    Ok(Json(ApiResponse::list("Stocks Successfully Retrieved", page)))
}

/// List warehouse stock of managed items
pub async fn list_warehouse_stock(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StockListParams>,
) -> AppResult<Json<ApiResponse<Vec<StockRow>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.list_warehouse_stock(&params.into_query()?).await?;
    Ok(Json(ApiResponse::list("Stocks Successfully Retrieved", page)))
}

/// Headquarters view of every managed item at every location
pub async fn list_stock_monitor(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StockListParams>,
) -> AppResult<Json<ApiResponse<Vec<StockMonitorRow>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.list_stock_monitor(&params.into_query()?).await?;
    Ok(Json(ApiResponse::list("Stocks Successfully Retrieved", page)))
}

pub async fn list_catalog(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CatalogParams>,
) -> AppResult<Json<ApiResponse<Vec<CatalogItem>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.list_catalog(&params.into_query()?).await?;
    Ok(Json(ApiResponse::list("Items Successfully Retrieved", page)))
}

/// Receipts recorded against one branch stock row
pub async fn get_movement_history(
    State(state): State<AppState>,
    ApiPath(branch_item_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<MovementRecord>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.movement_history(branch_item_id).await?;
    Ok(Json(ApiResponse::list("Stock History Successfully Retrieved", page)))
}

/// Receipts recorded against one warehouse stock row
pub async fn get_warehouse_movement_history(
    State(state): State<AppState>,
    ApiPath(warehouse_item_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<MovementRecord>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.warehouse_movement_history(warehouse_item_id).await?;
    Ok(Json(ApiResponse::list("Stock History Successfully Retrieved", page)))
}

pub async fn get_supplier_return_history(
    State(state): State<AppState>,
    ApiPath(warehouse_item_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<SupplierReturnRecord>>>> {
    let service = StockQueryService::new(state.store);
    let page = service.supplier_return_history(warehouse_item_id).await?;
    Ok(Json(ApiResponse::list("Returns Successfully Retrieved", page)))
}
