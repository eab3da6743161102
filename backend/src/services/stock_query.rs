//! Stock query service: listings, catalog, stock monitor and histories

use shared::Page;

use crate::error::AppResult;
use crate::models::{
    CatalogItem, CatalogQuery, MovementRecord, StockMonitorRow, StockQuery, StockRow,
    SupplierReturnRecord,
};
use crate::store::{SharedStore, StockQueryStore};

#[derive(Clone)]
pub struct StockQueryService {
    store: SharedStore,
}

impl StockQueryService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stock rows of one branch, thresholded by the branch critical value
    pub async fn list_branch_stock(
        &self,
        branch_id: i64,
        query: &StockQuery,
    ) -> AppResult<Page<StockRow>> {
        tracing::debug!(
            branch_id,
            filter = query.filter.as_str(),
            search = ?query.search,
            page = query.pagination.page,
            "Listing branch stock"
        );
        self.store.list_branch_stock(branch_id, query).await
    }

    /// Warehouse rows of managed items, thresholded by the warehouse critical value
    pub async fn list_warehouse_stock(&self, query: &StockQuery) -> AppResult<Page<StockRow>> {
        tracing::debug!(
            filter = query.filter.as_str(),
            search = ?query.search,
            page = query.pagination.page,
            "Listing warehouse stock"
        );
        self.store.list_warehouse_stock(query).await
    }

    pub async fn list_stock_monitor(&self, query: &StockQuery) -> AppResult<Page<StockMonitorRow>> {
        tracing::debug!(
            filter = query.filter.as_str(),
            search = ?query.search,
            page = query.pagination.page,
            "Listing stock monitor"
        );
        self.store.list_stock_monitor(query).await
    }

    pub async fn list_catalog(&self, query: &CatalogQuery) -> AppResult<Page<CatalogItem>> {
        tracing::debug!(
            branch_id = ?query.branch_id,
            category_id = ?query.category.id(),
            search = ?query.search,
            page = query.pagination.page,
            "Listing catalog"
        );
        self.store.list_catalog(query).await
    }

    pub async fn movement_history(&self, branch_item_id: i64) -> AppResult<Page<MovementRecord>> {
        self.store.branch_movement_history(branch_item_id).await
    }

    pub async fn warehouse_movement_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        self.store.warehouse_movement_history(warehouse_item_id).await
    }

    /// Warehouse movements delivered by one supplier
    pub async fn supplier_movement_history(
        &self,
        supplier_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        self.store.supplier_movement_history(supplier_id).await
    }

    pub async fn supplier_return_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<SupplierReturnRecord>> {
        self.store.supplier_return_history(warehouse_item_id).await
    }
}
