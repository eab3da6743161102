//! Data store access
//!
//! Services talk to the store through three narrow traits, one per
//! component. `PgStore` is the production implementation; `MemoryStore`
//! keeps everything in process and backs the test suite.
//!
//! Every mutating method is atomic: it either applies all of its statements
//! or none of them.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{validate_quantity_scale, Page};

use crate::error::{AppError, AppResult};
use crate::models::{
    BranchStock, CatalogItem, CatalogQuery, MovementRecord, NewBranchReceipt,
    NewSupplierReturn, NewWarehouseReceipt, Recorded, StockInput, StockMonitorRow, StockQuery,
    StockRow, Supplier, SupplierDeletion, SupplierFields, SupplierReturn, SupplierReturnRecord,
    WarehouseStock, WarehouseStockInput,
};

pub mod memory;
pub mod postgres;

pub use memory::{ItemSeed, MemoryStore};
pub use postgres::PgStore;

/// Quantity-changing operations
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn branch_stock(&self, id: i64) -> AppResult<Option<BranchStock>>;

    async fn warehouse_stock(&self, id: i64) -> AppResult<Option<WarehouseStock>>;

    /// Insert a branch receipt and add its qty to the stock row.
    /// `NotFound` when the stock row or the delivering supplier is absent.
    async fn record_branch_receipt(
        &self,
        receipt: NewBranchReceipt,
    ) -> AppResult<Recorded<StockInput>>;

    /// Insert a warehouse receipt and add its qty to the stock row
    async fn record_warehouse_receipt(
        &self,
        receipt: NewWarehouseReceipt,
    ) -> AppResult<Recorded<WarehouseStockInput>>;

    /// Overwrite the warehouse quantity without a movement record
    async fn set_warehouse_quantity(&self, id: i64, quantity: Decimal) -> AppResult<WarehouseStock>;

    /// Insert a supplier return and subtract its quantity from the stock row
    async fn record_supplier_return(
        &self,
        supplier_return: NewSupplierReturn,
    ) -> AppResult<Recorded<SupplierReturn>>;
}

/// Read-only listings. Counts ignore the page window.
#[async_trait]
pub trait StockQueryStore: Send + Sync {
    /// Cheap round trip used by the health check
    async fn ping(&self) -> AppResult<()>;

    async fn list_branch_stock(&self, branch_id: i64, query: &StockQuery)
        -> AppResult<Page<StockRow>>;

    async fn list_warehouse_stock(&self, query: &StockQuery) -> AppResult<Page<StockRow>>;

    async fn list_stock_monitor(&self, query: &StockQuery) -> AppResult<Page<StockMonitorRow>>;

    async fn list_catalog(&self, query: &CatalogQuery) -> AppResult<Page<CatalogItem>>;

    async fn branch_movement_history(&self, branch_item_id: i64)
        -> AppResult<Page<MovementRecord>>;

    async fn warehouse_movement_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<MovementRecord>>;

    async fn supplier_movement_history(&self, supplier_id: i64) -> AppResult<Page<MovementRecord>>;

    async fn supplier_return_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<SupplierReturnRecord>>;
}

#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn list_suppliers(&self, search: Option<&str>) -> AppResult<Vec<Supplier>>;

    async fn get_supplier(&self, id: i64) -> AppResult<Option<Supplier>>;

    async fn insert_supplier(&self, fields: &SupplierFields) -> AppResult<Supplier>;

    /// `None` when no supplier has this id
    async fn update_supplier(&self, id: i64, fields: &SupplierFields)
        -> AppResult<Option<Supplier>>;

    /// Detach movements, delete returns, delete the supplier.
    /// `None` when no supplier has this id.
    async fn delete_supplier(&self, id: i64) -> AppResult<Option<SupplierDeletion>>;
}

/// Stock quantity after applying `delta`. A result the quantity column
/// cannot hold is a validation failure on `field`.
pub(crate) fn adjusted_quantity(field: &str, current: Decimal, delta: Decimal) -> AppResult<Decimal> {
    let adjusted = current + delta;
    validate_quantity_scale(adjusted).map_err(|message| AppError::validation(field, message))?;
    Ok(adjusted)
}

/// Everything the HTTP layer needs from a store
pub trait InventoryStore: LedgerStore + StockQueryStore + SupplierStore {}

impl<T> InventoryStore for T where T: LedgerStore + StockQueryStore + SupplierStore {}

pub type SharedStore = Arc<dyn InventoryStore>;
