//! Stock rows, movement records and listing queries

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{http_date, CategoryFilter, Pagination, StockFilter};
use sqlx::FromRow;

/// Item master record. Read by the ledger, never written by it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub price: Decimal,
    pub cost: Decimal,
    pub unit_of_measure: String,
    pub sell_by_unit: bool,
    pub is_managed: bool,
    pub image_path: Option<String>,
    /// Branch critical threshold
    pub critical_value: Decimal,
    /// Warehouse critical threshold
    pub wh_critical_value: Decimal,
    pub moq: Option<Decimal>,
}

/// One (branch, item) stock row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BranchStock {
    pub id: i64,
    pub branch_id: i64,
    pub item_id: i64,
    pub quantity: Decimal,
}

/// The warehouse stock row of one managed item
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStock {
    pub id: i64,
    pub item_id: i64,
    pub quantity: Decimal,
}

/// Branch receipt movement (`stock_inputs`)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockInput {
    pub id: i64,
    pub qty: Decimal,
    pub moq: Decimal,
    #[serde(with = "http_date")]
    pub delivery_date: NaiveDateTime,
    pub delivered_by: Option<i64>,
    #[serde(rename = "expectedTotalQty")]
    pub expected_qty: Decimal,
    #[serde(rename = "actualTotalQty")]
    pub actual_qty: Decimal,
    pub branch_item_id: i64,
}

/// Warehouse receipt movement (`wh_stock_inputs`)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStockInput {
    pub id: i64,
    pub qty: Decimal,
    #[serde(with = "http_date")]
    pub delivery_date: NaiveDateTime,
    pub delivered_by: Option<i64>,
    #[serde(rename = "expectedTotalQty")]
    pub expected_qty: Decimal,
    #[serde(rename = "actualTotalQty")]
    pub actual_qty: Decimal,
    pub warehouse_item_id: i64,
}

/// Goods sent back from the warehouse to a supplier
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReturn {
    pub id: i64,
    pub supplier_id: i64,
    pub warehouse_item_id: i64,
    pub reason: String,
    pub quantity: Decimal,
    #[serde(with = "http_date")]
    pub date: NaiveDateTime,
}

/// A movement record together with the stock row's quantity after it was applied
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recorded<M> {
    #[serde(flatten)]
    pub record: M,
    pub new_quantity: Decimal,
}

// ============================================================================
// Inserts
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewBranchReceipt {
    pub branch_item_id: i64,
    pub qty: Decimal,
    pub moq: Decimal,
    pub delivery_date: NaiveDateTime,
    pub delivered_by: Option<i64>,
    pub expected_qty: Decimal,
    pub actual_qty: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewWarehouseReceipt {
    pub warehouse_item_id: i64,
    pub qty: Decimal,
    pub delivery_date: NaiveDateTime,
    pub delivered_by: Option<i64>,
    pub expected_qty: Decimal,
    pub actual_qty: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewSupplierReturn {
    pub warehouse_item_id: i64,
    pub supplier_id: i64,
    pub reason: String,
    pub quantity: Decimal,
    pub date: NaiveDateTime,
}

// ============================================================================
// Listings
// ============================================================================

/// Filter, search and page window of a stock listing
#[derive(Debug, Clone, Default)]
pub struct StockQuery {
    pub filter: StockFilter,
    pub search: Option<String>,
    pub pagination: Pagination,
}

/// Catalog listing, optionally scoped to one branch's stock
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub branch_id: Option<i64>,
    pub category: CategoryFilter,
    pub search: Option<String>,
    pub pagination: Pagination,
}

/// Stock row joined with its item, as listed for a branch or the warehouse.
/// `critical_value` is the threshold of the listed location.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub quantity: Decimal,
    pub unit_of_measure: String,
    pub critical_value: Decimal,
    pub sell_by_unit: bool,
    pub moq: Option<Decimal>,
    pub image_path: Option<String>,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub price: Decimal,
    pub cost: Decimal,
    pub is_managed: bool,
    pub image_path: Option<String>,
    /// Null outside a branch scope, or when the branch has no stock row
    pub quantity: Option<Decimal>,
    pub sell_by_unit: bool,
}

/// Quantity of one item at one location
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuantity {
    pub stock_id: i64,
    /// Null for the warehouse
    pub branch_id: Option<i64>,
    pub location_name: String,
    pub quantity: Decimal,
    pub low_stock: bool,
}

/// Headquarters view of one managed item across every location
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMonitorRow {
    pub id: i64,
    pub name: String,
    pub unit_of_measure: String,
    pub sell_by_unit: bool,
    pub critical_value: Decimal,
    pub wh_critical_value: Decimal,
    pub moq: Option<Decimal>,
    pub image_path: Option<String>,
    #[sqlx(skip)]
    pub warehouse: Option<LocationQuantity>,
    #[sqlx(skip)]
    pub branches: Vec<LocationQuantity>,
}

/// Movement history entry joined with supplier and item names
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    pub id: i64,
    pub stock_id: i64,
    pub qty: Decimal,
    /// Only branch receipts record the order quantity
    pub moq: Option<Decimal>,
    #[serde(with = "http_date")]
    pub delivery_date: NaiveDateTime,
    pub delivered_by: Option<i64>,
    pub supplier_name: Option<String>,
    #[serde(rename = "expectedTotalQty")]
    pub expected_qty: Decimal,
    #[serde(rename = "actualTotalQty")]
    pub actual_qty: Decimal,
    pub item_name: String,
    pub unit_of_measure: String,
}

/// Supplier return history entry
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReturnRecord {
    pub id: i64,
    pub warehouse_item_id: i64,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub reason: String,
    pub quantity: Decimal,
    #[serde(with = "http_date")]
    pub date: NaiveDateTime,
}

/// Location label of the central warehouse in the stock monitor
pub const WAREHOUSE_NAME: &str = "Warehouse";
