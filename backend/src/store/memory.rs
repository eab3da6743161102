//! In-process store
//!
//! Holds every table in ordered maps behind one `RwLock`. Each trait method
//! takes the lock once for its whole duration, so mutations are atomic and
//! serialized the same way row locks serialize them in PostgreSQL.
//! Ids come from a single sequence shared by all tables.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{is_low_stock, name_matches, CategoryFilter, Page, Pagination};
use tokio::sync::RwLock;

use super::{adjusted_quantity, LedgerStore, StockQueryStore, SupplierStore};
use crate::error::{AppError, AppResult};
use crate::models::{
    BranchStock, CatalogItem, CatalogQuery, Item, LocationQuantity, MovementRecord,
    NewBranchReceipt, NewSupplierReturn, NewWarehouseReceipt, Recorded, StockInput,
    StockMonitorRow, StockQuery, StockRow, Supplier, SupplierDeletion, SupplierFields,
    SupplierReturn, SupplierReturnRecord, WarehouseStock, WarehouseStockInput, WAREHOUSE_NAME,
};

/// Catalog entry to seed an in-memory store with
#[derive(Debug, Clone)]
pub struct ItemSeed {
    pub name: String,
    pub category_id: Option<i64>,
    pub price: Decimal,
    pub cost: Decimal,
    pub unit_of_measure: String,
    pub sell_by_unit: bool,
    pub is_managed: bool,
    pub image_path: Option<String>,
    pub critical_value: Decimal,
    pub wh_critical_value: Decimal,
    pub moq: Option<Decimal>,
}

impl ItemSeed {
    /// A managed, sold-by-unit item with zero thresholds
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category_id: None,
            price: Decimal::ZERO,
            cost: Decimal::ZERO,
            unit_of_measure: "pcs".to_string(),
            sell_by_unit: true,
            is_managed: true,
            image_path: None,
            critical_value: Decimal::ZERO,
            wh_critical_value: Decimal::ZERO,
            moq: None,
        }
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn thresholds(mut self, branch: Decimal, warehouse: Decimal) -> Self {
        self.critical_value = branch;
        self.wh_critical_value = warehouse;
        self
    }

    pub fn unmanaged(mut self) -> Self {
        self.is_managed = false;
        self
    }
}

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    branches: BTreeMap<i64, String>,
    items: BTreeMap<i64, Item>,
    branch_items: BTreeMap<i64, BranchStock>,
    warehouse_items: BTreeMap<i64, WarehouseStock>,
    stock_inputs: BTreeMap<i64, StockInput>,
    wh_stock_inputs: BTreeMap<i64, WarehouseStockInput>,
    suppliers: BTreeMap<i64, Supplier>,
    supplier_returns: BTreeMap<i64, SupplierReturn>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn require_supplier(&self, id: Option<i64>) -> AppResult<()> {
        match id {
            Some(id) if !self.suppliers.contains_key(&id) => {
                Err(AppError::NotFound("Supplier".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn supplier_name(&self, id: Option<i64>) -> Option<String> {
        id.and_then(|id| self.suppliers.get(&id)).map(|s| s.name.clone())
    }

    fn branch_movement(&self, input: &StockInput) -> Option<MovementRecord> {
        let stock = self.branch_items.get(&input.branch_item_id)?;
        let item = self.items.get(&stock.item_id)?;
        Some(MovementRecord {
            id: input.id,
            stock_id: input.branch_item_id,
            qty: input.qty,
            moq: Some(input.moq),
            delivery_date: input.delivery_date,
            delivered_by: input.delivered_by,
            supplier_name: self.supplier_name(input.delivered_by),
            expected_qty: input.expected_qty,
            actual_qty: input.actual_qty,
            item_name: item.name.clone(),
            unit_of_measure: item.unit_of_measure.clone(),
        })
    }

    fn warehouse_movement(&self, input: &WarehouseStockInput) -> Option<MovementRecord> {
        let stock = self.warehouse_items.get(&input.warehouse_item_id)?;
        let item = self.items.get(&stock.item_id)?;
        Some(MovementRecord {
            id: input.id,
            stock_id: input.warehouse_item_id,
            qty: input.qty,
            moq: None,
            delivery_date: input.delivery_date,
            delivered_by: input.delivered_by,
            supplier_name: self.supplier_name(input.delivered_by),
            expected_qty: input.expected_qty,
            actual_qty: input.actual_qty,
            item_name: item.name.clone(),
            unit_of_measure: item.unit_of_measure.clone(),
        })
    }
}

fn matches_search(name: &str, search: &Option<String>) -> bool {
    search.as_deref().map_or(true, |s| name_matches(name, s))
}

fn stock_row(id: i64, item: &Item, quantity: Decimal, threshold: Decimal) -> StockRow {
    StockRow {
        id,
        item_id: item.id,
        name: item.name.clone(),
        quantity,
        unit_of_measure: item.unit_of_measure.clone(),
        critical_value: threshold,
        sell_by_unit: item.sell_by_unit,
        moq: item.moq,
        image_path: item.image_path.clone(),
        low_stock: is_low_stock(quantity, threshold),
    }
}

/// Order by item name then id, then cut the page window.
/// Names compare byte-wise, the same order as PostgreSQL's `COLLATE "C"`.
fn paginate<T>(mut rows: Vec<T>, pagination: Pagination, key: impl Fn(&T) -> (String, i64)) -> Page<T> {
    rows.sort_by_key(|row| key(row));
    let total_count = rows.len() as i64;
    Page::new(pagination.window(rows), total_count)
}

/// Store that keeps every table in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_branch(&self, name: &str) -> i64 {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.branches.insert(id, name.to_string());
        id
    }

    pub async fn add_item(&self, seed: ItemSeed) -> i64 {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.items.insert(
            id,
            Item {
                id,
                name: seed.name,
                category_id: seed.category_id,
                price: seed.price,
                cost: seed.cost,
                unit_of_measure: seed.unit_of_measure,
                sell_by_unit: seed.sell_by_unit,
                is_managed: seed.is_managed,
                image_path: seed.image_path,
                critical_value: seed.critical_value,
                wh_critical_value: seed.wh_critical_value,
                moq: seed.moq,
            },
        );
        id
    }

    pub async fn add_branch_stock(&self, branch_id: i64, item_id: i64, quantity: Decimal) -> i64 {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.branch_items.insert(
            id,
            BranchStock {
                id,
                branch_id,
                item_id,
                quantity,
            },
        );
        id
    }

    pub async fn add_warehouse_stock(&self, item_id: i64, quantity: Decimal) -> i64 {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.warehouse_items.insert(
            id,
            WarehouseStock {
                id,
                item_id,
                quantity,
            },
        );
        id
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn branch_stock(&self, id: i64) -> AppResult<Option<BranchStock>> {
        Ok(self.tables.read().await.branch_items.get(&id).cloned())
    }

    async fn warehouse_stock(&self, id: i64) -> AppResult<Option<WarehouseStock>> {
        Ok(self.tables.read().await.warehouse_items.get(&id).cloned())
    }

    async fn record_branch_receipt(
        &self,
        receipt: NewBranchReceipt,
    ) -> AppResult<Recorded<StockInput>> {
        let mut t = self.tables.write().await;
        let current = t
            .branch_items
            .get(&receipt.branch_item_id)
            .map(|stock| stock.quantity)
            .ok_or_else(|| AppError::NotFound("Branch stock".to_string()))?;
        t.require_supplier(receipt.delivered_by)?;
        let new_quantity = adjusted_quantity("qty", current, receipt.qty)?;

        let id = t.next_id();
        let record = StockInput {
            id,
            qty: receipt.qty,
            moq: receipt.moq,
            delivery_date: receipt.delivery_date,
            delivered_by: receipt.delivered_by,
            expected_qty: receipt.expected_qty,
            actual_qty: receipt.actual_qty,
            branch_item_id: receipt.branch_item_id,
        };
        t.stock_inputs.insert(id, record.clone());

        let stock = t
            .branch_items
            .get_mut(&receipt.branch_item_id)
            .ok_or_else(|| AppError::NotFound("Branch stock".to_string()))?;
        stock.quantity = new_quantity;

        Ok(Recorded {
            record,
            new_quantity: stock.quantity,
        })
    }

    async fn record_warehouse_receipt(
        &self,
        receipt: NewWarehouseReceipt,
    ) -> AppResult<Recorded<WarehouseStockInput>> {
        let mut t = self.tables.write().await;
        let current = t
            .warehouse_items
            .get(&receipt.warehouse_item_id)
            .map(|stock| stock.quantity)
            .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))?;
        t.require_supplier(receipt.delivered_by)?;
        let new_quantity = adjusted_quantity("qty", current, receipt.qty)?;

        let id = t.next_id();
        let record = WarehouseStockInput {
            id,
            qty: receipt.qty,
            delivery_date: receipt.delivery_date,
            delivered_by: receipt.delivered_by,
            expected_qty: receipt.expected_qty,
            actual_qty: receipt.actual_qty,
            warehouse_item_id: receipt.warehouse_item_id,
        };
        t.wh_stock_inputs.insert(id, record.clone());

        let stock = t
            .warehouse_items
            .get_mut(&receipt.warehouse_item_id)
            .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))?;
        stock.quantity = new_quantity;

        Ok(Recorded {
            record,
            new_quantity: stock.quantity,
        })
    }

    async fn set_warehouse_quantity(&self, id: i64, quantity: Decimal) -> AppResult<WarehouseStock> {
        let mut t = self.tables.write().await;
        let stock = t
            .warehouse_items
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))?;
        stock.quantity = quantity;
        Ok(stock.clone())
    }

    async fn record_supplier_return(
        &self,
        supplier_return: NewSupplierReturn,
    ) -> AppResult<Recorded<SupplierReturn>> {
        let mut t = self.tables.write().await;
        let current = t
            .warehouse_items
            .get(&supplier_return.warehouse_item_id)
            .map(|stock| stock.quantity)
            .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))?;
        t.require_supplier(Some(supplier_return.supplier_id))?;
        let new_quantity = adjusted_quantity("quantity", current, -supplier_return.quantity)?;

        let id = t.next_id();
        let record = SupplierReturn {
            id,
            supplier_id: supplier_return.supplier_id,
            warehouse_item_id: supplier_return.warehouse_item_id,
            reason: supplier_return.reason,
            quantity: supplier_return.quantity,
            date: supplier_return.date,
        };
        t.supplier_returns.insert(id, record.clone());

        let stock = t
            .warehouse_items
            .get_mut(&record.warehouse_item_id)
            .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))?;
        stock.quantity = new_quantity;

        Ok(Recorded {
            new_quantity: stock.quantity,
            record,
        })
    }
}

#[async_trait]
impl StockQueryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list_branch_stock(
        &self,
        branch_id: i64,
        query: &StockQuery,
    ) -> AppResult<Page<StockRow>> {
        let t = self.tables.read().await;
        let rows = t
            .branch_items
            .values()
            .filter(|stock| stock.branch_id == branch_id)
            .filter_map(|stock| t.items.get(&stock.item_id).map(|item| (stock, item)))
            .filter(|(stock, item)| query.filter.admits(stock.quantity, item.critical_value))
            .filter(|(_, item)| matches_search(&item.name, &query.search))
            .map(|(stock, item)| stock_row(stock.id, item, stock.quantity, item.critical_value))
            .collect();

        Ok(paginate(rows, query.pagination, |row: &StockRow| (row.name.clone(), row.id)))
    }

    async fn list_warehouse_stock(&self, query: &StockQuery) -> AppResult<Page<StockRow>> {
        let t = self.tables.read().await;
        let rows = t
            .warehouse_items
            .values()
            .filter_map(|stock| t.items.get(&stock.item_id).map(|item| (stock, item)))
            .filter(|(_, item)| item.is_managed)
            .filter(|(stock, item)| query.filter.admits(stock.quantity, item.wh_critical_value))
            .filter(|(_, item)| matches_search(&item.name, &query.search))
            .map(|(stock, item)| stock_row(stock.id, item, stock.quantity, item.wh_critical_value))
            .collect();

        Ok(paginate(rows, query.pagination, |row: &StockRow| (row.name.clone(), row.id)))
    }

    async fn list_stock_monitor(&self, query: &StockQuery) -> AppResult<Page<StockMonitorRow>> {
        let t = self.tables.read().await;
        let rows = t
            .items
            .values()
            .filter(|item| item.is_managed)
            .filter(|item| matches_search(&item.name, &query.search))
            .map(|item| {
                let warehouse = t
                    .warehouse_items
                    .values()
                    .find(|stock| stock.item_id == item.id)
                    .map(|stock| LocationQuantity {
                        stock_id: stock.id,
                        branch_id: None,
                        location_name: WAREHOUSE_NAME.to_string(),
                        quantity: stock.quantity,
                        low_stock: is_low_stock(stock.quantity, item.wh_critical_value),
                    });

                let mut branches: Vec<LocationQuantity> = t
                    .branch_items
                    .values()
                    .filter(|stock| stock.item_id == item.id)
                    .map(|stock| LocationQuantity {
                        stock_id: stock.id,
                        branch_id: Some(stock.branch_id),
                        location_name: t.branches.get(&stock.branch_id).cloned().unwrap_or_default(),
                        quantity: stock.quantity,
                        low_stock: is_low_stock(stock.quantity, item.critical_value),
                    })
                    .collect();
                branches.sort_by_key(|location| location.branch_id);

                StockMonitorRow {
                    id: item.id,
                    name: item.name.clone(),
                    unit_of_measure: item.unit_of_measure.clone(),
                    sell_by_unit: item.sell_by_unit,
                    critical_value: item.critical_value,
                    wh_critical_value: item.wh_critical_value,
                    moq: item.moq,
                    image_path: item.image_path.clone(),
                    warehouse,
                    branches,
                }
            })
            .filter(|row| match query.filter {
                shared::StockFilter::All => true,
                shared::StockFilter::LowStock => {
                    row.warehouse.as_ref().map_or(false, |w| w.low_stock)
                        || row.branches.iter().any(|b| b.low_stock)
                }
            })
            .collect();

        Ok(paginate(rows, query.pagination, |row: &StockMonitorRow| (row.name.clone(), row.id)))
    }

    async fn list_catalog(&self, query: &CatalogQuery) -> AppResult<Page<CatalogItem>> {
        let t = self.tables.read().await;
        let rows = t
            .items
            .values()
            .filter(|item| match query.category {
                CategoryFilter::Any => true,
                CategoryFilter::Only(id) => item.category_id == Some(id),
            })
            .filter(|item| matches_search(&item.name, &query.search))
            .map(|item| CatalogItem {
                id: item.id,
                name: item.name.clone(),
                category_id: item.category_id,
                price: item.price,
                cost: item.cost,
                is_managed: item.is_managed,
                image_path: item.image_path.clone(),
                quantity: query.branch_id.and_then(|branch_id| {
                    t.branch_items
                        .values()
                        .find(|stock| stock.branch_id == branch_id && stock.item_id == item.id)
                        .map(|stock| stock.quantity)
                }),
                sell_by_unit: item.sell_by_unit,
            })
            .collect();

        Ok(paginate(rows, query.pagination, |row: &CatalogItem| (row.name.clone(), row.id)))
    }

    async fn branch_movement_history(
        &self,
        branch_item_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        let t = self.tables.read().await;
        let rows = t
            .stock_inputs
            .values()
            .filter(|input| input.branch_item_id == branch_item_id)
            .filter_map(|input| t.branch_movement(input))
            .collect();
        Ok(Page::full(rows))
    }

    async fn warehouse_movement_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        let t = self.tables.read().await;
        let rows = t
            .wh_stock_inputs
            .values()
            .filter(|input| input.warehouse_item_id == warehouse_item_id)
            .filter_map(|input| t.warehouse_movement(input))
            .collect();
        Ok(Page::full(rows))
    }

    async fn supplier_movement_history(&self, supplier_id: i64) -> AppResult<Page<MovementRecord>> {
        let t = self.tables.read().await;
        let rows = t
            .wh_stock_inputs
            .values()
            .filter(|input| input.delivered_by == Some(supplier_id))
            .filter_map(|input| t.warehouse_movement(input))
            .collect();
        Ok(Page::full(rows))
    }

    async fn supplier_return_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<SupplierReturnRecord>> {
        let t = self.tables.read().await;
        let rows = t
            .supplier_returns
            .values()
            .filter(|r| r.warehouse_item_id == warehouse_item_id)
            .filter_map(|r| {
                let supplier = t.suppliers.get(&r.supplier_id)?;
                Some(SupplierReturnRecord {
                    id: r.id,
                    warehouse_item_id: r.warehouse_item_id,
                    supplier_id: r.supplier_id,
                    supplier_name: supplier.name.clone(),
                    reason: r.reason.clone(),
                    quantity: r.quantity,
                    date: r.date,
                })
            })
            .collect();
        Ok(Page::full(rows))
    }
}

#[async_trait]
impl SupplierStore for MemoryStore {
    async fn list_suppliers(&self, search: Option<&str>) -> AppResult<Vec<Supplier>> {
        let t = self.tables.read().await;
        let mut suppliers: Vec<Supplier> = t
            .suppliers
            .values()
            .filter(|s| search.map_or(true, |search| name_matches(&s.name, search)))
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: i64) -> AppResult<Option<Supplier>> {
        Ok(self.tables.read().await.suppliers.get(&id).cloned())
    }

    async fn insert_supplier(&self, fields: &SupplierFields) -> AppResult<Supplier> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let supplier = Supplier {
            id,
            name: fields.name.clone(),
            contact_number1: fields.contact_number1.clone(),
            contact_number2: fields.contact_number2.clone(),
            address: fields.address.clone(),
        };
        t.suppliers.insert(id, supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: i64,
        fields: &SupplierFields,
    ) -> AppResult<Option<Supplier>> {
        let mut t = self.tables.write().await;
        Ok(t.suppliers.get_mut(&id).map(|supplier| {
            supplier.name = fields.name.clone();
            supplier.contact_number1 = fields.contact_number1.clone();
            supplier.contact_number2 = fields.contact_number2.clone();
            supplier.address = fields.address.clone();
            supplier.clone()
        }))
    }

    async fn delete_supplier(&self, id: i64) -> AppResult<Option<SupplierDeletion>> {
        let mut t = self.tables.write().await;
        if !t.suppliers.contains_key(&id) {
            return Ok(None);
        }

        let mut detached_movements = 0;
        for input in t.wh_stock_inputs.values_mut() {
            if input.delivered_by == Some(id) {
                input.delivered_by = None;
                detached_movements += 1;
            }
        }
        for input in t.stock_inputs.values_mut() {
            if input.delivered_by == Some(id) {
                input.delivered_by = None;
                detached_movements += 1;
            }
        }

        let returns_before = t.supplier_returns.len();
        t.supplier_returns.retain(|_, r| r.supplier_id != id);
        let deleted_returns = (returns_before - t.supplier_returns.len()) as u64;

        t.suppliers.remove(&id);

        Ok(Some(SupplierDeletion {
            supplier_id: id,
            detached_movements,
            deleted_returns,
        }))
    }
}
