//! PostgreSQL store
//!
//! Listings are assembled with `QueryBuilder` so every piece of client text
//! travels as a bind parameter. The row query and the count query of a
//! listing are built by the same closure, which keeps their predicates
//! identical.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{contains_pattern, CategoryFilter, Page, Pagination, StockFilter};
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use super::{adjusted_quantity, LedgerStore, StockQueryStore, SupplierStore};
use crate::error::{AppError, AppResult};
use crate::models::{
    BranchStock, CatalogItem, CatalogQuery, LocationQuantity, MovementRecord, NewBranchReceipt,
    NewSupplierReturn, NewWarehouseReceipt, Recorded, StockInput, StockMonitorRow, StockQuery,
    StockRow, Supplier, SupplierDeletion, SupplierFields, SupplierReturn, SupplierReturnRecord,
    WarehouseStock, WarehouseStockInput, WAREHOUSE_NAME,
};

/// Store backed by a PostgreSQL connection pool.
///
/// Name ordering uses the "C" collation so listings sort byte-wise whatever
/// the database default collation is.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

/// Location quantity plus the item it belongs to, for grouping
#[derive(Debug, FromRow)]
struct LocationRow {
    item_id: i64,
    stock_id: i64,
    branch_id: Option<i64>,
    location_name: String,
    quantity: Decimal,
    low_stock: bool,
}

impl From<LocationRow> for LocationQuantity {
    fn from(row: LocationRow) -> Self {
        LocationQuantity {
            stock_id: row.stock_id,
            branch_id: row.branch_id,
            location_name: row.location_name,
            quantity: row.quantity,
            low_stock: row.low_stock,
        }
    }
}

const SUPPLIER_COLUMNS: &str = "id, name, contact_number1, contact_number2, address";

const MOVEMENT_HISTORY_BRANCH: &str = r#"
    SELECT si.id, si.branch_item_id AS stock_id, si.qty, si.moq, si.delivery_date,
           si.delivered_by, s.name AS supplier_name, si.expected_qty, si.actual_qty,
           i.name AS item_name, i.unit_of_measure
    FROM stock_inputs si
    INNER JOIN branch_items bi ON bi.id = si.branch_item_id
    INNER JOIN items i ON i.id = bi.item_id
    LEFT JOIN suppliers s ON s.id = si.delivered_by
"#;

const MOVEMENT_HISTORY_WAREHOUSE: &str = r#"
    SELECT wsi.id, wsi.warehouse_item_id AS stock_id, wsi.qty, CAST(NULL AS NUMERIC) AS moq,
           wsi.delivery_date, wsi.delivered_by, s.name AS supplier_name, wsi.expected_qty,
           wsi.actual_qty, i.name AS item_name, i.unit_of_measure
    FROM wh_stock_inputs wsi
    INNER JOIN warehouse_items wi ON wi.id = wsi.warehouse_item_id
    INNER JOIN items i ON i.id = wi.item_id
    LEFT JOIN suppliers s ON s.id = wsi.delivered_by
"#;

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Run a count query and a windowed row query over the same `FROM ... WHERE`
    async fn paged<T, F>(
        &self,
        columns: &str,
        order_by: &str,
        pagination: Pagination,
        push_from: F,
    ) -> AppResult<Page<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        F: Fn(&mut QueryBuilder<'static, Postgres>) + Send + Sync,
    {
        let mut count = QueryBuilder::new("SELECT COUNT(*)");
        push_from(&mut count);
        let (total_count,): (i64,) = count.build_query_as().fetch_one(&self.db).await?;

        let mut rows = QueryBuilder::new(columns);
        push_from(&mut rows);
        rows.push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = rows.build_query_as::<T>().fetch_all(&self.db).await?;

        Ok(Page::new(items, total_count))
    }

    /// Unpaginated history listing with an independent count over the same predicate
    async fn history<T>(
        &self,
        select: &str,
        count_sql: &str,
        predicate: &str,
        order_by: &str,
        key: i64,
    ) -> AppResult<Page<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total_count = sqlx::query_scalar::<_, i64>(&format!("{} WHERE {}", count_sql, predicate))
            .bind(key)
            .fetch_one(&self.db)
            .await?;

        let items = sqlx::query_as::<_, T>(&format!(
            "{} WHERE {} ORDER BY {}",
            select, predicate, order_by
        ))
        .bind(key)
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(items, total_count))
    }
}

/// Append a case-insensitive item name search
fn push_name_search(qb: &mut QueryBuilder<'static, Postgres>, search: &Option<String>) {
    if let Some(search) = search {
        qb.push(" AND i.name ILIKE ").push_bind(contains_pattern(search));
    }
}

async fn lock_branch_stock(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> AppResult<BranchStock> {
    sqlx::query_as::<_, BranchStock>(
        "SELECT id, branch_id, item_id, quantity FROM branch_items WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Branch stock".to_string()))
}

async fn lock_warehouse_stock(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> AppResult<WarehouseStock> {
    sqlx::query_as::<_, WarehouseStock>(
        "SELECT id, item_id, quantity FROM warehouse_items WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))
}

/// Keep a referenced supplier from being deleted until the transaction ends
async fn share_lock_supplier(tx: &mut Transaction<'_, Postgres>, id: Option<i64>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };

    sqlx::query_scalar::<_, i64>("SELECT id FROM suppliers WHERE id = $1 FOR SHARE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

    Ok(())
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn branch_stock(&self, id: i64) -> AppResult<Option<BranchStock>> {
        let row = sqlx::query_as::<_, BranchStock>(
            "SELECT id, branch_id, item_id, quantity FROM branch_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn warehouse_stock(&self, id: i64) -> AppResult<Option<WarehouseStock>> {
        let row = sqlx::query_as::<_, WarehouseStock>(
            "SELECT id, item_id, quantity FROM warehouse_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn record_branch_receipt(
        &self,
        receipt: NewBranchReceipt,
    ) -> AppResult<Recorded<StockInput>> {
        let mut tx = self.db.begin().await?;

        let stock = lock_branch_stock(&mut tx, receipt.branch_item_id).await?;
        share_lock_supplier(&mut tx, receipt.delivered_by).await?;
        adjusted_quantity("qty", stock.quantity, receipt.qty)?;

        let record = sqlx::query_as::<_, StockInput>(
            r#"
            INSERT INTO stock_inputs (
                qty, moq, delivery_date, delivered_by, expected_qty, actual_qty, branch_item_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, qty, moq, delivery_date, delivered_by, expected_qty, actual_qty,
                      branch_item_id
            "#,
        )
        .bind(receipt.qty)
        .bind(receipt.moq)
        .bind(receipt.delivery_date)
        .bind(receipt.delivered_by)
        .bind(receipt.expected_qty)
        .bind(receipt.actual_qty)
        .bind(receipt.branch_item_id)
        .fetch_one(&mut *tx)
        .await?;

        let new_quantity = sqlx::query_scalar::<_, Decimal>(
            "UPDATE branch_items SET quantity = quantity + $1 WHERE id = $2 RETURNING quantity",
        )
        .bind(receipt.qty)
        .bind(receipt.branch_item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Recorded {
            record,
            new_quantity,
        })
    }

    async fn record_warehouse_receipt(
        &self,
        receipt: NewWarehouseReceipt,
    ) -> AppResult<Recorded<WarehouseStockInput>> {
        let mut tx = self.db.begin().await?;

        let stock = lock_warehouse_stock(&mut tx, receipt.warehouse_item_id).await?;
        share_lock_supplier(&mut tx, receipt.delivered_by).await?;
        adjusted_quantity("qty", stock.quantity, receipt.qty)?;

        let record = sqlx::query_as::<_, WarehouseStockInput>(
            r#"
            INSERT INTO wh_stock_inputs (
                qty, delivery_date, delivered_by, expected_qty, actual_qty, warehouse_item_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, qty, delivery_date, delivered_by, expected_qty, actual_qty,
                      warehouse_item_id
            "#,
        )
        .bind(receipt.qty)
        .bind(receipt.delivery_date)
        .bind(receipt.delivered_by)
        .bind(receipt.expected_qty)
        .bind(receipt.actual_qty)
        .bind(receipt.warehouse_item_id)
        .fetch_one(&mut *tx)
        .await?;

        let new_quantity = sqlx::query_scalar::<_, Decimal>(
            "UPDATE warehouse_items SET quantity = quantity + $1 WHERE id = $2 RETURNING quantity",
        )
        .bind(receipt.qty)
        .bind(receipt.warehouse_item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Recorded {
            record,
            new_quantity,
        })
    }

    async fn set_warehouse_quantity(&self, id: i64, quantity: Decimal) -> AppResult<WarehouseStock> {
        sqlx::query_as::<_, WarehouseStock>(
            "UPDATE warehouse_items SET quantity = $1 WHERE id = $2 RETURNING id, item_id, quantity",
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse stock".to_string()))
    }

    async fn record_supplier_return(
        &self,
        supplier_return: NewSupplierReturn,
    ) -> AppResult<Recorded<SupplierReturn>> {
        let mut tx = self.db.begin().await?;

        let stock = lock_warehouse_stock(&mut tx, supplier_return.warehouse_item_id).await?;
        share_lock_supplier(&mut tx, Some(supplier_return.supplier_id)).await?;
        adjusted_quantity("quantity", stock.quantity, -supplier_return.quantity)?;

        let record = sqlx::query_as::<_, SupplierReturn>(
            r#"
            INSERT INTO supplier_returns (supplier_id, warehouse_item_id, reason, quantity, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, warehouse_item_id, reason, quantity, date
            "#,
        )
        .bind(supplier_return.supplier_id)
        .bind(supplier_return.warehouse_item_id)
        .bind(&supplier_return.reason)
        .bind(supplier_return.quantity)
        .bind(supplier_return.date)
        .fetch_one(&mut *tx)
        .await?;

        let new_quantity = sqlx::query_scalar::<_, Decimal>(
            "UPDATE warehouse_items SET quantity = quantity - $1 WHERE id = $2 RETURNING quantity",
        )
        .bind(supplier_return.quantity)
        .bind(supplier_return.warehouse_item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Recorded {
            record,
            new_quantity,
        })
    }
}

#[async_trait]
impl StockQueryStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_branch_stock(
        &self,
        branch_id: i64,
        query: &StockQuery,
    ) -> AppResult<Page<StockRow>> {
        self.paged(
            r#"SELECT bi.id, i.id AS item_id, i.name, bi.quantity, i.unit_of_measure,
                      i.critical_value, i.sell_by_unit, i.moq, i.image_path,
                      (bi.quantity < i.critical_value) AS low_stock"#,
            "i.name COLLATE \"C\" ASC, bi.id ASC",
            query.pagination,
            |qb| {
                qb.push(" FROM branch_items bi INNER JOIN items i ON i.id = bi.item_id")
                    .push(" WHERE bi.branch_id = ")
                    .push_bind(branch_id);
                if query.filter == StockFilter::LowStock {
                    qb.push(" AND bi.quantity < i.critical_value");
                }
                push_name_search(qb, &query.search);
            },
        )
        .await
    }

    async fn list_warehouse_stock(&self, query: &StockQuery) -> AppResult<Page<StockRow>> {
        self.paged(
            r#"SELECT wi.id, i.id AS item_id, i.name, wi.quantity, i.unit_of_measure,
                      i.wh_critical_value AS critical_value, i.sell_by_unit, i.moq, i.image_path,
                      (wi.quantity < i.wh_critical_value) AS low_stock"#,
            "i.name COLLATE \"C\" ASC, wi.id ASC",
            query.pagination,
            |qb| {
                qb.push(" FROM warehouse_items wi INNER JOIN items i ON i.id = wi.item_id")
                    .push(" WHERE i.is_managed");
                if query.filter == StockFilter::LowStock {
                    qb.push(" AND wi.quantity < i.wh_critical_value");
                }
                push_name_search(qb, &query.search);
            },
        )
        .await
    }

    async fn list_stock_monitor(&self, query: &StockQuery) -> AppResult<Page<StockMonitorRow>> {
        let mut page: Page<StockMonitorRow> = self
            .paged(
                r#"SELECT i.id, i.name, i.unit_of_measure, i.sell_by_unit, i.critical_value,
                          i.wh_critical_value, i.moq, i.image_path"#,
                "i.name COLLATE \"C\" ASC, i.id ASC",
                query.pagination,
                |qb| {
                    qb.push(" FROM items i WHERE i.is_managed");
                    if query.filter == StockFilter::LowStock {
                        qb.push(
                            r#" AND (EXISTS (SELECT 1 FROM warehouse_items w
                                             WHERE w.item_id = i.id AND w.quantity < i.wh_critical_value)
                                  OR EXISTS (SELECT 1 FROM branch_items b
                                             WHERE b.item_id = i.id AND b.quantity < i.critical_value))"#,
                        );
                    }
                    push_name_search(qb, &query.search);
                },
            )
            .await?;

        if page.items.is_empty() {
            return Ok(page);
        }

        let item_ids: Vec<i64> = page.items.iter().map(|row| row.id).collect();

        let branch_rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT bi.item_id, bi.id AS stock_id, bi.branch_id, b.name AS location_name,
                   bi.quantity, (bi.quantity < i.critical_value) AS low_stock
            FROM branch_items bi
            INNER JOIN branches b ON b.id = bi.branch_id
            INNER JOIN items i ON i.id = bi.item_id
            WHERE bi.item_id = ANY($1)
            ORDER BY bi.item_id, b.id
            "#,
        )
        .bind(&item_ids)
        .fetch_all(&self.db)
        .await?;

        let warehouse_rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT wi.item_id, wi.id AS stock_id, CAST(NULL AS BIGINT) AS branch_id,
                   CAST($2 AS TEXT) AS location_name, wi.quantity,
                   (wi.quantity < i.wh_critical_value) AS low_stock
            FROM warehouse_items wi
            INNER JOIN items i ON i.id = wi.item_id
            WHERE wi.item_id = ANY($1)
            "#,
        )
        .bind(&item_ids)
        .bind(WAREHOUSE_NAME)
        .fetch_all(&self.db)
        .await?;

        for warehouse_row in warehouse_rows {
            if let Some(item) = page.items.iter_mut().find(|i| i.id == warehouse_row.item_id) {
                item.warehouse = Some(warehouse_row.into());
            }
        }
        for branch_row in branch_rows {
            if let Some(item) = page.items.iter_mut().find(|i| i.id == branch_row.item_id) {
                item.branches.push(branch_row.into());
            }
        }

        Ok(page)
    }

    async fn list_catalog(&self, query: &CatalogQuery) -> AppResult<Page<CatalogItem>> {
        let columns = match query.branch_id {
            Some(_) => {
                r#"SELECT i.id, i.name, i.category_id, i.price, i.cost, i.is_managed,
                          i.image_path, bi.quantity, i.sell_by_unit"#
            }
            None => {
                r#"SELECT i.id, i.name, i.category_id, i.price, i.cost, i.is_managed,
                          i.image_path, CAST(NULL AS NUMERIC) AS quantity, i.sell_by_unit"#
            }
        };

        self.paged(columns, "i.name COLLATE \"C\" ASC, i.id ASC", query.pagination, |qb| {
            qb.push(" FROM items i");
            if let Some(branch_id) = query.branch_id {
                // branch condition lives in the join so unstocked items still list
                qb.push(" LEFT JOIN branch_items bi ON bi.item_id = i.id AND bi.branch_id = ")
                    .push_bind(branch_id);
            }
            qb.push(" WHERE TRUE");
            if let CategoryFilter::Only(category_id) = query.category {
                qb.push(" AND i.category_id = ").push_bind(category_id);
            }
            push_name_search(qb, &query.search);
        })
        .await
    }

    async fn branch_movement_history(
        &self,
        branch_item_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        self.history(
            MOVEMENT_HISTORY_BRANCH,
            "SELECT COUNT(*) FROM stock_inputs si",
            "si.branch_item_id = $1",
            "si.id ASC",
            branch_item_id,
        )
        .await
    }

    async fn warehouse_movement_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<MovementRecord>> {
        self.history(
            MOVEMENT_HISTORY_WAREHOUSE,
            "SELECT COUNT(*) FROM wh_stock_inputs wsi",
            "wsi.warehouse_item_id = $1",
            "wsi.id ASC",
            warehouse_item_id,
        )
        .await
    }

    async fn supplier_movement_history(&self, supplier_id: i64) -> AppResult<Page<MovementRecord>> {
        self.history(
            MOVEMENT_HISTORY_WAREHOUSE,
            "SELECT COUNT(*) FROM wh_stock_inputs wsi",
            "wsi.delivered_by = $1",
            "wsi.id ASC",
            supplier_id,
        )
        .await
    }

    async fn supplier_return_history(
        &self,
        warehouse_item_id: i64,
    ) -> AppResult<Page<SupplierReturnRecord>> {
        self.history(
            r#"
            SELECT sr.id, sr.warehouse_item_id, sr.supplier_id, s.name AS supplier_name,
                   sr.reason, sr.quantity, sr.date
            FROM supplier_returns sr
            INNER JOIN suppliers s ON s.id = sr.supplier_id
            "#,
            "SELECT COUNT(*) FROM supplier_returns sr",
            "sr.warehouse_item_id = $1",
            "sr.id ASC",
            warehouse_item_id,
        )
        .await
    }
}

#[async_trait]
impl SupplierStore for PgStore {
    async fn list_suppliers(&self, search: Option<&str>) -> AppResult<Vec<Supplier>> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM suppliers", SUPPLIER_COLUMNS));
        if let Some(search) = search {
            qb.push(" WHERE name ILIKE ").push_bind(contains_pattern(search));
        }
        qb.push(r#" ORDER BY name COLLATE "C" ASC, id ASC"#);

        let suppliers = qb.build_query_as::<Supplier>().fetch_all(&self.db).await?;
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: i64) -> AppResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(supplier)
    }

    async fn insert_supplier(&self, fields: &SupplierFields) -> AppResult<Supplier> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_number1, contact_number2, address)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&fields.name)
        .bind(&fields.contact_number1)
        .bind(&fields.contact_number2)
        .bind(&fields.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: i64,
        fields: &SupplierFields,
    ) -> AppResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_number1 = $2, contact_number2 = $3, address = $4
            WHERE id = $5
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&fields.name)
        .bind(&fields.contact_number1)
        .bind(&fields.contact_number2)
        .bind(&fields.address)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(supplier)
    }

    async fn delete_supplier(&self, id: i64) -> AppResult<Option<SupplierDeletion>> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM suppliers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        // Detach movements before deleting anything they reference
        let warehouse_detached =
            sqlx::query("UPDATE wh_stock_inputs SET delivered_by = NULL WHERE delivered_by = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let branch_detached =
            sqlx::query("UPDATE stock_inputs SET delivered_by = NULL WHERE delivered_by = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let deleted_returns = sqlx::query("DELETE FROM supplier_returns WHERE supplier_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(SupplierDeletion {
            supplier_id: id,
            detached_movements: warehouse_detached + branch_detached,
            deleted_returns,
        }))
    }
}
