//! PostgreSQL store tests
//!
//! Each test gets a fresh database with the migrations applied. They need a
//! server reachable through `DATABASE_URL` and only run with
//! `--features postgres-tests` (or `--ignored`).

mod common;

use std::sync::Arc;

use bpims_backend::error::AppError;
use bpims_backend::models::{CatalogQuery, StockQuery};
use bpims_backend::services::supplier::SupplierInput;
use bpims_backend::services::{LedgerService, StockQueryService, SupplierService};
use bpims_backend::store::{LedgerStore, PgStore, SharedStore, StockQueryStore};
use common::*;
use rust_decimal::Decimal;
use shared::{Pagination, StockFilter};
use sqlx::PgPool;

/// Same layout as the in-memory `Seeded` fixture, written through SQL
struct PgSeeded {
    pool: PgPool,
    branch_id: i64,
    item_id: i64,
    branch_stock_id: i64,
    warehouse_stock_id: i64,
}

async fn insert_branch(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO branches (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_item(pool: &PgPool, name: &str, critical: &str, wh_critical: &str) -> i64 {
    sqlx::query_scalar(
        r#"INSERT INTO items (name, unit_of_measure, is_managed, critical_value, wh_critical_value)
           VALUES ($1, 'pcs', TRUE, $2, $3) RETURNING id"#,
    )
    .bind(name)
    .bind(dec(critical))
    .bind(dec(wh_critical))
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_branch_stock(pool: &PgPool, branch_id: i64, item_id: i64, quantity: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO branch_items (branch_id, item_id, quantity) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(branch_id)
    .bind(item_id)
    .bind(dec(quantity))
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_warehouse_stock(pool: &PgPool, item_id: i64, quantity: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO warehouse_items (item_id, quantity) VALUES ($1, $2) RETURNING id")
        .bind(item_id)
        .bind(dec(quantity))
        .fetch_one(pool)
        .await
        .unwrap()
}

impl PgSeeded {
    async fn new(pool: PgPool) -> Self {
        let branch_id = insert_branch(&pool, "Tagum").await;
        let item_id = insert_item(&pool, "Common Nail", "5", "20").await;
        let branch_stock_id = insert_branch_stock(&pool, branch_id, item_id, "10").await;
        let warehouse_stock_id = insert_warehouse_stock(&pool, item_id, "100").await;

        Self {
            pool,
            branch_id,
            item_id,
            branch_stock_id,
            warehouse_stock_id,
        }
    }

    fn store(&self) -> SharedStore {
        Arc::new(PgStore::new(self.pool.clone()))
    }

    async fn supplier(&self, name: &str) -> i64 {
        SupplierService::new(self.store())
            .upsert_supplier(SupplierInput {
                id: 0,
                name: name.to_string(),
                contact_number1: None,
                contact_number2: None,
                address: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

fn query(filter: StockFilter) -> StockQuery {
    StockQuery {
        filter,
        search: None,
        pagination: Pagination::default(),
    }
}

// ============================================================================
// Ledger
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_branch_receipt_adds_and_records(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let ledger = LedgerService::new(seeded.store());

    let recorded = ledger
        .record_branch_receipt(seeded.branch_stock_id, branch_receipt("5.25"))
        .await
        .unwrap();
    assert_eq!(recorded.new_quantity, dec("15.25"));
    assert_eq!(recorded.record.moq, dec("12"));
    assert_eq!(recorded.record.delivered_by, None);

    let store = seeded.store();
    let stock = store.branch_stock(seeded.branch_stock_id).await.unwrap().unwrap();
    assert_eq!(stock.quantity, dec("15.25"));

    let history = store.branch_movement_history(seeded.branch_stock_id).await.unwrap();
    assert_eq!(history.total_count, 1);
    assert_eq!(history.items[0].item_name, "Common Nail");
    assert_eq!(history.items[0].qty, dec("5.25"));
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_failed_receipt_writes_nothing(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let ledger = LedgerService::new(seeded.store());

    let err = ledger
        .record_warehouse_receipt(9999, warehouse_receipt("1", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = ledger
        .record_warehouse_receipt(seeded.warehouse_stock_id, warehouse_receipt("1", 4242))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(seeded.count("wh_stock_inputs").await, 0);
    let stock = seeded
        .store()
        .warehouse_stock(seeded.warehouse_stock_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, dec("100"));
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_receipt_past_column_range_is_validation(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let store = seeded.store();
    store
        .set_warehouse_quantity(seeded.warehouse_stock_id, dec("9999999999.00"))
        .await
        .unwrap();

    let err = LedgerService::new(seeded.store())
        .record_warehouse_receipt(seeded.warehouse_stock_id, warehouse_receipt("1", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "qty"));
    assert_eq!(seeded.count("wh_stock_inputs").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_return_subtracts_and_can_go_negative(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let supplier_id = seeded.supplier("Holcim").await;
    let ledger = LedgerService::new(seeded.store());

    let recorded = ledger
        .return_to_supplier(seeded.warehouse_stock_id, supplier_return(supplier_id, "2.50"))
        .await
        .unwrap();
    assert_eq!(recorded.new_quantity, dec("97.50"));

    let recorded = ledger
        .return_to_supplier(seeded.warehouse_stock_id, supplier_return(supplier_id, "100"))
        .await
        .unwrap();
    assert_eq!(recorded.new_quantity, dec("-2.50"));

    let returns = seeded
        .store()
        .supplier_return_history(seeded.warehouse_stock_id)
        .await
        .unwrap();
    assert_eq!(returns.total_count, 2);
    assert_eq!(returns.items[0].supplier_name, "Holcim");
    assert_eq!(returns.items[0].quantity, dec("2.50"));
}

// ============================================================================
// Suppliers
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_delete_supplier_cascade(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let supplier_id = seeded.supplier("Holcim").await;
    let ledger = LedgerService::new(seeded.store());

    ledger
        .record_warehouse_receipt(seeded.warehouse_stock_id, warehouse_receipt("10", supplier_id))
        .await
        .unwrap();
    let mut receipt = branch_receipt("3");
    receipt.delivered_by = Some(supplier_id);
    ledger
        .record_branch_receipt(seeded.branch_stock_id, receipt)
        .await
        .unwrap();
    ledger
        .return_to_supplier(seeded.warehouse_stock_id, supplier_return(supplier_id, "2"))
        .await
        .unwrap();

    let deletion = SupplierService::new(seeded.store())
        .delete_supplier(supplier_id)
        .await
        .unwrap();
    assert_eq!(deletion.detached_movements, 2);
    assert_eq!(deletion.deleted_returns, 1);

    let store = seeded.store();
    let warehouse = store
        .warehouse_movement_history(seeded.warehouse_stock_id)
        .await
        .unwrap();
    assert_eq!(warehouse.total_count, 1);
    assert_eq!(warehouse.items[0].delivered_by, None);
    assert_eq!(warehouse.items[0].supplier_name, None);

    let branch = store.branch_movement_history(seeded.branch_stock_id).await.unwrap();
    assert_eq!(branch.items[0].delivered_by, None);

    assert_eq!(seeded.count("supplier_returns").await, 0);
    assert_eq!(seeded.count("suppliers").await, 0);

    // the return stays applied to the stock row
    let stock = store.warehouse_stock(seeded.warehouse_stock_id).await.unwrap().unwrap();
    assert_eq!(stock.quantity, dec("108"));
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_upsert_unknown_supplier_is_not_found(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;

    let err = SupplierService::new(seeded.store())
        .upsert_supplier(SupplierInput {
            id: 4242,
            name: "Ghost".to_string(),
            contact_number1: None,
            contact_number2: None,
            address: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(seeded.count("suppliers").await, 0);
}

// ============================================================================
// Listings
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_low_stock_uses_each_locations_threshold(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let cement = insert_item(&seeded.pool, "Cement", "50", "20").await;
    insert_branch_stock(&seeded.pool, seeded.branch_id, cement, "30").await;
    insert_warehouse_stock(&seeded.pool, cement, "30").await;
    let service = StockQueryService::new(seeded.store());

    let warehouse = service
        .list_warehouse_stock(&query(StockFilter::LowStock))
        .await
        .unwrap();
    assert_eq!(warehouse.total_count, 0);
    assert!(warehouse.items.is_empty());

    let branch = service
        .list_branch_stock(seeded.branch_id, &query(StockFilter::LowStock))
        .await
        .unwrap();
    assert_eq!(branch.total_count, 1);
    assert_eq!(branch.items[0].item_id, cement);
    assert_eq!(branch.items[0].critical_value, dec("50"));
    assert!(branch.items[0].low_stock);

    let all = service
        .list_branch_stock(seeded.branch_id, &query(StockFilter::All))
        .await
        .unwrap();
    assert_eq!(all.total_count, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_listing_order_and_paging(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    for name in ["apple", "Zinc", "100% Silicone"] {
        let item = insert_item(&seeded.pool, name, "0", "0").await;
        insert_warehouse_stock(&seeded.pool, item, "1").await;
    }
    let service = StockQueryService::new(seeded.store());

    let page = service
        .list_warehouse_stock(&query(StockFilter::All))
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["100% Silicone", "Common Nail", "Zinc", "apple"]);

    let search = service
        .list_warehouse_stock(&StockQuery {
            search: Some("0%".to_string()),
            ..query(StockFilter::All)
        })
        .await
        .unwrap();
    assert_eq!(search.total_count, 1);
    assert_eq!(search.items[0].name, "100% Silicone");

    let second = service
        .list_warehouse_stock(&StockQuery {
            pagination: Pagination::page(Some(2)),
            ..query(StockFilter::All)
        })
        .await
        .unwrap();
    assert!(second.items.is_empty());
    assert_eq!(second.total_count, 4);
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_catalog_branch_scope_keeps_unstocked_items(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let plywood = insert_item(&seeded.pool, "Plywood", "0", "0").await;
    let other_branch = insert_branch(&seeded.pool, "Panabo").await;
    insert_branch_stock(&seeded.pool, other_branch, plywood, "7").await;
    let service = StockQueryService::new(seeded.store());

    let scoped = service
        .list_catalog(&CatalogQuery {
            branch_id: Some(seeded.branch_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scoped.total_count, 2);
    let nail = scoped.items.iter().find(|i| i.id == seeded.item_id).unwrap();
    assert_eq!(nail.quantity, Some(dec("10")));
    // stocked only at another branch
    let unstocked = scoped.items.iter().find(|i| i.id == plywood).unwrap();
    assert_eq!(unstocked.quantity, None);

    let whole = service.list_catalog(&CatalogQuery::default()).await.unwrap();
    assert_eq!(whole.total_count, 2);
    assert!(whole.items.iter().all(|i| i.quantity.is_none()));
}

#[sqlx::test(migrations = "./migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "needs PostgreSQL at DATABASE_URL")]
async fn test_stock_monitor_groups_locations(pool: PgPool) {
    let seeded = PgSeeded::new(pool).await;
    let second_branch = insert_branch(&seeded.pool, "Panabo").await;
    insert_branch_stock(&seeded.pool, second_branch, seeded.item_id, "2").await;
    let service = StockQueryService::new(seeded.store());

    let page = service
        .list_stock_monitor(&query(StockFilter::All))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    let row = &page.items[0];
    let warehouse = row.warehouse.as_ref().unwrap();
    assert_eq!(warehouse.stock_id, seeded.warehouse_stock_id);
    assert_eq!(warehouse.location_name, "Warehouse");
    assert_eq!(warehouse.quantity, dec("100"));
    assert_eq!(row.branches.len(), 2);
    assert_eq!(row.branches[0].location_name, "Tagum");
    assert!(!row.branches[0].low_stock);
    assert!(row.branches[1].low_stock);
    assert_eq!(row.branches[1].quantity, Decimal::from(2));
}
