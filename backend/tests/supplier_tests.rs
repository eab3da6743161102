//! Supplier directory tests, including the detach-and-delete cascade

mod common;

use bpims_backend::error::AppError;
use bpims_backend::services::supplier::SupplierInput;
use bpims_backend::services::{LedgerService, SupplierService};
use bpims_backend::store::{LedgerStore, StockQueryStore, SupplierStore};
use common::*;

fn input(id: i64, name: &str) -> SupplierInput {
    SupplierInput {
        id,
        name: name.to_string(),
        contact_number1: Some("09171234567".to_string()),
        contact_number2: None,
        address: Some("Tagum City".to_string()),
    }
}

#[tokio::test]
async fn test_upsert_creates_then_updates() {
    let seeded = Seeded::new().await;
    let service = SupplierService::new(seeded.shared());

    let created = service.upsert_supplier(input(0, "Holcim")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.contact_number1.as_deref(), Some("09171234567"));

    let updated = service
        .upsert_supplier(input(created.id, "Holcim Philippines"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Holcim Philippines");

    let all = service.list_suppliers(None).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_upsert_unknown_id_is_not_found() {
    let seeded = Seeded::new().await;
    let service = SupplierService::new(seeded.shared());

    let err = service.upsert_supplier(input(4242, "Ghost")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(service.list_suppliers(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upsert_rejects_blank_name() {
    let seeded = Seeded::new().await;
    let service = SupplierService::new(seeded.shared());

    let err = service.upsert_supplier(input(0, "   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));
}

#[tokio::test]
async fn test_get_supplier() {
    let seeded = Seeded::new().await;
    let supplier = seeded.supplier("Holcim").await;
    let service = SupplierService::new(seeded.shared());

    assert_eq!(service.get_supplier(None).await.unwrap(), None);
    assert_eq!(
        service.get_supplier(Some(supplier.id)).await.unwrap(),
        Some(supplier)
    );
    let err = service.get_supplier(Some(4242)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_list_suppliers_search_and_order() {
    let seeded = Seeded::new().await;
    for name in ["Republic Cement", "Holcim", "Eagle Cement"] {
        seeded.supplier(name).await;
    }
    let service = SupplierService::new(seeded.shared());

    let all = service.list_suppliers(Some("  ")).await.unwrap();
    let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Eagle Cement", "Holcim", "Republic Cement"]);

    let cement = service.list_suppliers(Some("CEMENT")).await.unwrap();
    assert_eq!(cement.len(), 2);
}

#[tokio::test]
async fn test_delete_supplier_detaches_movements_and_removes_returns() {
    let seeded = Seeded::new().await;
    let supplier = seeded.supplier("Holcim").await;
    let ledger = LedgerService::new(seeded.shared());
    let service = SupplierService::new(seeded.shared());

    ledger
        .record_warehouse_receipt(seeded.warehouse_stock_id, warehouse_receipt("10", supplier.id))
        .await
        .unwrap();
    ledger
        .return_to_supplier(seeded.warehouse_stock_id, supplier_return(supplier.id, "2"))
        .await
        .unwrap();

    let deletion = service.delete_supplier(supplier.id).await.unwrap();
    assert_eq!(deletion.detached_movements, 1);
    assert_eq!(deletion.deleted_returns, 1);

    let movements = seeded
        .store
        .warehouse_movement_history(seeded.warehouse_stock_id)
        .await
        .unwrap();
    assert_eq!(movements.total_count, 1);
    assert_eq!(movements.items[0].delivered_by, None);
    assert_eq!(movements.items[0].qty, dec("10"));

    let returns = seeded
        .store
        .supplier_return_history(seeded.warehouse_stock_id)
        .await
        .unwrap();
    assert_eq!(returns.total_count, 0);

    assert_eq!(seeded.store.get_supplier(supplier.id).await.unwrap(), None);

    // the return is not undone on the stock row
    let stock = seeded
        .store
        .warehouse_stock(seeded.warehouse_stock_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity, dec("108"));
}

#[tokio::test]
async fn test_delete_supplier_detaches_branch_movements() {
    let seeded = Seeded::new().await;
    let supplier = seeded.supplier("Holcim").await;
    let ledger = LedgerService::new(seeded.shared());

    let mut receipt = branch_receipt("3");
    receipt.delivered_by = Some(supplier.id);
    ledger
        .record_branch_receipt(seeded.branch_stock_id, receipt)
        .await
        .unwrap();

    let service = SupplierService::new(seeded.shared());
    service.delete_supplier(supplier.id).await.unwrap();

    let movements = seeded
        .store
        .branch_movement_history(seeded.branch_stock_id)
        .await
        .unwrap();
    assert_eq!(movements.items[0].delivered_by, None);
}

#[tokio::test]
async fn test_delete_unknown_supplier_is_not_found() {
    let seeded = Seeded::new().await;
    let service = SupplierService::new(seeded.shared());

    let err = service.delete_supplier(4242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_supplier_movement_history() {
    let seeded = Seeded::new().await;
    let holcim = seeded.supplier("Holcim").await;
    let eagle = seeded.supplier("Eagle Cement").await;
    let ledger = LedgerService::new(seeded.shared());

    for (qty, supplier) in [("1", holcim.id), ("2", eagle.id), ("3", holcim.id)] {
        ledger
            .record_warehouse_receipt(seeded.warehouse_stock_id, warehouse_receipt(qty, supplier))
            .await
            .unwrap();
    }

    let history = seeded.store.supplier_movement_history(holcim.id).await.unwrap();
    assert_eq!(history.total_count, 2);
    assert_eq!(history.items[0].qty, dec("1"));
    assert_eq!(history.items[1].qty, dec("3"));
    assert!(history.items[0].id < history.items[1].id);
}
