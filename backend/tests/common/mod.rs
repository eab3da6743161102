//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bpims_backend::{
    create_app,
    models::{Supplier, SupplierFields},
    services::ledger::{BranchReceiptInput, SupplierReturnInput, WarehouseReceiptInput},
    store::{ItemSeed, MemoryStore, SharedStore, SupplierStore},
    AppState, Config,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

pub const DELIVERY_DATE: &str = "Tue, 14 May 2024 09:30:15 GMT";

pub fn dec(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

/// One branch, one managed item stocked at the branch (10) and the warehouse (100).
/// Branch threshold is 5, warehouse threshold is 20.
pub struct Seeded {
    pub store: Arc<MemoryStore>,
    pub branch_id: i64,
    pub item_id: i64,
    pub branch_stock_id: i64,
    pub warehouse_stock_id: i64,
}

impl Seeded {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let branch_id = store.add_branch("Tagum").await;
        let item_id = store
            .add_item(ItemSeed::named("Common Nail").thresholds(dec("5"), dec("20")))
            .await;
        let branch_stock_id = store.add_branch_stock(branch_id, item_id, dec("10")).await;
        let warehouse_stock_id = store.add_warehouse_stock(item_id, dec("100")).await;

        Self {
            store,
            branch_id,
            item_id,
            branch_stock_id,
            warehouse_stock_id,
        }
    }

    pub fn shared(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn supplier(&self, name: &str) -> Supplier {
        self.store
            .insert_supplier(&SupplierFields {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }
}

pub fn branch_receipt(qty: &str) -> BranchReceiptInput {
    BranchReceiptInput {
        qty: qty.to_string(),
        moq: Some("12".to_string()),
        delivery_date: DELIVERY_DATE.to_string(),
        delivered_by: Some(0),
        expected_qty: qty.to_string(),
        actual_qty: qty.to_string(),
    }
}

pub fn warehouse_receipt(qty: &str, delivered_by: i64) -> WarehouseReceiptInput {
    WarehouseReceiptInput {
        qty: qty.to_string(),
        delivery_date: DELIVERY_DATE.to_string(),
        delivered_by: Some(delivered_by),
        expected_qty: qty.to_string(),
        actual_qty: qty.to_string(),
    }
}

pub fn supplier_return(supplier_id: i64, quantity: &str) -> SupplierReturnInput {
    SupplierReturnInput {
        supplier_id,
        reason: "Damaged on delivery".to_string(),
        quantity: quantity.to_string(),
        date: Some(DELIVERY_DATE.to_string()),
    }
}

/// Router over a seeded in-memory store
pub struct TestApp {
    router: Router,
    pub seeded: Seeded,
}

impl TestApp {
    pub async fn new() -> Self {
        let seeded = Seeded::new().await;
        let router = create_app(AppState::new(seeded.shared(), Config::default()));
        Self { router, seeded }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    /// Send a request and parse the JSON envelope
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
