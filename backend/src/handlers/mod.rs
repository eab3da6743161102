//! HTTP handlers

mod extract;
pub mod health;
pub mod ledger;
pub mod receipt;
pub mod stock;
pub mod supplier;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health_check;
pub use ledger::{
    edit_warehouse_quantity, record_branch_receipt, record_warehouse_receipt, return_to_supplier,
};
pub use receipt::generate_receipt;
pub use stock::{
    get_movement_history, get_supplier_return_history, get_warehouse_movement_history,
    list_branch_stock, list_catalog, list_stock_monitor, list_warehouse_stock,
};
pub use supplier::{
    delete_supplier, get_supplier, get_supplier_movement_history, list_suppliers, upsert_supplier,
};
